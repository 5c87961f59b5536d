//! Spaced repetition scheduling engine for exam preparation
//!
//! A deterministic function library: it decides when each card comes back,
//! splits the daily study budget across competing exam deadlines, and
//! builds one interleaved session queue. It holds no state, performs no
//! I/O, and never reads the clock. Every computation takes `now` as a
//! parameter and works on explicit value snapshots, so the surrounding
//! application owns storage, sync, and presentation.
//!
//! This crate provides:
//! - [`scheduling`]: per-card review state machine and due-card filter
//! - [`planner`]: cross-exam quota allocation and study queue building

pub mod planner;
pub mod scheduling;

pub use planner::{
    allocate, build_queue, Exam, ExamQuota, ExamSnapshot, PrioritySignal, StudyQueue,
};
pub use scheduling::{
    apply_review, due_cards, Card, CardState, CardStatus, CardWithState, ReviewRecord,
    ReviewStats, ScheduleError,
};
