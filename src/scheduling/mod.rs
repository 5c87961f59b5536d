//! Card scheduling for the study engine
//!
//! This module provides:
//! - Card and scheduling-state models
//! - Extended SM-2 spaced repetition state machine
//! - Due-card selection
//! - Review statistics

pub mod algorithm;
pub mod due;
pub mod models;

pub use algorithm::{
    advance, apply_review, format_interval, preview_intervals, ui_rating_to_quality, Advance,
    ScheduleError, MINUTE, MIN_EASE_FACTOR,
};
pub use due::due_cards;
pub use models::*;
