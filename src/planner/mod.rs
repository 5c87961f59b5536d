//! Cross-exam planning
//!
//! This module provides:
//! - Exam, snapshot, and priority-signal models
//! - Daily quota allocation across competing deadlines
//! - Interleaved study queue construction

pub mod allocator;
pub mod models;
pub mod queue;

pub use allocator::allocate;
pub use models::*;
pub use queue::build_queue;
