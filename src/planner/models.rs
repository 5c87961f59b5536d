//! Exam planning data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduling::{CardWithState, MASTERY_REPETITION};

fn default_weight() -> f64 {
    1.0
}

/// A deadline-bound exam whose cards compete for daily study capacity
///
/// Read-only input to the planner; the engine never mutates exams.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: Uuid,
    pub name: String,
    /// When the exam takes place
    pub deadline: DateTime<Utc>,
    /// Relative importance against other exams
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Subjects the user declared as focus areas for this exam
    #[serde(default)]
    pub priority_subjects: Vec<String>,
}

impl Exam {
    pub fn new(name: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            deadline,
            weight: default_weight(),
            priority_subjects: Vec::new(),
        }
    }

    /// Builder method to set the weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Builder method to set the priority subjects
    pub fn with_priority_subjects(mut self, subjects: Vec<String>) -> Self {
        self.priority_subjects = subjects;
        self
    }
}

/// Where an exam stands right now (computed, not stored)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSnapshot {
    pub exam_id: Uuid,
    /// Whole days until the deadline, never below one
    pub days_left: i64,
    pub total_cards: usize,
    /// Cards with at least three consecutive successful reviews
    pub mastered_cards: usize,
    pub due_cards: usize,
    /// Cards still to master before the deadline
    pub remaining_cards: usize,
}

impl ExamSnapshot {
    /// Derive a snapshot from an exam's cards at the given instant
    pub fn compute(exam: &Exam, cards: &[CardWithState], now: DateTime<Utc>) -> Self {
        let total_cards = cards.len();
        let mastered_cards = cards
            .iter()
            .filter(|c| c.state.repetition >= MASTERY_REPETITION)
            .count();
        let due_cards = cards.iter().filter(|c| c.state.is_due(now)).count();

        Self {
            exam_id: exam.id,
            days_left: days_until(exam.deadline, now),
            total_cards,
            mastered_cards,
            due_cards,
            remaining_cards: total_cards - mastered_cards,
        }
    }
}

/// Days remaining before a deadline, rounded up and clamped to one
///
/// A deadline 36 hours away counts as two days out; past-due deadlines
/// count as one so pace divisions stay defined.
pub(crate) fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let days = (deadline - now).num_seconds() as f64 / 86_400.0;
    (days.ceil() as i64).max(1)
}

/// Weak-subject score for one exam, produced by the external analysis job
///
/// Scores only break ties in queue ordering; a missing feed behaves as if
/// every score were zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritySignal {
    pub exam_id: Uuid,
    pub subject: String,
    /// Non-negative weak-point score; higher means weaker
    pub score: f64,
}

impl PrioritySignal {
    pub fn new(exam_id: Uuid, subject: impl Into<String>, score: f64) -> Self {
        Self {
            exam_id,
            subject: subject.into(),
            score: score.max(0.0),
        }
    }
}

/// Daily study quota granted to one exam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuota {
    pub exam_id: Uuid,
    pub days_left: i64,
    /// Normalized urgency share across all active exams
    pub share: f64,
    /// Cards this exam may contribute to a session
    pub daily_quota: u32,
}

/// One session's ordered study queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyQueue {
    pub cards: Vec<CardWithState>,
    /// Sum of the applied daily quotas, for UI display
    pub quota_total: u32,
}
