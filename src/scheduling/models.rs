//! Data models for card scheduling

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::MIN_EASE_FACTOR;

/// Repetition count at which a card counts as mastered
pub const MASTERY_REPETITION: u32 = 3;

/// A reviewable card as the scheduler sees it
///
/// Card content (question and answer text) lives in the store; the engine
/// only needs the owning exam and the subject label used for priority
/// classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub exam_id: Uuid,
    /// Subject label, matched against exam priority subjects and
    /// weak-point signals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Card {
    pub fn new(exam_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            exam_id,
            subject: None,
        }
    }

    /// Builder method to set the subject label
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// Status of a card in the spaced repetition system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardStatus {
    /// Never reviewed
    New,
    /// In the sub-day learning steps
    Learning,
    /// Graduated to day-scale review
    Review,
    /// Lapsed and working back through the learning steps
    Relearning,
}

impl Default for CardStatus {
    fn default() -> Self {
        Self::New
    }
}

/// Current spaced repetition state for a card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    pub card_id: Uuid,
    /// Current interval in days; values below 1 are fractions of a day,
    /// with one minute (1/1440) as the smallest step
    #[serde(default)]
    pub interval: f64,
    /// Consecutive successful graduations since the last reset
    #[serde(default)]
    pub repetition: u32,
    /// SM-2 ease factor (default 2.5, never below 1.3)
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f32,
    /// Interval held immediately before the most recent lapse, kept until
    /// the card re-graduates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lapse_interval: Option<f64>,
    /// When the card is due for review
    pub due_date: DateTime<Utc>,
    /// Total number of reviews
    #[serde(default)]
    pub review_count: u32,
    /// Number of correct responses
    #[serde(default)]
    pub correct_count: u32,
    /// Current status in the learning process
    #[serde(default)]
    pub status: CardStatus,
}

fn default_ease_factor() -> f32 {
    2.5
}

impl CardState {
    /// Create the state for a freshly added card, due immediately
    pub fn new(card_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            card_id,
            interval: 0.0,
            repetition: 0,
            ease_factor: default_ease_factor(),
            lapse_interval: None,
            due_date: now,
            review_count: 0,
            correct_count: 0,
            status: CardStatus::New,
        }
    }

    /// Create a state with an initial ease factor derived from prior
    /// difficulty data, clamped to the allowed minimum
    pub fn with_ease(card_id: Uuid, now: DateTime<Utc>, ease_factor: f32) -> Self {
        Self {
            ease_factor: ease_factor.max(MIN_EASE_FACTOR),
            ..Self::new(card_id, now)
        }
    }

    /// Check if the card is due for review
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.due_date
    }
}

/// A card with its current scheduling state, the unit handled by the
/// due filter and the queue builder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardWithState {
    pub card: Card,
    pub state: CardState,
}

/// A record of a single review attempt
///
/// Produced alongside `apply_review` for the caller to persist; the engine
/// itself keeps no history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    pub card_id: Uuid,
    /// Quality rating (0-5, SM-2 scale)
    pub quality: i32,
    /// Interval at time of review (days)
    pub interval: f64,
    /// Ease factor at time of review
    pub ease_factor: f32,
    /// When the review occurred
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn new(
        card_id: Uuid,
        quality: i32,
        interval: f64,
        ease_factor: f32,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            quality,
            interval,
            ease_factor,
            reviewed_at,
        }
    }
}

/// Aggregate counts for a deck or exam view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub due_cards: usize,
    pub mastered_cards: usize,
}

impl ReviewStats {
    /// Tally card states at the given instant
    pub fn compute(cards: &[CardWithState], now: DateTime<Utc>) -> Self {
        let mut stats = ReviewStats {
            total_cards: cards.len(),
            ..Default::default()
        };

        for card in cards {
            match card.state.status {
                CardStatus::New => stats.new_cards += 1,
                CardStatus::Learning => stats.learning_cards += 1,
                CardStatus::Review | CardStatus::Relearning => stats.review_cards += 1,
            }

            if card.state.is_due(now) {
                stats.due_cards += 1;
            }
            if card.state.repetition >= MASTERY_REPETITION {
                stats.mastered_cards += 1;
            }
        }

        stats
    }
}
