//! Extended SM-2 spaced repetition algorithm
//!
//! The classic SuperMemo 2 interval/ease computation, extended with
//! sub-day learning steps and partial-credit lapse recovery.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing answer, remembered
//! - 2: Incorrect, but answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation
//!
//! A card starts in the learning phase (two sub-day steps of one and ten
//! minutes), graduates to day-scale intervals, and on failure drops back
//! into the learning steps while remembering the interval it lost. The
//! review instant is always an explicit parameter.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::models::{CardState, CardStatus};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f32 = 1.3;

/// One minute expressed in days, the smallest interval the scheduler produces
pub const MINUTE: f64 = 1.0 / 1440.0;

/// First learning step
const FIRST_STEP: f64 = MINUTE;

/// Second learning step
const SECOND_STEP: f64 = 10.0 * MINUTE;

/// Cards below this interval are still on the first learning step
const STEP_SPLIT: f64 = 5.0 * MINUTE;

/// Interval granted when graduating with Good from the second step
const GRADUATING_INTERVAL: f64 = 1.0;

/// Interval granted when graduating directly with Easy
const EASY_INTERVAL: f64 = 4.0;

/// Floor for the first standard-growth review after graduation
const YOUNG_GOOD_FLOOR: f64 = 4.0;

/// Easy bonus multiplier while a card is young
const EASY_BONUS_YOUNG: f64 = 3.0;

/// Easy bonus multiplier once a card is mature
const EASY_BONUS_MATURE: f64 = 1.3;

/// Slow growth multiplier for a mature card answered Hard
const HARD_GROWTH: f64 = 1.2;

/// Fraction of the pre-lapse interval restored on re-graduation
const LAPSE_RECOVERY: f64 = 0.5;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("invalid quality rating {0}, expected 0-5")]
    InvalidRating(i32),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Outcome of one state-machine step, before lapse bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    pub interval: f64,
    pub repetition: u32,
    pub ease_factor: f32,
}

/// Compute the next scheduling state for a single review
///
/// Pure transition on `(quality, repetition, ease_factor, interval)`.
/// Quality below 2 resets the card to the first learning step, quality 2
/// resets to the second step, and 3/4/5 advance the card according to its
/// phase. Total for quality in 0-5; anything else is rejected.
pub fn advance(quality: i32, repetition: u32, ease_factor: f32, interval: f64) -> Result<Advance> {
    if !(0..=5).contains(&quality) {
        return Err(ScheduleError::InvalidRating(quality));
    }

    // Failed with no recall: back to the first step, whatever the maturity
    if quality < 2 {
        return Ok(Advance {
            interval: FIRST_STEP,
            repetition: 0,
            ease_factor: (ease_factor - 0.2).max(MIN_EASE_FACTOR),
        });
    }

    // Failed, but the answer came back on seeing it: softer reset
    if quality == 2 {
        return Ok(Advance {
            interval: SECOND_STEP,
            repetition: 0,
            ease_factor: (ease_factor - 0.1).max(MIN_EASE_FACTOR),
        });
    }

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let missed = (5 - quality) as f32;
    let ease = (ease_factor + (0.1 - missed * (0.08 + missed * 0.02))).max(MIN_EASE_FACTOR);

    // Learning phase: two sub-day steps
    if repetition == 0 && interval < 1.0 {
        let next = if interval < STEP_SPLIT {
            match quality {
                3 => Advance {
                    interval: FIRST_STEP,
                    repetition: 0,
                    ease_factor: ease,
                },
                5 => Advance {
                    interval: EASY_INTERVAL,
                    repetition: 1,
                    ease_factor: ease,
                },
                _ => Advance {
                    interval: SECOND_STEP,
                    repetition: 0,
                    ease_factor: ease,
                },
            }
        } else {
            match quality {
                3 => Advance {
                    interval: SECOND_STEP,
                    repetition: 0,
                    ease_factor: ease,
                },
                5 => Advance {
                    interval: EASY_INTERVAL,
                    repetition: 1,
                    ease_factor: ease,
                },
                _ => Advance {
                    interval: GRADUATING_INTERVAL,
                    repetition: 1,
                    ease_factor: ease,
                },
            }
        };
        return Ok(next);
    }

    let growth = ease as f64;
    let next_interval = if repetition >= 2 {
        // Mature: intervals only ever grow
        match quality {
            3 => interval.max((interval * HARD_GROWTH).round()),
            5 => (interval + 1.0).max((interval * growth * EASY_BONUS_MATURE).round()),
            _ => (interval + 1.0).max((interval * growth).round()),
        }
    } else {
        // Young: first day-scale review after graduation
        match quality {
            3 => interval.max(1.0),
            5 => (interval + 1.0).max((interval * growth * EASY_BONUS_YOUNG).round()),
            _ => (interval * growth).round().max(YOUNG_GOOD_FLOOR),
        }
    };

    Ok(Advance {
        interval: next_interval,
        repetition: repetition + 1,
        ease_factor: ease,
    })
}

/// Apply a review to a card's scheduling state
///
/// Wraps [`advance`] with lapse bookkeeping, due-date computation, and
/// status/counter updates. A graduated card that fails keeps the interval
/// it lost; when it re-graduates, the new interval recovers to at least
/// half of it. Returns the updated state; persisting it, and the matching
/// [`ReviewRecord`](super::models::ReviewRecord), is the caller's concern.
pub fn apply_review(
    state: &CardState,
    quality: i32,
    reviewed_at: DateTime<Utc>,
) -> Result<CardState> {
    let Advance {
        mut interval,
        repetition,
        ease_factor,
    } = advance(quality, state.repetition, state.ease_factor, state.interval)?;

    let lapsed = quality < 3 && state.interval >= 1.0 && state.repetition >= 1;
    let mut lapse_interval = if lapsed {
        Some(state.interval)
    } else {
        state.lapse_interval
    };

    // Partial credit on re-graduation
    if interval >= 1.0 && repetition >= 1 {
        if let Some(previous) = lapse_interval.take() {
            interval = interval.max((previous * LAPSE_RECOVERY).round());
        }
    }

    let due_date = if interval < 1.0 {
        reviewed_at + Duration::minutes((interval * 1440.0).round() as i64)
    } else {
        reviewed_at + Duration::days(interval.round() as i64)
    };

    let status = if repetition >= 1 {
        CardStatus::Review
    } else if lapsed
        || lapse_interval.is_some()
        || state.status == CardStatus::Review
        || state.status == CardStatus::Relearning
    {
        CardStatus::Relearning
    } else {
        CardStatus::Learning
    };

    Ok(CardState {
        card_id: state.card_id,
        interval,
        repetition,
        ease_factor,
        lapse_interval,
        due_date,
        review_count: state.review_count + 1,
        correct_count: state.correct_count + if quality >= 3 { 1 } else { 0 },
        status,
    })
}

/// Calculate the intervals each answer button would produce
///
/// Returns raw state-machine intervals for ratings: Again, Hard, Good,
/// Easy. Used to label the answer buttons before the user commits.
pub fn preview_intervals(state: &CardState) -> [f64; 4] {
    let step = |quality: i32| match advance(quality, state.repetition, state.ease_factor, state.interval) {
        Ok(next) => next.interval,
        Err(_) => state.interval,
    };

    [step(1), step(3), step(4), step(5)]
}

/// Map UI rating (1-4: Again, Hard, Good, Easy) to SM-2 quality (0-5)
pub fn ui_rating_to_quality(rating: i32) -> i32 {
    match rating {
        1 => 1, // Again -> incorrect but recognized
        2 => 3, // Hard -> correct with difficulty
        3 => 4, // Good -> correct with hesitation
        4 => 5, // Easy -> perfect
        _ => 3, // Default to Good
    }
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: f64) -> String {
    if days < 1.0 {
        let minutes = ((days * 1440.0).round() as i64).max(1);
        if minutes < 60 {
            format!("{}m", minutes)
        } else {
            format!("{}h", minutes / 60)
        }
    } else {
        let days = days.round() as i64;
        if days == 1 {
            "1d".to_string()
        } else if days < 7 {
            format!("{}d", days)
        } else if days < 30 {
            let weeks = days / 7;
            if weeks == 1 {
                "1w".to_string()
            } else {
                format!("{}w", weeks)
            }
        } else if days < 365 {
            let months = days / 30;
            if months == 1 {
                "1mo".to_string()
            } else {
                format!("{}mo", months)
            }
        } else {
            let years = days / 365;
            if years == 1 {
                "1y".to_string()
            } else {
                format!("{}y", years)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn new_card_state() -> CardState {
        CardState::new(Uuid::new_v4(), t0())
    }

    fn graduated_state(repetition: u32, interval: f64, ease_factor: f32) -> CardState {
        let mut state = new_card_state();
        state.repetition = repetition;
        state.interval = interval;
        state.ease_factor = ease_factor;
        state.status = CardStatus::Review;
        state
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        assert!(matches!(
            advance(-1, 0, 2.5, 0.0),
            Err(ScheduleError::InvalidRating(-1))
        ));
        assert!(matches!(
            advance(6, 0, 2.5, 0.0),
            Err(ScheduleError::InvalidRating(6))
        ));
    }

    #[test]
    fn test_new_card_good_advances_to_second_step() {
        // interval=0, repetition=0: quality 4 moves to the ten-minute step
        let next = advance(4, 0, 2.5, 0.0).unwrap();
        assert_eq!(next.interval, 10.0 * MINUTE);
        assert_eq!(next.repetition, 0);
    }

    #[test]
    fn test_new_card_hard_repeats_first_step() {
        let next = advance(3, 0, 2.5, 0.0).unwrap();
        assert_eq!(next.interval, MINUTE);
        assert_eq!(next.repetition, 0);
    }

    #[test]
    fn test_new_card_easy_graduates_directly() {
        let next = advance(5, 0, 2.5, 0.0).unwrap();
        assert_eq!(next.interval, 4.0);
        assert_eq!(next.repetition, 1);
    }

    #[test]
    fn test_second_step_easy_graduates() {
        let next = advance(5, 0, 2.5, 10.0 * MINUTE).unwrap();
        assert_eq!(next.interval, 4.0);
        assert_eq!(next.repetition, 1);
    }

    #[test]
    fn test_second_step_good_graduates_to_one_day() {
        let next = advance(4, 0, 2.5, 10.0 * MINUTE).unwrap();
        assert_eq!(next.interval, 1.0);
        assert_eq!(next.repetition, 1);
    }

    #[test]
    fn test_second_step_hard_repeats() {
        let next = advance(3, 0, 2.5, 10.0 * MINUTE).unwrap();
        assert_eq!(next.interval, 10.0 * MINUTE);
        assert_eq!(next.repetition, 0);
    }

    #[test]
    fn test_young_card_good_grows_by_ease() {
        // 4 * 2.5 = 10, ease unchanged at quality 4
        let next = advance(4, 1, 2.5, 4.0).unwrap();
        assert_eq!(next.interval, 10.0);
        assert_eq!(next.repetition, 2);
        assert!((next.ease_factor - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_young_card_good_has_floor() {
        let next = advance(4, 1, 2.5, 1.0).unwrap();
        assert_eq!(next.interval, 4.0);
    }

    #[test]
    fn test_young_card_easy_applies_bonus() {
        // ease rises to 2.6; 4 * 2.6 * 3 = 31.2
        let next = advance(5, 1, 2.5, 4.0).unwrap();
        assert_eq!(next.interval, 31.0);
        assert!((next.ease_factor - 2.6).abs() < 1e-6);
    }

    #[test]
    fn test_mature_card_hard_grows_slowly() {
        let next = advance(3, 3, 2.5, 10.0).unwrap();
        assert_eq!(next.interval, 12.0);
        assert_eq!(next.repetition, 4);
        // quality 3 costs 0.14 ease
        assert!((next.ease_factor - 2.36).abs() < 1e-6);
    }

    #[test]
    fn test_mature_card_easy_applies_bonus() {
        // ease rises to 2.6; 10 * 2.6 * 1.3 = 33.8
        let next = advance(5, 2, 2.5, 10.0).unwrap();
        assert_eq!(next.interval, 34.0);
    }

    #[test]
    fn test_mature_interval_never_shrinks_on_success() {
        for quality in [3, 4, 5] {
            for interval in [2.0, 10.0, 90.0, 365.0] {
                let next = advance(quality, 2, 1.3, interval).unwrap();
                assert!(
                    next.interval >= interval,
                    "quality {} shrank {} to {}",
                    quality,
                    interval,
                    next.interval
                );
            }
        }
    }

    #[test]
    fn test_ease_factor_never_drops_below_minimum() {
        let mut ease = 1.4_f32;
        for _ in 0..5 {
            let next = advance(1, 0, ease, MINUTE).unwrap();
            assert!(next.ease_factor >= MIN_EASE_FACTOR);
            ease = next.ease_factor;
        }

        let next = advance(3, 2, MIN_EASE_FACTOR, 10.0).unwrap();
        assert!(next.ease_factor >= MIN_EASE_FACTOR);
    }

    #[test]
    fn test_interval_never_drops_below_one_minute() {
        for quality in 0..=5 {
            let next = advance(quality, 0, 2.5, 0.0).unwrap();
            assert!(next.interval >= MINUTE);
        }
    }

    #[test]
    fn test_hard_fail_resets_to_second_step() {
        let next = advance(2, 4, 2.5, 30.0).unwrap();
        assert_eq!(next.interval, 10.0 * MINUTE);
        assert_eq!(next.repetition, 0);
        assert!((next.ease_factor - 2.4).abs() < 1e-6);
    }

    #[test]
    fn test_apply_review_schedules_sub_day_intervals_in_minutes() {
        let state = new_card_state();
        let updated = apply_review(&state, 4, t0()).unwrap();

        assert_eq!(updated.interval, 10.0 * MINUTE);
        assert_eq!(updated.due_date, t0() + Duration::minutes(10));
        assert_eq!(updated.status, CardStatus::Learning);
        assert_eq!(updated.review_count, 1);
        assert_eq!(updated.correct_count, 1);
    }

    #[test]
    fn test_apply_review_schedules_graduated_intervals_in_days() {
        let state = graduated_state(1, 4.0, 2.5);
        let updated = apply_review(&state, 4, t0()).unwrap();

        assert_eq!(updated.interval, 10.0);
        assert_eq!(updated.due_date, t0() + Duration::days(10));
        assert_eq!(updated.status, CardStatus::Review);
    }

    #[test]
    fn test_lapse_records_interval_and_recovery_restores_half() {
        let state = graduated_state(3, 10.0, 2.5);

        // Failure: full reset, but the lost interval is remembered
        let lapsed = apply_review(&state, 1, t0()).unwrap();
        assert_eq!(lapsed.lapse_interval, Some(10.0));
        assert_eq!(lapsed.interval, MINUTE);
        assert_eq!(lapsed.repetition, 0);
        assert!((lapsed.ease_factor - 2.3).abs() < 1e-6);
        assert_eq!(lapsed.status, CardStatus::Relearning);
        assert_eq!(lapsed.due_date, t0() + Duration::minutes(1));

        // Re-graduation with Easy: raw 4 days, recovery lifts it to 5
        let recovered = apply_review(&lapsed, 5, t0() + Duration::minutes(1)).unwrap();
        assert_eq!(recovered.interval, 5.0);
        assert_eq!(recovered.repetition, 1);
        assert!(recovered.lapse_interval.is_none());
        assert_eq!(recovered.status, CardStatus::Review);
    }

    #[test]
    fn test_recovery_keeps_larger_computed_interval() {
        let state = graduated_state(2, 6.0, 2.5);

        let lapsed = apply_review(&state, 0, t0()).unwrap();
        assert_eq!(lapsed.lapse_interval, Some(6.0));

        // Raw graduation (4 days) beats half the lapse interval (3 days)
        let recovered = apply_review(&lapsed, 5, t0() + Duration::minutes(1)).unwrap();
        assert_eq!(recovered.interval, 4.0);
        assert!(recovered.lapse_interval.is_none());
    }

    #[test]
    fn test_lapse_interval_survives_repeated_learning_steps() {
        let state = graduated_state(2, 20.0, 2.5);

        let lapsed = apply_review(&state, 1, t0()).unwrap();
        // Hard keeps the card in the learning steps; the memento stays
        let repeated = apply_review(&lapsed, 3, t0() + Duration::minutes(1)).unwrap();
        assert_eq!(repeated.lapse_interval, Some(20.0));
        assert_eq!(repeated.status, CardStatus::Relearning);

        // Easy graduates directly at 4 days; recovery lifts it to 10
        let recovered = apply_review(&repeated, 5, t0() + Duration::minutes(2)).unwrap();
        assert_eq!(recovered.interval, 10.0);
        assert!(recovered.lapse_interval.is_none());
    }

    #[test]
    fn test_learning_failure_is_not_a_lapse() {
        let state = new_card_state();
        let failed = apply_review(&state, 1, t0()).unwrap();
        assert!(failed.lapse_interval.is_none());
        assert_eq!(failed.status, CardStatus::Learning);
    }

    #[test]
    fn test_hard_fail_counts_as_incorrect() {
        let state = graduated_state(2, 10.0, 2.5);
        let updated = apply_review(&state, 2, t0()).unwrap();
        assert_eq!(updated.correct_count, 0);
        assert_eq!(updated.review_count, 1);
        assert_eq!(updated.lapse_interval, Some(10.0));
    }

    #[test]
    fn test_apply_review_rejects_invalid_rating() {
        let state = new_card_state();
        assert!(apply_review(&state, 9, t0()).is_err());
    }

    #[test]
    fn test_preview_matches_new_card_transitions() {
        let state = new_card_state();
        let [again, hard, good, easy] = preview_intervals(&state);
        assert_eq!(again, MINUTE);
        assert_eq!(hard, MINUTE);
        assert_eq!(good, 10.0 * MINUTE);
        assert_eq!(easy, 4.0);
    }

    #[test]
    fn test_ui_ratings_map_to_sm2_qualities() {
        assert_eq!(ui_rating_to_quality(1), 1);
        assert_eq!(ui_rating_to_quality(2), 3);
        assert_eq!(ui_rating_to_quality(3), 4);
        assert_eq!(ui_rating_to_quality(4), 5);
        assert_eq!(ui_rating_to_quality(42), 3);
    }

    #[test]
    fn test_format_interval_covers_sub_day_and_day_ranges() {
        assert_eq!(format_interval(MINUTE), "1m");
        assert_eq!(format_interval(10.0 * MINUTE), "10m");
        assert_eq!(format_interval(0.5), "12h");
        assert_eq!(format_interval(1.0), "1d");
        assert_eq!(format_interval(5.0), "5d");
        assert_eq!(format_interval(14.0), "2w");
        assert_eq!(format_interval(45.0), "1mo");
        assert_eq!(format_interval(365.0), "1y");
        assert_eq!(format_interval(730.0), "2y");
    }
}
