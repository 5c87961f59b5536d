//! Daily quota allocation across exams

use chrono::{DateTime, Utc};

use super::models::{Exam, ExamQuota, ExamSnapshot};
use crate::scheduling::CardWithState;

/// Minimum cards per day an active exam receives
const MIN_DAILY_QUOTA: u32 = 5;

/// Split the daily study budget across exams by deadline urgency
///
/// Each exam's urgency is its weight divided by the days left until its
/// deadline; shares are the urgencies normalized over all active exams.
/// The raw per-exam pace (remaining cards over days left) is rescaled by
/// that share times the number of active exams. Degrades by clamping
/// rather than failing: past-due deadlines count one day left, a zero
/// urgency sum normalizes over one, and every exam gets at least
/// `MIN_DAILY_QUOTA` cards regardless of its computed share.
pub fn allocate(exams: &[Exam], cards: &[CardWithState], now: DateTime<Utc>) -> Vec<ExamQuota> {
    if exams.is_empty() {
        return Vec::new();
    }

    let snapshots: Vec<ExamSnapshot> = exams
        .iter()
        .map(|exam| {
            let own: Vec<CardWithState> = cards
                .iter()
                .filter(|c| c.card.exam_id == exam.id)
                .cloned()
                .collect();
            ExamSnapshot::compute(exam, &own, now)
        })
        .collect();

    let urgencies: Vec<f64> = exams
        .iter()
        .zip(&snapshots)
        .map(|(exam, snapshot)| exam.weight / snapshot.days_left as f64)
        .collect();

    let sum: f64 = urgencies.iter().sum();
    let urgency_sum = if sum > 0.0 { sum } else { 1.0 };
    let exam_count = exams.len() as f64;

    let quotas: Vec<ExamQuota> = exams
        .iter()
        .zip(&snapshots)
        .zip(&urgencies)
        .map(|((exam, snapshot), urgency)| {
            let share = urgency / urgency_sum;
            let raw_quota = snapshot.remaining_cards as f64 / snapshot.days_left as f64;
            let daily_quota = (raw_quota * share * exam_count).ceil() as u32;

            ExamQuota {
                exam_id: exam.id,
                days_left: snapshot.days_left,
                share,
                daily_quota: daily_quota.max(MIN_DAILY_QUOTA),
            }
        })
        .collect();

    log::debug!(
        "allocated quotas for {} exams, {} cards/day total",
        quotas.len(),
        quotas.iter().map(|q| q.daily_quota).sum::<u32>()
    );

    quotas
}
