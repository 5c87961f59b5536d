//! Study queue construction

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{Exam, ExamQuota, PrioritySignal, StudyQueue};
use crate::scheduling::{due_cards, CardWithState};

/// Priority tier of a due card within a session
///
/// Tier 3: declared priority subject with a positive weak-point score.
/// Tier 2: declared priority subject only. Tier 1: positive weak-point
/// score only. Tier 0: neither.
fn tier(in_priority_subjects: bool, score: f64) -> u8 {
    match (in_priority_subjects, score > 0.0) {
        (true, true) => 3,
        (true, false) => 2,
        (false, true) => 1,
        (false, false) => 0,
    }
}

/// Build one interleaved study queue for a session
///
/// Each exam contributes its due cards ordered by priority tier, then
/// weak-point score, then staleness, truncated to the exam's daily quota.
/// The per-exam lists are interleaved round-robin so no single exam
/// monopolizes the front of the session. With no exams the queue degrades
/// to the plain due filter over all cards; with no signal feed every
/// score counts as zero.
pub fn build_queue(
    exams: &[Exam],
    cards: &[CardWithState],
    quotas: &[ExamQuota],
    signals: &[PrioritySignal],
    now: DateTime<Utc>,
) -> StudyQueue {
    if exams.is_empty() {
        return StudyQueue {
            cards: due_cards(cards, now),
            quota_total: 0,
        };
    }

    let quota_by_exam: HashMap<Uuid, u32> = quotas
        .iter()
        .map(|q| (q.exam_id, q.daily_quota))
        .collect();
    let score_by_subject: HashMap<(Uuid, &str), f64> = signals
        .iter()
        .map(|s| ((s.exam_id, s.subject.as_str()), s.score))
        .collect();

    let mut buckets: Vec<Vec<CardWithState>> = Vec::with_capacity(exams.len());
    let mut quota_total = 0u32;

    for exam in exams {
        let own: Vec<CardWithState> = cards
            .iter()
            .filter(|c| c.card.exam_id == exam.id)
            .cloned()
            .collect();

        let mut ranked: Vec<(u8, f64, CardWithState)> = due_cards(&own, now)
            .into_iter()
            .map(|card| {
                let subject = card.card.subject.as_deref();
                let score = subject
                    .and_then(|s| score_by_subject.get(&(exam.id, s)))
                    .copied()
                    .unwrap_or(0.0);
                let in_priority = subject
                    .map(|s| exam.priority_subjects.iter().any(|p| p == s))
                    .unwrap_or(false);
                (tier(in_priority, score), score, card)
            })
            .collect();

        // Tier first, then weak-point score, then oldest due
        ranked.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then(b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.2.state.due_date.cmp(&b.2.state.due_date))
        });

        let quota = quota_by_exam.get(&exam.id).copied().unwrap_or(0);
        ranked.truncate(quota as usize);
        quota_total += quota;

        buckets.push(ranked.into_iter().map(|(_, _, card)| card).collect());
    }

    let queued = interleave(buckets);
    log::debug!(
        "built study queue of {} cards across {} exams",
        queued.len(),
        exams.len()
    );

    StudyQueue {
        cards: queued,
        quota_total,
    }
}

/// Round-robin across per-exam buckets until all are exhausted
fn interleave(buckets: Vec<Vec<CardWithState>>) -> Vec<CardWithState> {
    let total: usize = buckets.iter().map(Vec::len).sum();
    let mut streams: Vec<_> = buckets.into_iter().map(Vec::into_iter).collect();
    let mut queued = Vec::with_capacity(total);

    loop {
        let mut exhausted = true;
        for stream in streams.iter_mut() {
            if let Some(card) = stream.next() {
                queued.push(card);
                exhausted = false;
            }
        }
        if exhausted {
            break;
        }
    }

    queued
}
