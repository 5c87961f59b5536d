//! Due-card selection

use chrono::{DateTime, Utc};

use super::models::CardWithState;

/// Select the cards whose review time has elapsed, oldest overdue first
///
/// Every other scheduling consumer composes on top of this filter. Pure:
/// the input is untouched and repeated application is a no-op.
pub fn due_cards(cards: &[CardWithState], now: DateTime<Utc>) -> Vec<CardWithState> {
    let mut due: Vec<CardWithState> = cards
        .iter()
        .filter(|c| c.state.due_date <= now)
        .cloned()
        .collect();

    due.sort_by(|a, b| a.state.due_date.cmp(&b.state.due_date));
    due
}
