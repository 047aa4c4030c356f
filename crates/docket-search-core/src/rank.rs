//! Relevance scoring and canonical result ordering.

use chrono::{DateTime, Datelike, Utc};

use crate::models::EnrichedDocket;

/// Days over which relevance decays by a factor of `e`.
const DECAY_DAYS: f64 = 365.0;

/// Relevance score for one docket at time `now`:
/// `total * (matching/total)^2 * e^(-ageDays/365)`.
///
/// The squared match ratio penalizes low match density super-linearly; the
/// exponential keeps stale dockets discoverable without letting them
/// dominate. Age is whole days since the docket's modification date.
///
/// A docket with no comments scores zero, as does a docket with no usable
/// modification date; a bad record never fails the batch.
pub fn relevance_score(docket: &EnrichedDocket, now: DateTime<Utc>) -> f64 {
    let total = docket.comments.total;
    if total <= 0 {
        return 0.0;
    }
    let modified = match docket.timeline_dates.date_modified {
        Some(d) => d,
        None => {
            tracing::debug!(docket_id = %docket.docket_id, "no modification date, scoring 0");
            return 0.0;
        }
    };
    let ratio = docket.comments.matched as f64 / total as f64;
    let age_days = (now - modified).num_days() as f64;
    total as f64 * ratio * ratio * (-age_days / DECAY_DAYS).exp()
}

/// Score every docket in place.
pub fn score_all(dockets: &mut [EnrichedDocket], now: DateTime<Utc>) {
    for d in dockets.iter_mut() {
        d.relevance_score = relevance_score(d, now);
    }
}

/// Order the candidate set and assign 0-based ranks.
///
/// The enforced ordering is fixed: matching-comment count descending, then
/// modification year descending. The sort is stable, so equal-key dockets
/// keep their prior relative order, and it always runs over the entire set
/// before any pagination. The request's nominal sort type never alters it,
/// and neither does the relevance score.
pub fn order_and_rank(dockets: &mut [EnrichedDocket]) {
    dockets.sort_by(|a, b| {
        b.comments
            .matched
            .cmp(&a.comments.matched)
            .then_with(|| modify_year(b).cmp(&modify_year(a)))
    });
    for (rank, d) in dockets.iter_mut().enumerate() {
        d.search_rank = rank as i32;
    }
}

/// Modification year used as the ordering tiebreak. Dockets without a date
/// sort after every dated docket of equal match count.
fn modify_year(d: &EnrichedDocket) -> i32 {
    d.timeline_dates
        .date_modified
        .map(|dt| dt.year())
        .unwrap_or(0)
}
