use crate::{FibonacciSchedule, RawDeck, ResolvedDeck, SchedulePolicy, Score};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Scores of `all_scores` referenced by `refs`, oldest first.
///
/// Refs without a matching score are dropped. Equal dates fall back to the
/// score id, then to fetch order, so the result is fully deterministic.
pub fn resolve_scores(all_scores: &[Score], refs: &[String]) -> Vec<Score> {
    let wanted: HashSet<&str> = refs.iter().map(String::as_str).collect();
    let mut out: Vec<Score> = all_scores
        .iter()
        .filter(|s| wanted.contains(s.id.as_str()))
        .cloned()
        .collect();
    out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    out
}

pub fn resolve_deck(
    policy: &dyn SchedulePolicy,
    raw: &RawDeck,
    all_scores: &[Score],
    today: NaiveDate,
) -> ResolvedDeck {
    let scores = resolve_scores(all_scores, &raw.score_refs);
    if scores.len() < raw.score_refs.len() {
        tracing::debug!(
            deck = %raw.id,
            refs = raw.score_refs.len(),
            matched = scores.len(),
            "dropping unmatched score refs"
        );
    }
    let due_date = policy.next_due_date(&scores, today);
    ResolvedDeck {
        id: raw.id.clone(),
        name: raw.name.clone(),
        url: raw.url.clone(),
        scores,
        due_date,
    }
}

/// One resolved deck per raw deck, in input order.
pub fn resolve_decks(raw_decks: &[RawDeck], all_scores: &[Score], today: NaiveDate) -> Vec<ResolvedDeck> {
    resolve_decks_with(&FibonacciSchedule, raw_decks, all_scores, today)
}

pub fn resolve_decks_with(
    policy: &dyn SchedulePolicy,
    raw_decks: &[RawDeck],
    all_scores: &[Score],
    today: NaiveDate,
) -> Vec<ResolvedDeck> {
    raw_decks
        .iter()
        .map(|d| resolve_deck(policy, d, all_scores, today))
        .collect()
}
