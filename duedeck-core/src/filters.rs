use crate::ResolvedDeck;
use chrono::NaiveDate;

fn by_due_then_id(decks: &mut [ResolvedDeck]) {
    decks.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));
}

pub fn all_decks_view(decks: &[ResolvedDeck]) -> Vec<ResolvedDeck> {
    let mut v = decks.to_vec();
    by_due_then_id(&mut v);
    v
}

/// Decks due before tomorrow, i.e. due today or overdue.
pub fn due_decks_view(decks: &[ResolvedDeck], today: NaiveDate) -> Vec<ResolvedDeck> {
    let mut v: Vec<ResolvedDeck> = decks.iter().filter(|d| d.is_due(today)).cloned().collect();
    by_due_then_id(&mut v);
    v
}

pub fn filter_by_name(decks: &[ResolvedDeck], query: &str) -> Vec<ResolvedDeck> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return decks.to_vec();
    }
    decks
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&q))
        .cloned()
        .collect()
}
