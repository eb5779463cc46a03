use crate::ResolvedDeck;
use chrono::NaiveDate;
use serde::Serialize;

/// What the deck listings show next to each deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeckSummary {
    pub id: String,
    pub name: String,
    pub url: String,
    pub due_date: NaiveDate,
    pub repetitions: usize,
    pub last_score_percent: Option<u32>,
}

impl DeckSummary {
    pub fn of(deck: &ResolvedDeck) -> Self {
        Self {
            id: deck.id.clone(),
            name: deck.name.clone(),
            url: deck.url.clone(),
            due_date: deck.due_date,
            repetitions: deck.repetitions(),
            last_score_percent: deck.last_score().and_then(|s| s.percent()),
        }
    }

    pub fn last_score_label(&self) -> String {
        match (self.repetitions, self.last_score_percent) {
            (0, _) => "No scores".to_string(),
            (_, Some(p)) => format!("Last score: {p}%"),
            (_, None) => "Last score: -".to_string(),
        }
    }
}

pub fn summarize(decks: &[ResolvedDeck]) -> Vec<DeckSummary> {
    decks.iter().map(DeckSummary::of).collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub decks: usize,
    pub due: usize,
    pub never_reviewed: usize,
    pub reviews: usize,
}

pub fn totals(decks: &[ResolvedDeck], today: NaiveDate) -> Totals {
    let mut t = Totals::default();
    for d in decks {
        t.decks += 1;
        t.reviews += d.repetitions();
        if d.is_due(today) {
            t.due += 1;
        }
        if d.scores.is_empty() {
            t.never_reviewed += 1;
        }
    }
    t
}
