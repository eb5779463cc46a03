use chrono::NaiveDate;
use duedeck_core::{ResolvedDeck, Score};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct ScoreOut {
    pub id: String,
    pub num_correct: u32,
    pub num_total: u32,
    pub date: NaiveDate,
    pub percent: Option<u32>,
}

#[derive(Serialize, Deserialize)]
pub struct DeckOut {
    pub id: String,
    pub name: String,
    pub url: String,
    pub due_date: NaiveDate,
    pub repetitions: usize,
    pub last_score_percent: Option<u32>,
    pub scores: Vec<ScoreOut>,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
}

impl From<&Score> for ScoreOut {
    fn from(s: &Score) -> Self {
        Self {
            id: s.id.clone(),
            num_correct: s.num_correct,
            num_total: s.num_total,
            date: s.date,
            percent: s.percent(),
        }
    }
}

impl From<&ResolvedDeck> for DeckOut {
    fn from(d: &ResolvedDeck) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            url: d.url.clone(),
            due_date: d.due_date,
            repetitions: d.repetitions(),
            last_score_percent: d.last_score().and_then(Score::percent),
            scores: d.scores.iter().map(ScoreOut::from).collect(),
        }
    }
}
