use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type DeckId = String;
pub type ScoreId = String;

/// Opaque identity handed to the core by the auth layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Decks,
    Scores,
}

impl Collection {
    /// Table name on the data source side.
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Decks => "Decks",
            Collection::Scores => "Scores",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawDeck {
    pub id: DeckId,
    pub name: String,
    pub url: String,
    pub score_refs: Vec<ScoreId>,
}

impl RawDeck {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            score_refs: Vec::new(),
        }
    }

    pub fn with_refs<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.score_refs = refs.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    pub id: ScoreId,
    pub num_correct: u32,
    pub num_total: u32,
    pub date: NaiveDate,
}

impl Score {
    pub fn new(id: impl Into<String>, num_correct: u32, num_total: u32, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            num_correct,
            num_total,
            date,
        }
    }

    /// Rounded percentage correct, `None` for an empty session.
    pub fn percent(&self) -> Option<u32> {
        if self.num_total == 0 {
            None
        } else {
            Some((100.0 * self.num_correct as f64 / self.num_total as f64).round() as u32)
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedDeck {
    pub id: DeckId,
    pub name: String,
    pub url: String,
    pub scores: Vec<Score>,
    pub due_date: NaiveDate,
}

impl ResolvedDeck {
    pub fn repetitions(&self) -> usize {
        self.scores.len()
    }

    pub fn last_score(&self) -> Option<&Score> {
        self.scores.last()
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due_date <= today
    }
}
