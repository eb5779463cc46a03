//! Wire records and the mapping from source field names onto the domain types.
//!
//! Every data source hands back [`Record`]s in the shape the upstream table
//! store serves them. Decoding into [`RawDeck`] / [`Score`] happens here and
//! only here, driven by the field tables below.

use crate::{Collection, CoreError, RawDeck, Score};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            fields,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Page<T = Record> {
    pub records: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

impl<T> Page<T> {
    pub fn last(records: Vec<T>) -> Self {
        Self {
            records,
            offset: None,
        }
    }

    pub fn more(records: Vec<T>, offset: impl Into<String>) -> Self {
        Self {
            records,
            offset: Some(offset.into()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Absent means empty; the upstream store drops empty list cells.
    DefaultEmpty,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub canonical: &'static str,
    pub source: &'static str,
    pub presence: Presence,
}

const fn field(canonical: &'static str, source: &'static str, presence: Presence) -> FieldSpec {
    FieldSpec {
        canonical,
        source,
        presence,
    }
}

pub const DECK_FIELDS: &[FieldSpec] = &[
    field("name", "Name", Presence::Required),
    field("url", "URL", Presence::Required),
    field("score_refs", "Scores", Presence::DefaultEmpty),
];

pub const SCORE_FIELDS: &[FieldSpec] = &[
    field("num_correct", "Num Correct", Presence::Required),
    field("num_total", "Num Total", Presence::Required),
    field("date", "Date", Presence::Required),
];

struct Fields<'a> {
    collection: Collection,
    table: &'static [FieldSpec],
    record: &'a Record,
}

impl<'a> Fields<'a> {
    fn spec(&self, canonical: &'static str) -> FieldSpec {
        // Tables are static; a miss is a programming error caught by tests.
        self.table
            .iter()
            .copied()
            .find(|f| f.canonical == canonical)
            .unwrap_or(field(canonical, canonical, Presence::Required))
    }

    fn error(&self, spec: FieldSpec, reason: impl Into<String>) -> CoreError {
        CoreError::DataFormat {
            collection: self.collection,
            record: self.record.id.clone(),
            field: spec.source,
            reason: reason.into(),
        }
    }

    fn get(&self, canonical: &'static str) -> Result<Option<&'a Value>, CoreError> {
        let spec = self.spec(canonical);
        match self.record.fields.get(spec.source) {
            Some(Value::Null) | None if spec.presence == Presence::Required => {
                Err(self.error(spec, "is missing"))
            }
            Some(Value::Null) | None => Ok(None),
            Some(v) => Ok(Some(v)),
        }
    }

    fn string(&self, canonical: &'static str) -> Result<String, CoreError> {
        match self.get(canonical)? {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.error(self.spec(canonical), format!("expected string, got {other}"))),
            None => Ok(String::new()),
        }
    }

    fn string_list(&self, canonical: &'static str) -> Result<Vec<String>, CoreError> {
        let Some(v) = self.get(canonical)? else {
            return Ok(Vec::new());
        };
        let Value::Array(items) = v else {
            return Err(self.error(self.spec(canonical), format!("expected list, got {v}")));
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(self.error(self.spec(canonical), format!("expected string id, got {other}"))),
            })
            .collect()
    }

    fn count(&self, canonical: &'static str) -> Result<u32, CoreError> {
        let spec = self.spec(canonical);
        let v = self.get(canonical)?.ok_or_else(|| self.error(spec, "is missing"))?;
        v.as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.error(spec, format!("expected non-negative integer, got {v}")))
    }

    fn date(&self, canonical: &'static str) -> Result<NaiveDate, CoreError> {
        let spec = self.spec(canonical);
        let raw = self.string(canonical)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|e| self.error(spec, format!("is not an ISO-8601 date ({raw:?}: {e})")))
    }
}

pub fn decode_deck(record: &Record) -> Result<RawDeck, CoreError> {
    let f = Fields {
        collection: Collection::Decks,
        table: DECK_FIELDS,
        record,
    };
    Ok(RawDeck {
        id: record.id.clone(),
        name: f.string("name")?,
        url: f.string("url")?,
        score_refs: f.string_list("score_refs")?,
    })
}

pub fn decode_score(record: &Record) -> Result<Score, CoreError> {
    let f = Fields {
        collection: Collection::Scores,
        table: SCORE_FIELDS,
        record,
    };
    let num_correct = f.count("num_correct")?;
    let num_total = f.count("num_total")?;
    if num_correct > num_total {
        return Err(f.error(
            f.spec("num_correct"),
            format!("{num_correct} exceeds total {num_total}"),
        ));
    }
    Ok(Score {
        id: record.id.clone(),
        num_correct,
        num_total,
        date: f.date("date")?,
    })
}

pub fn decode_decks(records: &[Record]) -> Result<Vec<RawDeck>, CoreError> {
    records.iter().map(decode_deck).collect()
}

pub fn decode_scores(records: &[Record]) -> Result<Vec<Score>, CoreError> {
    records.iter().map(decode_score).collect()
}

/// Inverse of [`decode_deck`], used when writing snapshots and test fixtures.
pub fn encode_deck(deck: &RawDeck) -> Record {
    let mut fields = Map::new();
    fields.insert("Name".into(), Value::String(deck.name.clone()));
    fields.insert("URL".into(), Value::String(deck.url.clone()));
    if !deck.score_refs.is_empty() {
        fields.insert(
            "Scores".into(),
            Value::Array(deck.score_refs.iter().cloned().map(Value::String).collect()),
        );
    }
    Record {
        id: deck.id.clone(),
        fields,
    }
}

pub fn encode_score(score: &Score) -> Record {
    let mut fields = Map::new();
    fields.insert("Num Correct".into(), Value::from(score.num_correct));
    fields.insert("Num Total".into(), Value::from(score.num_total));
    fields.insert(
        "Date".into(),
        Value::String(score.date.format("%Y-%m-%d").to_string()),
    );
    Record {
        id: score.id.clone(),
        fields,
    }
}
