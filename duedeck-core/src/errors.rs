use thiserror::Error;

use crate::Collection;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("fetch failed for {collection}: {cause}")]
    Fetch {
        collection: Collection,
        cause: String,
    },
    #[error("bad {collection} record {record}: field `{field}` {reason}")]
    DataFormat {
        collection: Collection,
        record: String,
        field: &'static str,
        reason: String,
    },
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid input: {0}")]
    Invalid(&'static str),
}

impl CoreError {
    pub fn fetch(collection: Collection, cause: impl ToString) -> Self {
        CoreError::Fetch {
            collection,
            cause: cause.to_string(),
        }
    }
}
