// ⚠️ Store errors
//
// Out-of-range indices are recoverable (the caller reports and carries on).
// Everything else means the storage file cannot be trusted or written.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Index outside `[0, len)`; the store is left untouched
    #[error("expense index {index} is out of range (store holds {len} expenses)")]
    OutOfRange { index: i64, len: usize },

    /// NaN or infinite amounts cannot be written as JSON numbers
    #[error("amount {amount} is not a finite number")]
    InvalidAmount { amount: f64 },

    /// A persisted entry is missing a field or has a field of the wrong type
    #[error("malformed expense at entry {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// Top level of the storage file is not an array
    #[error("expected an array of expenses, found {found}")]
    NotAList { found: &'static str },

    /// The storage file is not a JSON array of objects
    #[error("storage file {} is not a valid expense list: {source}", path.display())]
    MalformedStorage {
        path: PathBuf,
        #[source]
        source: Box<StoreError>,
    },

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode expenses: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// True for the errors a dispatcher should report and then continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::OutOfRange { .. })
    }
}
