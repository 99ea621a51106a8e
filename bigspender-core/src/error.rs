use chrono::NaiveDate;
use thiserror::Error;

/// Domain errors shared across the pipeline. I/O-level failures stay on
/// `anyhow` at the call sites that touch files or the network.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid date.range format: {0:?} (valid examples: \"14d\", \"2w\", \"1m\")")]
    InvalidRange(String),

    #[error("[date] must set either \"range\" or both \"from\" and \"to\"")]
    MissingDateConfig,

    #[error("date range is inverted: from {from} is after to {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },

    #[error("unknown transaction type {kind:?} for booking {id} ({description:?})")]
    UnknownTransactionType {
        kind: String,
        id: String,
        description: String,
    },
}
