// Error taxonomy for the analysis library.
//
// Collaborator plumbing (HTTP, CSV, JSON) reports through anyhow with
// context. Anything a caller may want to match on surfaces here instead.

use thiserror::Error;

/// Errors surfaced by the price and text pipelines.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The price source was unreachable or returned no usable rows.
    #[error("price retrieval failed for {ticker}: {reason}")]
    Retrieval { ticker: String, reason: String },

    /// Fewer clean rows than the longest indicator lookback.
    #[error(
        "not enough clean data (only {actual} rows) for indicators; at least {required} required"
    )]
    InsufficientData { actual: usize, required: usize },

    /// Topic training was requested before the corpus was prepared.
    #[error("corpus and dictionary must be prepared before running LDA")]
    NotPrepared,

    /// Every token was pruned from the dictionary.
    #[error("cannot train a topic model over an empty vocabulary")]
    EmptyVocabulary,

    /// A caller-supplied parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A column did not match the series' row count.
    #[error("column {column} has {actual} rows, series has {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Returns were already appended to this series.
    #[error("Return column already present; returns can only be added once")]
    ReturnsAlreadyAdded,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
