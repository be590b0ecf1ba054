//! Error types for the transaction report.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that abort a load, a comparison run or the CLI.
///
/// Per-record problems never show up here; they are [`RecordError`]s and are
/// only counted.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Failed to write output or read input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error that is not tied to a single record
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON export error
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input file is missing or unreadable
    #[error("Cannot open source {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A load was requested before a source path was set
    #[error("No source path configured")]
    NoSource,

    /// Missing input file argument
    #[error("Missing input file argument. Usage: transaction-report <input.csv> [category] [--export <path>] [--top <n>] [--batch <n>] [--silent]")]
    MissingArgument,

    /// Unparseable or unknown command line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Why a single input line was rejected.
///
/// Variants are checked in declaration order; the first failure wins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected at least {expected} fields, found {found}")]
    Malformed { expected: usize, found: usize },

    #[error("field `{field}` is {len} chars, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("amount `{0}` is not a number")]
    Parse(String),

    #[error("amount {0} is outside the accepted range")]
    AmountOutOfRange(String),

    #[error("required field `{0}` is empty")]
    MissingField(&'static str),

    #[error("sender and receiver are the same account `{0}`")]
    SelfTransfer(String),
}

/// Coarse bucket a [`RecordError`] is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipKind {
    Malformed,
    Validation,
    Parse,
}

impl RecordError {
    pub fn kind(&self) -> SkipKind {
        match self {
            RecordError::Malformed { .. } => SkipKind::Malformed,
            RecordError::Parse(_) => SkipKind::Parse,
            RecordError::FieldTooLong { .. }
            | RecordError::AmountOutOfRange(_)
            | RecordError::MissingField(_)
            | RecordError::SelfTransfer(_) => SkipKind::Validation,
        }
    }
}
