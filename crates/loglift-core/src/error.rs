//! Error types shared by the loglift crates.

use thiserror::Error;

/// Why a line produced no [`Event`](crate::Event).
///
/// Every variant is a recoverable drop: the orchestrator logs it and moves on
/// to the next line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseFailure {
    #[error("line does not match the access-log grammar")]
    GrammarMismatch,

    #[error("request line has {tokens} tokens, expected 3")]
    RequestLineMalformed { tokens: usize },

    #[error("invalid request target {target:?}: {reason}")]
    UriInvalid { target: String, reason: String },

    #[error("invalid timestamp: {0:?}")]
    TimestampInvalid(String),

    #[error("invalid {field} value: {value:?}")]
    NumericInvalid { field: &'static str, value: String },
}

/// Stable discriminant of a [`ParseFailure`], used for logging and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    GrammarMismatch,
    RequestLineMalformed,
    UriInvalid,
    TimestampInvalid,
    NumericInvalid,
}

impl ParseFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            ParseFailure::GrammarMismatch => FailureKind::GrammarMismatch,
            ParseFailure::RequestLineMalformed { .. } => FailureKind::RequestLineMalformed,
            ParseFailure::UriInvalid { .. } => FailureKind::UriInvalid,
            ParseFailure::TimestampInvalid(_) => FailureKind::TimestampInvalid,
            ParseFailure::NumericInvalid { .. } => FailureKind::NumericInvalid,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::GrammarMismatch => write!(f, "grammar_mismatch"),
            FailureKind::RequestLineMalformed => write!(f, "request_line_malformed"),
            FailureKind::UriInvalid => write!(f, "uri_invalid"),
            FailureKind::TimestampInvalid => write!(f, "timestamp_invalid"),
            FailureKind::NumericInvalid => write!(f, "numeric_invalid"),
        }
    }
}

/// Invalid configuration. Raised at startup, before any stage runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),

    #[error("invalid access-log grammar: {0}")]
    Grammar(#[from] regex::Error),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Load(#[from] config::ConfigError),
}
