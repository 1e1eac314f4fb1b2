//! Drafting pipeline: history analysis, strategy selection, template
//! rendering, and optional generative refinement.
//!
//! [`service::DraftService`] wires the stages together for one request:
//!
//! ```text
//! store ─▶ analyzer ─▶ strategy ─▶ template ─▶ refine ─▶ DraftResult
//! ```
//!
//! Only two failures are absorbed on the way: a missing thread (treated as a
//! first-time application) and a failing provider chain (the rendered
//! template is returned as-is). Everything else surfaces as [`DraftError`].

pub mod analyzer;
pub mod refine;
pub mod service;
pub mod strategy;
pub mod template;

use serde::Serialize;

use crate::store::{RecordKind, StoreError};

pub use analyzer::{analyze_history, RapportLevel, Sentiment, SentimentAnalysis};
pub use refine::{
    LlmRefiner, RefinementInput, RefinementOrchestrator, RefinementOutcome, RefinementProvider,
};
pub use service::{DraftFields, DraftRequest, DraftResult, DraftService};
pub use strategy::{select_strategy, Strategy};
pub use template::{render, JobDetails, MessageTemplate, TemplateError};

/// Coarse classification of a [`DraftError`], for callers that map errors
/// onto transport status codes or exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced doctor or practice does not exist.
    NotFound,
    /// The request itself is malformed.
    Validation,
    /// The record store failed; retrying may succeed.
    Transient,
    /// Anything else.
    Unexpected,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Transient => "transient",
            Self::Unexpected => "unexpected",
        })
    }
}

/// Errors surfaced by the drafting pipeline.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// A referenced record does not exist.
    #[error("{record} not found: {id}")]
    NotFound {
        /// What was looked up.
        record: RecordKind,
        /// The key that was looked up.
        id: String,
    },

    /// The request is malformed (bad identifier, unparseable date).
    #[error("invalid request: {0}")]
    Validation(String),

    /// The record store failed.
    #[error(transparent)]
    Store(StoreError),

    /// Unexpected internal failure.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl DraftError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Store(StoreError::Corrupt(_)) => ErrorKind::Unexpected,
            Self::Store(_) => ErrorKind::Transient,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

impl From<StoreError> for DraftError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { record, id } => Self::NotFound { record, id },
            other => Self::Store(other),
        }
    }
}

impl From<TemplateError> for DraftError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::InvalidDate { .. } => Self::Validation(err.to_string()),
            TemplateError::UnknownPlaceholder { .. } => Self::Unexpected(err.to_string()),
        }
    }
}

/// Parse a numeric identifier supplied as text.
///
/// # Errors
///
/// Returns [`DraftError::Validation`] naming `field` when `raw` is not an
/// integer.
pub fn parse_id(field: &str, raw: &str) -> Result<i64, DraftError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DraftError::Validation(format!("{field} must be numeric, got '{raw}'")))
}
