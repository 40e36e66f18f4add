//! Error types shared by every Sahaay crate.
//!
//! All fallible operations return `SahaayResult<T>`. Variants carry enough
//! context to produce an audit entry or a re-prompt without further lookups.

use thiserror::Error;

/// The unified error type for the Sahaay workspace.
#[derive(Debug, Error)]
pub enum SahaayError {
    /// An answer value fell outside the Likert range [0, 3].
    #[error("answer {value} for question {question} is outside the range 0..=3")]
    InvalidAnswer { question: usize, value: u8 },

    /// One or more questions of the instrument have no answer.
    ///
    /// The caller must re-prompt; a default is never substituted.
    #[error("{instrument} response is incomplete: missing answers for questions {missing:?}")]
    IncompleteResponse { instrument: String, missing: Vec<usize> },

    /// The response answers a question index the instrument does not define.
    #[error("{instrument} has no question at index {index}")]
    UnexpectedQuestion { instrument: String, index: usize },

    /// The response was recorded for a different instrument than the
    /// questionnaire it is being scored against.
    #[error("{found} response cannot be scored as {expected}")]
    InstrumentMismatch { expected: String, found: String },

    /// A textual instrument tag did not name a known instrument.
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    /// The risk flag was already acknowledged; the original reviewer stands.
    #[error("risk flag '{flag_id}' was already acknowledged by '{acknowledged_by}'")]
    AlreadyAcknowledged { flag_id: String, acknowledged_by: String },

    /// A record lookup found nothing.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// A record with this id is already stored; records are never replaced
    /// by a fresh insert.
    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: &'static str, id: String },

    /// The view policy denied the requested action.
    #[error("access denied: {reason}")]
    AccessDenied { reason: String },

    /// The patient has not consented to therapist-originated reminders.
    #[error("patient '{patient_id}' does not accept nudges")]
    NudgeNotPermitted { patient_id: String },

    /// The audit writer could not persist a record.
    ///
    /// Treated as fatal: an action that cannot be audited does not proceed.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// The record store could not complete a read or write.
    #[error("record store error: {reason}")]
    Store { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the Sahaay crates.
pub type SahaayResult<T> = Result<T, SahaayError>;
