//! Error contracts for the CURA sync core.
//!
//! All fallible operations return `CuraResult<T>`. The taxonomy mirrors how
//! failures are surfaced to the user: corruption and local-storage failures
//! are recovered with defaults, remote failures are advisory, and validation
//! failures are rejected before any state changes.

use thiserror::Error;

/// The unified error type for the CURA runtime.
#[derive(Debug, Error)]
pub enum CuraError {
    /// The local key-value store could not complete an operation.
    ///
    /// Callers must not apply the corresponding in-memory update when this
    /// is returned — durable storage is the source of truth.
    #[error("local storage operation failed for key '{key}': {reason}")]
    StorageFailed { key: String, reason: String },

    /// A stored value failed to deserialize or failed its shape check.
    ///
    /// The loader deletes the offending key and substitutes a default; this
    /// variant is recorded as a non-fatal load problem, never surfaced as a
    /// blocking error.
    #[error("stored record under key '{key}' is corrupted: {reason}")]
    CorruptedRecord { key: String, reason: String },

    /// The remote profile service could not be reached or returned a failure.
    ///
    /// Reads are retried per the configured policy; write-throughs are
    /// single-attempt and surfaced as an advisory warning.
    #[error("profile service unavailable: {reason}")]
    RemoteUnavailable { reason: String },

    /// Input was rejected before any persistence attempt.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// An insert was rejected because the trimmed value already exists in
    /// the target list. Distinct from `Validation` so callers can surface a
    /// duplicate-specific message rather than a generic rejection.
    #[error("'{value}' is already in the list")]
    DuplicateEntry { value: String },

    /// A delete or lookup referenced a record that does not exist.
    #[error("{what} was not found")]
    NotFound { what: String },

    /// Sign-in, sign-up, or session retrieval failed.
    #[error("authentication failed: {reason}")]
    AuthFailed { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the CURA crates.
pub type CuraResult<T> = Result<T, CuraError>;
