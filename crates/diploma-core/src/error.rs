//! # Error Types: Structured Error Hierarchy
//!
//! Defines the foundational error types of the registry. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Registry operation failures (unauthorized caller, duplicate registration,
//! wrong fee amount, ...) live next to the state machine in
//! `diploma-state`; this module covers what can go wrong before a registry
//! exists: rejected identifiers, bad configuration, unreadable files.

use thiserror::Error;

/// Top-level error type for the foundational layer.
#[derive(Error, Debug)]
pub enum DiplomaError {
    /// A domain primitive failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Registry configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A domain primitive was rejected at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Credential identifier is empty.
    #[error("credential identifier must not be empty")]
    EmptyCredentialId,

    /// Credential identifier exceeds the maximum length.
    #[error("credential identifier is {len} bytes, maximum is {max}")]
    CredentialIdTooLong {
        /// Actual length in bytes.
        len: usize,
        /// Maximum permitted length in bytes.
        max: usize,
    },

    /// Account identifier is empty or contains characters reserved by the
    /// bearer token format.
    #[error("invalid account identifier: {0:?}")]
    InvalidAccountId(String),

    /// Signature text is not valid hex.
    #[error("invalid signature hex: {0}")]
    InvalidSignatureHex(String),

    /// Timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
