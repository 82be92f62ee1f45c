//! Error types for the augur library.

use thiserror::Error;

use super::MethodLocation;

/// Result type alias using augur's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mutation analysis.
///
/// Structural problems are fatal by design: filtering correctness depends on
/// the consistency of the instruction streams, so a partial or silently-wrong
/// answer is worse than aborting the run with the offending method attached.
#[derive(Error, Debug)]
pub enum Error {
    /// An instruction stream violates a structural invariant
    /// (dangling jump target, duplicate label definition).
    #[error("malformed instruction stream in {location}: {message}")]
    MalformedStream {
        location: MethodLocation,
        message: String,
    },

    /// A mutation references an instruction index outside its method body.
    #[error("instruction index {index} out of range (len {len}) in {location}")]
    IndexOutOfRange {
        location: MethodLocation,
        index: usize,
        len: usize,
    },

    /// A candidate mutation names a method absent from the class under
    /// analysis. Unreachable with correct upstream wiring; never recovered.
    #[error("no instruction stream for method {location}")]
    UnknownMethod { location: MethodLocation },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new malformed-stream error.
    pub fn malformed(location: &MethodLocation, message: impl Into<String>) -> Self {
        Self::MalformedStream {
            location: location.clone(),
            message: message.into(),
        }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
