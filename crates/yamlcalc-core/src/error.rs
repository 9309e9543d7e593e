//! Error types for yamlcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or reading a live document
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The document's top level is not a mapping
    #[error("Top level element should be a mapping, not {0}")]
    Schema(&'static str),

    /// The definitions preamble failed to execute
    #[error("Error executing {field}: {message}")]
    Definitions { field: String, message: String },

    /// Mapping indexed with an absent key
    #[error("Key '{0}' not found")]
    KeyNotFound(String),

    /// Sequence indexed past its end
    #[error("Index {index} out of range (length: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Nested formula evaluation exceeded the configured depth
    #[error("Formula recursion exceeded maximum depth of {0}")]
    RecursionLimit(usize),

    /// Document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// File access failed
    #[error("IO error: {0}")]
    Io(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error is a lookup failure (absent key or index)
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::KeyNotFound(_) | Error::IndexOutOfRange { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
