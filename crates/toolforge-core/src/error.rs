//! Error handling for Toolforge core types
//!
//! The kernel itself degrades silently on odd geometry, so the core error
//! type only covers parsing enumerated names from text.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A textual name did not match any known variant.
    #[error("Unknown {kind}: {value}")]
    UnknownName {
        /// The kind of value being parsed (e.g. "machine type").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

impl Error {
    /// Build an [`Error::UnknownName`].
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Error::UnknownName {
            kind,
            value: value.into(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
