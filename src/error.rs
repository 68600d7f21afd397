//! Error types for rtmp-stats
//!
//! Lookups and event ingestion never fail. The only fallible surface is
//! snapshot rendering, where a listing aborts on the first entity that
//! cannot be represented.

use std::fmt;

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type
#[derive(Debug)]
pub enum Error {
    /// Rendering an entity failed; `context` names the entity kind
    /// (e.g. "dump stream")
    Dump {
        context: &'static str,
        source: DumpError,
    },
}

impl Error {
    /// Wrap a render failure with the entity kind that produced it
    pub fn dump(context: &'static str, source: DumpError) -> Self {
        Error::Dump { context, source }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Dump { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Dump { source, .. } => Some(source),
        }
    }
}

/// Render-level errors
#[derive(Debug, Clone, PartialEq)]
pub enum DumpError {
    /// A floating point field was NaN or infinite
    NonFiniteNumber { field: &'static str, value: f64 },
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpError::NonFiniteNumber { field, value } => {
                write!(f, "Non-finite value for field {}: {}", field, value)
            }
        }
    }
}

impl std::error::Error for DumpError {}
