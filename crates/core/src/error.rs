//! Error types for the apdiff content-stream comparison library.

use thiserror::Error;

/// Primary error type for content-stream operations.
///
/// Comparator verdicts are not errors: a pair that tokenizes but differs
/// is reported as data (see [`crate::compare::Verdict`]), so batch callers
/// can aggregate divergences without unwinding. `DiffError` covers the
/// cases where a comparison could not be carried out at all.
#[derive(Error, Debug)]
pub enum DiffError {
    /// The tokenizer could not classify input at a byte offset.
    ///
    /// Fatal for the one comparison it occurred in; independent
    /// comparisons in the same batch proceed.
    #[error("malformed content stream at offset {offset}: {reason}")]
    MalformedContentStream { offset: usize, reason: String },

    /// A document model could not supply content bytes for an element.
    #[error("appearance unavailable: {0}")]
    AppearanceUnavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias for DiffError.
pub type Result<T> = std::result::Result<T, DiffError>;
