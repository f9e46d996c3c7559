//! apdiff - structural comparison of PDF appearance content streams.
//!
//! Validates that a regenerated appearance content stream is
//! operationally equivalent to the reference stream an authoring tool
//! produced. Two components do the work: a content-stream tokenizer
//! ([`lexer`]) and a tolerance-aware structural comparator ([`compare`]).
//! [`batch`] runs many pairs in parallel; [`appearance`] drives an
//! external document model through the extract/regenerate/compare flow.

pub mod appearance;
pub mod batch;
pub mod compare;
pub mod error;
pub mod lexer;
pub mod token;

pub use appearance::{
    AppearanceProvider, ElementRef, ElementReport, verify_elements, verify_regeneration,
};
pub use batch::{
    BatchOptions, PairOutcome, PairReport, StreamPair, StreamRole, compare_batch, compare_pair,
};
pub use compare::{CompareOptions, DEFAULT_TOLERANCE, Mismatch, MismatchKind, Verdict, compare};
pub use error::{DiffError, Result};
pub use lexer::{ContentLexer, RawToken, tokenize};
pub use token::{CompositeKind, PrecisionHint, Token, TokenSequence};
