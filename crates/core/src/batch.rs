//! Batch comparison of reference/candidate stream pairs.
//!
//! The expected usage pattern is one pair per annotation across many
//! annotations and pages. Tokenizer and comparator are pure functions
//! over immutable inputs, so pairs run in parallel without coordination;
//! each pair fails fast internally while the batch always produces one
//! report per pair.

use std::fmt;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::compare::{CompareOptions, Mismatch, Verdict, compare};
use crate::error::DiffError;
use crate::lexer::tokenize;

/// Which of the two streams in a pair an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    Reference,
    Candidate,
}

impl StreamRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Candidate => "candidate",
        }
    }
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing one reference/candidate pair.
///
/// "Could not even parse" and "parsed fine but differs" are distinct
/// outcomes and must not be conflated in reporting.
#[derive(Debug)]
pub enum PairOutcome {
    /// Both streams tokenized and the sequences are equivalent.
    Pass,
    /// Both streams tokenized but diverge at a token.
    Diverged(Mismatch),
    /// One of the streams could not be tokenized.
    Unparseable { role: StreamRole, error: DiffError },
}

impl PairOutcome {
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for PairOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("pass"),
            Self::Diverged(mismatch) => write!(f, "diverged: {mismatch}"),
            Self::Unparseable { role, error } => {
                write!(f, "{role} stream unparseable: {error}")
            }
        }
    }
}

/// Tokenize both streams and compare them.
///
/// The reference stream is tokenized first, so when both are malformed
/// the reference failure is the one reported.
pub fn compare_pair(
    reference: &[u8],
    candidate: &[u8],
    options: &CompareOptions,
) -> PairOutcome {
    let reference = match tokenize(reference) {
        Ok(sequence) => sequence,
        Err(error) => {
            return PairOutcome::Unparseable {
                role: StreamRole::Reference,
                error,
            };
        }
    };
    let candidate = match tokenize(candidate) {
        Ok(sequence) => sequence,
        Err(error) => {
            return PairOutcome::Unparseable {
                role: StreamRole::Candidate,
                error,
            };
        }
    };

    match compare(&reference, &candidate, options) {
        Verdict::Match => PairOutcome::Pass,
        Verdict::Mismatch(mismatch) => PairOutcome::Diverged(mismatch),
    }
}

/// A labeled pair of raw streams to compare.
#[derive(Debug, Clone)]
pub struct StreamPair {
    /// Caller-chosen identity for reports (e.g. "page 0 annotation 3").
    pub label: String,
    pub reference: Vec<u8>,
    pub candidate: Vec<u8>,
}

impl StreamPair {
    pub fn new(label: impl Into<String>, reference: Vec<u8>, candidate: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            reference,
            candidate,
        }
    }
}

/// One batch entry's result.
#[derive(Debug)]
pub struct PairReport {
    pub label: String,
    pub outcome: PairOutcome,
}

/// Options for a batch run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchOptions {
    pub compare: CompareOptions,
    /// Worker thread count. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

/// Compare every pair, in parallel, one report per pair in input order.
///
/// An unparseable or diverging pair never stops the rest of the batch.
pub fn compare_batch(pairs: &[StreamPair], options: &BatchOptions) -> Vec<PairReport> {
    let run = || {
        pairs
            .par_iter()
            .map(|pair| PairReport {
                label: pair.label.clone(),
                outcome: compare_pair(&pair.reference, &pair.candidate, &options.compare),
            })
            .collect()
    };

    match options.threads {
        Some(threads) => match ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(run),
            Err(_) => run(),
        },
        None => run(),
    }
}
