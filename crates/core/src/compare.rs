//! Tolerance-aware structural comparison of token sequences.
//!
//! Two sequences are "the same program" when they have the same length
//! and every token pair agrees: operators by name, numerics within a
//! tolerance, and the remaining operand kinds by tag (or by value, in
//! strict mode). Comparison is a pure function: no state survives a
//! call, and identical inputs always yield identical verdicts.

use std::fmt;

use crate::token::{Token, TokenSequence};

/// Default numeric tolerance.
///
/// Deliberately loose: independent PDF producers round coordinates
/// differently, and the regenerated stream only has to be operationally
/// equivalent, not byte-identical.
pub const DEFAULT_TOLERANCE: f64 = 3e-3;

/// Options controlling a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Numeric operands whose absolute difference is below this bound
    /// compare equal. The bound is strict: a difference of exactly
    /// `tolerance` is a mismatch.
    pub tolerance: f64,

    /// Also compare the values of name, string and composite operands.
    ///
    /// The default (`false`) reproduces the reference behavior: those
    /// operand kinds compare equal whenever their tags match.
    pub strict_operand_equality: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            strict_operand_equality: false,
        }
    }
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_strict_operand_equality(mut self, strict: bool) -> Self {
        self.strict_operand_equality = strict;
        self
    }
}

/// How a token pair diverged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// The sequences have different lengths.
    TokenCountMismatch,
    /// The tokens at an index have different tags.
    TypeMismatch,
    /// Two operators with different names.
    OperatorNameMismatch,
    /// Two same-tag operands with diverging values.
    ValueMismatch,
}

impl MismatchKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenCountMismatch => "token count mismatch",
            Self::TypeMismatch => "type mismatch",
            Self::OperatorNameMismatch => "operator name mismatch",
            Self::ValueMismatch => "value mismatch",
        }
    }
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first point of divergence between two sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Index of the first diverging token pair. For a count mismatch this
    /// is the length of the shorter sequence.
    pub index: usize,
    pub kind: MismatchKind,
    /// Human-readable description carrying both observed values.
    pub detail: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token {}: {}: {}", self.index, self.kind, self.detail)
    }
}

/// Result of comparing two token sequences. Exactly one per comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The sequences are operationally equivalent.
    Match,
    /// The sequences diverge; comparison stopped at the first divergence.
    Mismatch(Mismatch),
}

impl Verdict {
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    pub const fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Match => None,
            Self::Mismatch(mismatch) => Some(mismatch),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => f.write_str("match"),
            Self::Mismatch(mismatch) => write!(f, "mismatch: {mismatch}"),
        }
    }
}

/// Compare a candidate sequence against a reference sequence.
///
/// The length check runs first and fails fast: contents are never
/// inspected when the counts differ. Otherwise the sequences are walked
/// pairwise and the first diverging pair produces the verdict.
pub fn compare(
    reference: &TokenSequence,
    candidate: &TokenSequence,
    options: &CompareOptions,
) -> Verdict {
    if reference.len() != candidate.len() {
        let index = reference.len().min(candidate.len());
        return Verdict::Mismatch(Mismatch {
            index,
            kind: MismatchKind::TokenCountMismatch,
            detail: format!(
                "reference has {} tokens, candidate has {}",
                reference.len(),
                candidate.len()
            ),
        });
    }

    for (i, (a, b)) in reference.iter().zip(candidate.iter()).enumerate() {
        if let Some((kind, detail)) = token_divergence(a, b, options) {
            let detail = match (reference.offset(i), candidate.offset(i)) {
                (Some(ra), Some(ca)) => {
                    format!("{detail} (reference offset {ra}, candidate offset {ca})")
                }
                _ => detail,
            };
            return Verdict::Mismatch(Mismatch {
                index: i,
                kind,
                detail,
            });
        }
    }

    Verdict::Match
}

/// Decide whether one token pair diverges, and how.
fn token_divergence(
    a: &Token,
    b: &Token,
    options: &CompareOptions,
) -> Option<(MismatchKind, String)> {
    match (a, b) {
        (Token::Operator(x), Token::Operator(y)) => {
            if x == y {
                None
            } else {
                Some((
                    MismatchKind::OperatorNameMismatch,
                    format!("reference operator `{x}`, candidate operator `{y}`"),
                ))
            }
        }
        (Token::Numeric { value: x, .. }, Token::Numeric { value: y, .. }) => {
            // Strict `<`: a difference of exactly the tolerance mismatches
            if (x - y).abs() < options.tolerance {
                None
            } else {
                Some((
                    MismatchKind::ValueMismatch,
                    format!(
                        "|{x} - {y}| = {} is not below tolerance {}",
                        (x - y).abs(),
                        options.tolerance
                    ),
                ))
            }
        }
        (Token::Name(x), Token::Name(y)) => {
            if !options.strict_operand_equality || x == y {
                None
            } else {
                Some((
                    MismatchKind::ValueMismatch,
                    format!("reference name /{x}, candidate name /{y}"),
                ))
            }
        }
        (Token::StringLiteral(x), Token::StringLiteral(y)) => {
            if !options.strict_operand_equality || x == y {
                None
            } else {
                Some((
                    MismatchKind::ValueMismatch,
                    format!(
                        "reference string ({}), candidate string ({})",
                        String::from_utf8_lossy(x),
                        String::from_utf8_lossy(y)
                    ),
                ))
            }
        }
        (
            Token::CompositeOperand {
                kind: ka,
                elements: ea,
            },
            Token::CompositeOperand {
                kind: kb,
                elements: eb,
            },
        ) => {
            if !options.strict_operand_equality {
                return None;
            }
            if ka != kb {
                return Some((
                    MismatchKind::ValueMismatch,
                    format!(
                        "reference composite is an {}, candidate is a {}",
                        ka.as_str(),
                        kb.as_str()
                    ),
                ));
            }
            if ea.len() != eb.len() {
                return Some((
                    MismatchKind::ValueMismatch,
                    format!(
                        "reference {} has {} elements, candidate has {}",
                        ka.as_str(),
                        ea.len(),
                        eb.len()
                    ),
                ));
            }
            for (j, (x, y)) in ea.iter().zip(eb.iter()).enumerate() {
                if let Some((_, inner)) = token_divergence(x, y, options) {
                    return Some((
                        MismatchKind::ValueMismatch,
                        format!("element {j}: {inner}"),
                    ));
                }
            }
            None
        }
        _ => Some((
            MismatchKind::TypeMismatch,
            format!(
                "reference token is a {}, candidate token is a {}",
                a.kind_name(),
                b.kind_name()
            ),
        )),
    }
}
