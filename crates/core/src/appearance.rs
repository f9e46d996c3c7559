//! Regeneration verification harness.
//!
//! Drives an external document model through appearance regeneration and
//! compares the content stream it produces against the one the authoring
//! tool wrote. The document container, the annotation model and the
//! regeneration algorithm all live behind [`AppearanceProvider`]; this
//! module only ever sees raw content-stream bytes.

use std::fmt;

use crate::batch::{PairOutcome, compare_pair};
use crate::compare::CompareOptions;
use crate::error::Result;

/// Locates a visual element (an annotation on a page) in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    /// Zero-indexed page.
    pub page: usize,
    /// Zero-indexed annotation on that page.
    pub annotation: usize,
}

impl ElementRef {
    pub const fn new(page: usize, annotation: usize) -> Self {
        Self { page, annotation }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {} annotation {}", self.page, self.annotation)
    }
}

/// Access to a document model that serves and regenerates appearance
/// streams.
pub trait AppearanceProvider {
    /// Raw content-stream bytes of the element's current normal
    /// appearance.
    fn extract_content_bytes(&self, element: &ElementRef) -> Result<Vec<u8>>;

    /// Discard the element's appearance and recompute it.
    ///
    /// Opaque and side-effecting; the new stream is observed by calling
    /// [`AppearanceProvider::extract_content_bytes`] again.
    fn regenerate_appearance(&mut self, element: &ElementRef) -> Result<()>;
}

/// Outcome of verifying one element's regenerated appearance.
#[derive(Debug)]
pub struct ElementReport {
    pub element: ElementRef,
    pub outcome: PairOutcome,
}

/// Verify that regenerating one element's appearance preserves its
/// content stream.
///
/// Flow: extract the reference bytes, trigger regeneration, re-extract
/// the candidate bytes, tokenize both and compare. Provider failures
/// propagate as errors; tokenizer failures and comparison divergence are
/// reported in the [`PairOutcome`].
pub fn verify_regeneration<P>(
    provider: &mut P,
    element: &ElementRef,
    options: &CompareOptions,
) -> Result<PairOutcome>
where
    P: AppearanceProvider + ?Sized,
{
    let reference = provider.extract_content_bytes(element)?;
    provider.regenerate_appearance(element)?;
    let candidate = provider.extract_content_bytes(element)?;
    Ok(compare_pair(&reference, &candidate, options))
}

/// Verify a set of elements, one report per element in input order.
///
/// Sequential: regeneration mutates the provider, so elements of one
/// document cannot be regenerated concurrently. Unparseable streams and
/// divergences land in the per-element outcome and the run continues; a
/// provider failure aborts, since later extractions would read from a
/// model in an unknown state.
pub fn verify_elements<P>(
    provider: &mut P,
    elements: &[ElementRef],
    options: &CompareOptions,
) -> Result<Vec<ElementReport>>
where
    P: AppearanceProvider + ?Sized,
{
    let mut reports = Vec::with_capacity(elements.len());
    for element in elements {
        let outcome = verify_regeneration(provider, element, options)?;
        reports.push(ElementReport {
            element: *element,
            outcome,
        });
    }
    Ok(reports)
}
