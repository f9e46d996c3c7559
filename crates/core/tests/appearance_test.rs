//! Tests for the regeneration verification harness.

use std::collections::HashMap;

use apdiff_core::appearance::{
    AppearanceProvider, ElementRef, verify_elements, verify_regeneration,
};
use apdiff_core::batch::PairOutcome;
use apdiff_core::compare::{CompareOptions, MismatchKind};
use apdiff_core::error::{DiffError, Result};

/// In-memory stand-in for a document model: each element has a current
/// appearance stream and a canned stream that regeneration produces.
struct FakeDocument {
    current: HashMap<ElementRef, Vec<u8>>,
    regenerated: HashMap<ElementRef, Vec<u8>>,
}

impl FakeDocument {
    fn new() -> Self {
        Self {
            current: HashMap::new(),
            regenerated: HashMap::new(),
        }
    }

    fn with_element(
        mut self,
        element: ElementRef,
        authored: &[u8],
        regenerated: &[u8],
    ) -> Self {
        self.current.insert(element, authored.to_vec());
        self.regenerated.insert(element, regenerated.to_vec());
        self
    }
}

impl AppearanceProvider for FakeDocument {
    fn extract_content_bytes(&self, element: &ElementRef) -> Result<Vec<u8>> {
        self.current
            .get(element)
            .cloned()
            .ok_or_else(|| DiffError::AppearanceUnavailable(element.to_string()))
    }

    fn regenerate_appearance(&mut self, element: &ElementRef) -> Result<()> {
        let stream = self
            .regenerated
            .get(element)
            .cloned()
            .ok_or_else(|| DiffError::AppearanceUnavailable(element.to_string()))?;
        self.current.insert(*element, stream);
        Ok(())
    }
}

const ADOBE_RECT: &[u8] = b"1.000 0.000 0.000 RG 0 0 10 10 re S";
const REGENERATED_RECT: &[u8] = b"1.0 0 0 RG 0 0 10.001 10 re S";
const REGENERATED_FILLED: &[u8] = b"1.0 0 0 RG 0 0 10.001 10 re f";

#[test]
fn test_rectangle_full_stroke_no_fill() {
    let element = ElementRef::new(0, 0);
    let mut document =
        FakeDocument::new().with_element(element, ADOBE_RECT, REGENERATED_RECT);

    let outcome = verify_regeneration(&mut document, &element, &CompareOptions::default())
        .expect("provider");
    assert!(outcome.is_pass(), "got {outcome}");
}

#[test]
fn test_regeneration_changing_paint_operator_diverges() {
    let element = ElementRef::new(0, 0);
    let mut document =
        FakeDocument::new().with_element(element, ADOBE_RECT, REGENERATED_FILLED);

    let outcome = verify_regeneration(&mut document, &element, &CompareOptions::default())
        .expect("provider");
    match outcome {
        PairOutcome::Diverged(mismatch) => {
            assert_eq!(mismatch.index, 9);
            assert_eq!(mismatch.kind, MismatchKind::OperatorNameMismatch);
        }
        other => panic!("expected Diverged, got {other}"),
    }
}

#[test]
fn test_missing_element_is_a_provider_error() {
    let mut document = FakeDocument::new();
    let element = ElementRef::new(3, 7);

    let result = verify_regeneration(&mut document, &element, &CompareOptions::default());
    match result {
        Err(DiffError::AppearanceUnavailable(detail)) => {
            assert_eq!(detail, "page 3 annotation 7");
        }
        other => panic!("expected AppearanceUnavailable, got {other:?}"),
    }
}

#[test]
fn test_verify_elements_reports_in_order_and_continues_past_divergence() {
    let pass = ElementRef::new(0, 0);
    let diverging = ElementRef::new(0, 1);
    let also_pass = ElementRef::new(1, 0);

    let mut document = FakeDocument::new()
        .with_element(pass, ADOBE_RECT, REGENERATED_RECT)
        .with_element(diverging, ADOBE_RECT, REGENERATED_FILLED)
        .with_element(also_pass, ADOBE_RECT, ADOBE_RECT);

    let reports = verify_elements(
        &mut document,
        &[pass, diverging, also_pass],
        &CompareOptions::default(),
    )
    .expect("provider");

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].element, pass);
    assert!(reports[0].outcome.is_pass());
    assert_eq!(reports[1].element, diverging);
    assert!(matches!(reports[1].outcome, PairOutcome::Diverged(_)));
    assert_eq!(reports[2].element, also_pass);
    assert!(reports[2].outcome.is_pass());
}

#[test]
fn test_unparseable_regenerated_stream_is_not_a_provider_error() {
    let element = ElementRef::new(0, 0);
    let mut document =
        FakeDocument::new().with_element(element, ADOBE_RECT, b"0 0 10 10 re (oops");

    let outcome = verify_regeneration(&mut document, &element, &CompareOptions::default())
        .expect("provider");
    assert!(matches!(outcome, PairOutcome::Unparseable { .. }));
}
