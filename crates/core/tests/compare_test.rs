//! Tests for the tolerance-aware structural comparator.

use apdiff_core::compare::{CompareOptions, MismatchKind, Verdict, compare};
use apdiff_core::lexer::tokenize;
use apdiff_core::token::TokenSequence;

fn seq(data: &[u8]) -> TokenSequence {
    tokenize(data).expect("tokenize")
}

fn verdict(reference: &[u8], candidate: &[u8], options: &CompareOptions) -> Verdict {
    compare(&seq(reference), &seq(candidate), options)
}

fn default_verdict(reference: &[u8], candidate: &[u8]) -> Verdict {
    verdict(reference, candidate, &CompareOptions::default())
}

fn strict() -> CompareOptions {
    CompareOptions::new().with_strict_operand_equality(true)
}

#[test]
fn test_identical_sequences_match() {
    let data: &[u8] = b"q /GS0 gs 1.000 0.000 0.000 RG [(a) -250 (b)] TJ (x) Tj Q";
    assert_eq!(default_verdict(data, data), Verdict::Match);
}

#[test]
fn test_empty_sequences_match() {
    assert_eq!(default_verdict(b"", b""), Verdict::Match);
}

#[test]
fn test_rectangle_regeneration_scenario() {
    // Adobe-style reference vs regenerated candidate: integer/real shape
    // differences and a 0.001 coordinate drift, all within tolerance
    let reference = b"1.000 0.000 0.000 RG 0 0 10 10 re S";
    let candidate = b"1.0 0 0 RG 0 0 10.001 10 re S";
    assert_eq!(default_verdict(reference, candidate), Verdict::Match);
}

#[test]
fn test_operator_name_mismatch() {
    let reference = b"1.000 0.000 0.000 RG 0 0 10 10 re S";
    let candidate = b"1.000 0.000 0.000 RG 0 0 10 10 re f";
    let verdict = default_verdict(reference, candidate);

    let mismatch = verdict.mismatch().expect("mismatch");
    assert_eq!(mismatch.index, 9);
    assert_eq!(mismatch.kind, MismatchKind::OperatorNameMismatch);
    assert!(mismatch.detail.contains("`S`"), "detail: {}", mismatch.detail);
    assert!(mismatch.detail.contains("`f`"), "detail: {}", mismatch.detail);
}

#[test]
fn test_token_count_mismatch_fails_fast() {
    // 10 tokens vs 9: reported without inspecting contents, index is the
    // shorter length
    let reference = b"1.000 0.000 0.000 RG 0 0 10 10 re S";
    let candidate = b"1.000 0.000 0.000 RG 0 0 10 10 re";
    let verdict = default_verdict(reference, candidate);

    let mismatch = verdict.mismatch().expect("mismatch");
    assert_eq!(mismatch.kind, MismatchKind::TokenCountMismatch);
    assert_eq!(mismatch.index, 9);

    // Same count divergence with completely different contents: still a
    // count mismatch, never a value or type mismatch
    let verdict = default_verdict(b"(zzz) /Q S", b"1 2");
    let mismatch = verdict.mismatch().expect("mismatch");
    assert_eq!(mismatch.kind, MismatchKind::TokenCountMismatch);
    assert_eq!(mismatch.index, 2);
}

#[test]
fn test_tolerance_boundary_exact_is_mismatch() {
    // A difference of exactly the tolerance must mismatch: the bound is
    // strict `<`
    let verdict = default_verdict(b"0.003", b"0");
    let mismatch = verdict.mismatch().expect("mismatch");
    assert_eq!(mismatch.kind, MismatchKind::ValueMismatch);
    assert_eq!(mismatch.index, 0);
}

#[test]
fn test_tolerance_just_below_matches() {
    assert_eq!(default_verdict(b"0.0029", b"0"), Verdict::Match);
    assert_eq!(default_verdict(b"10.001", b"10"), Verdict::Match);
}

#[test]
fn test_numeric_comparison_is_symmetric() {
    for (a, b) in [
        (&b"0.0029"[..], &b"0"[..]),
        (&b"10.001"[..], &b"10"[..]),
        (&b"0.003"[..], &b"0"[..]),
        (&b"5"[..], &b"-5"[..]),
    ] {
        let forward = default_verdict(a, b);
        let backward = default_verdict(b, a);
        assert_eq!(
            forward.is_match(),
            backward.is_match(),
            "asymmetric verdicts for {:?} vs {:?}",
            std::str::from_utf8(a),
            std::str::from_utf8(b)
        );
    }
}

#[test]
fn test_integer_and_real_literals_share_a_tag() {
    // 0.000 vs 0 is a value comparison, not a type mismatch
    assert_eq!(default_verdict(b"1", b"1.0000"), Verdict::Match);
    assert_eq!(default_verdict(b"0.000", b"0"), Verdict::Match);
}

#[test]
fn test_type_mismatch() {
    let verdict = default_verdict(b"(abc) S", b"/abc S");
    let mismatch = verdict.mismatch().expect("mismatch");
    assert_eq!(mismatch.index, 0);
    assert_eq!(mismatch.kind, MismatchKind::TypeMismatch);
}

#[test]
fn test_first_divergence_wins() {
    let verdict = default_verdict(b"1 S 2", b"5 f 2");
    let mismatch = verdict.mismatch().expect("mismatch");
    assert_eq!(mismatch.index, 0);
    assert_eq!(mismatch.kind, MismatchKind::ValueMismatch);
}

#[test]
fn test_names_compare_by_tag_only_by_default() {
    assert_eq!(default_verdict(b"/GS0 gs", b"/GS1 gs"), Verdict::Match);

    let verdict = verdict(b"/GS0 gs", b"/GS1 gs", &strict());
    let mismatch = verdict.mismatch().expect("mismatch");
    assert_eq!(mismatch.index, 0);
    assert_eq!(mismatch.kind, MismatchKind::ValueMismatch);
}

#[test]
fn test_strings_compare_by_tag_only_by_default() {
    assert_eq!(default_verdict(b"(x) Tj", b"(y) Tj"), Verdict::Match);

    let verdict = verdict(b"(x) Tj", b"(y) Tj", &strict());
    let mismatch = verdict.mismatch().expect("mismatch");
    assert_eq!(mismatch.index, 0);
    assert_eq!(mismatch.kind, MismatchKind::ValueMismatch);
}

#[test]
fn test_composites_compare_by_tag_only_by_default() {
    assert_eq!(default_verdict(b"[1 2] TJ", b"[1 9] TJ"), Verdict::Match);
    // Even kind differences pass when only tags are compared
    assert_eq!(
        default_verdict(b"[1 2] TJ", b"<< /A 1 >> TJ"),
        Verdict::Match
    );
}

#[test]
fn test_strict_composites_recurse_with_tolerance() {
    let options = strict();

    // Numeric elements still get the tolerance
    assert_eq!(
        verdict(b"[1.000 2] TJ", b"[1.0005 2] TJ", &options),
        Verdict::Match
    );

    let diverged = verdict(b"[1 2] TJ", b"[1 9] TJ", &options);
    let mismatch = diverged.mismatch().expect("mismatch");
    assert_eq!(mismatch.index, 0);
    assert_eq!(mismatch.kind, MismatchKind::ValueMismatch);

    // Element count divergence
    let diverged = verdict(b"[1 2] TJ", b"[1 2 3] TJ", &options);
    assert_eq!(
        diverged.mismatch().expect("mismatch").kind,
        MismatchKind::ValueMismatch
    );

    // Kind divergence
    let diverged = verdict(b"[1 2] TJ", b"<< /A 1 >> TJ", &options);
    assert_eq!(
        diverged.mismatch().expect("mismatch").kind,
        MismatchKind::ValueMismatch
    );

    // Nested recursion
    assert_eq!(
        verdict(
            b"<< /BBox [0 0 10.000 10] >> x",
            b"<< /BBox [0 0 10.001 10] >> x",
            &options
        ),
        Verdict::Match
    );
}

#[test]
fn test_custom_tolerance() {
    let loose = CompareOptions::new().with_tolerance(0.5);
    assert_eq!(verdict(b"1", b"1.4", &loose), Verdict::Match);
    assert!(!verdict(b"1", b"1.6", &loose).is_match());
}

#[test]
fn test_repeated_comparison_is_deterministic() {
    let reference = seq(b"1.000 0.000 0.000 RG 0 0 10 10 re S");
    let candidate = seq(b"1.0 0 0 RG 0 0 10.001 10 re f");
    let options = CompareOptions::default();

    let first = compare(&reference, &candidate, &options);
    let second = compare(&reference, &candidate, &options);
    assert_eq!(first, second);
}
