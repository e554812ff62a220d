//! Failure accumulation, merging, commit, and diagnostic rendering.

use miette::Diagnostic;
use pegma::prelude::*;

#[test]
fn report_carries_the_deepest_expectations_only() {
    // Both branches die, one deeper than the other; only the deep one is
    // reported.
    let long = Parser::sequence([Parser::literal_emit("ab"), Parser::literal_emit("cd")]);
    let short = Parser::literal_emit("x");
    let report = Parser::choice([long, short]).parse("abzz").unwrap();
    assert!(!report.is_success());
    assert_eq!(
        report.failures,
        vec![Failure::expected(2, Expectation::Literal("cd".to_string()))]
    );
}

#[test]
fn sibling_expectations_at_the_same_depth_combine() {
    let parser = Parser::choice([
        Parser::literal_emit("a"),
        Parser::literal_emit("b"),
        Parser::literal_emit("a"),
    ]);
    let report = parser.parse("z").unwrap();
    let [Failure::Expected { at: 0, expected }] = report.failures.as_slice() else {
        panic!("expected one combined failure");
    };
    // Deduplicated, first occurrence order preserved.
    assert_eq!(
        expected,
        &vec![
            Expectation::Literal("a".to_string()),
            Expectation::Literal("b".to_string()),
        ]
    );
}

#[test]
fn committed_failures_survive_deeper_ones() {
    // The first alternative dies before 'b' matches; committing right after
    // the choice promotes that dead end, so it stays in the report even
    // though the later failure is deeper.
    let choice = Parser::choice([
        Parser::sequence([Parser::literal_emit("a"), Parser::literal_emit("x")]),
        Parser::literal_emit("b"),
    ]);
    let committed = Parser::action(choice, |cx: &mut ActionContext| {
        cx.commit();
        Ok(cx.value().cloned())
    });
    let parser = Parser::sequence([committed, Parser::literal_emit("c")]);
    let report = parser.parse("b d").unwrap();
    assert!(!report.is_success());
    assert_eq!(
        report.failures,
        vec![
            Failure::expected(0, Expectation::Literal("a".to_string())),
            Failure::expected(2, Expectation::Literal("c".to_string())),
        ]
    );
}

#[test]
fn merge_is_idempotent_over_reported_failures() {
    let parser = Parser::choice([
        Parser::literal_emit("a"),
        Parser::literal_emit("b"),
    ]);
    let report = parser.parse("z").unwrap();
    assert_eq!(merge_failures(&report.failures), report.failures);
}

#[test]
fn semantic_failures_span_the_rejected_match() {
    let digits = Parser::regex(r"\d+").unwrap();
    let odd = Parser::action(digits, |cx: &mut ActionContext| {
        Err(cx.error("odd numbers only"))
    });
    let report = odd.parse("  1234").unwrap();
    assert_eq!(
        report.failures,
        vec![Failure::Semantic {
            span: Span::new(2, 6),
            message: "odd numbers only".to_string(),
        }]
    );
}

#[test]
fn diagnostic_labels_sit_at_the_failure_offsets() {
    let parser = Parser::sequence([Parser::literal("if"), Parser::literal("then")]);
    let report = parser.parse("if x").unwrap();
    let diagnostic = report.to_diagnostic("input.peg").unwrap();
    assert_eq!(diagnostic.to_string(), "expected 'then'");

    let labels: Vec<_> = diagnostic.labels().unwrap().collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].offset(), 3);
    assert_eq!(labels[0].label(), Some("expected 'then'"));
}

#[test]
fn successful_report_without_failures_has_no_diagnostic() {
    let report = Parser::literal("a").parse("a").unwrap();
    assert!(report.to_diagnostic("input.peg").is_none());
}

#[test]
fn token_alias_names_the_expectation_in_the_message() {
    let number = Parser::token(Parser::regex(r"\d+").unwrap(), Some("number"));
    let report = number.parse("abc").unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failures[0].to_string(), "expected number");
}

#[test]
fn warnings_do_not_affect_success() {
    let noisy = Parser::action(Parser::literal_emit("a"), |cx: &mut ActionContext| {
        cx.warn("just saying");
        Ok(cx.value().cloned())
    });
    let report = Parser::choice([noisy, Parser::literal_emit("b")])
        .parse("a")
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.warnings.len(), 1);
}
