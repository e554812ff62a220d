//! Sequencing, ordered choice, and repetition.

use std::sync::Arc;

use crate::errors::GrammarError;
use crate::options::{Internals, ParseOptions};
use crate::outcome::Match;
use crate::parsers::Parser;
use crate::span::Span;
use crate::value::{Captures, Value};

pub(super) fn exec_sequence<'s>(
    children: &'s [Arc<Parser>],
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let mut cursor = options.from;
    let mut start = None;
    let mut values = Vec::new();
    let mut captures = Captures::new();
    for child in children {
        let attempt = ParseOptions {
            from: cursor,
            ..options
        };
        let Some(matched) = child.exec(attempt, state)? else {
            return Ok(None);
        };
        start.get_or_insert(matched.span.from);
        cursor = matched.span.to;
        // Splice: a child that emitted nothing contributes nothing.
        values.extend(matched.children);
        for (name, value) in matched.captures {
            captures.insert(name, value);
        }
    }
    let from = start.unwrap_or(options.from);
    Ok(Some(Match {
        span: Span::new(from, cursor),
        children: values,
        captures,
    }))
}

pub(super) fn exec_choice<'s>(
    children: &'s [Arc<Parser>],
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    // Alternatives share the starting cursor, and a failed attempt only
    // leaves failures behind, so backtracking needs no state restoration.
    for child in children {
        if let Some(matched) = child.exec(options, state)? {
            return Ok(Some(matched));
        }
    }
    Ok(None)
}

pub(super) fn exec_repetition<'s>(
    child: &'s Parser,
    min: usize,
    max: Option<usize>,
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let mut cursor = options.from;
    let mut start = None;
    let mut end = options.from;
    let mut values = Vec::new();
    let mut captures = Captures::new();
    let mut count = 0;
    while max.map_or(true, |limit| count < limit) {
        let attempt = ParseOptions {
            from: cursor,
            ..options
        };
        let Some(matched) = child.exec(attempt, state)? else {
            break;
        };
        let Match {
            span,
            children,
            captures: bound,
        } = matched;
        count += 1;
        start.get_or_insert(span.from);
        let consumed = span.to > cursor;
        end = span.to;
        cursor = span.to;
        for (name, value) in bound {
            captures.insert(name, value);
        }
        // One entry per iteration; a valueless iteration stays in the list.
        let mut emitted = children.into_iter();
        let value = match (emitted.next(), emitted.next()) {
            (Some(value), None) => value,
            _ => Value::Null,
        };
        values.push(value);
        if !consumed {
            // A zero-width iteration can never advance; stop here.
            break;
        }
    }
    if count < min {
        return Ok(None);
    }
    let from = start.unwrap_or(options.from);
    let to = if count == 0 { options.from } else { end };
    Ok(Some(Match {
        span: Span::new(from, to),
        children: values,
        captures,
    }))
}

#[cfg(test)]
mod tests {
    use crate::failure::{Expectation, Failure};
    use crate::parsers::Parser;
    use crate::span::Span;
    use crate::value::Value;

    fn letters() -> (Parser, Parser) {
        (Parser::literal_emit("a"), Parser::literal_emit("b"))
    }

    #[test]
    fn sequence_threads_the_cursor_through_skipped_input() {
        let (a, b) = letters();
        let report = Parser::sequence([a, b]).parse(" ab ").unwrap();
        assert!(report.is_success());
        assert_eq!(report.span(), Some(Span::new(1, 3)));
        assert_eq!(report.raw(), Some("ab"));
    }

    #[test]
    fn sequence_stops_at_the_first_failing_child() {
        let (a, b) = letters();
        let report = Parser::sequence([a, b]).parse("ac").unwrap();
        assert!(!report.is_success());
        assert_eq!(
            report.failures,
            vec![Failure::expected(1, Expectation::Literal("b".to_string()))]
        );
    }

    #[test]
    fn sequence_splices_child_values_and_drops_silent_ones() {
        let parser = Parser::sequence([
            Parser::literal("("),
            Parser::literal_emit("a"),
            Parser::literal_emit("b"),
            Parser::literal(")"),
        ]);
        let report = parser.parse("(ab)").unwrap();
        let matched = report.matched.as_ref().unwrap();
        assert_eq!(
            matched.children,
            vec![
                Value::String("a".to_string()),
                Value::String("b".to_string()),
            ]
        );
    }

    #[test]
    fn nested_and_flat_sequences_accept_the_same_input() {
        let nested = Parser::sequence([
            Parser::sequence([Parser::literal_emit("a"), Parser::literal_emit("b")]),
            Parser::literal_emit("c"),
        ]);
        let flat = Parser::sequence([
            Parser::literal_emit("a"),
            Parser::sequence([Parser::literal_emit("b"), Parser::literal_emit("c")]),
        ]);
        for input in ["abc", " a b c "] {
            let left = nested.parse(input).unwrap();
            let right = flat.parse(input).unwrap();
            assert_eq!(left.span(), right.span(), "span diverged on {input:?}");
            assert_eq!(
                left.matched.as_ref().unwrap().children,
                right.matched.as_ref().unwrap().children,
                "values diverged on {input:?}"
            );
        }
    }

    #[test]
    fn choice_takes_the_first_match_and_keeps_earlier_failures() {
        let (a, b) = letters();
        let report = Parser::choice([a, b]).parse("b").unwrap();
        assert!(report.is_success());
        assert_eq!(report.raw(), Some("b"));
        assert_eq!(
            report.failures,
            vec![Failure::expected(0, Expectation::Literal("a".to_string()))]
        );
    }

    #[test]
    fn choice_failure_merges_all_alternatives() {
        let (a, b) = letters();
        let report = Parser::choice([a, b]).parse("c").unwrap();
        assert!(!report.is_success());
        assert_eq!(
            report.failures,
            vec![Failure::Expected {
                at: 0,
                expected: vec![
                    Expectation::Literal("a".to_string()),
                    Expectation::Literal("b".to_string()),
                ],
            }]
        );
    }

    #[test]
    fn choice_ordering_is_first_match_wins() {
        // Both alternatives match; the first one decides the span.
        let parser = Parser::choice([Parser::literal_emit("ab"), Parser::literal_emit("a")]);
        let report = parser.parse("ab").unwrap();
        assert_eq!(report.raw(), Some("ab"));
    }

    #[test]
    fn repetition_is_greedy_up_to_its_cap() {
        let parser = Parser::repeat(Parser::literal_emit("a"), 2, Some(3));
        let report = parser.parse("aaaa").unwrap();
        assert!(report.is_success());
        assert_eq!(report.span(), Some(Span::new(0, 3)));
        let matched = report.matched.as_ref().unwrap();
        assert_eq!(matched.children.len(), 3);
    }

    #[test]
    fn repetition_below_minimum_fails() {
        let parser = Parser::repeat(Parser::literal_emit("a"), 2, Some(3));
        let report = parser.parse("a").unwrap();
        assert!(!report.is_success());
    }

    #[test]
    fn empty_repetition_matches_nothing_at_the_cursor() {
        let parser = Parser::zero_or_more(Parser::literal_emit("a"));
        let report = parser.parse("bbb").unwrap();
        assert!(report.is_success());
        assert_eq!(report.span(), Some(Span::new(0, 0)));
        assert!(report.matched.as_ref().unwrap().children.is_empty());
    }

    #[test]
    fn repetition_keeps_valueless_iterations_in_its_list() {
        let parser = Parser::repeat(Parser::literal("a"), 0, None);
        let report = parser.parse("aa").unwrap();
        let matched = report.matched.as_ref().unwrap();
        assert_eq!(matched.children, vec![Value::Null, Value::Null]);
    }

    #[test]
    fn unbounded_repetition_over_a_nullable_child_terminates() {
        let parser = Parser::zero_or_more(Parser::optional(Parser::literal_emit("a")));
        let report = parser.parse("b").unwrap();
        assert!(report.is_success());
        assert_eq!(report.span(), Some(Span::new(0, 0)));
    }
}
