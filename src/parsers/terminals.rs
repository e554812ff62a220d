//! Terminal parsers: exact text, anchored patterns, and input edges.

use regex::{Regex, RegexBuilder};

use crate::errors::GrammarError;
use crate::failure::{EdgeKind, Expectation, Failure};
use crate::options::{preskip, Internals, ParseOptions};
use crate::outcome::Match;
use crate::span::Span;
use crate::value::{Captures, Value};

/// Compiled pattern terminal. Both case forms are prepared up front and
/// selected at match time; the pattern is anchored by wrapping it in
/// `^(?:…)` and running it against the tail of the input.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    source: String,
    sensitive: Regex,
    insensitive: Regex,
}

impl RegexMatcher {
    pub(crate) fn compile(pattern: &str) -> Result<Self, GrammarError> {
        let anchored = format!("^(?:{pattern})");
        let compile = |case_insensitive: bool| {
            RegexBuilder::new(&anchored)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|source| GrammarError::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })
        };
        Ok(Self {
            source: pattern.to_string(),
            sensitive: compile(false)?,
            insensitive: compile(true)?,
        })
    }

    /// The pattern as the user wrote it, without the anchor.
    pub fn source(&self) -> &str {
        &self.source
    }
}

pub(super) fn exec_literal(
    literal: &str,
    emit: bool,
    options: ParseOptions<'_>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let Some(at) = preskip(options, state)? else {
        return Ok(None);
    };
    let Some(to) = literal_end(options.input, at, literal, options.ignore_case) else {
        state
            .failures
            .push(Failure::expected(at, Expectation::Literal(literal.to_string())));
        return Ok(None);
    };
    let children = if emit {
        vec![Value::String(literal.to_string())]
    } else {
        Vec::new()
    };
    Ok(Some(Match {
        span: Span::new(at, to),
        children,
        captures: Captures::new(),
    }))
}

/// End offset of `literal` matched at `at`, or nothing. Case-insensitive
/// comparison folds both sides char by char, so the consumed length follows
/// the input, not the literal.
fn literal_end(input: &str, at: usize, literal: &str, ignore_case: bool) -> Option<usize> {
    if !ignore_case {
        return input[at..]
            .starts_with(literal)
            .then(|| at + literal.len());
    }
    let mut end = at;
    let mut rest = input[at..].chars();
    for expected in literal.chars() {
        let found = rest.next()?;
        if !chars_fold_eq(found, expected) {
            return None;
        }
        end += found.len_utf8();
    }
    Some(end)
}

fn chars_fold_eq(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

pub(super) fn exec_regex(
    matcher: &RegexMatcher,
    options: ParseOptions<'_>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let Some(at) = preskip(options, state)? else {
        return Ok(None);
    };
    let regex = if options.ignore_case {
        &matcher.insensitive
    } else {
        &matcher.sensitive
    };
    let Some(found) = regex.captures(&options.input[at..]) else {
        state
            .failures
            .push(Failure::expected(at, Expectation::Pattern(matcher.source.clone())));
        return Ok(None);
    };
    let whole = found.get(0).expect("group 0 is the whole match");
    let mut captures = Captures::new();
    for name in regex.capture_names().flatten() {
        if let Some(group) = found.name(name) {
            captures.insert(name.to_string(), Value::String(group.as_str().to_string()));
        }
    }
    Ok(Some(Match {
        span: Span::new(at, at + whole.end()),
        children: vec![Value::String(whole.as_str().to_string())],
        captures,
    }))
}

pub(super) fn exec_start_edge(
    options: ParseOptions<'_>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    // Asserts position zero; skipping first would defeat the assertion.
    if options.from == 0 {
        return Ok(Some(Match::empty_at(0)));
    }
    state
        .failures
        .push(Failure::expected(options.from, Expectation::Edge(EdgeKind::Start)));
    Ok(None)
}

pub(super) fn exec_end_edge(
    options: ParseOptions<'_>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let Some(at) = preskip(options, state)? else {
        return Ok(None);
    };
    if at == options.input.len() {
        return Ok(Some(Match::empty_at(at)));
    }
    state
        .failures
        .push(Failure::expected(at, Expectation::Edge(EdgeKind::End)));
    Ok(None)
}
