//! Delegating parsers: tokens, captures, option scopes, semantic actions,
//! named rules, and lookahead.

use std::mem;

use crate::action::{ActionContext, ActionFn};
use crate::errors::GrammarError;
use crate::failure::{Expectation, Failure};
use crate::options::{preskip, Internals, ParseOptions};
use crate::outcome::Match;
use crate::parsers::{Overrides, Parser, Rule};
use crate::span::Span;
use crate::value::Value;

pub(super) fn exec_token<'s>(
    child: &'s Parser,
    alias: Option<&str>,
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let Some(at) = preskip(options, state)? else {
        return Ok(None);
    };
    // The body runs atomically: no skipping, and its failures stay private
    // so the token presents itself as a single unit outside.
    let attempt = ParseOptions {
        from: at,
        skip: false,
        ..options
    };
    let outer = mem::take(&mut state.failures);
    let result = child.exec(attempt, state);
    let body_failures = mem::replace(&mut state.failures, outer);
    match result? {
        Some(matched) => Ok(Some(matched)),
        None => {
            state.failures.push(Failure::expected(
                at,
                Expectation::Token {
                    alias: alias.map(str::to_string),
                    failures: body_failures,
                },
            ));
            Ok(None)
        }
    }
}

pub(super) fn exec_capture<'s>(
    child: &'s Parser,
    name: &str,
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let Some(mut matched) = child.exec(options, state)? else {
        return Ok(None);
    };
    let value = matched.value().cloned().unwrap_or(Value::Null);
    matched.captures.insert(name.to_string(), value);
    Ok(Some(matched))
}

pub(super) fn exec_with_options<'s>(
    child: &'s Parser,
    overrides: &'s Overrides,
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let attempt = ParseOptions {
        skip: overrides.skip.unwrap_or(options.skip),
        ignore_case: overrides.ignore_case.unwrap_or(options.ignore_case),
        skipper: overrides.skipper.as_deref().unwrap_or(options.skipper),
        ..options
    };
    child.exec(attempt, state)
}

pub(super) fn exec_action<'s>(
    child: &'s Parser,
    action: &ActionFn,
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let Some(matched) = child.exec(options, state)? else {
        return Ok(None);
    };
    let result = {
        let Internals {
            warnings,
            failures,
            committed,
            ..
        } = state;
        let mut context = ActionContext {
            span: matched.span,
            options,
            captures: &matched.captures,
            children: &matched.children,
            warnings,
            failures,
            committed,
        };
        action.call(&mut context)
    };
    match result {
        Ok(Some(value)) => Ok(Some(Match {
            span: matched.span,
            children: vec![value],
            captures: matched.captures,
        })),
        Ok(None) => Ok(Some(Match {
            span: matched.span,
            children: Vec::new(),
            captures: matched.captures,
        })),
        Err(error) => {
            state.failures.push(Failure::Semantic {
                span: matched.span,
                message: error.message,
            });
            Ok(None)
        }
    }
}

pub(super) fn exec_grammar<'s>(
    rules: &'s [Rule],
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let Some(first) = rules.first() else {
        return Err(GrammarError::EmptyGrammar);
    };
    let scoped = ParseOptions {
        grammar: Some(rules),
        ..options
    };
    first.parser.exec(scoped, state)
}

pub(super) fn exec_reference<'s>(
    label: &str,
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let Some(rules) = options.grammar else {
        return Err(GrammarError::NoGrammar {
            label: label.to_string(),
        });
    };
    let Some(rule) = rules.iter().find(|rule| rule.name == label) else {
        return Err(GrammarError::UndefinedRule {
            label: label.to_string(),
        });
    };
    let Some(mut matched) = rule.parser.exec(options, state)? else {
        return Ok(None);
    };
    if let Some(value) = matched.value().cloned() {
        matched.captures.insert(label.to_string(), value);
    }
    Ok(Some(matched))
}

pub(super) fn exec_predicate<'s>(
    child: &'s Parser,
    negated: bool,
    options: ParseOptions<'s>,
    state: &mut Internals<'_>,
) -> Result<Option<Match>, GrammarError> {
    let outer = mem::take(&mut state.failures);
    let result = child.exec(options, state);
    let attempt_failures = mem::replace(&mut state.failures, outer);
    match (result?, negated) {
        (Some(matched), false) => {
            // Lookahead consumes nothing but keeps what it captured.
            Ok(Some(Match {
                span: Span::at(options.from),
                children: Vec::new(),
                captures: matched.captures,
            }))
        }
        (None, true) => Ok(Some(Match::empty_at(options.from))),
        (Some(matched), true) => {
            let raw = matched.raw(options.input).to_string();
            state
                .failures
                .push(Failure::expected(options.from, Expectation::Mismatch(raw)));
            Ok(None)
        }
        (None, false) => {
            state.failures.extend(attempt_failures);
            Ok(None)
        }
    }
}
