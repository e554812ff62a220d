//! Match failures and their reduction to a single diagnostic.
//!
//! Dead ends are data, not errors: every failed attempt pushes a `Failure`
//! onto the per-call scratchpad and matching continues through the next
//! alternative. `merge_failures` reduces the accumulated pile to the
//! failures at the deepest input position reached, which is the diagnostic
//! a grammar user actually wants: how far the parse got, and the union of
//! everything that could have followed there.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::span::Span;

/// Which end of the input an edge assertion wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    Start,
    End,
}

/// What a parser wanted to see at a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expectation {
    /// An exact string.
    Literal(String),
    /// A regex, identified by its source pattern.
    Pattern(String),
    /// A named token; carries the failures met while trying its body.
    Token {
        alias: Option<String>,
        failures: Vec<Failure>,
    },
    /// Start or end of input.
    Edge(EdgeKind),
    /// Input a negative lookahead should not have matched.
    Mismatch(String),
}

/// A recorded dead end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Failure {
    /// Nothing at `at` satisfied any of `expected`.
    Expected {
        at: usize,
        expected: Vec<Expectation>,
    },
    /// A semantic action rejected an otherwise valid match.
    Semantic { span: Span, message: String },
}

impl Failure {
    pub fn expected(at: usize, expectation: Expectation) -> Self {
        Failure::Expected {
            at,
            expected: vec![expectation],
        }
    }

    /// The input position the failure is anchored at.
    pub fn position(&self) -> usize {
        match self {
            Failure::Expected { at, .. } => *at,
            Failure::Semantic { span, .. } => span.from,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Literal(text) => write!(f, "'{}'", text),
            Expectation::Pattern(pattern) => write!(f, "/{}/", pattern),
            Expectation::Token {
                alias: Some(alias), ..
            } => write!(f, "{}", alias),
            Expectation::Token { alias: None, .. } => write!(f, "token"),
            Expectation::Edge(EdgeKind::Start) => write!(f, "start of input"),
            Expectation::Edge(EdgeKind::End) => write!(f, "end of input"),
            Expectation::Mismatch(text) => write!(f, "anything but '{}'", text),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Expected { expected, .. } => match expected.as_slice() {
                [] => write!(f, "expected nothing"),
                [sole] => write!(f, "expected {}", sole),
                many => {
                    write!(f, "expected one of ")?;
                    for (i, expectation) in many.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", expectation)?;
                    }
                    Ok(())
                }
            },
            Failure::Semantic { message, .. } => write!(f, "{}", message),
        }
    }
}

/// Reduces a failure list to the failures at the deepest position reached.
///
/// Semantic failures at that position pass through individually; all
/// expectation failures there collapse into a single entry whose expected
/// list is deduplicated, preserving first occurrence. The reduction is
/// idempotent.
pub fn merge_failures(failures: &[Failure]) -> Vec<Failure> {
    let Some(deepest) = failures.iter().map(Failure::position).max() else {
        return Vec::new();
    };

    let mut merged: Vec<Failure> = Vec::new();
    let mut combined: Option<usize> = None;
    for failure in failures.iter().filter(|f| f.position() == deepest) {
        let Failure::Expected { at, expected } = failure else {
            merged.push(failure.clone());
            continue;
        };
        match combined {
            Some(slot) => {
                let Failure::Expected { expected: all, .. } = &mut merged[slot] else {
                    unreachable!("slot always holds an expectation failure");
                };
                for expectation in expected {
                    if !all.contains(expectation) {
                        all.push(expectation.clone());
                    }
                }
            }
            None => {
                let mut all: Vec<Expectation> = Vec::new();
                for expectation in expected {
                    if !all.contains(expectation) {
                        all.push(expectation.clone());
                    }
                }
                merged.push(Failure::Expected {
                    at: *at,
                    expected: all,
                });
                combined = Some(merged.len() - 1);
            }
        }
    }
    merged
}

/// Moves the merged tentative failures into the committed list and clears
/// the tentative buffer. This is the cut operation: once promoted, earlier
/// expectations can no longer be displaced by deeper ones.
pub fn commit_failures(failures: &mut Vec<Failure>, committed: &mut Vec<Failure>) {
    let merged = merge_failures(failures);
    committed.extend(merged);
    failures.clear();
}
