//! Match results and the per-call report.

use serde::{Deserialize, Serialize};

use crate::errors::ParseDiagnostic;
use crate::failure::Failure;
use crate::span::Span;
use crate::value::{Captures, Value};

/// A successful match: the consumed range, the values emitted for the
/// parent, and the captures collected so far.
///
/// The *computed value* of a match is derived rather than stored: it is the
/// sole emitted child when there is exactly one, and nothing otherwise.
/// Matches are immutable once returned; parents build new ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub span: Span,
    /// Values emitted for the enclosing parser, in input order.
    pub children: Vec<Value>,
    pub captures: Captures,
}

impl Match {
    /// An empty match anchored at `position`, emitting nothing.
    pub fn empty_at(position: usize) -> Self {
        Self {
            span: Span::at(position),
            children: Vec::new(),
            captures: Captures::new(),
        }
    }

    /// The computed value: the sole emitted child, if there is exactly one.
    pub fn value(&self) -> Option<&Value> {
        match self.children.as_slice() {
            [value] => Some(value),
            _ => None,
        }
    }

    /// Consumes the match, returning its computed value.
    pub fn into_value(self) -> Option<Value> {
        let mut children = self.children.into_iter();
        match (children.next(), children.next()) {
            (Some(value), None) => Some(value),
            _ => None,
        }
    }

    /// The input text the match consumed.
    pub fn raw<'s>(&self, input: &'s str) -> &'s str {
        self.span.slice(input)
    }
}

/// Advisory note attached to a range. Warnings never cause failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub span: Span,
    pub message: String,
}

/// Everything a `parse` call produced.
///
/// A successful report can still carry failures: they are the deepest dead
/// ends met while finding the match, useful when a caller wants to explain
/// why the match stopped where it did.
#[derive(Debug, Clone)]
pub struct ParseReport<'s> {
    pub input: &'s str,
    pub matched: Option<Match>,
    pub warnings: Vec<Warning>,
    /// Committed failures first, then the merged tentative ones.
    pub failures: Vec<Failure>,
}

impl<'s> ParseReport<'s> {
    pub fn is_success(&self) -> bool {
        self.matched.is_some()
    }

    pub fn span(&self) -> Option<Span> {
        self.matched.as_ref().map(|m| m.span)
    }

    /// The input slice the match consumed, with its original casing.
    pub fn raw(&self) -> Option<&'s str> {
        self.matched.as_ref().map(|m| m.raw(self.input))
    }

    pub fn value(&self) -> Option<&Value> {
        self.matched.as_ref().and_then(Match::value)
    }

    pub fn capture(&self, name: &str) -> Option<&Value> {
        self.matched.as_ref().and_then(|m| m.captures.get(name))
    }

    /// Renders the failure set as a miette diagnostic over the input.
    /// Returns nothing when there are no failures to show.
    pub fn to_diagnostic(&self, source_name: &str) -> Option<ParseDiagnostic> {
        if self.failures.is_empty() {
            return None;
        }
        Some(ParseDiagnostic::new(
            source_name,
            self.input,
            self.failures.clone(),
        ))
    }
}
