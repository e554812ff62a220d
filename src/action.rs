//! Semantic actions.
//!
//! An action wraps a parser and rewrites its value once it matches. The
//! callback receives an `ActionContext` exposing the match, its captures,
//! and the commit and warn hooks. Returning `Err` converts the match into
//! a semantic failure spanning the child's range. Panics are programmer
//! errors and propagate unchanged.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::failure::{commit_failures, Failure};
use crate::options::ParseOptions;
use crate::outcome::Warning;
use crate::span::Span;
use crate::value::{Captures, Value};

/// A rejected match, with the message reported to the user.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// What a semantic action sees: the match so far, plus the mutable hooks
/// into the per-call scratchpad.
pub struct ActionContext<'cx> {
    pub(crate) span: Span,
    pub(crate) options: ParseOptions<'cx>,
    pub(crate) captures: &'cx Captures,
    pub(crate) children: &'cx [Value],
    pub(crate) warnings: &'cx mut Vec<Warning>,
    pub(crate) failures: &'cx mut Vec<Failure>,
    pub(crate) committed: &'cx mut Vec<Failure>,
}

impl<'cx> ActionContext<'cx> {
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn start(&self) -> usize {
        self.span.from
    }

    pub fn end(&self) -> usize {
        self.span.to
    }

    /// The raw input the match consumed.
    pub fn raw(&self) -> &'cx str {
        self.span.slice(self.options.input)
    }

    /// The computed value of the match: its sole emitted child.
    pub fn value(&self) -> Option<&'cx Value> {
        match self.children {
            [value] => Some(value),
            _ => None,
        }
    }

    /// All values the match emitted, in input order.
    pub fn children(&self) -> &'cx [Value] {
        self.children
    }

    pub fn captures(&self) -> &'cx Captures {
        self.captures
    }

    pub fn capture(&self, name: &str) -> Option<&'cx Value> {
        self.captures.get(name)
    }

    pub fn options(&self) -> &ParseOptions<'cx> {
        &self.options
    }

    /// User payload handed to the entry point, if any.
    pub fn context(&self) -> Option<&'cx Value> {
        self.options.context
    }

    /// Cut: promotes the tentative failures so earlier expectations can no
    /// longer become the final diagnostic.
    pub fn commit(&mut self) {
        commit_failures(self.failures, self.committed);
    }

    /// Attaches an advisory warning spanning the current match.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(Warning {
            span: self.span,
            message: message.into(),
        });
    }

    /// Builds the error that rejects this match.
    pub fn error(&self, message: impl Into<String>) -> ActionError {
        ActionError::new(message)
    }
}

/// Shared action callback. Returning `Ok(None)` makes the match emit
/// nothing; `Ok(Some(value))` replaces the match value.
#[derive(Clone)]
pub struct ActionFn(
    Arc<dyn Fn(&mut ActionContext<'_>) -> Result<Option<Value>, ActionError> + Send + Sync>,
);

impl ActionFn {
    pub fn new(
        action: impl Fn(&mut ActionContext<'_>) -> Result<Option<Value>, ActionError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self(Arc::new(action))
    }

    pub(crate) fn call(
        &self,
        context: &mut ActionContext<'_>,
    ) -> Result<Option<Value>, ActionError> {
        (self.0)(context)
    }
}

impl fmt::Debug for ActionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionFn")
    }
}
