//! Fatal errors and diagnostic rendering.
//!
//! Match failures travel through the per-call scratchpad as data. This
//! module holds the other lane: `GrammarError` for bugs in the grammar
//! itself, which abort the call immediately, and `ParseDiagnostic`, the
//! miette rendering of a report's failure set over the input.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource};
use thiserror::Error;

use crate::failure::Failure;
use crate::span::Span;

/// A bug in the grammar, not in the input.
#[derive(Debug, Error, Diagnostic)]
pub enum GrammarError {
    #[error("reference to undefined rule '{label}'")]
    #[diagnostic(code(pegma::grammar::undefined_rule))]
    UndefinedRule { label: String },

    #[error("reference '{label}' used outside of any grammar")]
    #[diagnostic(code(pegma::grammar::no_grammar))]
    NoGrammar { label: String },

    #[error("grammar has no rules")]
    #[diagnostic(code(pegma::grammar::empty))]
    EmptyGrammar,

    #[error("duplicate rule '{name}'")]
    #[diagnostic(code(pegma::grammar::duplicate_rule))]
    DuplicateRule { name: String },

    #[error("invalid pattern /{pattern}/")]
    #[diagnostic(code(pegma::grammar::pattern))]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("recursion limit of {limit} exceeded")]
    #[diagnostic(
        code(pegma::grammar::recursion_limit),
        help("a rule that recurses without consuming input, typically left recursion, cannot make progress")
    )]
    RecursionLimit { limit: usize },
}

/// Renders a failure set as a miette diagnostic over the original input.
#[derive(Debug)]
pub struct ParseDiagnostic {
    source: Arc<NamedSource<String>>,
    failures: Vec<Failure>,
}

impl ParseDiagnostic {
    pub fn new(source_name: &str, input: &str, failures: Vec<Failure>) -> Self {
        Self {
            source: Arc::new(NamedSource::new(source_name, input.to_string())),
            failures,
        }
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }
}

impl fmt::Display for ParseDiagnostic {
    // The first failure is the committed or deepest one.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.first() {
            Some(failure) => write!(f, "{}", failure),
            None => write!(f, "parse failed"),
        }
    }
}

impl std::error::Error for ParseDiagnostic {}

impl Diagnostic for ParseDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("pegma::parse"))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.failures.iter().map(|failure| {
            let span = match failure {
                Failure::Expected { at, .. } => Span::at(*at),
                Failure::Semantic { span, .. } => *span,
            };
            LabeledSpan::new_with_span(Some(failure.to_string()), miette::SourceSpan::from(span))
        });
        Some(Box::new(labels))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source)
    }
}
