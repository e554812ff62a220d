//! Per-call configuration and the mutable scratchpad.
//!
//! A `parse` call builds one `ParseOptions` record and one `Internals`
//! scratchpad. Options are immutable: every scoped change (a moved cursor,
//! a disabled skipper, an installed rule table) is a functional-update copy
//! handed to the child invocation. The scratchpad is append-only except for
//! the commit operation and never outlives the call.

use std::sync::Arc;

use crate::errors::GrammarError;
use crate::failure::{commit_failures, Failure};
use crate::outcome::Warning;
use crate::parsers::{Parser, Rule};
use crate::trace::Tracer;
use crate::value::Value;

/// Ceiling on `exec` re-entry unless overridden per call.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Immutable per-invocation options. Cheap to copy; scoped overrides are
/// functional updates (`ParseOptions { from: cursor, ..options }`).
#[derive(Clone, Copy)]
pub struct ParseOptions<'s> {
    pub input: &'s str,
    /// Cursor the next attempt starts at.
    pub from: usize,
    /// Rule table installed by the innermost enclosing grammar node.
    pub grammar: Option<&'s [Rule]>,
    /// Consulted before terminals when `skip` is set.
    pub skipper: &'s Parser,
    pub skip: bool,
    pub ignore_case: bool,
    /// User payload, visible to semantic actions.
    pub context: Option<&'s Value>,
}

/// Overrides accepted by the entry points.
pub struct ParseSettings<'t> {
    pub from: usize,
    /// Replaces the whitespace skipper when set.
    pub skipper: Option<Arc<Parser>>,
    pub skip: bool,
    pub ignore_case: bool,
    pub context: Option<Value>,
    pub tracer: Option<&'t mut dyn Tracer>,
    pub max_depth: usize,
}

impl Default for ParseSettings<'_> {
    fn default() -> Self {
        Self {
            from: 0,
            skipper: None,
            skip: true,
            ignore_case: false,
            context: None,
            tracer: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Mutable per-invocation scratchpad. Never shared across calls.
pub struct Internals<'t> {
    pub warnings: Vec<Warning>,
    /// Tentative failures; cleared by `commit`.
    pub failures: Vec<Failure>,
    /// Failures promoted by `commit`; always part of the final report.
    pub committed: Vec<Failure>,
    pub tracer: Option<&'t mut dyn Tracer>,
    pub depth: usize,
    pub max_depth: usize,
}

impl<'t> Internals<'t> {
    pub fn new(tracer: Option<&'t mut dyn Tracer>, max_depth: usize) -> Self {
        Self {
            warnings: Vec::new(),
            failures: Vec::new(),
            committed: Vec::new(),
            tracer,
            depth: 0,
            max_depth,
        }
    }

    /// Promotes the tentative failures: merges them, appends the result to
    /// the committed list, and clears the tentative buffer.
    pub fn commit(&mut self) {
        commit_failures(&mut self.failures, &mut self.committed);
    }
}

/// Advances the cursor past skipper-matched input when skipping is on.
/// Returns the cursor the real attempt starts at, or nothing when the
/// skipper itself failed.
pub(crate) fn preskip(
    options: ParseOptions<'_>,
    state: &mut Internals<'_>,
) -> Result<Option<usize>, GrammarError> {
    if !options.skip {
        return Ok(Some(options.from));
    }
    // The skipper runs with skipping off so it cannot recurse into itself.
    let attempt = ParseOptions {
        skip: false,
        ..options
    };
    Ok(options
        .skipper
        .exec(attempt, state)?
        .map(|skipped| skipped.span.to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Expectation;

    #[test]
    fn commit_promotes_merged_failures_and_clears_the_buffer() {
        let mut state = Internals::new(None, DEFAULT_MAX_DEPTH);
        state
            .failures
            .push(Failure::expected(0, Expectation::Literal("a".to_string())));
        state
            .failures
            .push(Failure::expected(2, Expectation::Literal("b".to_string())));

        state.commit();
        assert!(state.failures.is_empty());
        assert_eq!(
            state.committed,
            vec![Failure::expected(2, Expectation::Literal("b".to_string()))]
        );

        // Committed failures only ever grow.
        state
            .failures
            .push(Failure::expected(5, Expectation::Literal("c".to_string())));
        state.commit();
        assert_eq!(state.committed.len(), 2);
    }
}
