//! The parser node set and its matching protocol.
//!
//! A grammar is a tree of `Parser` nodes, built with the constructors below
//! or assembled variant by variant. Matching is a single depth-first
//! recursion: `exec` dispatches on the variant, starts at the options
//! cursor, and either returns a match or records what it expected in the
//! scratchpad. Ordered choice backtracks by construction: alternatives all
//! start from the same cursor, and a failed attempt leaves nothing behind
//! but failures.
//!
//! Nodes hold their children behind `Arc`, so a user may share subtrees
//! (turning the tree into a DAG) and move grammars across threads. Named
//! recursion goes through `Grammar`/`Reference`: a reference holds only a
//! label and resolves it through the innermost enclosing grammar at match
//! time, so the data structure itself stays acyclic.
//!
//! Matching recursion is capped by `max_depth` (default 1024 frames); a
//! grammar that recurses without consuming input is reported as a
//! `GrammarError` instead of overflowing the stack.

mod combinators;
mod delegates;
mod terminals;

pub use terminals::RegexMatcher;

use std::sync::{Arc, OnceLock};

use crate::action::{ActionContext, ActionError, ActionFn};
use crate::errors::GrammarError;
use crate::failure::merge_failures;
use crate::options::{Internals, ParseOptions, ParseSettings};
use crate::outcome::{Match, ParseReport};
use crate::trace::TraceEvent;
use crate::value::Value;

/// A named grammar rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub parser: Arc<Parser>,
}

/// Option overrides applied to a subtree by `Parser::WithOptions`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub skip: Option<bool>,
    pub ignore_case: Option<bool>,
    pub skipper: Option<Arc<Parser>>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skipping(mut self, skip: bool) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn case_insensitive(mut self, ignore_case: bool) -> Self {
        self.ignore_case = Some(ignore_case);
        self
    }

    pub fn skipper(mut self, skipper: Parser) -> Self {
        self.skipper = Some(Arc::new(skipper));
        self
    }
}

/// A parsing expression.
///
/// The set of variants is closed; every matching behavior in the engine is
/// one of these, dispatched by [`Parser::exec`].
#[derive(Debug, Clone)]
pub enum Parser {
    /// Exact string. Emits its text as the value when `emit` is set.
    Literal { literal: String, emit: bool },
    /// Anchored regex. Emits the whole match; named groups become captures.
    Regex(RegexMatcher),
    /// Matches only at position zero. Never skips.
    StartEdge,
    /// Matches only at the end of the input, after skipping.
    EndEdge,
    /// All children in order, threading the cursor.
    Sequence { children: Vec<Arc<Parser>> },
    /// Ordered choice: the first matching child wins.
    Choice { children: Vec<Arc<Parser>> },
    /// Greedy bounded repetition; `max: None` means unbounded.
    Repetition {
        child: Arc<Parser>,
        min: usize,
        max: Option<usize>,
    },
    /// Atomic unit: skipping is off inside, and the body's failures show
    /// up outside as one labeled expectation.
    Token {
        child: Arc<Parser>,
        alias: Option<String>,
    },
    /// Binds the child's value under `name` in the captures.
    Capture { child: Arc<Parser>, name: String },
    /// Rewrites the child's value through a user callback.
    Action { child: Arc<Parser>, action: ActionFn },
    /// Overrides parse options for the subtree.
    WithOptions {
        child: Arc<Parser>,
        overrides: Overrides,
    },
    /// Named rule table; matches as its first rule.
    Grammar { rules: Vec<Rule> },
    /// Call of a named rule, resolved through the innermost grammar.
    Reference { label: String },
    /// Lookahead: consumes nothing; `negated` inverts the child's outcome.
    Predicate { child: Arc<Parser>, negated: bool },
}

impl Parser {
    pub fn literal(literal: impl Into<String>) -> Self {
        Parser::Literal {
            literal: literal.into(),
            emit: false,
        }
    }

    /// Like [`Parser::literal`], but the matched text becomes the value.
    pub fn literal_emit(literal: impl Into<String>) -> Self {
        Parser::Literal {
            literal: literal.into(),
            emit: true,
        }
    }

    /// Compiles `pattern` into a terminal anchored at the cursor.
    pub fn regex(pattern: &str) -> Result<Self, GrammarError> {
        Ok(Parser::Regex(RegexMatcher::compile(pattern)?))
    }

    pub fn sequence(children: impl IntoIterator<Item = Parser>) -> Self {
        Parser::Sequence {
            children: children.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn choice(children: impl IntoIterator<Item = Parser>) -> Self {
        Parser::Choice {
            children: children.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn repeat(child: Parser, min: usize, max: Option<usize>) -> Self {
        Parser::Repetition {
            child: Arc::new(child),
            min,
            max,
        }
    }

    pub fn optional(child: Parser) -> Self {
        Self::repeat(child, 0, Some(1))
    }

    pub fn zero_or_more(child: Parser) -> Self {
        Self::repeat(child, 0, None)
    }

    pub fn one_or_more(child: Parser) -> Self {
        Self::repeat(child, 1, None)
    }

    pub fn token(child: Parser, alias: Option<&str>) -> Self {
        Parser::Token {
            child: Arc::new(child),
            alias: alias.map(str::to_string),
        }
    }

    pub fn capture(child: Parser, name: impl Into<String>) -> Self {
        Parser::Capture {
            child: Arc::new(child),
            name: name.into(),
        }
    }

    pub fn action(
        child: Parser,
        action: impl Fn(&mut ActionContext<'_>) -> Result<Option<Value>, ActionError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Parser::Action {
            child: Arc::new(child),
            action: ActionFn::new(action),
        }
    }

    /// Builds a rule table. Rejects an empty table and duplicate names.
    pub fn grammar<S: Into<String>>(
        rules: impl IntoIterator<Item = (S, Parser)>,
    ) -> Result<Self, GrammarError> {
        let rules: Vec<Rule> = rules
            .into_iter()
            .map(|(name, parser)| Rule {
                name: name.into(),
                parser: Arc::new(parser),
            })
            .collect();
        if rules.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }
        for (index, rule) in rules.iter().enumerate() {
            if rules[..index].iter().any(|other| other.name == rule.name) {
                return Err(GrammarError::DuplicateRule {
                    name: rule.name.clone(),
                });
            }
        }
        Ok(Parser::Grammar { rules })
    }

    pub fn reference(label: impl Into<String>) -> Self {
        Parser::Reference {
            label: label.into(),
        }
    }

    pub fn with_options(child: Parser, overrides: Overrides) -> Self {
        Parser::WithOptions {
            child: Arc::new(child),
            overrides,
        }
    }

    /// `&child`: succeeds without consuming iff the child matches.
    pub fn and_predicate(child: Parser) -> Self {
        Parser::Predicate {
            child: Arc::new(child),
            negated: false,
        }
    }

    /// `!child`: succeeds without consuming iff the child fails.
    pub fn not_predicate(child: Parser) -> Self {
        Parser::Predicate {
            child: Arc::new(child),
            negated: true,
        }
    }

    pub fn start_edge() -> Self {
        Parser::StartEdge
    }

    pub fn end_edge() -> Self {
        Parser::EndEdge
    }

    /// `self` followed by `other`.
    pub fn then(self, other: Parser) -> Self {
        Parser::sequence([self, other])
    }

    /// `self`, or `other` from the same cursor if `self` fails.
    pub fn or(self, other: Parser) -> Self {
        Parser::choice([self, other])
    }

    /// Label used for tracing: the rule label, the token alias, or a type
    /// tag.
    pub fn label(&self) -> &str {
        match self {
            Parser::Reference { label } => label,
            Parser::Token {
                alias: Some(alias), ..
            } => alias,
            Parser::Token { .. } => "token",
            Parser::Literal { .. } => "literal",
            Parser::Regex(_) => "pattern",
            Parser::StartEdge => "start-edge",
            Parser::EndEdge => "end-edge",
            Parser::Sequence { .. } => "sequence",
            Parser::Choice { .. } => "choice",
            Parser::Repetition { .. } => "repetition",
            Parser::Capture { .. } => "capture",
            Parser::Action { .. } => "action",
            Parser::WithOptions { .. } => "options",
            Parser::Grammar { .. } => "grammar",
            Parser::Predicate { negated: false, .. } => "lookahead",
            Parser::Predicate { .. } => "negative-lookahead",
        }
    }

    /// Attempts a match starting at `options.from`.
    ///
    /// `Ok(Some(_))` is a match; `Ok(None)` a recoverable failure with its
    /// expectations recorded in `state`; `Err(_)` a bug in the grammar.
    pub fn exec<'s>(
        &'s self,
        options: ParseOptions<'s>,
        state: &mut Internals<'_>,
    ) -> Result<Option<Match>, GrammarError> {
        state.depth += 1;
        if state.depth > state.max_depth {
            return Err(GrammarError::RecursionLimit {
                limit: state.max_depth,
            });
        }
        if let Some(tracer) = state.tracer.as_deref_mut() {
            tracer.trace(TraceEvent::Enter {
                label: self.label(),
                at: options.from,
            });
        }
        let result = self.dispatch(options, state)?;
        if let Some(tracer) = state.tracer.as_deref_mut() {
            match &result {
                Some(matched) => tracer.trace(TraceEvent::Matched {
                    label: self.label(),
                    span: matched.span,
                }),
                None => tracer.trace(TraceEvent::Failed {
                    label: self.label(),
                    at: options.from,
                }),
            }
        }
        state.depth -= 1;
        Ok(result)
    }

    fn dispatch<'s>(
        &'s self,
        options: ParseOptions<'s>,
        state: &mut Internals<'_>,
    ) -> Result<Option<Match>, GrammarError> {
        match self {
            Parser::Literal { literal, emit } => {
                terminals::exec_literal(literal, *emit, options, state)
            }
            Parser::Regex(matcher) => terminals::exec_regex(matcher, options, state),
            Parser::StartEdge => terminals::exec_start_edge(options, state),
            Parser::EndEdge => terminals::exec_end_edge(options, state),
            Parser::Sequence { children } => combinators::exec_sequence(children, options, state),
            Parser::Choice { children } => combinators::exec_choice(children, options, state),
            Parser::Repetition { child, min, max } => {
                combinators::exec_repetition(child, *min, *max, options, state)
            }
            Parser::Token { child, alias } => {
                delegates::exec_token(child, alias.as_deref(), options, state)
            }
            Parser::Capture { child, name } => delegates::exec_capture(child, name, options, state),
            Parser::Action { child, action } => {
                delegates::exec_action(child, action, options, state)
            }
            Parser::WithOptions { child, overrides } => {
                delegates::exec_with_options(child, overrides, options, state)
            }
            Parser::Grammar { rules } => delegates::exec_grammar(rules, options, state),
            Parser::Reference { label } => delegates::exec_reference(label, options, state),
            Parser::Predicate { child, negated } => {
                delegates::exec_predicate(child, *negated, options, state)
            }
        }
    }

    /// Runs the parser against `input` with default settings: cursor zero,
    /// whitespace skipper, skipping on, case-sensitive.
    pub fn parse<'s>(&self, input: &'s str) -> Result<ParseReport<'s>, GrammarError> {
        self.parse_with(input, ParseSettings::default())
    }

    /// Runs the parser against `input` with the given overrides.
    pub fn parse_with<'s>(
        &self,
        input: &'s str,
        settings: ParseSettings<'_>,
    ) -> Result<ParseReport<'s>, GrammarError> {
        let ParseSettings {
            from,
            skipper,
            skip,
            ignore_case,
            context,
            tracer,
            max_depth,
        } = settings;
        let skipper = skipper.unwrap_or_else(default_skipper);
        let mut state = Internals::new(tracer, max_depth);
        let options = ParseOptions {
            input,
            from,
            grammar: None,
            skipper: &skipper,
            skip,
            ignore_case,
            context: context.as_ref(),
        };
        let matched = self.exec(options, &mut state)?;
        let Internals {
            warnings,
            failures,
            committed,
            ..
        } = state;
        let mut reported = committed;
        reported.extend(merge_failures(&failures));
        Ok(ParseReport {
            input,
            matched,
            warnings,
            failures: reported,
        })
    }
}

/// Skipper used when none is configured: any run of whitespace.
pub fn default_skipper() -> Arc<Parser> {
    static SKIPPER: OnceLock<Arc<Parser>> = OnceLock::new();
    SKIPPER
        .get_or_init(|| {
            let skipper = Parser::regex(r"\s*").expect("whitespace skipper pattern is valid");
            Arc::new(skipper)
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_construction_rejects_empty_and_duplicate_rules() {
        let empty: Vec<(&str, Parser)> = Vec::new();
        assert!(matches!(
            Parser::grammar(empty),
            Err(GrammarError::EmptyGrammar)
        ));

        let duplicated = Parser::grammar([
            ("x", Parser::literal("a")),
            ("x", Parser::literal("b")),
        ]);
        assert!(matches!(
            duplicated,
            Err(GrammarError::DuplicateRule { name }) if name == "x"
        ));
    }

    #[test]
    fn labels_prefer_rule_names_and_aliases() {
        assert_eq!(Parser::reference("expr").label(), "expr");
        assert_eq!(
            Parser::token(Parser::literal("a"), Some("identifier")).label(),
            "identifier"
        );
        assert_eq!(Parser::literal("a").label(), "literal");
    }

    #[test]
    fn runaway_recursion_is_reported_not_overflowed() {
        let grammar = Parser::grammar([("x", Parser::reference("x"))]).unwrap();
        let result = grammar.parse("anything");
        assert!(matches!(
            result,
            Err(GrammarError::RecursionLimit { .. })
        ));
    }

    #[test]
    fn reference_outside_a_grammar_is_a_configuration_error() {
        let result = Parser::reference("ghost").parse("a");
        assert!(matches!(
            result,
            Err(GrammarError::NoGrammar { label }) if label == "ghost"
        ));
    }
}
