//! Tracing hooks for observing a parse.
//!
//! A tracer is an optional sink receiving one enter event and one outcome
//! event per parser invocation. Labels come from the rule label of a
//! reference, the alias of a token, or a static type tag.

use crate::span::Span;

/// One event in the depth-first traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent<'a> {
    Enter { label: &'a str, at: usize },
    Matched { label: &'a str, span: Span },
    Failed { label: &'a str, at: usize },
}

/// Sink for trace events.
pub trait Tracer {
    fn trace(&mut self, event: TraceEvent<'_>);
}

/// Collects formatted trace lines. Handy in tests and debugging sessions.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    pub lines: Vec<String>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tracer for RecordingTracer {
    fn trace(&mut self, event: TraceEvent<'_>) {
        let line = match event {
            TraceEvent::Enter { label, at } => format!("enter {label} at {at}"),
            TraceEvent::Matched { label, span } => {
                format!("match {label} at {}..{}", span.from, span.to)
            }
            TraceEvent::Failed { label, at } => format!("fail {label} at {at}"),
        };
        self.lines.push(line);
    }
}
