//! Source spans for matches, failures, and warnings.
//!
//! A `Span` is a half-open byte range `[from, to)` into the input string.
//! All positions produced by the engine sit on character boundaries.

use serde::{Deserialize, Serialize};

/// Half-open byte range into the input.
///
/// # Examples
///
/// ```rust
/// use pegma::span::Span;
/// let span = Span::new(2, 7);
/// assert_eq!(span.len(), 5);
/// assert_eq!(span.slice("  hello world"), "hello");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

impl Span {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// An empty span anchored at a single position.
    pub fn at(position: usize) -> Self {
        Self {
            from: position,
            to: position,
        }
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// The input text the span covers.
    pub fn slice<'s>(&self, input: &'s str) -> &'s str {
        &input[self.from..self.to]
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.from..span.to).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_span_at_position() {
        let span = Span::at(3);
        assert_eq!(span.from, 3);
        assert_eq!(span.to, 3);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn slice_covers_the_range() {
        let span = Span::new(1, 3);
        assert_eq!(span.slice("abcd"), "bc");
    }
}
