//! Parser infrastructure types
//!
//! This module contains metadata types used by the parser:
//! - `Span` for tracking source code locations
//! - `DepthTracker` for bounding expression nesting while building the tree

use serde::Serialize;

/// Span representing a location in source code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn from_pest_span(span: pest::Span) -> Self {
        let (line, col) = span.start_pos().line_col();
        Self {
            start: span.start(),
            end: span.end(),
            line,
            col,
        }
    }

    /// A span covering the whole of `source`
    pub fn covering(source: &str) -> Self {
        Self {
            start: 0,
            end: source.len(),
            line: 1,
            col: 1,
        }
    }
}

/// Tracks nesting depth while converting parse trees into expressions
#[derive(Debug, Default)]
pub struct DepthTracker {
    depth: usize,
    max_depth: usize,
}

impl DepthTracker {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Enter one nesting level, failing once the configured maximum is passed
    pub fn push_depth(&mut self) -> Result<(), usize> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(self.depth + 1);
        }
        Ok(())
    }

    pub fn pop_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
