//! Source regions for diagnostics
//!
//! A [`RegionInfo`] tree mirrors the shape of the AST it was parsed into: the region of a
//! read command has one child per matcher, the region of a stream has one child per
//! streamable, and so on. Regions are never stored inside AST nodes, so structural
//! equality cannot observe them; a parse hands them back next to the node (see
//! [`Parsed`](crate::script::parsing::Parsed)).
//!
//! Byte offsets are converted to line:column positions on demand with [`SourceLocation`].

use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// A line:column position in source text (both 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte span of a node plus the spans of its children, in AST order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RegionInfo {
    pub span: ByteRange<usize>,
    pub children: Vec<RegionInfo>,
}

impl RegionInfo {
    /// A region without children
    pub fn leaf(span: ByteRange<usize>) -> Self {
        Self {
            span,
            children: Vec::new(),
        }
    }

    /// A region whose children were encountered in order
    pub fn sequential(span: ByteRange<usize>, children: Vec<RegionInfo>) -> Self {
        Self { span, children }
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn child(&self, index: usize) -> Option<&RegionInfo> {
        self.children.get(index)
    }

    /// Follow a path of child indexes from this region
    pub fn descendant(&self, path: &[usize]) -> Option<&RegionInfo> {
        path.iter()
            .try_fold(self, |region, &index| region.children.get(index))
    }

    /// Smallest region covering all the given regions, with those regions as children
    pub fn enclosing(children: Vec<RegionInfo>) -> Self {
        let start = children.iter().map(|c| c.span.start).min().unwrap_or(0);
        let end = children.iter().map(|c| c.span.end).max().unwrap_or(start);
        Self::sequential(start..end, children)
    }

    /// Source text covered by this region
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.span.clone())
    }
}

impl fmt::Display for RegionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.span.start, self.span.end)
    }
}

/// Provides fast conversion from byte offsets to line/column positions
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);

        let column = byte_offset - self.line_starts[line];

        Position::new(line, column)
    }

    /// Start and end positions of a region
    pub fn region_positions(&self, region: &RegionInfo) -> (Position, Position) {
        (
            self.byte_to_position(region.span.start),
            self.byte_to_position(region.span.end),
        )
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
