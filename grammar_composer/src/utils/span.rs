//! Source locations for symbols, references and findings.
//!
//! Scanners walk byte offsets. A [`SourceMap`] built once per document turns
//! those offsets into line/column [`Position`]s when something is recorded.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Line, column and byte offset of a point in a document.
///
/// Lines and columns count from 1; columns count characters, not bytes.
/// Findings with no location use [`Position::zero`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// First character of a document
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    pub fn is_zero(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open region `[start, end)` of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset, "span ends before it starts");
        Self { start, end }
    }

    pub fn byte_len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start.offset..self.end.offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start.line == self.end.line {
            true => write!(f, "{}-{}", self.start, self.end.column),
            false => write!(f, "{}-{}", self.start, self.end),
        }
    }
}

/// Attribute names and values keep the region they were read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned::new(f(self.value), self.span)
    }
}

/// Offsets of every line start in a borrowed document, plus where its
/// multi-byte characters sit so columns never rescan a line
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
    /// Byte offsets of non-ASCII characters
    wide_chars: Vec<usize>,
    /// `extra_bytes[i]` is the continuation byte count of `wide_chars[..i]`
    extra_bytes: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(at, _)| at + 1))
            .collect();

        let mut wide_chars = Vec::new();
        let mut extra_bytes = vec![0];
        let mut extra = 0;
        if !source.is_ascii() {
            for (at, c) in source.char_indices().filter(|(_, c)| !c.is_ascii()) {
                wide_chars.push(at);
                extra += c.len_utf8() - 1;
                extra_bytes.push(extra);
            }
        }

        Self {
            source,
            line_starts,
            wide_chars,
            extra_bytes,
        }
    }

    /// Continuation bytes before `offset`
    fn extra_bytes_before(&self, offset: usize) -> usize {
        if self.wide_chars.is_empty() {
            return 0;
        }
        let wide = self.wide_chars.partition_point(|&at| at < offset);
        self.extra_bytes[wide]
    }

    /// Offsets past the end clamp to it; offsets inside a multi-byte
    /// character snap back to that character.
    pub fn position_at(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }

        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let column =
            (offset - line_start) - (self.extra_bytes_before(offset) - self.extra_bytes_before(line_start));

        Position::new(offset, line as u32 + 1, column as u32 + 1)
    }

    pub fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.position_at(start), self.position_at(end.max(start)))
    }

    pub fn lines(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_map_to_lines_and_columns() {
        let map = SourceMap::new("ab\ncd\n\nxyz");

        assert_eq!(map.position_at(0), Position::new(0, 1, 1));
        assert_eq!(map.position_at(2), Position::new(2, 1, 3));
        assert_eq!(map.position_at(3), Position::new(3, 2, 1));
        assert_eq!(map.position_at(6), Position::new(6, 3, 1));
        assert_eq!(map.position_at(7), Position::new(7, 4, 1));
        assert_eq!(map.lines(), 4);
    }

    #[test]
    fn test_columns_count_characters() {
        let map = SourceMap::new("é=1");
        assert_eq!(map.position_at(2).column, 2);
        assert_eq!(map.position_at(99).offset, 4);
        assert_eq!(map.position_at(1).offset, 0);
    }

    #[test]
    fn test_long_line_columns_match_char_count() {
        let mut source = "<p>".repeat(2000);
        source.push_str("ü€𝄞");
        source.push_str(&"x".repeat(500));
        source.push_str("\nñ\n");
        let map = SourceMap::new(&source);

        for offset in (0..source.len()).filter(|at| source.is_char_boundary(*at)) {
            let line_start = source[..offset].rfind('\n').map(|at| at + 1).unwrap_or(0);
            let expected = source[line_start..offset].chars().count() as u32 + 1;
            assert_eq!(map.position_at(offset).column, expected, "offset {}", offset);
        }

        let last = map.position_at(source.len() - 1);
        assert_eq!((last.line, last.column), (2, 2));
        assert_eq!(map.position_at(6000).column, 6001);
    }

    #[test]
    fn test_spanned_attribute_value() {
        let source = "id=\"app\"";
        let map = SourceMap::new(source);
        let value = Spanned::new("app", map.span(4, 7));

        assert_eq!(value.span.text(source), Some("app"));
        assert_eq!(value.span.byte_len(), 3);
        assert_eq!(value.map(str::len).value, 3);
    }

    #[test]
    fn test_span_display() {
        let map = SourceMap::new("hello\nworld");
        assert_eq!(map.span(0, 5).to_string(), "1:1-6");
        assert_eq!(map.span(2, 8).to_string(), "1:3-2:3");
        assert!(Position::zero().is_zero());
    }
}
