//! Byte spans into the template source and line/column lookup.

use text_size::{TextRange, TextSize};

/// A byte offset into the template source.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` into the original template source.
///
/// Spans are only used for diagnostics; the AST never reconstructs text from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Creates a span from two offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` cursor positions.
    #[inline]
    pub(crate) fn from_usize(start: usize, end: usize) -> Self {
        Self::new(to_offset(start), to_offset(end))
    }

    /// Creates an empty span at `offset`.
    #[inline]
    pub fn empty(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self::new(offset, offset)
    }

    /// Length of the span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if the span covers no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the covered text of `source`, or `None` when the span is out of bounds.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(usize::from(self.start)..usize::from(self.end))
    }

    /// Moves the span by `delta` bytes, used when a template was cut out of a larger file.
    #[inline]
    pub fn shift(self, delta: TextSize) -> Span {
        Span::new(self.start + delta, self.end + delta)
    }

    /// Returns the smallest span covering both spans.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}

/// Converts a cursor position to an offset, saturating on inputs above 4 GiB.
#[inline]
pub(crate) fn to_offset(pos: usize) -> ByteOffset {
    TextSize::from(u32::try_from(pos).unwrap_or(u32::MAX))
}

/// A 0-indexed line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineCol {
    /// 0-indexed line.
    pub line: u32,
    /// 0-indexed byte column within the line.
    pub col: u32,
}

/// Maps byte offsets to line/column positions by binary search over line starts.
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    /// Indexes every `\n` in `text`.
    pub fn new(text: &str) -> Self {
        let newlines = text
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| to_offset(i))
            .collect();
        Self {
            newlines,
            len: to_offset(text.len()),
        }
    }

    /// Returns the position of `offset`, or `None` past the end of the text.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }
        let line = self.newlines.partition_point(|nl| *nl < offset);
        let line_start = match line {
            0 => TextSize::from(0),
            n => self.newlines[n - 1] + TextSize::from(1),
        };
        Some(LineCol {
            line: line as u32,
            col: u32::from(offset - line_start),
        })
    }
}
