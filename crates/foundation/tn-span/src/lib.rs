//! Source file spans and locations

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A unique identifier for a source file
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize, Display)]
#[display("file#{_0}")]
pub struct FileId(pub u32);

impl FileId {
    /// Creates a file identifier
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A byte offset span in a source file
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize, Display)]
#[display("{start}..{end}")]
pub struct Span {
    /// Inclusive start offset
    pub start: u32,
    /// Exclusive end offset
    pub end: u32,
}

impl Span {
    /// Creates a span from two offsets
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// A span with associated file
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize, Display)]
#[display("{file}:{span}")]
pub struct FileSpan {
    /// File the span belongs to
    pub file: FileId,
    /// Offsets within the file
    pub span: Span,
}

impl FileSpan {
    /// Creates a file span
    #[must_use]
    pub const fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }

    /// Placeholder location for synthesized nodes
    #[must_use]
    pub const fn dummy() -> Self {
        Self::new(FileId(0), Span::new(0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let span = FileSpan::new(FileId(3), Span::new(10, 12));
        assert_eq!(span.to_string(), "file#3:10..12");
        assert_eq!(FileSpan::dummy(), FileSpan::new(FileId::new(0), Span::default()));
    }
}
