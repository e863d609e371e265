//! Source locations.
//!
//! A glossary may be assembled from several files through inclusion, so a
//! [`Span`] records which loaded source it points into next to the byte
//! range.

use std::ops::Range;

/// Identifier of one loaded source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SourceId(u32);

impl SourceId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A byte range inside one source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    source: SourceId,
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span in the first (main) source.
    pub fn new(range: Range<usize>) -> Self {
        Self::in_source(SourceId::default(), range)
    }

    /// Create a span in the given source.
    pub fn in_source(source: SourceId, range: Range<usize>) -> Self {
        Self {
            source,
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    /// Get the source this span points into
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Get the start offset of the span
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the end offset of the span
    pub fn end(&self) -> usize {
        self.end
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Create a union of two spans (encompassing both).
    ///
    /// Spans from different sources do not combine; `self` is returned.
    pub fn union(&self, other: Span) -> Span {
        if self.source != other.source {
            return *self;
        }
        Self {
            source: self.source,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
