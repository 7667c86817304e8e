//! File positions, source ranges and the line-offset table.
//!
//! The elaboration artifacts address source locations as flat byte offsets.
//! Everything downstream works with 1-indexed line/column pairs, so the
//! line table is the first thing consulted for any span.

use serde::{Deserialize, Serialize};

/// Position in a source file (1-indexed line and byte column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilePos {
    pub line: u32,
    pub column: u32,
}

impl FilePos {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A span between two file positions, ordered by start.
///
/// Spans are half-open at the artifact level; once resolved to positions
/// they are compared only through `contains` and the derived ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileRange {
    pub start: FilePos,
    pub stop: FilePos,
}

impl FileRange {
    pub const fn new(start: FilePos, stop: FilePos) -> Self {
        Self { start, stop }
    }

    /// Containment: `other` starts no earlier and ends no later than `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }
}

/// A raw byte-offset span as it appears in the artifacts.
///
/// Either end may be absent, meaning the span is open at that end and
/// clamps to the file extent when resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringRange {
    pub start: Option<u32>,
    pub stop: Option<u32>,
}

impl StringRange {
    pub const fn new(start: u32, stop: u32) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
        }
    }
}

/// One entry of the line artifact: the byte offset where a line starts.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LineEntry {
    pub start: u32,
}

/// Sorted table of line-start offsets for one source file.
///
/// An empty table signals "positions unavailable": every resolved position
/// degenerates to the file-start/file-end sentinels.
#[derive(Debug, Clone, Default)]
pub struct LineTable {
    starts: Vec<u32>,
}

impl LineTable {
    pub fn new(starts: Vec<u32>) -> Self {
        Self { starts }
    }

    pub fn from_entries(entries: Vec<LineEntry>) -> Self {
        Self::new(entries.into_iter().map(|e| e.start).collect())
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Resolve a byte offset to a position.
    ///
    /// Picks the greatest line start that is at most `offset`; offsets past
    /// the end of the file clamp to the last line. Never fails.
    pub fn resolve(&self, offset: u32) -> FilePos {
        let idx = self.starts.partition_point(|&s| s <= offset);
        if idx == 0 {
            return FilePos::new(1, offset + 1);
        }
        FilePos::new(idx as u32, offset - self.starts[idx - 1] + 1)
    }

    /// Resolve a raw span to a file range.
    ///
    /// Absent ends clamp to the file extent: start-of-file `(1, 1)` for a
    /// missing start, the position just past the last line for a missing
    /// stop.
    pub fn file_range(&self, range: Option<StringRange>) -> FileRange {
        let mut start = FilePos::new(1, 1);
        let mut stop = FilePos::new(self.line_count() as u32 + 1, 1);
        if let Some(range) = range {
            if let Some(offset) = range.start {
                start = self.resolve(offset);
            }
            if let Some(offset) = range.stop {
                stop = self.resolve(offset);
            }
        }
        FileRange::new(start, stop)
    }
}
