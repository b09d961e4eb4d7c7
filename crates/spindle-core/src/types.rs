//! Positions, ranges and selections exchanged with the host surface.
//!
//! Host-side types address nodes of the [`Tree`](crate::tree::Tree); block-side
//! types are plain char offsets within one block.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

/// A point in the host tree.
///
/// For a text node, `offset` is a char offset into its text. For any other
/// node it is a child index, so `(parent, i)` sits just before child `i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Host range between two positions, start first in document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostRange {
    pub start: Position,
    pub end: Position,
}

impl HostRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Empty range at `at`.
    pub fn caret(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// Whether this is a bare insertion point.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Block-addressed selection: block index plus char offset on both ends.
///
/// The anchor may come after the head; nothing here orders them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSelection {
    pub anchor_block: usize,
    pub anchor_offset: usize,
    pub head_block: usize,
    pub head_offset: usize,
}

impl BlockSelection {
    pub fn new(anchor: (usize, usize), head: (usize, usize)) -> Self {
        Self {
            anchor_block: anchor.0,
            anchor_offset: anchor.1,
            head_block: head.0,
            head_offset: head.1,
        }
    }

    pub fn caret(block: usize, offset: usize) -> Self {
        Self::new((block, offset), (block, offset))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_block == self.head_block && self.anchor_offset == self.head_offset
    }

    /// Both ends as `(block, offset)`, document order.
    pub fn ordered(&self) -> ((usize, usize), (usize, usize)) {
        let anchor = (self.anchor_block, self.anchor_offset);
        let head = (self.head_block, self.head_offset);
        if head < anchor {
            (head, anchor)
        } else {
            (anchor, head)
        }
    }
}

/// Offset selection within a single block or cell.
///
/// The anchor is where the selection started, the head is where the caret is
/// now. Use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}
