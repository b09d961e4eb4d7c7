//! Host selection abstraction.
//!
//! The live selection belongs to the host surface (a browser `Selection`, a
//! native text view, ...). The engine only reads it and installs new ones
//! through [`SelectionHost`], always with an explicit reference, so the same
//! addressing logic runs against a real surface or the in-memory
//! [`LiveSelection`].

use crate::types::{HostRange, Position};

/// A host selection: anchor where it started, focus where the caret is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostSelection {
    pub anchor: Position,
    pub focus: Position,
}

impl HostSelection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Access to the host's current selection.
pub trait SelectionHost {
    /// Current selection, if the host has one.
    fn selection(&self) -> Option<HostSelection>;

    /// Replace the selection by a caret at `at`.
    fn collapse(&mut self, at: Position);

    /// Replace the selection by the range from `anchor` to `focus`.
    fn select(&mut self, anchor: Position, focus: Position);

    /// Replace the selection by `range`, anchored at its start.
    fn select_range(&mut self, range: &HostRange) {
        self.select(range.start, range.end);
    }
}

/// In-memory selection host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveSelection {
    current: Option<HostSelection>,
}

impl LiveSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(anchor: Position, focus: Position) -> Self {
        Self {
            current: Some(HostSelection::new(anchor, focus)),
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl SelectionHost for LiveSelection {
    fn selection(&self) -> Option<HostSelection> {
        self.current
    }

    fn collapse(&mut self, at: Position) {
        self.current = Some(HostSelection::new(at, at));
    }

    fn select(&mut self, anchor: Position, focus: Position) {
        self.current = Some(HostSelection::new(anchor, focus));
    }
}

impl<T: SelectionHost + ?Sized> SelectionHost for &mut T {
    fn selection(&self) -> Option<HostSelection> {
        (**self).selection()
    }

    fn collapse(&mut self, at: Position) {
        (**self).collapse(at)
    }

    fn select(&mut self, anchor: Position, focus: Position) {
        (**self).select(anchor, focus)
    }
}
