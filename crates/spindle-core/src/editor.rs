//! Editor facade tying the tree, the host selection and the style engine
//! together.
//!
//! A style command reads the host selection, splits it into per-block char
//! ranges (or a single range inside the table cell holding it), restyles
//! each range, and finally re-installs the selection from the logical offsets
//! read at the start, since the host nodes it pointed at may have been split
//! or merged.

use std::ops::Range;

use crate::clipboard::sanitize_paste;
use crate::config::EditorConfig;
use crate::format::{apply_offsets, clear_offsets, styles_offsets};
use crate::lines::{char_count, lines};
use crate::markup::{Document, MarkupError, to_markup};
use crate::platform::{LiveSelection, SelectionHost};
use crate::selection::{
    block_by_index, cell_from_selection, read_selection, selection_in_cell, set_cursor,
    set_selection, set_selection_in_cell,
};
use crate::style::StyleSet;
use crate::traverse::InlineRun;
use crate::tree::{NodeId, NodeKind, Tree};
use crate::types::{BlockSelection, Selection};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Restyle {
    Apply,
    Clear,
    Toggle,
}

/// What the current selection covers.
enum Target {
    Cell {
        cell: NodeId,
        selection: Selection,
    },
    Blocks {
        selection: BlockSelection,
        parts: Vec<(NodeId, Range<usize>)>,
    },
}

impl Target {
    fn parts(&self) -> Vec<(NodeId, Range<usize>)> {
        match self {
            Target::Cell { selection, .. } if selection.is_collapsed() => Vec::new(),
            Target::Cell { cell, selection } => vec![(*cell, selection.to_range())],
            Target::Blocks { parts, .. } => parts.clone(),
        }
    }
}

pub struct Editor<S = LiveSelection> {
    tree: Tree,
    root: NodeId,
    selection: S,
    config: EditorConfig,
}

impl Editor<LiveSelection> {
    /// Editor over parsed markup, with an empty in-memory selection.
    pub fn parse(markup: &str, config: EditorConfig) -> Result<Self, MarkupError> {
        let Document { tree, root } = Document::parse(markup)?;
        Ok(Self::new(tree, root, LiveSelection::new(), config))
    }
}

impl<S: SelectionHost> Editor<S> {
    pub fn new(tree: Tree, root: NodeId, selection: S, config: EditorConfig) -> Self {
        Self {
            tree,
            root,
            selection,
            config,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn selection_host(&self) -> &S {
        &self.selection
    }

    pub fn selection_host_mut(&mut self) -> &mut S {
        &mut self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn block(&self, index: usize) -> Option<NodeId> {
        block_by_index(&self.tree, self.root, index)
    }

    pub fn char_count(&self, index: usize) -> Option<usize> {
        self.block(index).map(|b| char_count(&self.tree, b))
    }

    pub fn lines(&self, index: usize) -> Option<Vec<String>> {
        self.block(index).map(|b| lines(&self.tree, b, None))
    }

    pub fn read_selection(&self) -> Option<BlockSelection> {
        read_selection(&self.tree, self.root, &self.selection)
    }

    pub fn set_cursor(&mut self, block: usize, offset: usize) {
        set_cursor(&self.tree, self.root, &mut self.selection, block, offset);
    }

    pub fn set_selection(&mut self, selection: &BlockSelection) {
        set_selection(&self.tree, self.root, &mut self.selection, selection);
    }

    pub fn to_markup(&self) -> String {
        to_markup(&self.tree, self.root)
    }

    /// Sanitize clipboard HTML with this editor's paste settings.
    pub fn sanitize_paste(&self, html: &str) -> Vec<InlineRun> {
        sanitize_paste(html, &self.config.paste)
    }

    fn target(&self) -> Option<Target> {
        if let Some(cell) = cell_from_selection(&self.tree, self.root, &self.selection) {
            let selection = selection_in_cell(&self.tree, cell, &self.selection)?;
            return Some(Target::Cell { cell, selection });
        }

        let selection = self.read_selection()?;
        let ((first, start), (last, end)) = selection.ordered();
        let mut parts = Vec::new();
        for index in first..=last {
            let Some(block) = self.block(index) else {
                continue;
            };
            if !matches!(self.tree.kind(block), NodeKind::Block { editable: true, .. }) {
                continue;
            }
            let from = if index == first { start } else { 0 };
            let to = if index == last {
                end
            } else {
                char_count(&self.tree, block)
            };
            if from < to {
                parts.push((block, from..to));
            }
        }
        Some(Target::Blocks { selection, parts })
    }

    /// Styles shared by every selected char; empty for a caret.
    pub fn active_styles(&self) -> StyleSet {
        let Some(target) = self.target() else {
            return StyleSet::new();
        };
        let mut common: Option<StyleSet> = None;
        for (block, range) in target.parts() {
            let styles = styles_offsets(&self.tree, block, range);
            match common.as_mut() {
                Some(acc) => acc.retain_common(&styles),
                None => common = Some(styles),
            }
        }
        common.unwrap_or_default()
    }

    fn restyle(&mut self, tag: &str, mode: Restyle) -> bool {
        let Some(target) = self.target() else {
            tracing::debug!(target: "spindle::editor", tag, "no selection to style");
            return false;
        };
        let parts = target.parts();
        if parts.is_empty() {
            return false;
        }
        let clear = match mode {
            Restyle::Apply => false,
            Restyle::Clear => true,
            Restyle::Toggle => self.active_styles().contains(tag),
        };
        for (block, range) in parts {
            if clear {
                clear_offsets(&mut self.tree, block, range, tag);
            } else {
                apply_offsets(&mut self.tree, block, range, tag);
            }
        }
        match target {
            Target::Cell { cell, selection } => {
                set_selection_in_cell(&self.tree, cell, &mut self.selection, selection)
            }
            Target::Blocks { selection, .. } => self.set_selection(&selection),
        }
        true
    }

    /// Toggle `tag` over the selection: cleared when every selected char
    /// already has it, applied otherwise. Returns false when nothing is
    /// selected.
    pub fn toggle_style(&mut self, tag: &str) -> bool {
        self.restyle(tag, Restyle::Toggle)
    }

    pub fn apply_style(&mut self, tag: &str) -> bool {
        self.restyle(tag, Restyle::Apply)
    }

    pub fn clear_style(&mut self, tag: &str) -> bool {
        self.restyle(tag, Restyle::Clear)
    }
}
