//! Styled-run traversal and small block hygiene helpers.

use serde::Serialize;

use crate::lines::char_count;
use crate::offset_map::position_offset;
use crate::style::StyleSet;
use crate::tree::{NodeId, NodeKind, Tree};
use crate::types::{HostRange, Position};

/// Maximal text carrying one style set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InlineRun {
    pub text: String,
    pub styles: StyleSet,
}

impl InlineRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            styles: StyleSet::new(),
        }
    }

    pub fn styled(text: impl Into<String>, styles: StyleSet) -> Self {
        Self {
            text: text.into(),
            styles,
        }
    }
}

/// One step of a flattened block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineEvent {
    Text { text: String, styles: StyleSet },
    LineBreak,
}

/// Flatten `root` into styled text and line breaks.
///
/// Styles are the union of every enclosing wrapper. Adjacent text with equal
/// styles is merged; embed text is reported like any other text.
pub fn runs(tree: &Tree, root: NodeId) -> Vec<InlineEvent> {
    let mut events: Vec<InlineEvent> = Vec::new();
    let mut stack: Vec<(NodeId, StyleSet)> = tree
        .children(root)
        .iter()
        .rev()
        .map(|&c| (c, StyleSet::new()))
        .collect();

    while let Some((node, inherited)) = stack.pop() {
        match tree.kind(node) {
            NodeKind::Text(text) => {
                if text.is_empty() {
                    continue;
                }
                match events.last_mut() {
                    Some(InlineEvent::Text { text: last, styles }) if *styles == inherited => {
                        last.push_str(text)
                    }
                    _ => events.push(InlineEvent::Text {
                        text: text.clone(),
                        styles: inherited,
                    }),
                }
            }
            NodeKind::Break { trailing: false } => events.push(InlineEvent::LineBreak),
            NodeKind::Break { trailing: true } => {}
            kind => {
                let mut styles = inherited;
                if let NodeKind::Wrapper { styles: own } = kind {
                    styles.extend_from(own);
                }
                stack.extend(tree.children(node).iter().rev().map(|&c| (c, styles.clone())));
            }
        }
    }
    events
}

/// Block hygiene after edits: drop a dangling final break and protect a
/// leading space from collapsing. Returns whether anything changed.
pub fn clean(tree: &mut Tree, block: NodeId) -> bool {
    let mut changed = false;
    if let Some(last) = tree.last_child(block) {
        let dangling = matches!(tree.kind(last), NodeKind::Break { trailing: false })
            && !tree.prev_sibling(last).is_some_and(|p| tree.is_break(p));
        if dangling {
            tree.detach(last);
            changed = true;
        }
    }
    if let Some(first) = tree.first_child(block) {
        if let Some(rest) = tree.text(first).and_then(|t| t.strip_prefix(' ')) {
            let replaced = format!("\u{a0}{rest}");
            tree.set_text(first, replaced);
            changed = true;
        }
    }
    changed
}

/// Whether `position` is at offset zero of `block`.
pub fn is_at_start(tree: &Tree, block: NodeId, position: Position) -> bool {
    position_offset(tree, block, position) == 0
}

/// Whether `position` is at the last offset of `block`.
pub fn is_at_end(tree: &Tree, block: NodeId, position: Position) -> bool {
    position_offset(tree, block, position) >= char_count(tree, block)
}

/// Deepest node containing both `a` and `b` (either may be the answer).
pub fn common_ancestor(tree: &Tree, a: NodeId, b: NodeId) -> Option<NodeId> {
    std::iter::once(a)
        .chain(tree.ancestors(a))
        .find(|&candidate| tree.contains(candidate, b))
}

/// Whether both ends of `range` lie within `node`.
pub fn bounded(tree: &Tree, node: NodeId, range: &HostRange) -> bool {
    tree.contains(node, range.start.node) && tree.contains(node, range.end.node)
}
