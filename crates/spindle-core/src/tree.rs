//! Index-addressed node arena standing in for the host document.
//!
//! Every node of every block lives in a single [`Tree`]. Nodes refer to each
//! other through [`NodeId`] handles, which stay valid after a node is detached,
//! so the splitting and re-parenting done by the style engine never leaves a
//! dangling reference behind. Text lengths are always counted in chars.

use std::fmt;

use smol_str::SmolStr;

use crate::style::StyleSet;

/// Handle to a node in a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a node is, as far as offset mapping and styling are concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Text run. Contributes its char count.
    Text(String),
    /// Line break. A trailing break is the host's end-of-block placeholder and
    /// contributes nothing.
    Break { trailing: bool },
    /// Styled span holding text (and occasionally breaks or embeds).
    Wrapper { styles: StyleSet },
    /// Atomic, non-editable island. Its text counts but is never entered.
    Embed { tag: SmolStr },
    /// Top-level block addressed by index.
    Block {
        tag: SmolStr,
        index: usize,
        editable: bool,
    },
    /// Editable table cell acting as an independent sub-editor.
    Cell { tag: SmolStr, index: usize },
    /// Any other element. Traversed, never styled.
    Element { tag: SmolStr },
}

impl NodeKind {
    pub fn text(text: impl Into<String>) -> Self {
        NodeKind::Text(text.into())
    }

    pub fn wrapper(styles: StyleSet) -> Self {
        NodeKind::Wrapper { styles }
    }

    pub fn element(tag: impl Into<SmolStr>) -> Self {
        NodeKind::Element { tag: tag.into() }
    }
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena of nodes. Detached nodes keep their subtree and may be re-inserted.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

/// Byte index of the char at `char_offset`, or the string length past the end.
pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(byte, _)| byte)
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeKind::Text(text.into()))
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id.0].children.len()
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id.0].children.get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.last().copied()
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child(parent, index + 1)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    pub fn is_break(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Break { .. })
    }

    pub fn is_wrapper(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Wrapper { .. })
    }

    pub fn is_embed(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Embed { .. })
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Char length of a text node; zero for anything else.
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map_or(0, |t| t.chars().count())
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        if let NodeKind::Text(text) = self.kind_mut(id) {
            *text = value.into();
        }
    }

    pub fn push_text(&mut self, id: NodeId, value: &str) {
        if let NodeKind::Text(text) = self.kind_mut(id) {
            text.push_str(value);
        }
    }

    /// Style set of a wrapper node.
    pub fn styles(&self, id: NodeId) -> Option<&StyleSet> {
        match self.kind(id) {
            NodeKind::Wrapper { styles } => Some(styles),
            _ => None,
        }
    }

    pub fn styles_mut(&mut self, id: NodeId) -> Option<&mut StyleSet> {
        match self.kind_mut(id) {
            NodeKind::Wrapper { styles } => Some(styles),
            _ => None,
        }
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Pre-order walk over `id` and its descendants.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Concatenated text of every text node beneath `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Remove `id` from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Insert `child` into `parent` at `index` (clamped), detaching it first.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let end = self.child_count(parent);
        // Detaching may shrink the list when re-appending to the same parent.
        self.insert(parent, end, child);
    }

    /// Place `child` right before `reference`. No-op if `reference` is detached.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        self.detach(child);
        if let (Some(parent), Some(index)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert(parent, index, child);
        }
    }

    /// Place `child` right after `reference`. No-op if `reference` is detached.
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) {
        self.detach(child);
        if let (Some(parent), Some(index)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert(parent, index + 1, child);
        }
    }

    /// Split a text node at a char offset.
    ///
    /// The node keeps the text before `at`; a new text node holding the rest is
    /// returned and, when the node is attached, inserted right after it.
    /// Non-text nodes are returned unchanged.
    pub fn split_text(&mut self, id: NodeId, at: usize) -> NodeId {
        let tail = match self.kind_mut(id) {
            NodeKind::Text(text) => {
                let byte = byte_index(text, at);
                text.split_off(byte)
            }
            _ => return id,
        };
        let right = self.create_text(tail);
        self.insert_after(id, right);
        right
    }

    /// Replace `id` by its children, in place.
    pub fn unwrap_node(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(index) = self.index_in_parent(id) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for (offset, &child) in children.iter().enumerate() {
            self.nodes[child.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(index + 1 + offset, child);
        }
        self.detach(id);
    }

    /// Move `from` and every sibling following it to the end of `dest`.
    pub fn move_run(&mut self, from: NodeId, dest: NodeId) {
        let mut current = Some(from);
        while let Some(node) = current {
            current = self.next_sibling(node);
            self.append(dest, node);
        }
    }
}

/// Pre-order iterator returned by [`Tree::descendants`].
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.create(NodeKind::element("div"));
        let a = tree.create_text("héllo");
        let b = tree.create(NodeKind::Break { trailing: false });
        tree.append(root, a);
        tree.append(root, b);
        (tree, root, a, b)
    }

    #[test]
    fn test_split_text_counts_chars() {
        let (mut tree, root, a, b) = sample();
        let right = tree.split_text(a, 2);
        assert_eq!(tree.text(a), Some("hé"));
        assert_eq!(tree.text(right), Some("llo"));
        assert_eq!(tree.children(root), &[a, right, b]);
        assert_eq!(tree.text_len(right), 3);
    }

    #[test]
    fn test_split_text_at_edges() {
        let (mut tree, root, a, _) = sample();
        let right = tree.split_text(a, 0);
        assert_eq!(tree.text(a), Some(""));
        assert_eq!(tree.text(right), Some("héllo"));
        let past = tree.split_text(right, 99);
        assert_eq!(tree.text(past), Some(""));
        assert_eq!(tree.child_count(root), 4);
    }

    #[test]
    fn test_siblings_and_index() {
        let (tree, root, a, b) = sample();
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.prev_sibling(a), None);
        assert_eq!(tree.next_sibling(b), None);
        assert_eq!(tree.next_sibling(root), None);
        assert_eq!(tree.index_in_parent(b), Some(1));
    }

    #[test]
    fn test_unwrap_node_splices_children() {
        let mut tree = Tree::new();
        let root = tree.create(NodeKind::element("div"));
        let before = tree.create_text("a");
        let span = tree.create(NodeKind::wrapper(StyleSet::single("bold")));
        let inner1 = tree.create_text("b");
        let inner2 = tree.create_text("c");
        let after = tree.create_text("d");
        tree.append(root, before);
        tree.append(root, span);
        tree.append(span, inner1);
        tree.append(span, inner2);
        tree.append(root, after);

        tree.unwrap_node(span);
        assert_eq!(tree.children(root), &[before, inner1, inner2, after]);
        assert_eq!(tree.parent(inner2), Some(root));
        assert_eq!(tree.parent(span), None);
        assert_eq!(tree.text_content(root), "abcd");
    }

    #[test]
    fn test_move_run_and_reinsert() {
        let mut tree = Tree::new();
        let root = tree.create(NodeKind::element("div"));
        let ids: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|t| {
                let id = tree.create_text(t);
                tree.append(root, id);
                id
            })
            .collect();
        let dest = tree.create(NodeKind::element("p"));
        tree.insert_after(ids[0], dest);
        tree.move_run(ids[1], dest);
        assert_eq!(tree.children(root), &[ids[0], dest]);
        assert_eq!(tree.children(dest), &[ids[1], ids[2]]);
        assert!(tree.contains(root, ids[2]));
        assert!(!tree.contains(dest, ids[0]));
    }

    #[test]
    fn test_append_to_same_parent_moves_to_end() {
        let (mut tree, root, a, b) = sample();
        tree.append(root, a);
        assert_eq!(tree.children(root), &[b, a]);
    }
}
