//! Leaf traversal bounded by a scope node.

use crate::tree::{NodeId, Tree};

/// Descend through first children until a node without children.
pub fn first_leaf(tree: &Tree, node: NodeId) -> NodeId {
    let mut current = node;
    while let Some(child) = tree.first_child(current) {
        current = child;
    }
    current
}

/// Descend through last children until a node without children.
pub fn last_leaf(tree: &Tree, node: NodeId) -> NodeId {
    let mut current = node;
    while let Some(child) = tree.last_child(current) {
        current = child;
    }
    current
}

/// Next leaf after `node` in document order, never leaving `scope`.
///
/// `node` must lie under `scope`. Returns `None` once the last leaf of the
/// scope has been passed, when `node` is the scope itself, or when no node is
/// given.
pub fn next_leaf(tree: &Tree, scope: NodeId, node: Option<NodeId>) -> Option<NodeId> {
    let mut current = node?;
    loop {
        if current == scope {
            return None;
        }
        if let Some(sibling) = tree.next_sibling(current) {
            return Some(first_leaf(tree, sibling));
        }
        current = tree.parent(current)?;
    }
}

/// Mirror of [`next_leaf`].
pub fn prev_leaf(tree: &Tree, scope: NodeId, node: Option<NodeId>) -> Option<NodeId> {
    let mut current = node?;
    loop {
        if current == scope {
            return None;
        }
        if let Some(sibling) = tree.prev_sibling(current) {
            return Some(last_leaf(tree, sibling));
        }
        current = tree.parent(current)?;
    }
}

/// Nearest embed strictly above `node`, not looking at or past `scope`.
pub fn embed_ancestor(tree: &Tree, scope: NodeId, node: NodeId) -> Option<NodeId> {
    tree.ancestors(node)
        .take_while(|&n| n != scope)
        .find(|&n| tree.is_embed(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Document;

    #[test]
    fn test_leaf_walk_stays_in_scope() {
        let doc = Document::parse(
            r#"<div data-block-index="0">a<span class="b">b<br/>c</span></div><div data-block-index="1">d</div>"#,
        )
        .unwrap();
        let tree = &doc.tree;
        let block = doc.block(0).unwrap();

        let mut seen = Vec::new();
        let mut leaf = Some(first_leaf(tree, block));
        while let Some(id) = leaf {
            seen.push(id);
            leaf = next_leaf(tree, block, Some(id));
        }
        let texts: Vec<_> = seen
            .iter()
            .map(|&id| tree.text(id).unwrap_or("<br>").to_string())
            .collect();
        assert_eq!(texts, ["a", "b", "<br>", "c"]);

        let mut back = Vec::new();
        let mut leaf = Some(last_leaf(tree, block));
        while let Some(id) = leaf {
            back.push(id);
            leaf = prev_leaf(tree, block, Some(id));
        }
        back.reverse();
        assert_eq!(back, seen);
    }

    #[test]
    fn test_next_leaf_edge_inputs() {
        let doc = Document::parse(r#"<div data-block-index="0">x</div>"#).unwrap();
        let block = doc.block(0).unwrap();
        assert_eq!(next_leaf(&doc.tree, block, None), None);
        assert_eq!(next_leaf(&doc.tree, block, Some(block)), None);
        let text = doc.tree.children(block)[0];
        assert_eq!(first_leaf(&doc.tree, block), text);
        assert_eq!(first_leaf(&doc.tree, text), text);
        assert_eq!(next_leaf(&doc.tree, block, Some(text)), None);
    }

    #[test]
    fn test_embed_ancestor() {
        let doc = Document::parse(
            r#"<div data-block-index="0">Hi <span contenteditable="false"><b>user</b></span></div>"#,
        )
        .unwrap();
        let tree = &doc.tree;
        let block = doc.block(0).unwrap();
        let inner = last_leaf(tree, block);
        assert_eq!(tree.text(inner), Some("user"));
        let embed = embed_ancestor(tree, block, inner).unwrap();
        assert!(tree.is_embed(embed));
        assert_eq!(embed_ancestor(tree, block, first_leaf(tree, block)), None);
        assert_eq!(embed_ancestor(tree, embed, inner), None);
    }
}
