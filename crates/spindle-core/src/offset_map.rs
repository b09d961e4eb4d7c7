//! Conversion between block char offsets and host positions.
//!
//! Atomic embeds occupy their full length in the offset space but are
//! never entered: a position resolved for an offset inside one snaps to one of
//! its edges.

use crate::leaf::{embed_ancestor, first_leaf, last_leaf, next_leaf};
use crate::lines::{char_count, count_before, node_length};
use crate::tree::{NodeId, NodeKind, Tree};
use crate::types::Position;

/// Char offset in `block` of the host position `(node, inner)`.
pub fn offset_in_block(tree: &Tree, block: NodeId, node: NodeId, inner: usize) -> usize {
    let (node, inner) = if tree.is_text(node) {
        (node, inner.min(tree.text_len(node)))
    } else {
        let count = tree.child_count(node);
        match tree.child(node, inner) {
            Some(child) => (child, 0),
            None if inner > 0 && node == block => return char_count(tree, block),
            None if inner > 0 => {
                return count_before(tree, block, node) + node_length(tree, node);
            }
            None => {
                debug_assert_eq!(count, 0);
                (node, 0)
            }
        }
    };
    count_before(tree, block, node) + inner
}

/// Offset of a [`Position`].
pub fn position_offset(tree: &Tree, block: NodeId, position: Position) -> usize {
    offset_in_block(tree, block, position.node, position.offset)
}

fn before(tree: &Tree, node: NodeId) -> Option<Position> {
    Some(Position::new(tree.parent(node)?, tree.index_in_parent(node)?))
}

fn after(tree: &Tree, node: NodeId) -> Option<Position> {
    Some(Position::new(tree.parent(node)?, tree.index_in_parent(node)? + 1))
}

/// Host position for a char offset in `block`.
///
/// Offsets past the end resolve to the end of the block.
pub fn resolve_position(tree: &Tree, block: NodeId, offset: usize) -> Position {
    let block_end = Position::new(block, tree.child_count(block));

    if offset == 0 {
        let first = first_leaf(tree, block);
        if !tree.is_text(first) {
            return Position::new(block, 0);
        }
        return match embed_ancestor(tree, block, first) {
            Some(embed) => before(tree, embed).unwrap_or(Position::new(block, 0)),
            None => Position::new(first, 0),
        };
    }

    let mut remaining = offset;
    let mut leaf = Some(first_leaf(tree, block));
    while let Some(node) = leaf {
        match tree.kind(node) {
            NodeKind::Text(_) => {
                if let Some(embed) = embed_ancestor(tree, block, node) {
                    let len = node_length(tree, embed);
                    if remaining == 0 {
                        return before(tree, embed).unwrap_or(block_end);
                    }
                    if remaining < len {
                        tracing::trace!(
                            target: "spindle::offset",
                            offset,
                            remaining,
                            "offset inside embed, snapping past it"
                        );
                        return after(tree, embed).unwrap_or(block_end);
                    }
                    remaining -= len;
                    if remaining == 0 {
                        return after(tree, embed).unwrap_or(block_end);
                    }
                    leaf = next_leaf(tree, block, Some(last_leaf(tree, embed)));
                    continue;
                }
                let len = tree.text_len(node);
                if remaining <= len {
                    return Position::new(node, remaining);
                }
                remaining -= len;
            }
            NodeKind::Break { trailing: true } => {
                return before(tree, node).unwrap_or(block_end);
            }
            NodeKind::Break { trailing: false } => {
                if remaining == 0 {
                    return before(tree, node).unwrap_or(block_end);
                }
                remaining -= 1;
            }
            _ => {}
        }
        leaf = next_leaf(tree, block, Some(node));
    }
    block_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::char_count;
    use crate::markup::Document;

    fn block(markup: &str) -> (Document, NodeId) {
        let doc = Document::parse(&format!(r#"<div data-block-index="0">{markup}</div>"#)).unwrap();
        let block = doc.block(0).unwrap();
        (doc, block)
    }

    fn embeds_strictly_contain(tree: &Tree, block: NodeId, offset: usize) -> bool {
        tree.descendants(block).filter(|&n| tree.is_embed(n)).any(|embed| {
            let start = count_before(tree, block, embed);
            let end = start + node_length(tree, embed);
            start < offset && offset < end
        })
    }

    fn assert_round_trip(markup: &str) {
        let (doc, b) = block(markup);
        let tree = &doc.tree;
        for offset in 0..=char_count(tree, b) {
            if embeds_strictly_contain(tree, b, offset) {
                continue;
            }
            let pos = resolve_position(tree, b, offset);
            assert_eq!(
                position_offset(tree, b, pos),
                offset,
                "offset {offset} in {markup:?} resolved to {pos:?}"
            );
        }
    }

    #[test]
    fn test_round_trip_offsets() {
        assert_round_trip("Hello world");
        assert_round_trip("ab<br/>cd");
        assert_round_trip(r#"He<span class="bold">llo</span> <span class="bold italic">wor</span>ld"#);
        assert_round_trip(r#"a<br/><br/>b<br data-trailing=""/>"#);
        assert_round_trip(r#"Hi <span contenteditable="false">user</span>!"#);
        assert_round_trip(r#"<span contenteditable="false">x</span><br/><span class="edt-b">é</span>"#);
        assert_round_trip("");
        assert_round_trip(r#"<span class="bold">a<br/><span contenteditable="false">xy</span></span>"#);
        assert_round_trip(r#"<span class="bold">a<br/>b</span>c"#);
        assert_round_trip(r#"a<span contenteditable="false">x<br/>y</span>b"#);
    }

    #[test]
    fn test_end_of_wrapper_counts_breaks() {
        let (doc, b) = block(r#"<span class="bold">a<br/>b</span>c"#);
        let tree = &doc.tree;
        let span = tree.children(b)[0];
        assert_eq!(offset_in_block(tree, b, span, tree.child_count(span)), 3);

        let (doc, b) = block(r#"<span class="bold">a<br/><span contenteditable="false">xy</span></span>"#);
        let tree = &doc.tree;
        let span = tree.children(b)[0];
        let end = resolve_position(tree, b, char_count(tree, b));
        assert_eq!(end, Position::new(span, 3));
        assert_eq!(position_offset(tree, b, end), 4);
    }

    #[test]
    fn test_embed_with_break_is_one_unit() {
        let (doc, b) = block(r#"a<span contenteditable="false">x<br/>y</span>b"#);
        let tree = &doc.tree;
        assert_eq!(char_count(tree, b), 5);
        assert_eq!(resolve_position(tree, b, 2), Position::new(b, 2));
        assert_eq!(resolve_position(tree, b, 4), Position::new(b, 2));
        let tail = tree.children(b)[2];
        assert_eq!(resolve_position(tree, b, 5), Position::new(tail, 1));
    }

    #[test]
    fn test_resolve_after_embed() {
        let (doc, b) = block(r#"Hi <span contenteditable="false">user</span>!"#);
        let tree = &doc.tree;
        let pos = resolve_position(tree, b, 5);
        assert_eq!(pos, Position::new(b, 2));
        assert_eq!(resolve_position(tree, b, 3), Position::new(tree.children(b)[0], 3));
        assert_eq!(resolve_position(tree, b, 7), Position::new(b, 2));
        let bang = tree.children(b)[2];
        assert_eq!(resolve_position(tree, b, 8), Position::new(bang, 1));
    }

    #[test]
    fn test_resolve_zero_before_leading_embed() {
        let (doc, b) = block(r#"<span contenteditable="false">abc</span>d"#);
        assert_eq!(resolve_position(&doc.tree, b, 0), Position::new(b, 0));
    }

    #[test]
    fn test_resolve_at_trailing_break() {
        let (doc, b) = block(r#"ab<br/><br data-trailing=""/>"#);
        let tree = &doc.tree;
        assert_eq!(resolve_position(tree, b, 3), Position::new(b, 2));
        assert_eq!(resolve_position(tree, b, 99), Position::new(b, 2));
    }

    #[test]
    fn test_offset_in_block_non_text_nodes() {
        let (doc, b) = block(r#"ab<span class="bold">cd</span>ef"#);
        let tree = &doc.tree;
        let span = tree.children(b)[1];
        assert_eq!(offset_in_block(tree, b, b, 0), 0);
        assert_eq!(offset_in_block(tree, b, b, 1), 2);
        assert_eq!(offset_in_block(tree, b, b, 3), 6);
        assert_eq!(offset_in_block(tree, b, span, 1), 4);
        assert_eq!(offset_in_block(tree, b, span, 0), 2);
        // Text offsets clamp to the leaf.
        assert_eq!(offset_in_block(tree, b, tree.children(b)[0], 10), 2);
    }
}
