//! Range normalization: reduce a host range to a pair of text-leaf endpoints.

use std::ops::Range;

use crate::error::EditError;
use crate::leaf::embed_ancestor;
use crate::offset_map::{offset_in_block, resolve_position};
use crate::tree::{NodeId, Tree};
use crate::types::{HostRange, Position};

/// A range whose endpoints are text leaves lying directly under the block or
/// under one of its wrappers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizedRange {
    pub start: Position,
    pub end: Position,
}

impl NormalizedRange {
    /// Absolute char offsets of both endpoints.
    pub fn offsets(&self, tree: &Tree, block: NodeId) -> (usize, usize) {
        (
            offset_in_block(tree, block, self.start.node, self.start.offset),
            offset_in_block(tree, block, self.end.node, self.end.offset),
        )
    }
}

/// Largest valid offset inside `node`.
fn end_offset(tree: &Tree, node: NodeId) -> usize {
    if tree.is_text(node) {
        tree.text_len(node)
    } else {
        tree.child_count(node)
    }
}

fn depth_below(tree: &Tree, block: NodeId, node: NodeId) -> Option<usize> {
    let mut depth = 0;
    let mut current = node;
    while current != block {
        current = tree.parent(current)?;
        depth += 1;
    }
    Some(depth)
}

fn check_endpoint(tree: &Tree, block: NodeId, node: NodeId) -> Result<(), EditError> {
    let depth = depth_below(tree, block, node)
        .ok_or(EditError::InvalidRange("endpoint outside block"))?;
    if embed_ancestor(tree, block, node).is_some() {
        return Err(EditError::AtomicBoundary);
    }
    if depth > 2 {
        return Err(EditError::InvalidRange("endpoint nested too deeply"));
    }
    Ok(())
}

fn is_atomic(tree: &Tree, node: NodeId) -> bool {
    tree.is_break(node) || tree.is_embed(node)
}

/// Reduce `range` to text-leaf endpoints.
pub fn normalize(tree: &Tree, block: NodeId, range: &HostRange) -> Result<NormalizedRange, EditError> {
    let Position { node: mut ln, offset: lnp } = range.start;
    let Position { node: mut rn, offset: rnp } = range.end;

    check_endpoint(tree, block, ln)?;
    check_endpoint(tree, block, rn)?;

    let mut lnp = lnp.min(end_offset(tree, ln));
    let mut rnp = rnp.min(end_offset(tree, rn));

    if ln == block {
        ln = tree
            .child(block, lnp)
            .ok_or(EditError::InvalidRange("start past the end of the block"))?;
        lnp = 0;
    }
    if rn == block {
        let index = rnp
            .checked_sub(1)
            .ok_or(EditError::InvalidRange("end at the start of the block"))?;
        rn = tree
            .child(block, index)
            .ok_or(EditError::InvalidRange("end past the end of the block"))?;
        rnp = end_offset(tree, rn);
    }

    while is_atomic(tree, ln) {
        ln = tree
            .next_sibling(ln)
            .ok_or(EditError::InvalidRange("nothing after start break"))?;
        lnp = 0;
    }
    while is_atomic(tree, rn) {
        rn = tree
            .prev_sibling(rn)
            .ok_or(EditError::InvalidRange("nothing before end break"))?;
        rnp = end_offset(tree, rn);
    }

    if tree.is_wrapper(ln) {
        if let Some(child) = tree.child(ln, lnp) {
            ln = child;
            lnp = 0;
        } else if let Some(last) = tree.last_child(ln) {
            ln = last;
            lnp = end_offset(tree, last);
        }
    }
    if tree.is_wrapper(rn) {
        if let Some(child) = rnp.checked_sub(1).and_then(|i| tree.child(rn, i)) {
            rn = child;
            rnp = end_offset(tree, child);
        } else if let Some(first) = tree.first_child(rn) {
            rn = first;
            rnp = 0;
        }
    }

    for node in [ln, rn] {
        let parent_ok = tree.parent(node).is_some_and(|p| {
            p == block || (tree.is_wrapper(p) && tree.parent(p) == Some(block))
        });
        if !tree.is_text(node) || !parent_ok {
            tracing::trace!(target: "spindle::range", %node, "endpoint is not a styleable text leaf");
            return Err(EditError::InvalidRange("endpoint is not a text leaf"));
        }
    }

    Ok(NormalizedRange {
        start: Position::new(ln, lnp),
        end: Position::new(rn, rnp),
    })
}

/// Host range covering the char offsets `offsets` of `block`.
pub fn range_for_offsets(tree: &Tree, block: NodeId, offsets: Range<usize>) -> HostRange {
    HostRange::new(
        resolve_position(tree, block, offsets.start),
        resolve_position(tree, block, offsets.end),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Document;

    fn block(markup: &str) -> (Document, NodeId) {
        let doc = Document::parse(&format!(r#"<div data-block-index="0">{markup}</div>"#)).unwrap();
        let block = doc.block(0).unwrap();
        (doc, block)
    }

    #[test]
    fn test_block_endpoints_descend() {
        let (doc, b) = block(r#"ab<span class="bold">cd</span>ef"#);
        let tree = &doc.tree;
        let range = HostRange::new(Position::new(b, 0), Position::new(b, 3));
        let n = normalize(tree, b, &range).unwrap();
        assert_eq!(n.start, Position::new(tree.children(b)[0], 0));
        assert_eq!(n.end, Position::new(tree.children(b)[2], 2));
        assert_eq!(n.offsets(tree, b), (0, 6));
    }

    #[test]
    fn test_wrapper_endpoints_descend() {
        let (doc, b) = block(r#"ab<span class="bold">cd</span>ef"#);
        let tree = &doc.tree;
        let span = tree.children(b)[1];
        let inner = tree.children(span)[0];
        let range = HostRange::new(Position::new(span, 0), Position::new(span, 1));
        let n = normalize(tree, b, &range).unwrap();
        assert_eq!(n.start, Position::new(inner, 0));
        assert_eq!(n.end, Position::new(inner, 2));
    }

    #[test]
    fn test_break_endpoints_migrate() {
        let (doc, b) = block("ab<br/>cd");
        let tree = &doc.tree;
        let br = tree.children(b)[1];
        let range = HostRange::new(Position::new(br, 0), Position::new(br, 0));
        let n = normalize(tree, b, &range).unwrap();
        assert_eq!(n.start, Position::new(tree.children(b)[2], 0));
        assert_eq!(n.end, Position::new(tree.children(b)[0], 2));
    }

    #[test]
    fn test_rejections() {
        let (doc, b) = block(r#"x<span contenteditable="false">user</span>"#);
        let tree = &doc.tree;
        let embed_text = tree.children(tree.children(b)[1])[0];
        let inside = HostRange::new(Position::new(embed_text, 1), Position::new(embed_text, 2));
        assert_eq!(normalize(tree, b, &inside), Err(EditError::AtomicBoundary));

        let end_at_zero = HostRange::new(Position::new(b, 0), Position::new(b, 0));
        assert!(matches!(normalize(tree, b, &end_at_zero), Err(EditError::InvalidRange(_))));

        let past_end = HostRange::new(Position::new(b, 5), Position::new(b, 2));
        assert!(normalize(tree, b, &past_end).is_err());

        let stray = HostRange::new(Position::new(doc.root, 0), Position::new(b, 1));
        assert!(normalize(tree, b, &stray).is_err());
    }

    #[test]
    fn test_range_for_offsets() {
        let (doc, b) = block(r#"He<span class="bold">llo</span> world"#);
        let tree = &doc.tree;
        let range = range_for_offsets(tree, b, 1..4);
        let n = normalize(tree, b, &range).unwrap();
        assert_eq!(n.offsets(tree, b), (1, 4));
    }
}
