//! Block and cell addressing of the host selection.
//!
//! Host positions are mapped to `(block index, char offset)` pairs and back.
//! Table cells live inside non-editable blocks and are addressed on their own,
//! with offsets relative to the cell.

use crate::error::EditError;
use crate::offset_map::{offset_in_block, resolve_position};
use crate::platform::SelectionHost;
use crate::tree::{NodeId, NodeKind, Tree};
use crate::types::{BlockSelection, Position, Selection};

/// Index carried by a block node.
pub fn block_index(tree: &Tree, block: NodeId) -> Option<usize> {
    match tree.kind(block) {
        NodeKind::Block { index, .. } => Some(*index),
        _ => None,
    }
}

/// Nearest editable block at or above `node`, not looking past `root`.
pub fn find_block(tree: &Tree, root: NodeId, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        if current == root {
            return None;
        }
        if let NodeKind::Block { editable, .. } = tree.kind(current) {
            return editable.then_some(current);
        }
        current = tree.parent(current)?;
    }
}

/// First block under `root` carrying `index`, in document order.
pub fn block_by_index(tree: &Tree, root: NodeId, index: usize) -> Option<NodeId> {
    tree.descendants(root)
        .find(|&n| matches!(tree.kind(n), NodeKind::Block { index: i, .. } if *i == index))
}

fn editable_block(tree: &Tree, root: NodeId, index: usize) -> Result<NodeId, EditError> {
    block_by_index(tree, root, index)
        .filter(|&b| matches!(tree.kind(b), NodeKind::Block { editable: true, .. }))
        .ok_or(EditError::BlockNotFound(index))
}

fn locate(tree: &Tree, root: NodeId, at: Position) -> Option<(usize, usize)> {
    let block = find_block(tree, root, at.node)?;
    let index = block_index(tree, block)?;
    Some((index, offset_in_block(tree, block, at.node, at.offset)))
}

/// Host selection as block coordinates.
pub fn try_read_selection<H: SelectionHost + ?Sized>(
    tree: &Tree,
    root: NodeId,
    host: &H,
) -> Result<BlockSelection, EditError> {
    let current = host.selection().ok_or(EditError::NoSelection)?;
    let anchor = locate(tree, root, current.anchor).ok_or(EditError::NoSelection)?;
    let head = locate(tree, root, current.focus).ok_or(EditError::NoSelection)?;
    Ok(BlockSelection::new(anchor, head))
}

/// Host selection as block coordinates, `None` when either end is outside an
/// editable block.
pub fn read_selection<H: SelectionHost + ?Sized>(tree: &Tree, root: NodeId, host: &H) -> Option<BlockSelection> {
    try_read_selection(tree, root, host).ok()
}

pub fn try_set_cursor<H: SelectionHost + ?Sized>(
    tree: &Tree,
    root: NodeId,
    host: &mut H,
    block: usize,
    offset: usize,
) -> Result<(), EditError> {
    let node = editable_block(tree, root, block)?;
    host.collapse(resolve_position(tree, node, offset));
    Ok(())
}

/// Put a caret at `offset` in block `block`. Unknown blocks leave the host
/// selection as it was.
pub fn set_cursor<H: SelectionHost + ?Sized>(tree: &Tree, root: NodeId, host: &mut H, block: usize, offset: usize) {
    if let Err(err) = try_set_cursor(tree, root, host, block, offset) {
        tracing::debug!(target: "spindle::selection", %err, block, offset, "cursor not moved");
    }
}

pub fn try_set_selection<H: SelectionHost + ?Sized>(
    tree: &Tree,
    root: NodeId,
    host: &mut H,
    selection: &BlockSelection,
) -> Result<(), EditError> {
    let anchor_block = editable_block(tree, root, selection.anchor_block)?;
    let head_block = editable_block(tree, root, selection.head_block)?;
    let anchor = resolve_position(tree, anchor_block, selection.anchor_offset);
    let head = resolve_position(tree, head_block, selection.head_offset);
    host.select(anchor, head);
    Ok(())
}

/// Install `selection` on the host, keeping its direction.
pub fn set_selection<H: SelectionHost + ?Sized>(tree: &Tree, root: NodeId, host: &mut H, selection: &BlockSelection) {
    if let Err(err) = try_set_selection(tree, root, host, selection) {
        tracing::debug!(target: "spindle::selection", %err, ?selection, "selection not moved");
    }
}

/// Editable cell holding the selection anchor.
pub fn cell_from_selection<H: SelectionHost + ?Sized>(tree: &Tree, root: NodeId, host: &H) -> Option<NodeId> {
    let anchor = host.selection()?.anchor;
    std::iter::once(anchor.node)
        .chain(tree.ancestors(anchor.node))
        .take_while(|&n| n != root)
        .find(|&n| matches!(tree.kind(n), NodeKind::Cell { .. }))
}

/// Selection offsets relative to `cell`, when both ends lie inside it.
pub fn selection_in_cell<H: SelectionHost + ?Sized>(tree: &Tree, cell: NodeId, host: &H) -> Option<Selection> {
    let current = host.selection()?;
    if !tree.contains(cell, current.anchor.node) || !tree.contains(cell, current.focus.node) {
        return None;
    }
    Some(Selection::new(
        offset_in_block(tree, cell, current.anchor.node, current.anchor.offset),
        offset_in_block(tree, cell, current.focus.node, current.focus.offset),
    ))
}

pub fn set_selection_in_cell<H: SelectionHost + ?Sized>(tree: &Tree, cell: NodeId, host: &mut H, selection: Selection) {
    let anchor = resolve_position(tree, cell, selection.anchor);
    let head = resolve_position(tree, cell, selection.head);
    host.select(anchor, head);
}

/// Caret offset inside `cell`; `None` for ranged selections.
pub fn cursor_offset_in_cell<H: SelectionHost + ?Sized>(tree: &Tree, cell: NodeId, host: &H) -> Option<usize> {
    selection_in_cell(tree, cell, host)
        .filter(Selection::is_collapsed)
        .map(|s| s.head)
}

pub fn move_cursor_to_start<H: SelectionHost + ?Sized>(node: NodeId, host: &mut H) {
    host.collapse(Position::new(node, 0));
}

pub fn move_cursor_to_end<H: SelectionHost + ?Sized>(tree: &Tree, node: NodeId, host: &mut H) {
    let end = if tree.is_text(node) {
        tree.text_len(node)
    } else {
        tree.child_count(node)
    };
    host.collapse(Position::new(node, end));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Document;
    use crate::platform::LiveSelection;

    const DOC: &str = concat!(
        r#"<div data-block-index="0">Hello <span class="bold">big</span> world</div>"#,
        r#"<div data-block-index="1">ab<br/>cd</div>"#,
        r#"<table data-block-index="2" contenteditable="false"><tr>"#,
        r#"<td contenteditable="true" data-table-index="2">cell <span class="edt-i">text</span></td>"#,
        r#"</tr></table>"#,
    );

    #[test]
    fn test_read_then_set_selection_both_directions() {
        let doc = Document::parse(DOC).unwrap();
        for selection in [
            BlockSelection::new((0, 3), (1, 4)),
            BlockSelection::new((1, 4), (0, 3)),
            BlockSelection::new((1, 2), (1, 0)),
            BlockSelection::caret(0, 9),
        ] {
            let mut host = LiveSelection::new();
            set_selection(&doc.tree, doc.root, &mut host, &selection);
            assert_eq!(read_selection(&doc.tree, doc.root, &host), Some(selection));
        }
    }

    #[test]
    fn test_unknown_block_leaves_selection() {
        let doc = Document::parse(DOC).unwrap();
        let mut host = LiveSelection::new();
        set_cursor(&doc.tree, doc.root, &mut host, 1, 2);
        let before = host.clone();
        set_cursor(&doc.tree, doc.root, &mut host, 999, 0);
        assert_eq!(host, before);
        assert_eq!(
            try_set_cursor(&doc.tree, doc.root, &mut host, 2, 0),
            Err(EditError::BlockNotFound(2))
        );
        assert_eq!(
            read_selection(&doc.tree, doc.root, &host),
            Some(BlockSelection::caret(1, 2))
        );
    }

    #[test]
    fn test_selection_outside_blocks() {
        let doc = Document::parse(DOC).unwrap();
        let host = LiveSelection::with_selection(Position::new(doc.root, 0), Position::new(doc.root, 1));
        assert_eq!(read_selection(&doc.tree, doc.root, &host), None);
        assert_eq!(read_selection(&doc.tree, doc.root, &LiveSelection::new()), None);
    }

    #[test]
    fn test_cell_addressing() {
        let doc = Document::parse(DOC).unwrap();
        let tree = &doc.tree;
        let table = block_by_index(tree, doc.root, 2).unwrap();
        let cell = tree
            .descendants(table)
            .find(|&n| matches!(tree.kind(n), NodeKind::Cell { .. }))
            .unwrap();

        let mut host = LiveSelection::new();
        set_selection_in_cell(tree, cell, &mut host, Selection::new(7, 2));
        assert_eq!(cell_from_selection(tree, doc.root, &host), Some(cell));
        assert_eq!(selection_in_cell(tree, cell, &host), Some(Selection::new(7, 2)));
        assert_eq!(cursor_offset_in_cell(tree, cell, &host), None);
        // Cells sit in a non-editable block, so block addressing ignores them.
        assert_eq!(read_selection(tree, doc.root, &host), None);

        move_cursor_to_end(tree, cell, &mut host);
        assert_eq!(cursor_offset_in_cell(tree, cell, &host), Some(9));
        move_cursor_to_start(cell, &mut host);
        assert_eq!(cursor_offset_in_cell(tree, cell, &host), Some(0));

        set_cursor(tree, doc.root, &mut host, 0, 1);
        assert_eq!(cell_from_selection(tree, doc.root, &host), None);
        assert_eq!(selection_in_cell(tree, cell, &host), None);
    }
}
