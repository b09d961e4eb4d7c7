//! Line segmentation and char counting over a block.
//!
//! Offsets in a block count every char of every text leaf plus one per
//! non-trailing break. Nothing here is cached; each call walks the tree.

use crate::tree::{NodeId, NodeKind, Tree};

/// Split the text under `root` into lines at non-trailing breaks.
///
/// Always returns at least one (possibly empty) line. When `stop` is given the
/// walk halts as soon as it reaches that node, so only content strictly before
/// it in document order is collected.
pub fn lines(tree: &Tree, root: NodeId, stop: Option<NodeId>) -> Vec<String> {
    let mut lines = vec![String::new()];
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if Some(node) == stop {
            break;
        }
        match tree.kind(node) {
            NodeKind::Text(text) => {
                if let Some(line) = lines.last_mut() {
                    line.push_str(text);
                }
            }
            NodeKind::Break { trailing: true } => {}
            NodeKind::Break { trailing: false } => lines.push(String::new()),
            _ => stack.extend(tree.children(node).iter().rev().copied()),
        }
    }
    lines
}

/// Offset length of a line list: separators plus chars.
pub fn measure(lines: &[String]) -> usize {
    let chars: usize = lines.iter().map(|l| l.chars().count()).sum();
    lines.len().saturating_sub(1) + chars
}

/// Total offset length of a block.
pub fn char_count(tree: &Tree, block: NodeId) -> usize {
    measure(&lines(tree, block, None))
}

/// Offset length of everything in `block` before `stop`.
pub fn count_before(tree: &Tree, block: NodeId, stop: NodeId) -> usize {
    measure(&lines(tree, block, Some(stop)))
}

/// Offset length of the content under `node`, breaks included.
pub fn node_length(tree: &Tree, node: NodeId) -> usize {
    measure(&lines(tree, node, None))
}

/// Chars of all text under `node`; breaks do not count.
pub fn text_length(tree: &Tree, node: NodeId) -> usize {
    tree.descendants(node).map(|n| tree.text_len(n)).sum()
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
    fn test_lines_split_on_breaks() {
        let (doc, b) = block("ab<br/>cd");
        assert_eq!(lines(&doc.tree, b, None), ["ab", "cd"]);
        assert_eq!(char_count(&doc.tree, b), 5);
    }

    #[test]
    fn test_trailing_break_not_counted() {
        let (doc, b) = block("ab<br/><br data-trailing=\"\"/>");
        assert_eq!(lines(&doc.tree, b, None), ["ab", ""]);
        assert_eq!(char_count(&doc.tree, b), 3);
    }

    #[test]
    fn test_empty_block() {
        let (doc, b) = block("");
        assert_eq!(lines(&doc.tree, b, None), [""]);
        assert_eq!(char_count(&doc.tree, b), 0);
        assert_eq!(count_before(&doc.tree, b, b), 0);
    }

    #[test]
    fn test_count_before_stops_at_node() {
        let (doc, b) = block(r#"one<span class="bold">two<br/>three</span>four"#);
        let tree = &doc.tree;
        let span = tree.children(b)[1];
        let tail = tree.children(b)[2];
        assert_eq!(count_before(tree, b, span), 3);
        assert_eq!(count_before(tree, b, tail), 3 + 3 + 1 + 5);
        assert_eq!(text_length(tree, span), 8);
        assert_eq!(node_length(tree, span), 9);
        assert_eq!(char_count(tree, b), 16);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let (doc, b) = block("naïve ✓");
        assert_eq!(char_count(&doc.tree, b), 7);
    }
}
