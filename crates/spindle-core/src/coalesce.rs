//! Canonicalizer restoring minimal wrapper structure after a style edit.

use crate::tree::{NodeId, Tree};

/// Merge adjacent text children of `parent` and drop empty ones.
fn merge_text_children(tree: &mut Tree, parent: NodeId) -> bool {
    let mut changed = false;
    let mut index = 0;
    while let Some(child) = tree.child(parent, index) {
        if tree.text(child).is_some_and(str::is_empty) {
            tree.detach(child);
            changed = true;
            continue;
        }
        if tree.is_text(child) {
            if let Some(next) = tree.child(parent, index + 1).filter(|&n| tree.is_text(n)) {
                let tail = tree.text(next).unwrap_or_default().to_owned();
                tree.push_text(child, &tail);
                tree.detach(next);
                changed = true;
                continue;
            }
        }
        index += 1;
    }
    changed
}

fn wrappers(tree: &Tree, block: NodeId) -> Vec<NodeId> {
    tree.children(block)
        .iter()
        .copied()
        .filter(|&c| tree.is_wrapper(c))
        .collect()
}

fn merge_text_in_wrappers(tree: &mut Tree, block: NodeId) -> bool {
    let mut changed = false;
    for wrapper in wrappers(tree, block) {
        changed |= merge_text_children(tree, wrapper);
    }
    changed
}

fn unwrap_unstyled(tree: &mut Tree, block: NodeId) -> bool {
    let mut changed = false;
    for wrapper in wrappers(tree, block) {
        if tree.styles(wrapper).is_some_and(|s| s.is_empty()) {
            tree.unwrap_node(wrapper);
            changed = true;
        }
    }
    changed
}

fn drop_empty_wrappers(tree: &mut Tree, block: NodeId) -> bool {
    let mut changed = false;
    for wrapper in wrappers(tree, block) {
        if tree.child_count(wrapper) == 0 {
            tree.detach(wrapper);
            changed = true;
        }
    }
    changed
}

fn merge_equal_wrappers(tree: &mut Tree, block: NodeId) -> bool {
    let mut changed = false;
    let mut index = 0;
    while let (Some(left), Some(right)) = (tree.child(block, index), tree.child(block, index + 1)) {
        let same = match (tree.styles(left), tree.styles(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if same {
            while let Some(child) = tree.first_child(right) {
                tree.append(left, child);
            }
            tree.detach(right);
            changed = true;
        } else {
            index += 1;
        }
    }
    changed
}

/// Bring the children of `block` back to canonical form.
///
/// Runs its passes until none of them changes anything. Returns whether the
/// tree was modified at all.
pub fn coalesce(tree: &mut Tree, block: NodeId) -> bool {
    let mut changed = false;
    let mut rounds = 0usize;
    loop {
        let pass = merge_text_in_wrappers(tree, block)
            | unwrap_unstyled(tree, block)
            | drop_empty_wrappers(tree, block)
            | merge_equal_wrappers(tree, block)
            | merge_text_children(tree, block);
        if !pass {
            break;
        }
        changed = true;
        rounds += 1;
    }
    if changed {
        tracing::trace!(target: "spindle::coalesce", %block, rounds, "coalesced");
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{Document, to_markup};
    use crate::style::StyleSet;
    use crate::tree::NodeKind;

    #[test]
    fn test_coalesce_merges_and_prunes() {
        let doc = Document::parse(
            r#"<div data-block-index="0">a<span class="bold">b</span><span class="bold">c</span><span class="italic"></span>d</div>"#,
        )
        .unwrap();
        let mut tree = doc.tree;
        let b = crate::selection::block_by_index(&tree, doc.root, 0).unwrap();
        let span = tree.children(b)[1];
        let extra = tree.create_text("");
        tree.append(span, extra);
        let more = tree.create_text("d");
        tree.append(b, more);

        assert!(coalesce(&mut tree, b));
        insta::assert_snapshot!(to_markup(&tree, b), @r#"a<span class="bold">bc</span>dd"#);
        assert!(!coalesce(&mut tree, b));
    }

    #[test]
    fn test_unwraps_unstyled_wrapper() {
        let mut tree = Tree::new();
        let block = tree.create(NodeKind::Block {
            tag: "div".into(),
            index: 0,
            editable: true,
        });
        let first = tree.create_text("x");
        let bare = tree.create(NodeKind::wrapper(StyleSet::new()));
        let inner = tree.create_text("y");
        tree.append(block, first);
        tree.append(block, bare);
        tree.append(bare, inner);

        assert!(coalesce(&mut tree, block));
        assert_eq!(tree.child_count(block), 1);
        assert_eq!(tree.text_content(block), "xy");
    }

    #[test]
    fn test_canonical_input_untouched() {
        let doc = Document::parse(
            r#"<div data-block-index="0">a<span class="bold">b<br/>c</span><span class="bold italic">d</span></div>"#,
        )
        .unwrap();
        let mut tree = doc.tree;
        let b = crate::selection::block_by_index(&tree, doc.root, 0).unwrap();
        let before = to_markup(&tree, b);
        assert!(!coalesce(&mut tree, b));
        assert_eq!(to_markup(&tree, b), before);
    }
}
