//! Style range engine: apply, clear and query inline styles over a char range.
//!
//! Every mutation splits text leaves at the range boundaries, re-parents the
//! pieces into wrappers, then hands the block to [`coalesce`] and re-derives
//! the range from the absolute offsets read up front, because the host nodes the
//! caller passed in may no longer exist in the same shape.

use std::ops::Range;

use crate::coalesce::coalesce;
use crate::error::EditError;
use crate::range::{normalize, range_for_offsets};
use crate::style::StyleSet;
use crate::tree::{NodeId, NodeKind, Tree};
use crate::types::{HostRange, Position};

/// Which half of a split wrapper the caller keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Keep {
    Left,
    Right,
}

fn wrapper_has(tree: &Tree, node: NodeId, tag: &str) -> bool {
    tree.styles(node).is_some_and(|s| s.contains(tag))
}

fn copy_wrapper(tree: &mut Tree, of: NodeId) -> NodeId {
    let styles = tree.styles(of).cloned().unwrap_or_default();
    tree.create(NodeKind::wrapper(styles))
}

/// Remove `tag` from a wrapper, dissolving it once no style is left.
fn unstyle(tree: &mut Tree, wrapper: NodeId, tag: &str) {
    let emptied = match tree.styles_mut(wrapper) {
        Some(styles) => {
            styles.remove(tag);
            styles.is_empty()
        }
        None => false,
    };
    if emptied {
        tree.unwrap_node(wrapper);
    }
}

/// Fold text siblings following `node` (up to, not including, `stop`) into it.
fn absorb_following_text(tree: &mut Tree, node: NodeId, stop: NodeId) {
    while let Some(next) = tree.next_sibling(node).filter(|&n| n != stop && tree.is_text(n)) {
        let tail = tree.text(next).unwrap_or_default().to_owned();
        tree.push_text(node, &tail);
        tree.detach(next);
    }
}

/// Fold text siblings preceding `node` into it.
fn absorb_preceding_text(tree: &mut Tree, node: NodeId) {
    while let Some(prev) = tree.prev_sibling(node).filter(|&n| tree.is_text(n)) {
        let mut text = tree.text(prev).unwrap_or_default().to_owned();
        text.push_str(tree.text(node).unwrap_or_default());
        tree.set_text(node, text);
        tree.detach(prev);
    }
}

/// Give `child` a wrapper of its own, copying its wrapper's styles.
///
/// Siblings after `child` move into a trailing copy so that document order is
/// kept. Returns the wrapper now holding only `child`.
fn isolate(tree: &mut Tree, child: NodeId) -> NodeId {
    let Some(span) = tree.parent(child) else {
        return child;
    };
    if tree.child_count(span) == 1 {
        return span;
    }
    if let Some(next) = tree.next_sibling(child) {
        let tail = copy_wrapper(tree, span);
        tree.insert_after(span, tail);
        tree.move_run(next, tail);
    }
    if tree.child_count(span) == 1 {
        return span;
    }
    let own = copy_wrapper(tree, span);
    tree.insert_after(span, own);
    tree.append(own, child);
    own
}

/// Split the wrapper around `child` at char `at` of it.
///
/// Returns the wrapper itself when the split point is at its outer edge or
/// `child` is not text; otherwise the half named by `keep`.
fn split_wrapper_at(tree: &mut Tree, child: NodeId, at: usize, keep: Keep) -> Option<NodeId> {
    let parent = tree.parent(child)?;
    if !tree.is_text(child)
        || (tree.prev_sibling(child).is_none() && at == 0)
        || (tree.next_sibling(child).is_none() && at >= tree.text_len(child))
    {
        return Some(parent);
    }
    let tail = tree.split_text(child, at);
    let right = copy_wrapper(tree, parent);
    tree.insert_after(parent, right);
    tree.move_run(tail, right);
    Some(match keep {
        Keep::Left => parent,
        Keep::Right => right,
    })
}

/// Apply `tag` to `range`, returning the re-derived range.
pub fn try_apply(tree: &mut Tree, block: NodeId, range: &HostRange, tag: &str) -> Result<HostRange, EditError> {
    let normalized = normalize(tree, block, range)?;
    let (left, right) = normalized.offsets(tree, block);
    if left >= right {
        return Err(EditError::InvalidRange("empty range"));
    }
    let Position { node: mut ln, offset: lnp } = normalized.start;
    let Position { node: mut rn, offset: rnp } = normalized.end;

    if ln == rn {
        if rnp < tree.text_len(rn) {
            tree.split_text(rn, rnp);
        }
        if lnp > 0 {
            ln = tree.split_text(ln, lnp);
        }
        rn = ln;
    } else {
        if lnp > 0 {
            ln = tree.split_text(ln, lnp);
        }
        if rnp < tree.text_len(rn) {
            tree.split_text(rn, rnp);
        }
    }

    let same = ln == rn;
    if tree.parent(ln) != Some(block) {
        if !same {
            absorb_following_text(tree, ln, rn);
        }
        ln = isolate(tree, ln);
        if same {
            rn = ln;
        }
    }
    if tree.parent(rn) != Some(block) {
        absorb_preceding_text(tree, rn);
        rn = isolate(tree, rn);
    }

    let mut run: Option<NodeId> = None;
    let mut cursor = Some(ln);
    while let Some(node) = cursor {
        let last = node == rn;
        cursor = tree.next_sibling(node);
        match tree.kind(node) {
            NodeKind::Text(_) => {
                let wrapper = match run {
                    Some(wrapper) => wrapper,
                    None => {
                        let wrapper = tree.create(NodeKind::wrapper(StyleSet::single(tag)));
                        tree.insert_before(node, wrapper);
                        run = Some(wrapper);
                        wrapper
                    }
                };
                tree.append(wrapper, node);
            }
            NodeKind::Wrapper { .. } => {
                run = None;
                if let Some(styles) = tree.styles_mut(node) {
                    styles.insert(tag);
                }
            }
            _ => run = None,
        }
        if last {
            break;
        }
    }

    coalesce(tree, block);
    tracing::debug!(target: "spindle::format", tag, left, right, "applied style");
    Ok(range_for_offsets(tree, block, left..right))
}

/// Remove `tag` from `range`, returning the re-derived range.
pub fn try_clear(tree: &mut Tree, block: NodeId, range: &HostRange, tag: &str) -> Result<HostRange, EditError> {
    let normalized = normalize(tree, block, range)?;
    let (left, right) = normalized.offsets(tree, block);
    if left >= right {
        return Err(EditError::InvalidRange("empty range"));
    }
    let Position { node: ln, offset: lnp } = normalized.start;
    let Position { node: rn, offset: rnp } = normalized.end;

    if ln == rn {
        let Some(parent) = tree.parent(ln).filter(|&p| wrapper_has(tree, p, tag)) else {
            return Ok(*range);
        };
        if rnp < tree.text_len(rn) {
            let tail = tree.split_text(rn, rnp);
            let after = copy_wrapper(tree, parent);
            tree.insert_after(parent, after);
            tree.move_run(tail, after);
        }
        if lnp > 0 {
            let middle = tree.split_text(ln, lnp);
            let before = copy_wrapper(tree, parent);
            tree.insert_before(parent, before);
            while let Some(first) = tree.first_child(parent).filter(|&c| c != middle) {
                tree.append(before, first);
            }
        }
        unstyle(tree, parent, tag);
    } else {
        let from = match tree.parent(ln) {
            Some(parent) if parent != block && wrapper_has(tree, parent, tag) => {
                if tree.next_sibling(ln).is_none() && lnp >= tree.text_len(ln) {
                    tree.next_sibling(parent)
                } else {
                    split_wrapper_at(tree, ln, lnp, Keep::Right)
                }
            }
            Some(parent) if parent != block => Some(parent),
            _ => Some(ln),
        };
        let to = match tree.parent(rn) {
            Some(parent) if parent != block && wrapper_has(tree, parent, tag) => {
                if tree.prev_sibling(rn).is_none() && rnp == 0 {
                    tree.prev_sibling(parent)
                } else {
                    split_wrapper_at(tree, rn, rnp, Keep::Left)
                }
            }
            Some(parent) if parent != block => Some(parent),
            _ => Some(rn),
        };

        if let (Some(from), Some(to)) = (from, to) {
            let ordered = match (tree.index_in_parent(from), tree.index_in_parent(to)) {
                (Some(a), Some(b)) => a <= b && tree.parent(from) == tree.parent(to),
                _ => false,
            };
            if ordered {
                let mut cursor = Some(from);
                while let Some(node) = cursor {
                    let last = node == to;
                    cursor = tree.next_sibling(node);
                    if wrapper_has(tree, node, tag) {
                        unstyle(tree, node, tag);
                    }
                    if last {
                        break;
                    }
                }
            }
        }
    }

    coalesce(tree, block);
    tracing::debug!(target: "spindle::format", tag, left, right, "cleared style");
    Ok(range_for_offsets(tree, block, left..right))
}

/// Styles carried by every char of `range`, or the reason there are none.
pub fn try_styles(tree: &Tree, block: NodeId, range: &HostRange) -> Result<StyleSet, EditError> {
    let normalized = normalize(tree, block, range)?;
    let Position { node: ln, offset: lnp } = normalized.start;
    let Position { node: rn, offset: rnp } = normalized.end;

    // Lift endpoints to block children, stepping over wrapper edges the
    // range only touches.
    let mut from = match tree.parent(ln) {
        Some(parent) if parent != block => {
            if tree.next_sibling(ln).is_none() && lnp >= tree.text_len(ln) {
                tree.next_sibling(parent)
            } else {
                Some(parent)
            }
        }
        _ => Some(ln),
    };
    let mut to = match tree.parent(rn) {
        Some(parent) if parent != block => {
            if tree.prev_sibling(rn).is_none() && rnp == 0 {
                tree.prev_sibling(parent)
            } else {
                Some(parent)
            }
        }
        _ => Some(rn),
    };

    if from.is_some_and(|n| tree.is_text(n)) && from == Some(ln) && lnp >= tree.text_len(ln) {
        from = tree.next_sibling(ln);
    }
    if to.is_some_and(|n| tree.is_text(n)) && to == Some(rn) && rnp == 0 {
        to = tree.prev_sibling(rn);
    }

    let (Some(from), Some(to)) = (from, to) else {
        return Ok(StyleSet::new());
    };

    let mut common: Option<StyleSet> = None;
    let mut cursor = Some(from);
    while let Some(node) = cursor {
        match tree.kind(node) {
            NodeKind::Text(_) => return Ok(StyleSet::new()),
            NodeKind::Wrapper { styles } => match common.as_mut() {
                Some(acc) => acc.retain_common(styles),
                None => common = Some(styles.clone()),
            },
            _ => {}
        }
        if node == to {
            break;
        }
        cursor = tree.next_sibling(node);
        if cursor.is_none() {
            return Ok(StyleSet::new());
        }
    }
    Ok(common.unwrap_or_default())
}

/// Apply `tag` over `range`.
///
/// Ranges that cannot be normalized, or are empty, leave the tree untouched
/// and come back unchanged.
pub fn apply(tree: &mut Tree, block: NodeId, range: &HostRange, tag: &str) -> HostRange {
    try_apply(tree, block, range, tag).unwrap_or_else(|err| {
        tracing::debug!(target: "spindle::format", %err, tag, "apply skipped");
        *range
    })
}

/// Remove `tag` from `range`. Unmodified range on failure, like [`apply`].
pub fn clear(tree: &mut Tree, block: NodeId, range: &HostRange, tag: &str) -> HostRange {
    try_clear(tree, block, range, tag).unwrap_or_else(|err| {
        tracing::debug!(target: "spindle::format", %err, tag, "clear skipped");
        *range
    })
}

/// Intersection of the styles over `range`; empty when unstyled text is
/// covered or the range is invalid.
pub fn styles(tree: &Tree, block: NodeId, range: &HostRange) -> StyleSet {
    try_styles(tree, block, range).unwrap_or_else(|err| {
        tracing::trace!(target: "spindle::format", %err, "no styles for range");
        StyleSet::new()
    })
}

/// Clear `tag` if the whole range carries it, apply it otherwise.
pub fn toggle(tree: &mut Tree, block: NodeId, range: &HostRange, tag: &str) -> HostRange {
    if styles(tree, block, range).contains(tag) {
        clear(tree, block, range, tag)
    } else {
        apply(tree, block, range, tag)
    }
}

pub fn apply_offsets(tree: &mut Tree, block: NodeId, offsets: Range<usize>, tag: &str) -> HostRange {
    let range = range_for_offsets(tree, block, offsets);
    apply(tree, block, &range, tag)
}

pub fn clear_offsets(tree: &mut Tree, block: NodeId, offsets: Range<usize>, tag: &str) -> HostRange {
    let range = range_for_offsets(tree, block, offsets);
    clear(tree, block, &range, tag)
}

pub fn styles_offsets(tree: &Tree, block: NodeId, offsets: Range<usize>) -> StyleSet {
    let range = range_for_offsets(tree, block, offsets);
    styles(tree, block, &range)
}

pub fn toggle_offsets(tree: &mut Tree, block: NodeId, offsets: Range<usize>, tag: &str) -> HostRange {
    let range = range_for_offsets(tree, block, offsets);
    toggle(tree, block, &range, tag)
}
