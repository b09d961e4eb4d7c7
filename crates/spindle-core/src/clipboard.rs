//! Clipboard paste sanitizing.
//!
//! Pasted HTML is reduced to a flat list of runs: spans carrying allowed style
//! classes keep those classes, everything else becomes plain text.

use crate::config::PasteConfig;
use crate::markup::parse_into;
use crate::style::StyleSet;
use crate::traverse::InlineRun;
use crate::tree::{NodeId, NodeKind, Tree};

fn pasted_text(tree: &Tree, node: NodeId) -> String {
    tree.text_content(node).replace('\u{a0}', " ")
}

/// The `<body>` of a full clipboard document, or the fragment root.
fn content_root(tree: &Tree, root: NodeId) -> NodeId {
    tree.descendants(root)
        .skip(1)
        .find(|&n| matches!(tree.kind(n), NodeKind::Element { tag } if tag == "body"))
        .unwrap_or(root)
}

/// Reduce clipboard HTML to styled and plain runs.
///
/// Never fails: unparseable input keeps whatever was read before the error.
pub fn sanitize_paste(html: &str, config: &PasteConfig) -> Vec<InlineRun> {
    let mut scratch = Tree::new();
    let root = scratch.create(NodeKind::element("fragment"));
    if let Err(err) = parse_into(&mut scratch, root, html) {
        tracing::warn!(target: "spindle::clipboard", %err, "clipboard markup is malformed, keeping text read so far");
    }
    let body = content_root(&scratch, root);

    let mut runs: Vec<InlineRun> = Vec::new();
    let mut plain: Option<usize> = None;
    for &child in scratch.children(body) {
        let text = pasted_text(&scratch, child);
        if let Some(styles) = scratch.styles(child) {
            let kept: StyleSet = styles.iter().filter(|s| config.allows(s)).cloned().collect();
            if !kept.is_empty() {
                plain = None;
                runs.push(InlineRun::styled(text, kept));
                continue;
            }
        }
        match plain {
            Some(index) => runs[index].text.push_str(&text),
            None => {
                plain = Some(runs.len());
                runs.push(InlineRun::plain(text));
            }
        }
    }
    runs.retain(|run| !run.text.is_empty());

    if runs.is_empty() {
        let text = pasted_text(&scratch, body);
        if !text.is_empty() {
            runs.push(InlineRun::plain(text));
        }
    }
    tracing::debug!(target: "spindle::clipboard", runs = runs.len(), "sanitized paste");
    runs
}

/// Materialize runs as a detached fragment ready to insert into a block.
pub fn paste_fragment(tree: &mut Tree, runs: &[InlineRun]) -> NodeId {
    let fragment = tree.create(NodeKind::element("fragment"));
    for run in runs {
        let text = tree.create_text(run.text.clone());
        if run.styles.is_empty() {
            tree.append(fragment, text);
        } else {
            let wrapper = tree.create(NodeKind::wrapper(run.styles.clone()));
            tree.append(wrapper, text);
            tree.append(fragment, wrapper);
        }
    }
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::to_markup;

    fn paste(html: &str) -> Vec<InlineRun> {
        sanitize_paste(html, &PasteConfig::default())
    }

    #[test]
    fn test_keeps_allowed_classes_only() {
        let runs = paste(r#"plain <span class="edt-b foreign">bold</span><b>not</b> kept<span class="x">y</span>"#);
        assert_eq!(
            runs,
            [
                InlineRun::plain("plain "),
                InlineRun::styled("bold", StyleSet::single("edt-b")),
                InlineRun::plain("not kepty"),
            ]
        );
    }

    #[test]
    fn test_unwraps_document_and_spaces() {
        let html = concat!(
            "<html><head><meta charset=\"utf-8\"></head><body><!--StartFragment-->",
            "a&nbsp;b&#160;c<span class=\"edt-i edt-u\">d</span><!--EndFragment--></body></html>",
        );
        let runs = paste(html);
        assert_eq!(
            runs,
            [
                InlineRun::plain("a b c"),
                InlineRun::styled("d", StyleSet::from_classes("edt-u edt-i")),
            ]
        );
    }

    #[test]
    fn test_nested_markup_flattens() {
        let runs = paste(r#"<p>one <span class="edt-b">two</span></p>"#);
        assert_eq!(runs, [InlineRun::plain("one two")]);
    }

    #[test]
    fn test_malformed_input_degrades_to_text() {
        let runs = paste("before <span class=\"edt-b\">x</span> <a href=\"unterminated");
        assert_eq!(runs[0], InlineRun::plain("before "));
        assert_eq!(runs[1], InlineRun::styled("x", StyleSet::single("edt-b")));
        assert!(paste("").is_empty());
    }

    #[test]
    fn test_paste_fragment() {
        let mut tree = Tree::new();
        let runs = paste(r#"a<span class="edt-code">b</span>c"#);
        let fragment = paste_fragment(&mut tree, &runs);
        insta::assert_snapshot!(to_markup(&tree, fragment), @r#"a<span class="edt-code">b</span>c"#);
        assert_eq!(tree.parent(fragment), None);
    }
}
