//! Markup adapter between HTML-like host fragments and the node arena.
//!
//! Parsing is lenient in the way browser markup needs: end tags need not
//! match, void elements (`<br>`, `<img>`, ...) never open a scope, attributes
//! may come without a value, and HTML named entities are decoded.

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use smol_str::SmolStr;
use thiserror::Error;

use crate::selection::block_by_index;
use crate::style::StyleSet;
use crate::tree::{NodeId, NodeKind, Tree};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MarkupError {
    /// The tokenizer gave up on the input.
    #[error("malformed markup near byte {position}: {message}")]
    Malformed { position: u64, message: String },
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Append text to `parent`, extending its last child when that is text.
fn push_text(tree: &mut Tree, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    match tree.last_child(parent).filter(|&c| tree.is_text(c)) {
        Some(last) => tree.push_text(last, text),
        None => {
            let node = tree.create_text(text);
            tree.append(parent, node);
        }
    }
}

fn element_kind(decoder: Decoder, start: &BytesStart<'_>) -> (SmolStr, NodeKind) {
    let tag: SmolStr = decoder
        .decode(start.name().as_ref())
        .map(|name| name.to_ascii_lowercase())
        .unwrap_or_default()
        .into();

    let mut classes = StyleSet::new();
    let mut editable = None;
    let mut block = None;
    let mut table = None;
    let mut trailing = false;
    for attr in start.html_attributes().flatten() {
        let Ok(key) = decoder.decode(attr.key.as_ref()) else {
            continue;
        };
        let value = decoder
            .decode(&attr.value)
            .map(|v| html_escape::decode_html_entities(&v).into_owned())
            .unwrap_or_default();
        match key.to_ascii_lowercase().as_str() {
            "class" => classes = StyleSet::from_classes(&value),
            "contenteditable" => editable = Some(!value.eq_ignore_ascii_case("false")),
            "data-block-index" => block = value.trim().parse::<usize>().ok(),
            "data-table-index" => table = value.trim().parse::<usize>().ok(),
            "data-trailing" => trailing = true,
            _ => {}
        }
    }

    let kind = match (tag.as_str(), block, table, editable) {
        ("br", ..) => NodeKind::Break { trailing },
        (_, Some(index), _, _) => NodeKind::Block {
            tag: tag.clone(),
            index,
            editable: editable != Some(false),
        },
        (_, None, Some(index), Some(true)) => NodeKind::Cell {
            tag: tag.clone(),
            index,
        },
        (_, None, _, Some(false)) => NodeKind::Embed { tag: tag.clone() },
        ("span", ..) if !classes.is_empty() => NodeKind::Wrapper { styles: classes },
        _ => NodeKind::Element { tag: tag.clone() },
    };
    (tag, kind)
}

fn malformed(reader: &Reader<&[u8]>, message: impl ToString) -> MarkupError {
    MarkupError::Malformed {
        position: reader.buffer_position() as u64,
        message: message.to_string(),
    }
}

/// Parse `markup` and append the resulting nodes to `parent`.
///
/// On error, everything read up to that point stays in the tree.
pub fn parse_into(tree: &mut Tree, parent: NodeId, markup: &str) -> Result<(), MarkupError> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut open: Vec<(SmolStr, NodeId)> = Vec::new();
    loop {
        let current = open.last().map_or(parent, |&(_, id)| id);
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let (tag, kind) = element_kind(reader.decoder(), &e);
                let node = tree.create(kind);
                tree.append(current, node);
                if !is_void(&tag) {
                    open.push((tag, node));
                }
            }
            Ok(Event::Empty(e)) => {
                let (_, kind) = element_kind(reader.decoder(), &e);
                let node = tree.create(kind);
                tree.append(current, node);
            }
            Ok(Event::End(e)) => {
                let name = reader
                    .decoder()
                    .decode(e.name().as_ref())
                    .map(|n| n.to_ascii_lowercase())
                    .unwrap_or_default();
                if let Some(at) = open.iter().rposition(|(tag, _)| tag.as_str() == name) {
                    open.truncate(at);
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.decode().map_err(|err| malformed(&reader, err))?;
                push_text(tree, current, &text);
            }
            Ok(Event::CData(e)) => {
                let text = reader.decoder().decode(&e).map_err(|err| malformed(&reader, err))?;
                push_text(tree, current, &text);
            }
            Ok(Event::GeneralRef(e)) => {
                let name = e.decode().map_err(|err| malformed(&reader, err))?;
                let entity = format!("&{name};");
                push_text(tree, current, &html_escape::decode_html_entities(&entity));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(malformed(&reader, err)),
        }
    }
    Ok(())
}

fn open_tag(out: &mut String, tag: &str, attrs: &[(&str, String)]) {
    out.push('<');
    out.push_str(tag);
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');
}

fn write_node(tree: &Tree, node: NodeId, out: &mut String) {
    let (tag, attrs): (&str, Vec<(&str, String)>) = match tree.kind(node) {
        NodeKind::Text(text) => {
            out.push_str(&html_escape::encode_text(text));
            return;
        }
        NodeKind::Break { trailing: false } => {
            out.push_str("<br>");
            return;
        }
        NodeKind::Break { trailing: true } => {
            out.push_str("<br data-trailing=\"\">");
            return;
        }
        NodeKind::Wrapper { styles } => ("span", vec![("class", styles.to_string())]),
        NodeKind::Embed { tag } => (tag.as_str(), vec![("contenteditable", "false".into())]),
        NodeKind::Block { tag, index, editable } => {
            let mut attrs = vec![("data-block-index", index.to_string())];
            if !editable {
                attrs.push(("contenteditable", "false".into()));
            }
            (tag.as_str(), attrs)
        }
        NodeKind::Cell { tag, index } => (
            tag.as_str(),
            vec![
                ("contenteditable", "true".into()),
                ("data-table-index", index.to_string()),
            ],
        ),
        NodeKind::Element { tag } => (tag.as_str(), Vec::new()),
    };
    open_tag(out, tag, &attrs);
    for &child in tree.children(node) {
        write_node(tree, child, out);
    }
    if !is_void(tag) {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

/// Serialize the children of `node` (its inner markup).
pub fn to_markup(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(node) {
        write_node(tree, child, &mut out);
    }
    out
}

/// A tree parsed from markup under a fresh editor root.
#[derive(Clone, Debug)]
pub struct Document {
    pub tree: Tree,
    pub root: NodeId,
}

impl Document {
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        let mut tree = Tree::new();
        let root = tree.create(NodeKind::element("div"));
        parse_into(&mut tree, root, markup)?;
        Ok(Self { tree, root })
    }

    /// Block with the given index, in document order.
    pub fn block(&self, index: usize) -> Option<NodeId> {
        block_by_index(&self.tree, self.root, index)
    }

    /// Inner markup of the editor root.
    pub fn to_markup(&self) -> String {
        to_markup(&self.tree, self.root)
    }
}
