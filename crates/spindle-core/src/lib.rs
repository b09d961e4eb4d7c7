//! spindle-core: styled-block editing without a UI toolkit.
//!
//! This crate provides:
//! - `Tree` - the node arena standing in for the host surface
//! - offset mapping between block char offsets and host positions
//! - the style range engine (`apply`, `clear`, `styles`, `toggle`) and its
//!   canonicalizer
//! - block and table-cell addressing of the host selection via `SelectionHost`
//! - paste sanitizing, styled-run traversal and a markup adapter
//! - the `EmbedRenderer` interface for math and diagram embeds

pub mod clipboard;
pub mod coalesce;
pub mod config;
pub mod editor;
pub mod error;
pub mod format;
pub mod leaf;
pub mod lines;
pub mod markup;
pub mod offset_map;
pub mod platform;
pub mod range;
pub mod render;
pub mod selection;
pub mod style;
pub mod traverse;
pub mod tree;
pub mod types;

pub use clipboard::{paste_fragment, sanitize_paste};
pub use coalesce::coalesce;
pub use config::{EditorConfig, EmbedConfig, PasteConfig};
pub use editor::Editor;
pub use error::EditError;
pub use format::{
    apply, apply_offsets, clear, clear_offsets, styles, styles_offsets, toggle, toggle_offsets,
    try_apply, try_clear, try_styles,
};
pub use leaf::{embed_ancestor, first_leaf, last_leaf, next_leaf, prev_leaf};
pub use lines::{char_count, count_before, lines, node_length, text_length};
pub use markup::{Document, MarkupError, parse_into, to_markup};
pub use offset_map::{offset_in_block, position_offset, resolve_position};
pub use platform::{HostSelection, LiveSelection, SelectionHost};
pub use range::{NormalizedRange, normalize, range_for_offsets};
pub use render::{EmbedRenderer, RenderError, render_message};
pub use selection::{
    block_by_index, block_index, cell_from_selection, cursor_offset_in_cell, find_block,
    move_cursor_to_end, move_cursor_to_start, read_selection, selection_in_cell, set_cursor,
    set_selection, set_selection_in_cell, try_read_selection, try_set_cursor, try_set_selection,
};
pub use smol_str::SmolStr;
pub use style::StyleSet;
pub use traverse::{InlineEvent, InlineRun, bounded, clean, common_ancestor, is_at_end, is_at_start, runs};
pub use tree::{NodeId, NodeKind, Tree};
pub use types::{BlockSelection, HostRange, Position, Selection};
