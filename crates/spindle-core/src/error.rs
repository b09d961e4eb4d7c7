//! Error types for editing operations.

use thiserror::Error;

/// Why an editing or addressing operation did nothing.
///
/// The lenient entry points (`apply`, `set_cursor`, ...) swallow these after
/// logging them; the `try_*` variants hand them back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditError {
    /// Range endpoints could not be normalized to a pair of text leaves, or
    /// the range is empty.
    #[error("invalid range: {0}")]
    InvalidRange(&'static str),

    /// No block with this index under the editor root.
    #[error("no block with index {0}")]
    BlockNotFound(usize),

    /// Endpoint falls inside an atomic embed.
    #[error("position falls inside an atomic embed")]
    AtomicBoundary,

    /// The host reports no selection, or one outside any editable block.
    #[error("no selection inside an editable block")]
    NoSelection,
}
