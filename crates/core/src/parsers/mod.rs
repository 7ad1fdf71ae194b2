mod clojure;

pub use clojure::{ClojureReader, NodeKind, SourceNode};

use crate::models::TextRange;

/// Marker that starts a line comment
pub const LINE_COMMENT: &str = ";";

/// Marker that makes the reader skip the next form
pub const DISCARD_MARKER: &str = "#_";

/// Read-only view of a syntax node supplied by the host.
///
/// The scanner only walks the tree to find comment and discard regions; it
/// never takes ownership of nodes or mutates them. Ranges are absolute byte
/// offsets in the same coordinate space as the scan's `base_offset`.
pub trait SyntaxNode {
    /// Source text covered by this node
    fn text(&self) -> &str;

    /// Absolute byte range of this node
    fn text_range(&self) -> TextRange;

    /// Direct children, in document order
    fn children(&self) -> Vec<&dyn SyntaxNode>;

    /// Whether this node is a line comment region
    fn is_line_comment(&self) -> bool {
        self.text().starts_with(LINE_COMMENT)
    }

    /// Whether this node is a reader-discard (`#_form`) node
    fn is_discard_form(&self) -> bool {
        false
    }
}
