//! # Editing Algorithms
//!
//! High-level edits issued by keyboard commands and toolbar buttons. Each
//! one reads the selection, runs a batch of primitives, and leaves the
//! selection where the user expects it.
//!
//! - [`marks`]: active marks, toggling, exclusive groups, intensity cycles
//! - [`inlines`]: creating and removing inline wrappers
//! - [`blocks`]: block type toggling
//! - [`lists`]: list wrapping, conversion and item extraction
//! - [`breaks`]: line breaks and leaving trailing soft-break blocks
//! - [`text`]: typing and deletion
//!
//! With no selection, every algorithm is a silent no-op.

pub mod blocks;
pub mod breaks;
pub mod inlines;
pub mod lists;
pub mod marks;
pub mod text;

use crate::editor::Editor;
use crate::selection::{Anchor, Selection};
use crate::tree::NodeId;

impl Editor {
    pub(crate) fn set_caret(&mut self, node: NodeId, offset: usize) {
        self.selection = Some(Selection::caret(Anchor::new(node, offset)));
    }

    /// Select from the start of `first` to the end of `last`
    pub(crate) fn select_leaves(&mut self, first: NodeId, last: NodeId, backward: bool) {
        let start = Anchor::new(first, 0);
        let end = Anchor::new(last, self.tree.text_len(last));
        self.selection = Some(if backward {
            Selection::new(end, start)
        } else {
            Selection::new(start, end)
        });
    }

    /// Caret at the start of the first text below `node`
    pub(crate) fn caret_at_start_of(&mut self, node: NodeId) {
        if let Some(text) = self.tree.first_text(node) {
            self.set_caret(text, 0);
        }
    }

    /// The collapsed caret, if the selection is one
    pub(crate) fn caret(&self) -> Option<Anchor> {
        self.selection
            .filter(Selection::is_collapsed)
            .map(|selection| selection.anchor)
    }
}
