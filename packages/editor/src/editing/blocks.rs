//! Block type toggling.
//!
//! `toggle_block` only rewrites the type tag of the lowest blocks in the
//! selection. It never creates or removes list containers; list structure is
//! owned by [`lists`](super::lists).

use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::node::{BlockType, ElementKind, ElementProps};
use crate::selection::{blocks_in_range, nodes_in_range};

impl Editor {
    /// True if any block at or above the selection has type `kind`
    pub fn is_block_active(&self, kind: BlockType) -> bool {
        let Some(range) = self.selection() else {
            return false;
        };
        nodes_in_range(&self.tree, &range)
            .into_iter()
            .any(|node| self.tree.kind(node) == Some(ElementKind::Block(kind)))
    }

    /// Set the selected blocks to `kind`, or back to paragraphs if already active
    pub fn toggle_block(&mut self, kind: BlockType) -> EditorResult<()> {
        if kind.is_list() || kind == BlockType::ListItem {
            return Err(EditorError::invalid_operation(
                "list structure is changed with toggle_list",
            ));
        }
        if kind.is_void() {
            return Err(EditorError::invalid_operation(
                "void blocks are inserted, not toggled",
            ));
        }
        let Some(range) = self.selection() else {
            return Ok(());
        };

        let target = if self.is_block_active(kind) {
            BlockType::default()
        } else {
            kind
        };
        self.with_batch("toggle_block", |editor| {
            for block in blocks_in_range(&editor.tree, &range) {
                let Some(props) = editor.tree.element(block) else {
                    continue;
                };
                if props.is_void() {
                    continue;
                }
                let next = ElementProps {
                    kind: ElementKind::Block(target),
                    attributes: props.attributes.clone(),
                };
                editor.set_element_id(block, next)?;
            }
            Ok(())
        })
    }
}
