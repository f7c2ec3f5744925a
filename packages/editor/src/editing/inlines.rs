//! Inline creation and removal. Inlines never nest: creating one over a
//! selection that already touches an inline does nothing.

use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::node::{ElementKind, ElementProps, InlineType, Node};
use crate::selection::{nodes_in_range, unhang_range, Anchor};
use crate::transforms::Split;

impl Editor {
    /// True if an inline of `kind` intersects the selection
    pub fn is_inline_active(&self, kind: InlineType) -> bool {
        let Some(range) = self.selection() else {
            return false;
        };
        nodes_in_range(&self.tree, &range)
            .into_iter()
            .any(|node| self.tree.kind(node) == Some(ElementKind::Inline(kind)))
    }

    /// Create an inline at the selection; returns whether one was created
    ///
    /// At a caret a new inline is inserted holding `text`, the configured
    /// placeholder for its type, or nothing for void types; the caret moves
    /// to its end. Over a range the covered text is wrapped, and void types
    /// drop the wrapped text.
    pub fn create_inline(&mut self, props: ElementProps, text: Option<&str>) -> EditorResult<bool> {
        let Some(kind) = props.kind.inline_type() else {
            return Err(EditorError::invalid_operation(
                "create_inline needs an inline element",
            ));
        };
        let Some(range) = self.selection() else {
            return Ok(false);
        };
        let range = unhang_range(&self.tree, &range);

        let nested = nodes_in_range(&self.tree, &range)
            .into_iter()
            .any(|node| self.tree.is_inline(node));
        let (start, end) = range.edges();
        let start = Anchor::from_point(&self.tree, start)?;
        let end = Anchor::from_point(&self.tree, end)?;
        let in_void = [start, end]
            .iter()
            .any(|anchor| self.tree.void_of(anchor.node).is_some());
        if nested || (range.is_collapsed() && in_void) {
            tracing::debug!(?kind, "create_inline skipped: selection touches an inline or void");
            return Ok(false);
        }

        if range.is_collapsed() {
            let content = if kind.is_void() {
                String::new()
            } else {
                text.or_else(|| self.config.placeholder(kind))
                    .unwrap_or_default()
                    .to_string()
            };
            self.with_batch("create_inline", |editor| {
                let leaf = start.node;
                let (parent, _) = editor.position_of(leaf)?;
                let right = editor.split_id(leaf, start.offset)?;
                let (_, index) = editor.position_of(right)?;
                let inline = editor.insert_id(parent, index, &Node::element(props, vec![Node::text(content)]))?;
                if let Some(text) = editor.tree.first_text(inline) {
                    let len = editor.tree.text_len(text);
                    editor.set_caret(text, len);
                }
                Ok(())
            })?;
            return Ok(true);
        }

        let backward = range.is_backward();
        self.with_batch("create_inline", |editor| {
            let wrappers = editor.wrap_range(&props, &range, Split::Exact)?;
            if props.is_void() {
                for wrapper in &wrappers {
                    for child in editor.tree.children(*wrapper).to_vec() {
                        editor.remove_id(child)?;
                    }
                    editor.insert_id(*wrapper, 0, &Node::text(""))?;
                }
            }

            let first = wrappers.first().and_then(|w| editor.tree.first_text(*w));
            let last = wrappers.last().and_then(|w| editor.tree.last_text(*w));
            match (first, last) {
                (Some(first), Some(_)) if props.is_void() => editor.set_caret(first, 0),
                (Some(first), Some(last)) => editor.select_leaves(first, last, backward),
                _ => {}
            }
            Ok(())
        })?;
        Ok(true)
    }

    /// Replace inlines of `kind` in the selection with their children
    pub fn unwrap_inline(&mut self, kind: InlineType) -> EditorResult<usize> {
        let Some(range) = self.selection() else {
            return Ok(0);
        };
        self.with_batch("unwrap_inline", |editor| {
            let target = ElementKind::Inline(kind);
            editor.unwrap_range(&range, &|props: &ElementProps| props.kind == target, Split::Whole)
        })
    }
}
