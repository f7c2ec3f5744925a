//! Typing and deletion at the selection.

use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::node::{BlockType, ElementKind, Node};
use crate::path::Range;
use crate::selection::Anchor;
use crate::tree::NodeId;
use std::cmp::Ordering;
use std::collections::HashSet;

impl Editor {
    /// Type `text` at the selection, replacing an expanded selection
    ///
    /// Pending marks, when set, apply to the typed text.
    pub fn insert_text(&mut self, text: &str) -> EditorResult<()> {
        if self.selection.is_none() || text.is_empty() {
            return Ok(());
        }
        let pending = self.pending_marks.clone();
        self.with_batch("insert_text", |editor| {
            editor.delete_selected_fragment()?;
            let Some(caret) = editor.caret() else {
                return Ok(());
            };
            if editor.tree.void_of(caret.node).is_some() {
                return Err(EditorError::invalid_operation("void nodes are not text-editable"));
            }

            match pending {
                Some(marks) if editor.tree.marks(caret.node) != Some(&marks) => {
                    let (parent, _) = editor.position_of(caret.node)?;
                    let right = editor.split_id(caret.node, caret.offset)?;
                    let (_, index) = editor.position_of(right)?;
                    let leaf = editor.insert_id(parent, index, &Node::marked(text, marks))?;
                    let len = editor.tree.text_len(leaf);
                    editor.set_caret(leaf, len);
                    Ok(())
                }
                _ => editor.insert_text_id(caret.node, caret.offset, text),
            }
        })
    }

    /// Delete the expanded selection, leaving a caret at its start
    pub fn delete_fragment(&mut self) -> EditorResult<()> {
        if !self.selection.is_some_and(|selection| !selection.is_collapsed()) {
            return Ok(());
        }
        self.with_batch("delete_fragment", |editor| editor.delete_selected_fragment())
    }

    /// Delete one character before the caret, or join with the previous block
    pub fn delete_backward(&mut self) -> EditorResult<()> {
        let Some(selection) = self.selection else {
            return Ok(());
        };
        if !selection.is_collapsed() {
            return self.delete_fragment();
        }
        let caret = selection.anchor;

        self.with_batch("delete_backward", |editor| {
            if let Some(void) = editor.tree.void_of(caret.node) {
                return editor.remove_id(void);
            }
            if caret.offset > 0 {
                return editor.remove_text_id(caret.node, caret.offset - 1, 1);
            }

            let Some(previous) = editor.tree.previous_text(caret.node) else {
                return Ok(());
            };
            let block = editor.tree.block_of(caret.node);
            if editor.tree.block_of(previous) == block {
                if let Some(void) = editor.tree.void_of(previous) {
                    return editor.remove_id(void);
                }
                let len = editor.tree.text_len(previous);
                return match len {
                    0 => Ok(()),
                    _ => editor.remove_text_id(previous, len - 1, 1),
                };
            }

            let (Some(block), Some(previous_block)) = (block, editor.tree.block_of(previous)) else {
                return Ok(());
            };
            editor.join_with_previous(block, previous_block)
        })
    }

    /// Backspace at the start of `block` when `previous_block` precedes it
    fn join_with_previous(&mut self, block: NodeId, previous_block: NodeId) -> EditorResult<()> {
        let mut target = previous_block;
        if self.is_spacer(target) {
            match self.tree.previous_text(target).and_then(|text| self.tree.block_of(text)) {
                Some(before) if self.tree.is_void(before) && !self.is_spacer(before) => target = before,
                Some(_) | None => return Ok(()),
            }
        }
        if self.tree.is_void(target) {
            return self.remove_id(target);
        }
        self.merge_blocks(target, block)
    }

    fn is_spacer(&self, node: NodeId) -> bool {
        self.tree.kind(node) == Some(ElementKind::Block(BlockType::VoidSpacer))
    }

    /// Move the content of `from` to the end of `into`, then remove `from`
    fn merge_blocks(&mut self, into: NodeId, from: NodeId) -> EditorResult<()> {
        for child in self.tree.children(from).to_vec() {
            let end = self.tree.children(into).len();
            self.move_id(child, into, end)?;
        }
        self.remove_id(from)
    }

    /// Remove the expanded selection's content inside the current batch
    pub(crate) fn delete_selected_fragment(&mut self) -> EditorResult<()> {
        let Some(range) = self.selection() else {
            return Ok(());
        };
        if range.is_collapsed() {
            return Ok(());
        }
        let (start, end) = range.edges();
        let start = Anchor::from_point(&self.tree, start)?;
        let end = Anchor::from_point(&self.tree, end)?;
        self.set_caret(start.node, start.offset);

        if start.node == end.node {
            if self.tree.void_of(start.node).is_none() {
                self.remove_text_id(start.node, start.offset, end.offset - start.offset)?;
            }
            return Ok(());
        }

        let start_void = self.tree.void_of(start.node);
        let end_void = self.tree.void_of(end.node);
        if end_void.is_none() {
            self.remove_text_id(end.node, 0, end.offset)?;
        }
        if start_void.is_none() {
            let len = self.tree.text_len(start.node);
            self.remove_text_id(start.node, start.offset, len - start.offset)?;
        }

        for node in self.nodes_between(start.node, end.node, &range).into_iter().rev() {
            self.remove_id(node)?;
        }

        let (Some(start_block), Some(end_block)) =
            (self.tree.block_of(start.node), self.tree.block_of(end.node))
        else {
            return Ok(());
        };
        if start_block == end_block {
            return Ok(());
        }

        if self.tree.is_void(start_block) {
            self.remove_id(start_block)?;
            self.caret_at_start_of(end_block);
        } else if self.tree.is_void(end_block) {
            self.remove_id(end_block)?;
            self.set_caret(start.node, start.offset);
        } else {
            self.merge_blocks(start_block, end_block)?;
            self.set_caret(start.node, start.offset);
        }
        Ok(())
    }

    /// Maximal subtrees strictly between two leaves, in document order
    fn nodes_between(&self, first: NodeId, last: NodeId, range: &Range) -> Vec<NodeId> {
        let (start, end) = range.edges();
        let mut taken: HashSet<NodeId> = HashSet::new();
        let mut result = Vec::new();

        for node in self.tree.descendants(self.tree.root()) {
            if node == self.tree.root() || node == first || self.tree.is_ancestor_or_self(node, last) {
                continue;
            }
            if self.tree.parent(node).is_some_and(|parent| taken.contains(&parent)) {
                taken.insert(node);
                continue;
            }
            let Some(path) = self.tree.path_of(node) else {
                continue;
            };
            if path.compare(&start.path) == Ordering::Greater && path.compare(&end.path) == Ordering::Less {
                taken.insert(node);
                result.push(node);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EditorConfig;
    use crate::editor::Editor;
    use crate::errors::EditorError;
    use crate::node::{BlockType, ElementKind, Node};
    use crate::path::{Point, Range};

    fn load(doc: Vec<Node>, range: Range) -> Editor {
        Editor::load(doc, Some(range), EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_insert_text_at_caret() {
        let mut editor = load(vec![Node::paragraph("ac")], Range::collapsed(Point::new([0, 0], 1)));
        editor.insert_text("b").unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("abc")]);
        assert_eq!(editor.selection(), Some(Range::collapsed(Point::new([0, 0], 2))));
    }

    #[test]
    fn test_insert_text_replaces_range() {
        let range = Range::new(Point::new([0, 0], 1), Point::new([1, 0], 1));
        let mut editor = load(vec![Node::paragraph("abc"), Node::paragraph("xyz")], range);
        editor.insert_text("-").unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("a-yz")]);
    }

    #[test]
    fn test_insert_text_refuses_void() {
        let doc = vec![Node::void(ElementKind::Block(BlockType::Image))];
        let mut editor = load(doc, Range::collapsed(Point::new([0, 0], 0)));
        let before = editor.save();
        assert!(matches!(editor.insert_text("x"), Err(EditorError::InvalidOperation(_))));
        assert_eq!(editor.save(), before);
    }

    #[test]
    fn test_delete_fragment_across_blocks() {
        let range = Range::new(Point::new([2, 0], 1), Point::new([0, 0], 2));
        let doc = vec![Node::paragraph("hello"), Node::paragraph("middle"), Node::paragraph("end")];
        let mut editor = load(doc, range);
        editor.delete_fragment().unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("hend")]);
        assert_eq!(editor.selection(), Some(Range::collapsed(Point::new([0, 0], 2))));
    }

    #[test]
    fn test_delete_backward_joins_blocks() {
        let doc = vec![Node::paragraph("ab"), Node::paragraph("cd")];
        let mut editor = load(doc, Range::collapsed(Point::new([1, 0], 0)));
        editor.delete_backward().unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("abcd")]);
        assert_eq!(editor.selection(), Some(Range::collapsed(Point::new([0, 0], 2))));

        editor.delete_backward().unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("acd")]);
    }

    #[test]
    fn test_delete_backward_removes_image_behind_spacer() {
        let doc = vec![
            Node::paragraph("a"),
            Node::void(ElementKind::Block(BlockType::Image)),
            Node::paragraph("b"),
        ];
        // [a, spacer, image, spacer, b]
        let mut editor = load(doc, Range::collapsed(Point::new([2, 0], 0)));
        editor.select_point(Point::new([4, 0], 0)).unwrap();
        editor.delete_backward().unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("a"), Node::paragraph("b")]);
    }
}
