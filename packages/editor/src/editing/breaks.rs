//! Line breaks and arrow-out.
//!
//! Soft-break blocks (code by default) keep line breaks as `\n` in their
//! text instead of splitting. When such a block is the last one in the
//! document, moving down from its last line appends a paragraph so the
//! caret is not trapped.

use crate::editor::Editor;
use crate::errors::EditorResult;
use crate::node::Node;
use crate::selection::Anchor;

impl Editor {
    /// Split the current block at the caret, or insert `\n` in soft-break blocks
    ///
    /// An expanded selection is deleted first. On a void block a new
    /// paragraph is inserted after it.
    pub fn insert_break(&mut self) -> EditorResult<()> {
        if self.selection.is_none() {
            return Ok(());
        }
        self.with_batch("insert_break", |editor| {
            editor.delete_selected_fragment()?;
            let Some(caret) = editor.caret() else {
                return Ok(());
            };

            let soft_break = editor
                .tree
                .parent(caret.node)
                .and_then(|parent| editor.tree.kind(parent))
                .is_some_and(|kind| editor.config.is_soft_break(kind));
            if soft_break {
                return editor.insert_text_id(caret.node, caret.offset, "\n");
            }

            if let Some(void) = editor.tree.void_of(caret.node) {
                return editor.break_after_void(void);
            }

            let height = editor.height_to_block(caret);
            let block = editor.split_at(caret, height)?;
            editor.caret_at_start_of(block);
            Ok(())
        })
    }

    /// Levels between a leaf and its block, the block included
    fn height_to_block(&self, caret: Anchor) -> usize {
        let mut height = 0;
        let mut current = caret.node;
        while let Some(parent) = self.tree.parent(current) {
            height += 1;
            if self.tree.is_block(parent) {
                break;
            }
            current = parent;
        }
        height
    }

    fn break_after_void(&mut self, void: crate::tree::NodeId) -> EditorResult<()> {
        if self.tree.is_block(void) {
            let (parent, index) = self.position_of(void)?;
            let paragraph = self.insert_id(parent, index + 1, &Node::paragraph(""))?;
            self.caret_at_start_of(paragraph);
            return Ok(());
        }

        // Void inline: split its block right after it
        let (parent, index) = self.position_of(void)?;
        let mut container = parent;
        let mut position = index + 1;
        while !self.tree.is_block(container) {
            let (up, at) = self.position_of(container)?;
            position = at + 1;
            container = up;
        }
        let block = self.split_id(container, position)?;
        if self.tree.children(block).is_empty() {
            self.insert_id(block, 0, &Node::text(""))?;
        }
        self.caret_at_start_of(block);
        Ok(())
    }

    /// Append a paragraph after a trailing soft-break block when the caret
    /// is on its last line; returns whether one was added
    ///
    /// The selection is left where it is.
    pub fn attempt_arrow_out(&mut self) -> EditorResult<bool> {
        let Some(caret) = self.caret() else {
            return Ok(false);
        };
        let Some(block) = self.tree.block_of(caret.node) else {
            return Ok(false);
        };
        let root = self.tree.root();
        if self.tree.parent(block) != Some(root) || self.tree.children(root).last() != Some(&block) {
            return Ok(false);
        }
        if !self.tree.kind(block).is_some_and(|kind| self.config.is_soft_break(kind)) {
            return Ok(false);
        }

        let text: Vec<char> = self.tree.string(block).chars().collect();
        let offset = self.offset_in_block(block, caret);
        let on_last_line = match text.iter().rposition(|c| *c == '\n') {
            Some(newline) => offset > newline,
            None => true,
        };
        if !on_last_line {
            return Ok(false);
        }

        let index = self.tree.children(root).len();
        self.with_batch("arrow_out", |editor| {
            editor.insert_id(root, index, &Node::paragraph(""))?;
            Ok(())
        })?;
        Ok(true)
    }

    /// Character offset of `caret` within the whole text of `block`
    fn offset_in_block(&self, block: crate::tree::NodeId, caret: Anchor) -> usize {
        self.tree
            .texts_in(block)
            .into_iter()
            .take_while(|text| *text != caret.node)
            .map(|text| self.tree.text_len(text))
            .sum::<usize>()
            + caret.offset
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EditorConfig;
    use crate::editor::Editor;
    use crate::node::{BlockType, ElementKind, InlineType, Node};
    use crate::path::{Point, Range};

    fn code(text: &str) -> Node {
        Node::block(BlockType::Code, vec![Node::text(text)])
    }

    fn load(doc: Vec<Node>, point: Point) -> Editor {
        Editor::load(doc, Some(Range::collapsed(point)), EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_break_splits_paragraph() {
        let mut editor = load(vec![Node::paragraph("hello")], Point::new([0, 0], 2));
        editor.insert_break().unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("he"), Node::paragraph("llo")]);
        assert_eq!(editor.selection(), Some(Range::collapsed(Point::new([1, 0], 0))));
    }

    #[test]
    fn test_break_in_code_inserts_newline() {
        let mut editor = load(vec![code("ab")], Point::new([0, 0], 1));
        editor.insert_break().unwrap();
        assert_eq!(editor.save(), vec![code("a\nb")]);
        assert_eq!(editor.selection(), Some(Range::collapsed(Point::new([0, 0], 2))));
    }

    #[test]
    fn test_break_on_image_adds_paragraph_after() {
        let doc = vec![Node::void(ElementKind::Block(BlockType::Image))];
        let mut editor = load(doc, Point::new([0, 0], 0));
        // [spacer, image, spacer]
        editor.select_point(Point::new([1, 0], 0)).unwrap();
        editor.insert_break().unwrap();

        let saved = editor.save();
        assert_eq!(saved.len(), 4);
        assert_eq!(saved[3], Node::paragraph(""));
        assert_eq!(editor.selection(), Some(Range::collapsed(Point::new([3, 0], 0))));
    }

    #[test]
    fn test_arrow_out_only_from_last_line() {
        let mut editor = load(vec![code("one\ntwo")], Point::new([0, 0], 2));
        assert!(!editor.attempt_arrow_out().unwrap());
        assert_eq!(editor.save().len(), 1);

        editor.select_point(Point::new([0, 0], 5)).unwrap();
        assert!(editor.attempt_arrow_out().unwrap());
        assert_eq!(editor.save(), vec![code("one\ntwo"), Node::paragraph("")]);
        assert_eq!(editor.selection(), Some(Range::collapsed(Point::new([0, 0], 5))));
    }

    #[test]
    fn test_arrow_out_requires_last_block() {
        let mut editor = load(vec![code("x"), Node::paragraph("y")], Point::new([0, 0], 1));
        assert!(!editor.attempt_arrow_out().unwrap());
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_arrow_out_from_inside_inline() {
        let doc = vec![Node::block(
            BlockType::Code,
            vec![
                Node::text("see "),
                Node::inline(InlineType::Link, vec![Node::text("docs")]),
            ],
        )];
        let mut editor = load(doc, Point::new([0, 1, 0], 2));
        assert!(editor.attempt_arrow_out().unwrap());
        assert_eq!(editor.save().len(), 2);
        assert_eq!(editor.save()[1], Node::paragraph(""));
    }
}
