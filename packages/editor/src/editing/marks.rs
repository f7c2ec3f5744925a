//! Mark toggling with exclusive groups and cyclic intensity families.
//!
//! Expanded selections change the covered text and end up selecting exactly
//! the leaves that changed. Collapsed selections change the *pending* marks
//! instead: the set the next typed text will carry.

use crate::editor::Editor;
use crate::errors::EditorResult;
use crate::marks::{intensity_marks, Emphasis, Mark, MarkFamily, Marks, Stress};
use crate::selection::covered_spans;

impl Editor {
    /// Marks newly typed text would carry at the current selection
    ///
    /// For a caret this is the pending set when one is stored, else the marks
    /// of the leaf before the caret. For a range it is the first covered leaf.
    pub fn active_marks(&self) -> Marks {
        let Some(selection) = self.selection else {
            return Marks::new();
        };

        if selection.is_collapsed() {
            if let Some(pending) = &self.pending_marks {
                return pending.clone();
            }
            let anchor = selection.anchor;
            if self.tree.void_of(anchor.node).is_some() {
                return Marks::new();
            }
            let source = if anchor.offset == 0 {
                self.tree
                    .previous_text(anchor.node)
                    .filter(|previous| {
                        self.tree.block_of(*previous) == self.tree.block_of(anchor.node)
                            && self.tree.void_of(*previous).is_none()
                    })
                    .unwrap_or(anchor.node)
            } else {
                anchor.node
            };
            return self.tree.marks(source).cloned().unwrap_or_default();
        }

        self.selection()
            .and_then(|range| covered_spans(&self.tree, &range).first().copied())
            .and_then(|span| self.tree.marks(span.node).cloned())
            .unwrap_or_default()
    }

    pub fn is_mark_active(&self, mark: &Mark) -> bool {
        self.active_marks().contains(mark)
    }

    /// Remove `mark` if it is active, otherwise add it
    pub fn toggle_mark(&mut self, mark: Mark) -> EditorResult<()> {
        if self.is_mark_active(&mark) {
            self.remove_mark(&mark)
        } else {
            self.add_mark(mark)
        }
    }

    /// Add `mark`, first clearing every mark that is exclusive with it
    pub fn add_mark(&mut self, mark: Mark) -> EditorResult<()> {
        let group = self.config.exclusive_group_of(&mark);
        self.change_marks("add_mark", move |marks| {
            let mut next = marks.without_all(&group);
            next.insert(mark.clone());
            next
        })
    }

    pub fn remove_mark(&mut self, mark: &Mark) -> EditorResult<()> {
        let mark = mark.clone();
        self.change_marks("remove_mark", move |marks| {
            let mut next = marks.clone();
            next.remove(&mark);
            next
        })
    }

    /// Step the emphasis level of the selection (clears any stress)
    pub fn increase_emph(&mut self) -> EditorResult<()> {
        self.cycle_family::<Emphasis>("increase_emph")
    }

    /// Step the stress level of the selection (clears any emphasis)
    pub fn increase_stress(&mut self) -> EditorResult<()> {
        self.cycle_family::<Stress>("increase_stress")
    }

    /// Read `F`'s level from the first touched leaf, clear both intensity
    /// families across the selection, then apply the next level (if any)
    fn cycle_family<F: MarkFamily>(&mut self, description: &str) -> EditorResult<()> {
        let next = F::successor(F::level_of(&self.active_marks()));
        let intensity = intensity_marks();
        self.change_marks(description, move |marks| {
            let mut cleared = marks.without_all(&intensity);
            if let Some(level) = next {
                cleared.insert(level.mark());
            }
            cleared
        })
    }

    fn change_marks(&mut self, description: &str, change: impl Fn(&Marks) -> Marks) -> EditorResult<()> {
        let Some(selection) = self.selection else {
            return Ok(());
        };

        if selection.is_collapsed() {
            let next = change(&self.active_marks());
            self.pending_marks = Some(next);
            return Ok(());
        }

        let Some(range) = self.selection() else {
            return Ok(());
        };
        let backward = range.is_backward();
        self.with_batch(description, |editor| {
            let covered = editor.update_marks(&range, change)?;
            if let (Some(first), Some(last)) = (covered.first(), covered.last()) {
                editor.select_leaves(*first, *last, backward);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EditorConfig;
    use crate::editor::Editor;
    use crate::marks::{Mark, Marks};
    use crate::node::Node;
    use crate::path::{Point, Range};

    fn editor_with(nodes: Vec<Node>, range: Range) -> Editor {
        Editor::load(nodes, Some(range), EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_toggle_mark_adds_then_removes() {
        let range = Range::new(Point::new([0, 0], 0), Point::new([0, 0], 3));
        let mut editor = editor_with(vec![Node::paragraph("abcdef")], range);

        editor.toggle_mark(Mark::strikethrough()).unwrap();
        assert!(editor.is_mark_active(&Mark::strikethrough()));
        assert_eq!(
            editor.save()[0].children(),
            &[Node::marked("abc", Marks::from(["strikethrough"])), Node::text("def")]
        );
        assert_eq!(
            editor.selection(),
            Some(Range::new(Point::new([0, 0], 0), Point::new([0, 0], 3)))
        );

        editor.toggle_mark(Mark::strikethrough()).unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("abcdef")]);
    }

    #[test]
    fn test_collapsed_toggle_sets_pending_marks() {
        let caret = Range::collapsed(Point::new([0, 0], 2));
        let mut editor = editor_with(vec![Node::paragraph("ab")], caret);

        editor.toggle_mark(Mark::cross_reference()).unwrap();
        assert_eq!(editor.version(), 0);
        assert!(editor.is_mark_active(&Mark::cross_reference()));

        editor.insert_text("cd").unwrap();
        assert_eq!(
            editor.save()[0].children(),
            &[Node::text("ab"), Node::marked("cd", Marks::from(["crossref"]))]
        );
        assert!(editor.pending_marks().is_none());
        assert!(editor.is_mark_active(&Mark::cross_reference()));
    }

    #[test]
    fn test_caret_at_leaf_start_reads_previous_leaf() {
        let caret = Range::collapsed(Point::new([0, 1], 0));
        let editor = editor_with(
            vec![Node::block(
                crate::node::BlockType::Paragraph,
                vec![Node::marked("a", Marks::from(["code"])), Node::text("b")],
            )],
            caret,
        );
        assert!(editor.is_mark_active(&Mark::code()));
    }

    #[test]
    fn test_add_mark_clears_exclusive_group() {
        let range = Range::new(Point::new([0, 0], 0), Point::new([0, 0], 2));
        let mut editor = editor_with(
            vec![Node::block(
                crate::node::BlockType::Paragraph,
                vec![Node::marked("ab", Marks::from(["emph2", "strikethrough"]))],
            )],
            range,
        );

        editor.add_mark(Mark::new("stress1")).unwrap();
        assert_eq!(
            editor.save()[0].children(),
            &[Node::marked("ab", Marks::from(["stress1", "strikethrough"]))]
        );
    }

    #[test]
    fn test_no_selection_is_noop() {
        let mut editor = Editor::load(vec![Node::paragraph("ab")], None, EditorConfig::default()).unwrap();
        editor.deselect();
        editor.increase_emph().unwrap();
        editor.toggle_mark(Mark::strikethrough()).unwrap();
        assert_eq!(editor.version(), 0);
        assert!(editor.pending_marks().is_none());
    }
}
