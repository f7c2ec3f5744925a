//! List structure: wrapping blocks into lists, converting list kinds, and
//! extracting items back out.
//!
//! Extracting an interior item splits its list: the items before it stay in
//! the original container, the items after it move to a new container of the
//! same kind, so one list can become up to three siblings.

use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::node::{BlockType, ElementKind, ElementProps};
use crate::path::Range;
use crate::selection::{blocks_in_range, nodes_in_range};
use crate::transforms::Split;
use crate::tree::NodeId;

fn is_list(props: &ElementProps) -> bool {
    props.kind.block_type().is_some_and(BlockType::is_list)
}

impl Editor {
    /// True if the selection is inside a list container of `kind`
    pub fn is_list_active(&self, kind: BlockType) -> bool {
        self.is_block_active(kind) && kind.is_list()
    }

    /// List containers intersecting `range`, outermost first
    fn lists_in_range(&self, range: &Range) -> Vec<NodeId> {
        nodes_in_range(&self.tree, range)
            .into_iter()
            .filter(|node| self.tree.element(*node).is_some_and(is_list))
            .collect()
    }

    /// Maximal runs of consecutive non-void sibling blocks, as
    /// `(parent, first index, last index)` in document order
    fn sibling_runs(&self, blocks: &[NodeId]) -> Vec<(NodeId, usize, usize)> {
        let mut runs: Vec<(NodeId, usize, usize)> = Vec::new();
        let mut open = false;
        for block in blocks {
            if self.tree.is_void(*block) {
                open = false;
                continue;
            }
            let (Some(parent), Some(index)) = (self.tree.parent(*block), self.tree.index_of(*block)) else {
                open = false;
                continue;
            };
            match runs.last_mut() {
                Some((run_parent, _, to)) if open && *run_parent == parent && *to + 1 == index => *to = index,
                _ => runs.push((parent, index, index)),
            }
            open = true;
        }
        runs
    }

    /// Wrap the selected blocks in a list of `kind`, convert the enclosing
    /// list to `kind`, or lift the items out when the list already is `kind`
    ///
    /// Void blocks stay top-level, so a selection across an image yields one
    /// list before it and one after it.
    pub fn toggle_list(&mut self, kind: BlockType) -> EditorResult<()> {
        if !kind.is_list() {
            return Err(EditorError::invalid_operation(format!(
                "{kind:?} is not a list container type"
            )));
        }
        let Some(range) = self.selection() else {
            return Ok(());
        };

        let lists = self.lists_in_range(&range);
        if lists.is_empty() {
            return self.with_batch("toggle_list", |editor| {
                let blocks = blocks_in_range(&editor.tree, &range);
                let runs = editor.sibling_runs(&blocks);
                for (parent, from, to) in runs.into_iter().rev() {
                    for index in from..=to {
                        let block = editor.tree.children(parent)[index];
                        let attributes = editor
                            .tree
                            .element(block)
                            .map(|props| props.attributes.clone())
                            .unwrap_or_default();
                        editor.set_element_id(
                            block,
                            ElementProps {
                                kind: ElementKind::Block(BlockType::ListItem),
                                attributes,
                            },
                        )?;
                    }
                    editor.wrap_children(parent, from, to, &ElementProps::block(kind))?;
                }
                Ok(())
            });
        }

        if self.is_block_active(kind) {
            return self.lift_list_items(BlockType::default());
        }

        self.with_batch("toggle_list", |editor| {
            for list in lists {
                let Some(props) = editor.tree.element(list) else {
                    continue;
                };
                let next = ElementProps {
                    kind: ElementKind::Block(kind),
                    attributes: props.attributes.clone(),
                };
                editor.set_element_id(list, next)?;
            }
            Ok(())
        })
    }

    /// Extract the selected list items as sibling blocks of type `target`
    ///
    /// Unselected items keep their container; a list split in the middle
    /// leaves a container before and after the extracted blocks.
    pub fn lift_list_items(&mut self, target: BlockType) -> EditorResult<()> {
        if target.is_list() || target == BlockType::ListItem || target.is_void() {
            return Err(EditorError::invalid_operation(format!(
                "list items cannot be lifted into {target:?}"
            )));
        }
        let Some(range) = self.selection() else {
            return Ok(());
        };

        self.with_batch("lift_list_items", |editor| {
            let items: Vec<NodeId> = blocks_in_range(&editor.tree, &range)
                .into_iter()
                .filter(|block| editor.tree.kind(*block) == Some(ElementKind::Block(BlockType::ListItem)))
                .collect();
            if items.is_empty() {
                return Ok(());
            }

            editor.unwrap_range(&range, &is_list, Split::Exact)?;

            for item in items {
                let attributes = editor
                    .tree
                    .element(item)
                    .map(|props| props.attributes.clone())
                    .unwrap_or_default();
                editor.set_element_id(
                    item,
                    ElementProps {
                        kind: ElementKind::Block(target),
                        attributes,
                    },
                )?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EditorConfig;
    use crate::editor::Editor;
    use crate::node::{BlockType, Node};
    use crate::path::{Point, Range};

    fn item(text: &str) -> Node {
        Node::block(BlockType::ListItem, vec![Node::text(text)])
    }

    #[test]
    fn test_toggle_list_wraps_paragraphs() {
        let range = Range::new(Point::new([0, 0], 0), Point::new([1, 0], 1));
        let doc = vec![Node::paragraph("a"), Node::paragraph("b")];
        let mut editor = Editor::load(doc.clone(), Some(range), EditorConfig::default()).unwrap();

        editor.toggle_list(BlockType::UnorderedList).unwrap();
        assert_eq!(
            editor.save(),
            vec![Node::block(BlockType::UnorderedList, vec![item("a"), item("b")])]
        );
        assert!(editor.is_list_active(BlockType::UnorderedList));

        editor.toggle_list(BlockType::OrderedList).unwrap();
        assert_eq!(
            editor.save(),
            vec![Node::block(BlockType::OrderedList, vec![item("a"), item("b")])]
        );

        editor.toggle_list(BlockType::OrderedList).unwrap();
        assert_eq!(editor.save(), doc);
    }

    #[test]
    fn test_lift_last_item_keeps_leading_items() {
        let doc = vec![Node::block(BlockType::OrderedList, vec![item("1"), item("2")])];
        let caret = Range::collapsed(Point::new([0, 1, 0], 0));
        let mut editor = Editor::load(doc, Some(caret), EditorConfig::default()).unwrap();

        editor.lift_list_items(BlockType::Paragraph).unwrap();
        assert_eq!(
            editor.save(),
            vec![
                Node::block(BlockType::OrderedList, vec![item("1")]),
                Node::paragraph("2"),
            ]
        );
    }

    #[test]
    fn test_lifting_only_item_removes_container() {
        let doc = vec![Node::block(BlockType::UnorderedList, vec![item("solo")])];
        let caret = Range::collapsed(Point::new([0, 0, 0], 2));
        let mut editor = Editor::load(doc, Some(caret), EditorConfig::default()).unwrap();

        editor.lift_list_items(BlockType::Header).unwrap();
        assert_eq!(
            editor.save(),
            vec![Node::block(BlockType::Header, vec![Node::text("solo")])]
        );
        assert_eq!(editor.selection(), Some(Range::collapsed(Point::new([0, 0], 2))));
    }
}
