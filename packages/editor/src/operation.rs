//! # Operations
//!
//! The reversible low-level edits every mutation primitive compiles to.
//!
//! ## Design Principles
//!
//! 1. **Exact inverses**: each operation carries enough state to be undone
//!    by [`Operation::inverse`]; undo replays inverses, redo replays originals
//! 2. **Validated**: an operation checks the tree is in the shape it expects
//!    before touching it, and rejects itself otherwise
//! 3. **Id-addressed**: operations name nodes by [`NodeId`], so a batch can be
//!    replayed after other batches have been undone or redone
//! 4. **Selection-aware**: applying an operation transforms the selection
//!    anchors it affects
//!
//! ## Anchor transforms
//!
//! - `InsertText` moves anchors at or after the offset forward
//! - `RemoveText` pulls anchors inside the removed span to its start
//! - `SplitNode` moves anchors strictly after the split into the new leaf
//! - `MergeNode` moves anchors on the merged leaf into the surviving one
//!
//! Split and merge record the properties of the node that appears or
//! disappears, so a merge of differently marked leaves (or differently typed
//! elements) splits back into exactly what was there.
//! - `RemoveNode` relocates anchors inside the removed subtree to the nearest
//!   text leaf outside it, or clears the selection when there is none

use crate::errors::EditorError;
use crate::marks::Marks;
use crate::node::ElementProps;
use crate::path::Path;
use crate::selection::{Anchor, Selection};
use crate::tree::{byte_index, char_slice, NodeData, NodeId, Tree};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Attach a detached node as `parent`'s child at `index`
    InsertNode {
        parent: NodeId,
        index: usize,
        node: NodeId,
    },

    /// Detach the node at `parent[index]` (the subtree stays in the arena)
    RemoveNode {
        parent: NodeId,
        index: usize,
        node: NodeId,
    },

    /// Relocate a node; `to_index` counts after the node has been detached
    MoveNode {
        node: NodeId,
        from_parent: NodeId,
        from_index: usize,
        to_parent: NodeId,
        to_index: usize,
    },

    /// Split a text at a character offset, or an element at a child index;
    /// the tail moves into `new_node`, attached right after `node`, and
    /// `new_node` takes `properties`
    SplitNode {
        node: NodeId,
        position: usize,
        new_node: NodeId,
        properties: NodeProperties,
    },

    /// Append the next sibling `merged` onto `node`; `position` is the
    /// length of `node` (characters or children) before the merge and
    /// `properties` are the ones `merged` carried
    MergeNode {
        node: NodeId,
        merged: NodeId,
        position: usize,
        properties: NodeProperties,
    },

    SetElement {
        node: NodeId,
        before: ElementProps,
        after: ElementProps,
    },

    SetMarks {
        node: NodeId,
        before: Marks,
        after: Marks,
    },

    InsertText {
        node: NodeId,
        offset: usize,
        text: String,
    },

    RemoveText {
        node: NodeId,
        offset: usize,
        text: String,
    },
}

/// The non-content part of a node: marks for text, props for elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeProperties {
    Marks(Marks),
    Element(ElementProps),
}

impl NodeProperties {
    /// Properties of `node`, `None` for the root
    pub fn of(tree: &Tree, node: NodeId) -> Option<Self> {
        match tree.data(node) {
            NodeData::Root => None,
            NodeData::Text { marks, .. } => Some(Self::Marks(marks.clone())),
            NodeData::Element(props) => Some(Self::Element(props.clone())),
        }
    }
}

impl Operation {
    pub fn inverse(&self) -> Operation {
        match self.clone() {
            Operation::InsertNode {
                parent,
                index,
                node,
            } => Operation::RemoveNode {
                parent,
                index,
                node,
            },
            Operation::RemoveNode {
                parent,
                index,
                node,
            } => Operation::InsertNode {
                parent,
                index,
                node,
            },
            Operation::MoveNode {
                node,
                from_parent,
                from_index,
                to_parent,
                to_index,
            } => Operation::MoveNode {
                node,
                from_parent: to_parent,
                from_index: to_index,
                to_parent: from_parent,
                to_index: from_index,
            },
            Operation::SplitNode {
                node,
                position,
                new_node,
                properties,
            } => Operation::MergeNode {
                node,
                merged: new_node,
                position,
                properties,
            },
            Operation::MergeNode {
                node,
                merged,
                position,
                properties,
            } => Operation::SplitNode {
                node,
                position,
                new_node: merged,
                properties,
            },
            Operation::SetElement {
                node,
                before,
                after,
            } => Operation::SetElement {
                node,
                before: after,
                after: before,
            },
            Operation::SetMarks {
                node,
                before,
                after,
            } => Operation::SetMarks {
                node,
                before: after,
                after: before,
            },
            Operation::InsertText { node, offset, text } => {
                Operation::RemoveText { node, offset, text }
            }
            Operation::RemoveText { node, offset, text } => {
                Operation::InsertText { node, offset, text }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::InsertNode { .. } => "insert_node",
            Operation::RemoveNode { .. } => "remove_node",
            Operation::MoveNode { .. } => "move_node",
            Operation::SplitNode { .. } => "split_node",
            Operation::MergeNode { .. } => "merge_node",
            Operation::SetElement { .. } => "set_element",
            Operation::SetMarks { .. } => "set_marks",
            Operation::InsertText { .. } => "insert_text",
            Operation::RemoveText { .. } => "remove_text",
        }
    }

    /// Parents whose children this operation changed, plus changed elements
    pub fn touched(&self, tree: &Tree) -> Vec<NodeId> {
        let parent_of = |node: NodeId| tree.parent(node).into_iter();
        match self {
            Operation::InsertNode { parent, node, .. } => std::iter::once(*parent)
                .chain(tree.descendants(*node))
                .filter(|id| !tree.is_text(*id))
                .collect(),
            Operation::RemoveNode { parent, .. } => vec![*parent],
            Operation::MoveNode {
                node,
                from_parent,
                to_parent,
                ..
            } => vec![*from_parent, *to_parent, *node],
            Operation::SplitNode { node, new_node, .. } => {
                parent_of(*node).chain([*node, *new_node]).collect()
            }
            Operation::MergeNode { node, .. } => parent_of(*node).chain([*node]).collect(),
            Operation::SetElement { node, .. } => parent_of(*node).chain([*node]).collect(),
            Operation::SetMarks { node, .. }
            | Operation::InsertText { node, .. }
            | Operation::RemoveText { node, .. } => parent_of(*node).collect(),
        }
    }

    /// Validate and apply to `tree`, transforming `selection`
    pub fn apply(&self, tree: &mut Tree, selection: &mut Option<Selection>) -> Result<(), EditorError> {
        match self {
            Operation::InsertNode {
                parent,
                index,
                node,
            } => Self::apply_insert(tree, *parent, *index, *node),

            Operation::RemoveNode {
                parent,
                index,
                node,
            } => Self::apply_remove(tree, selection, *parent, *index, *node),

            Operation::MoveNode {
                node,
                from_parent,
                from_index,
                to_parent,
                to_index,
            } => {
                Self::expect_child(tree, *from_parent, *from_index, *node)?;
                Self::detach(tree, *from_parent, *from_index);
                Self::apply_insert(tree, *to_parent, *to_index, *node)
            }

            Operation::SplitNode {
                node,
                position,
                new_node,
                properties,
            } => Self::apply_split(tree, selection, *node, *position, *new_node, properties),

            Operation::MergeNode {
                node,
                merged,
                position,
                properties,
            } => Self::apply_merge(tree, selection, *node, *merged, *position, properties),

            Operation::SetElement {
                node,
                before,
                after,
            } => {
                if tree.element(*node) != Some(before) {
                    return Err(Self::mismatch(tree, *node, "element properties"));
                }
                if let NodeData::Element(props) = tree.data_mut(*node) {
                    *props = after.clone();
                }
                Ok(())
            }

            Operation::SetMarks {
                node,
                before,
                after,
            } => {
                if tree.marks(*node) != Some(before) {
                    return Err(Self::mismatch(tree, *node, "marks"));
                }
                if let NodeData::Text { marks, .. } = tree.data_mut(*node) {
                    *marks = after.clone();
                }
                Ok(())
            }

            Operation::InsertText { node, offset, text } => {
                Self::apply_insert_text(tree, selection, *node, *offset, text)
            }

            Operation::RemoveText { node, offset, text } => {
                Self::apply_remove_text(tree, selection, *node, *offset, text)
            }
        }
    }

    fn apply_insert(tree: &mut Tree, parent: NodeId, index: usize, node: NodeId) -> Result<(), EditorError> {
        if !tree.contains(node) || !tree.contains(parent) {
            return Err(EditorError::invalid_operation("unknown node id"));
        }
        if tree.parent(node).is_some() || node == tree.root() {
            return Err(EditorError::invalid_operation("node is already attached"));
        }
        if tree.is_text(parent) {
            return Err(EditorError::invalid_operation("text leaves have no children"));
        }
        if index > tree.children(parent).len() {
            return Err(EditorError::InvalidPath(
                Self::path_hint(tree, parent).child(index),
            ));
        }
        tree.children_mut(parent).insert(index, node);
        tree.set_parent(node, Some(parent));
        Ok(())
    }

    fn apply_remove(
        tree: &mut Tree,
        selection: &mut Option<Selection>,
        parent: NodeId,
        index: usize,
        node: NodeId,
    ) -> Result<(), EditorError> {
        Self::expect_child(tree, parent, index, node)?;

        if let Some(current) = selection.as_mut() {
            let inside = current
                .anchors_mut()
                .iter()
                .any(|anchor| tree.is_ancestor_or_self(node, anchor.node));
            if inside {
                match Self::relocation_target(tree, node) {
                    Some(target) => {
                        for anchor in current.anchors_mut() {
                            if tree.is_ancestor_or_self(node, anchor.node) {
                                *anchor = target;
                            }
                        }
                    }
                    None => *selection = None,
                }
            }
        }

        Self::detach(tree, parent, index);
        Ok(())
    }

    /// Where anchors inside a subtree about to be removed should land
    ///
    /// Leaves and inlines prefer a neighbour inside their own block; blocks
    /// prefer the end of the previous text, then the start of the next.
    fn relocation_target(tree: &Tree, node: NodeId) -> Option<Anchor> {
        let previous = tree.previous_text(node);
        let next = tree.next_text(node);

        if !tree.is_block(node) {
            let block = tree.parent(node).and_then(|parent| tree.block_of(parent));
            let same_block = |text: &NodeId| tree.block_of(*text) == block;
            if let Some(text) = previous.filter(same_block) {
                return Some(Anchor::new(text, tree.text_len(text)));
            }
            if let Some(text) = next.filter(same_block) {
                return Some(Anchor::new(text, 0));
            }
        }

        previous
            .map(|text| Anchor::new(text, tree.text_len(text)))
            .or_else(|| next.map(|text| Anchor::new(text, 0)))
    }

    fn apply_split(
        tree: &mut Tree,
        selection: &mut Option<Selection>,
        node: NodeId,
        position: usize,
        new_node: NodeId,
        properties: &NodeProperties,
    ) -> Result<(), EditorError> {
        let parent = tree
            .parent(node)
            .ok_or_else(|| EditorError::invalid_operation("cannot split a detached node"))?;
        if tree.parent(new_node).is_some() || !tree.children(new_node).is_empty() {
            return Err(EditorError::invalid_operation("split target is not a fresh node"));
        }
        let index = tree
            .index_of(node)
            .ok_or_else(|| EditorError::invalid_operation("cannot split a detached node"))?;

        match (tree.data(node).clone(), properties) {
            (NodeData::Text { text, marks }, NodeProperties::Marks(tail_marks)) => {
                let len = text.chars().count();
                if position > len {
                    return Err(EditorError::OffsetOutOfRange {
                        path: Self::path_hint(tree, node),
                        offset: position,
                        len,
                    });
                }
                let split_at = byte_index(&text, position);
                let (head, tail) = text.split_at(split_at);
                *tree.data_mut(new_node) = NodeData::Text {
                    text: tail.to_string(),
                    marks: tail_marks.clone(),
                };
                *tree.data_mut(node) = NodeData::Text {
                    text: head.to_string(),
                    marks,
                };

                if let Some(current) = selection.as_mut() {
                    for anchor in current.anchors_mut() {
                        if anchor.node == node && anchor.offset > position {
                            *anchor = Anchor::new(new_node, anchor.offset - position);
                        }
                    }
                }
            }
            (NodeData::Element(_), NodeProperties::Element(tail_props)) => {
                if position > tree.children(node).len() {
                    return Err(EditorError::InvalidPath(
                        Self::path_hint(tree, node).child(position),
                    ));
                }
                *tree.data_mut(new_node) = NodeData::Element(tail_props.clone());
                let tail = tree.children_mut(node).split_off(position);
                for child in &tail {
                    tree.set_parent(*child, Some(new_node));
                }
                *tree.children_mut(new_node) = tail;
            }
            (NodeData::Root, _) => return Err(EditorError::invalid_operation("cannot split the root")),
            _ => return Err(Self::mismatch(tree, node, "split shapes")),
        }

        tree.children_mut(parent).insert(index + 1, new_node);
        tree.set_parent(new_node, Some(parent));
        Ok(())
    }

    fn apply_merge(
        tree: &mut Tree,
        selection: &mut Option<Selection>,
        node: NodeId,
        merged: NodeId,
        position: usize,
        properties: &NodeProperties,
    ) -> Result<(), EditorError> {
        let parent = tree
            .parent(node)
            .ok_or_else(|| EditorError::invalid_operation("cannot merge into a detached node"))?;
        let index = tree
            .index_of(node)
            .ok_or_else(|| EditorError::invalid_operation("cannot merge into a detached node"))?;
        Self::expect_child(tree, parent, index + 1, merged)?;
        if NodeProperties::of(tree, merged).as_ref() != Some(properties) {
            return Err(Self::mismatch(tree, merged, "merged properties"));
        }

        match (tree.data(node).clone(), tree.data(merged).clone()) {
            (NodeData::Text { text, marks }, NodeData::Text { text: tail, .. }) => {
                if text.chars().count() != position {
                    return Err(Self::mismatch(tree, node, "merge position"));
                }
                *tree.data_mut(node) = NodeData::Text {
                    text: format!("{text}{tail}"),
                    marks,
                };
                if let Some(current) = selection.as_mut() {
                    for anchor in current.anchors_mut() {
                        if anchor.node == merged {
                            *anchor = Anchor::new(node, anchor.offset + position);
                        }
                    }
                }
            }
            (NodeData::Element(_), NodeData::Element(_)) => {
                if tree.children(node).len() != position {
                    return Err(Self::mismatch(tree, node, "merge position"));
                }
                let moved = std::mem::take(tree.children_mut(merged));
                for child in &moved {
                    tree.set_parent(*child, Some(node));
                }
                tree.children_mut(node).extend(moved);
            }
            _ => return Err(Self::mismatch(tree, node, "merge shapes")),
        }

        Self::detach(tree, parent, index + 1);
        Ok(())
    }

    fn apply_insert_text(
        tree: &mut Tree,
        selection: &mut Option<Selection>,
        node: NodeId,
        offset: usize,
        inserted: &str,
    ) -> Result<(), EditorError> {
        let len = tree.text_len(node);
        let path = Self::path_hint(tree, node);
        let NodeData::Text { text, .. } = tree.data_mut(node) else {
            return Err(EditorError::NotAText(path));
        };
        if offset > len {
            return Err(EditorError::OffsetOutOfRange { path, offset, len });
        }
        let at = byte_index(text, offset);
        text.insert_str(at, inserted);

        let added = inserted.chars().count();
        if let Some(current) = selection.as_mut() {
            for anchor in current.anchors_mut() {
                if anchor.node == node && anchor.offset >= offset {
                    anchor.offset += added;
                }
            }
        }
        Ok(())
    }

    fn apply_remove_text(
        tree: &mut Tree,
        selection: &mut Option<Selection>,
        node: NodeId,
        offset: usize,
        removed: &str,
    ) -> Result<(), EditorError> {
        let count = removed.chars().count();
        let len = tree.text_len(node);
        let path = Self::path_hint(tree, node);
        let NodeData::Text { text, .. } = tree.data_mut(node) else {
            return Err(EditorError::NotAText(path));
        };
        if offset + count > len {
            return Err(EditorError::OffsetOutOfRange {
                path,
                offset: offset + count,
                len,
            });
        }
        if char_slice(text, offset, count) != removed {
            return Err(EditorError::invalid_operation(format!(
                "text at {path} does not match removed text"
            )));
        }
        let from = byte_index(text, offset);
        let to = byte_index(text, offset + count);
        text.replace_range(from..to, "");

        if let Some(current) = selection.as_mut() {
            for anchor in current.anchors_mut() {
                if anchor.node != node || anchor.offset <= offset {
                    continue;
                }
                anchor.offset = if anchor.offset >= offset + count {
                    anchor.offset - count
                } else {
                    offset
                };
            }
        }
        Ok(())
    }

    fn expect_child(tree: &Tree, parent: NodeId, index: usize, node: NodeId) -> Result<(), EditorError> {
        if tree.children(parent).get(index) == Some(&node) {
            Ok(())
        } else {
            Err(EditorError::InvalidPath(
                Self::path_hint(tree, parent).child(index),
            ))
        }
    }

    fn detach(tree: &mut Tree, parent: NodeId, index: usize) {
        let node = tree.children_mut(parent).remove(index);
        tree.set_parent(node, None);
    }

    fn path_hint(tree: &Tree, node: NodeId) -> Path {
        tree.path_of(node).unwrap_or_default()
    }

    fn mismatch(tree: &Tree, node: NodeId, what: &str) -> EditorError {
        EditorError::invalid_operation(format!(
            "{what} at {} do not match the operation",
            Self::path_hint(tree, node)
        ))
    }
}
