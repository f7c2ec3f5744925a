//! # Mutation Primitives
//!
//! The sanctioned ways to change a document. Each public primitive runs as
//! its own batch (or joins the caller's batch) and compiles down to
//! [`Operation`]s, so normalization and undo see every change.
//!
//! The `*_id` helpers are the same primitives addressed by [`NodeId`]. The
//! editing algorithms use them because ids, unlike paths, survive the
//! structural edits made earlier in the same algorithm.

use crate::editor::Editor;
use crate::errors::{EditorError, EditorResult};
use crate::marks::Marks;
use crate::node::{validate_node, ElementProps, Node, NodePatch};
use crate::operation::{NodeProperties, Operation};
use crate::path::{Path, Point, Range};
use crate::selection::{covered_spans, nodes_in_range, Anchor, LeafSpan};
use crate::tree::{char_slice, NodeData, NodeId};
use std::cmp::Ordering;

/// Where a wrap or unwrap is allowed to cut through partially covered nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Split boundary nodes so the change applies exactly to the range
    Exact,
    /// Apply to whole nodes touched by the range
    Whole,
}

impl From<bool> for Split {
    fn from(split: bool) -> Self {
        if split {
            Split::Exact
        } else {
            Split::Whole
        }
    }
}

impl Editor {
    // --- Public primitives, addressed by path ---

    /// Insert `node` so that it ends up at `at`
    pub fn insert_node(&mut self, node: Node, at: &Path) -> EditorResult<NodeId> {
        let (parent_path, index) = split_path(at)?;
        self.with_batch("insert_node", |editor| {
            let parent = editor.tree.node_at(&parent_path)?;
            editor.insert_id(parent, index, &node)
        })
    }

    pub fn remove_node(&mut self, at: &Path) -> EditorResult<()> {
        self.with_batch("remove_node", |editor| {
            let node = editor.tree.node_at(at)?;
            if node == editor.tree.root() {
                return Err(EditorError::invalid_operation("cannot remove the root"));
            }
            editor.remove_id(node)
        })
    }

    /// Shallow-merge `patch` onto the element at `at`; children are untouched
    pub fn set_node_properties(&mut self, at: &Path, patch: NodePatch) -> EditorResult<()> {
        self.with_batch("set_node_properties", |editor| {
            let node = editor.tree.element_at(at)?;
            editor.patch_id(node, &patch)
        })
    }

    /// Wrap the nodes covered by `range` in a new element built from `props`
    ///
    /// Inline wrappers are created once per block the range touches. Block
    /// wrappers enclose the touched blocks below their common ancestor.
    pub fn wrap_node(&mut self, props: ElementProps, range: &Range, split: bool) -> EditorResult<()> {
        self.with_batch("wrap_node", |editor| {
            editor.wrap_range(&props, range, split.into())?;
            Ok(())
        })
    }

    /// Replace elements matching `matches` in `range` with their children
    ///
    /// Returns the number of elements unwrapped. With `split`, only the
    /// children inside the range are lifted out and the rest of a matched
    /// element stays wrapped on either side.
    pub fn unwrap_node(
        &mut self,
        range: &Range,
        matches: impl Fn(&ElementProps) -> bool,
        split: bool,
    ) -> EditorResult<usize> {
        self.with_batch("unwrap_node", |editor| {
            editor.unwrap_range(range, &matches, split.into())
        })
    }

    /// Split the text at `at`, then `height` of its ancestors
    pub fn split_node(&mut self, at: &Point, height: usize) -> EditorResult<()> {
        self.with_batch("split_node", |editor| {
            let anchor = Anchor::from_point(&editor.tree, at)?;
            editor.split_at(anchor, height)?;
            Ok(())
        })
    }

    /// Add `marks` to every text character in `range`
    pub fn set_text_attributes(&mut self, range: &Range, marks: &Marks) -> EditorResult<()> {
        self.with_batch("set_text_attributes", |editor| {
            editor.update_marks(range, |current| current.with_all(marks))?;
            Ok(())
        })
    }

    pub fn remove_text_attributes(&mut self, range: &Range, marks: &Marks) -> EditorResult<()> {
        self.with_batch("remove_text_attributes", |editor| {
            editor.update_marks(range, |current| current.without_all(marks))?;
            Ok(())
        })
    }

    pub fn insert_text_at(&mut self, at: &Point, text: &str) -> EditorResult<()> {
        self.with_batch("insert_text", |editor| {
            let anchor = Anchor::from_point(&editor.tree, at)?;
            editor.insert_text_id(anchor.node, anchor.offset, text)
        })
    }

    /// Remove the characters of `range`, which must stay within one text leaf
    pub fn remove_text(&mut self, range: &Range) -> EditorResult<()> {
        let (start, end) = range.edges();
        if start.path != end.path {
            return Err(EditorError::invalid_operation(
                "remove_text range must stay within one text leaf",
            ));
        }
        self.with_batch("remove_text", |editor| {
            let anchor = Anchor::from_point(&editor.tree, start)?;
            Anchor::from_point(&editor.tree, end)?;
            editor.remove_text_id(anchor.node, start.offset, end.offset - start.offset)
        })
    }

    /// Merge the node at `at` into its previous sibling
    pub fn merge_node(&mut self, at: &Path) -> EditorResult<()> {
        self.with_batch("merge_node", |editor| {
            let node = editor.tree.node_at(at)?;
            editor.merge_id(node)
        })
    }

    /// Move the node at `from` under `to_parent` at `index`
    ///
    /// `to_parent` is resolved before the move; `index` counts the parent's
    /// children after the node has been taken out.
    pub fn move_node(&mut self, from: &Path, to_parent: &Path, index: usize) -> EditorResult<()> {
        self.with_batch("move_node", |editor| {
            let node = editor.tree.node_at(from)?;
            let parent = editor.tree.node_at(to_parent)?;
            editor.move_id(node, parent, index)
        })
    }

    // --- Id-addressed helpers used inside batches ---

    pub(crate) fn insert_id(&mut self, parent: NodeId, index: usize, node: &Node) -> EditorResult<NodeId> {
        let parent_path = self
            .tree
            .path_of(parent)
            .ok_or_else(|| EditorError::invalid_operation("insert target is detached"))?;

        if parent == self.tree.root() && !node.kind().is_some_and(|kind| kind.is_block()) {
            return Err(EditorError::invalid_operation(
                "only blocks can be inserted at the top level",
            ));
        }
        if self.tree.is_text(parent) {
            return Err(EditorError::NotAnElement(parent_path));
        }
        if self.tree.is_void(parent) {
            return Err(EditorError::invalid_operation("void elements hold no content"));
        }
        let inside_inline = self.tree.inline_of(parent).is_some();
        validate_node(node, &parent_path.child(index), inside_inline)
            .map_err(|err| EditorError::invalid_operation(err.to_string()))?;

        let id = self.tree.alloc_subtree(node);
        self.apply_op(Operation::InsertNode {
            parent,
            index,
            node: id,
        })?;
        Ok(id)
    }

    pub(crate) fn remove_id(&mut self, node: NodeId) -> EditorResult<()> {
        let (parent, index) = self.position_of(node)?;
        self.apply_op(Operation::RemoveNode {
            parent,
            index,
            node,
        })
    }

    pub(crate) fn move_id(&mut self, node: NodeId, to_parent: NodeId, to_index: usize) -> EditorResult<()> {
        if self.tree.is_ancestor_or_self(node, to_parent) {
            return Err(EditorError::invalid_operation("cannot move a node into itself"));
        }
        let (from_parent, from_index) = self.position_of(node)?;
        if from_parent == to_parent && from_index == to_index {
            return Ok(());
        }
        self.apply_op(Operation::MoveNode {
            node,
            from_parent,
            from_index,
            to_parent,
            to_index,
        })
    }

    /// Split `node` at `position` (characters for text, child index for elements)
    pub(crate) fn split_id(&mut self, node: NodeId, position: usize) -> EditorResult<NodeId> {
        let properties = NodeProperties::of(&self.tree, node)
            .ok_or_else(|| EditorError::invalid_operation("cannot split the root"))?;
        let new_node = self.tree.alloc(NodeData::Root);
        self.apply_op(Operation::SplitNode {
            node,
            position,
            new_node,
            properties,
        })?;
        Ok(new_node)
    }

    /// Merge `node` into its previous sibling
    pub(crate) fn merge_id(&mut self, node: NodeId) -> EditorResult<()> {
        let (parent, index) = self.position_of(node)?;
        let Some(previous) = index
            .checked_sub(1)
            .and_then(|i| self.tree.children(parent).get(i).copied())
        else {
            return Err(EditorError::invalid_operation("no previous sibling to merge into"));
        };

        let position = match (self.tree.data(previous), self.tree.data(node)) {
            (NodeData::Text { .. }, NodeData::Text { .. }) => self.tree.text_len(previous),
            (NodeData::Element(_), NodeData::Element(_)) => self.tree.children(previous).len(),
            _ => {
                return Err(EditorError::invalid_operation(
                    "cannot merge a text leaf with an element",
                ))
            }
        };
        let properties = NodeProperties::of(&self.tree, node)
            .ok_or_else(|| EditorError::invalid_operation("cannot merge the root"))?;
        self.apply_op(Operation::MergeNode {
            node: previous,
            merged: node,
            position,
            properties,
        })
    }

    pub(crate) fn set_element_id(&mut self, node: NodeId, after: ElementProps) -> EditorResult<()> {
        let before = self
            .tree
            .element(node)
            .cloned()
            .ok_or_else(|| EditorError::NotAnElement(self.tree.path_of(node).unwrap_or_default()))?;
        if before == after {
            return Ok(());
        }
        self.apply_op(Operation::SetElement {
            node,
            before,
            after,
        })
    }

    pub(crate) fn patch_id(&mut self, node: NodeId, patch: &NodePatch) -> EditorResult<()> {
        let Some(props) = self.tree.element(node) else {
            return Err(EditorError::NotAnElement(
                self.tree.path_of(node).unwrap_or_default(),
            ));
        };
        let next = patch.applied_to(props);

        if next.kind.is_inline() != props.kind.is_inline() {
            return Err(EditorError::invalid_operation(
                "cannot change an element between block and inline",
            ));
        }
        if next.is_void() && !props.is_void() && !self.is_placeholder_only(node) {
            return Err(EditorError::invalid_operation(
                "cannot make an element with content void",
            ));
        }
        self.set_element_id(node, next)
    }

    /// True if the element holds nothing but one empty text leaf
    fn is_placeholder_only(&self, node: NodeId) -> bool {
        match self.tree.children(node) {
            [] => true,
            [only] => self.tree.text(*only) == Some(""),
            _ => false,
        }
    }

    pub(crate) fn set_marks_id(&mut self, node: NodeId, after: Marks) -> EditorResult<()> {
        let before = self
            .tree
            .marks(node)
            .cloned()
            .ok_or_else(|| EditorError::NotAText(self.tree.path_of(node).unwrap_or_default()))?;
        if before == after {
            return Ok(());
        }
        self.apply_op(Operation::SetMarks {
            node,
            before,
            after,
        })
    }

    pub(crate) fn insert_text_id(&mut self, node: NodeId, offset: usize, text: &str) -> EditorResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        if self.tree.void_of(node).is_some() {
            return Err(EditorError::invalid_operation("void nodes are not text-editable"));
        }
        self.apply_op(Operation::InsertText {
            node,
            offset,
            text: text.to_string(),
        })
    }

    pub(crate) fn remove_text_id(&mut self, node: NodeId, offset: usize, count: usize) -> EditorResult<()> {
        if count == 0 {
            return Ok(());
        }
        let Some(current) = self.tree.text(node) else {
            return Err(EditorError::NotAText(self.tree.path_of(node).unwrap_or_default()));
        };
        let len = current.chars().count();
        if offset + count > len {
            return Err(EditorError::OffsetOutOfRange {
                path: self.tree.path_of(node).unwrap_or_default(),
                offset: offset + count,
                len,
            });
        }
        let text = char_slice(current, offset, count).to_string();
        self.apply_op(Operation::RemoveText { node, offset, text })
    }

    /// Split the leaf at `anchor`, then `height` ancestors; returns the
    /// topmost new node (the start of the second half)
    pub(crate) fn split_at(&mut self, anchor: Anchor, height: usize) -> EditorResult<NodeId> {
        let mut node = anchor.node;
        let mut new_node = self.split_id(node, anchor.offset)?;
        for _ in 0..height {
            let parent = self
                .tree
                .parent(node)
                .filter(|parent| *parent != self.tree.root())
                .ok_or_else(|| EditorError::invalid_operation("split height exceeds the tree depth"))?;
            let position = self
                .tree
                .index_of(new_node)
                .ok_or_else(|| EditorError::invalid_operation("split node is detached"))?;
            new_node = self.split_id(parent, position)?;
            node = parent;
        }
        Ok(new_node)
    }

    /// Split a leaf so that exactly `span` is one leaf; returns that leaf
    pub(crate) fn isolate_span(&mut self, span: LeafSpan) -> EditorResult<NodeId> {
        if span.end < span.len {
            self.split_id(span.node, span.end)?;
        }
        if span.start > 0 {
            return self.split_id(span.node, span.start);
        }
        Ok(span.node)
    }

    /// Rewrite the marks of every covered character; returns the covered leaves
    pub(crate) fn update_marks(
        &mut self,
        range: &Range,
        change: impl Fn(&Marks) -> Marks,
    ) -> EditorResult<Vec<NodeId>> {
        if range.is_collapsed() {
            return Ok(Vec::new());
        }
        let mut covered = Vec::new();
        for span in covered_spans(&self.tree, range) {
            let leaf = self.isolate_span(span)?;
            let current = self.tree.marks(leaf).cloned().unwrap_or_default();
            self.set_marks_id(leaf, change(&current))?;
            covered.push(leaf);
        }
        Ok(covered)
    }

    /// Wrap the content of `range`; returns the new wrappers in document order
    pub(crate) fn wrap_range(&mut self, props: &ElementProps, range: &Range, split: Split) -> EditorResult<Vec<NodeId>> {
        if props.kind.is_inline() {
            self.wrap_inline(props, range, split)
        } else {
            self.wrap_blocks(props, range).map(|wrapper| vec![wrapper])
        }
    }

    fn wrap_inline(&mut self, props: &ElementProps, range: &Range, split: Split) -> EditorResult<Vec<NodeId>> {
        let (start, end) = range.edges();
        let start = Anchor::from_point(&self.tree, start)?;
        let end = Anchor::from_point(&self.tree, end)?;
        let blocks = crate::selection::blocks_in_range(&self.tree, range);

        let mut wrappers = Vec::new();
        for block in blocks {
            // Boundary leaves in this block; blocks fully inside the range
            // are wrapped from their first to their last child
            let (Some(first_text), Some(last_text)) =
                (self.tree.first_text(block), self.tree.last_text(block))
            else {
                continue;
            };
            let head = if self.tree.block_of(start.node) == Some(block) {
                start
            } else {
                Anchor::new(first_text, 0)
            };
            let tail = if self.tree.block_of(end.node) == Some(block) {
                end
            } else {
                Anchor::new(last_text, self.tree.text_len(last_text))
            };

            let mut last = self.unit_in_block(block, tail.node);
            let mut first = self.unit_in_block(block, head.node);

            if split == Split::Exact && last == tail.node && tail.offset < self.tree.text_len(tail.node) {
                self.split_id(tail.node, tail.offset)?;
            }
            if split == Split::Exact && first == head.node && head.offset > 0 {
                let right = self.split_id(head.node, head.offset)?;
                if last == head.node {
                    last = right;
                }
                first = right;
            }

            let (Some(from), Some(to)) = (self.tree.index_of(first), self.tree.index_of(last)) else {
                continue;
            };
            wrappers.push(self.wrap_children(block, from, to, props)?);
        }
        Ok(wrappers)
    }

    fn wrap_blocks(&mut self, props: &ElementProps, range: &Range) -> EditorResult<NodeId> {
        let blocks = crate::selection::blocks_in_range(&self.tree, range);
        let (Some(first), Some(last)) = (blocks.first().copied(), blocks.last().copied()) else {
            return Err(EditorError::invalid_operation("range touches no blocks"));
        };
        let first_path = self.path(first)?;
        let last_path = self.path(last)?;

        let depth = if first == last {
            first_path.len() - 1
        } else {
            let common = first_path.common(&last_path);
            if common.len() == first_path.len() || common.len() == last_path.len() {
                return Err(EditorError::invalid_operation("cannot wrap a block together with its ancestor"));
            }
            common.len()
        };
        let parent = self
            .tree
            .node_at(&Path::new(first_path.as_slice()[..depth].to_vec()))?;
        let from = first_path.as_slice()[depth];
        let to = last_path.as_slice()[depth];
        self.wrap_children(parent, from, to, props)
    }

    /// Move `parent`'s children `from..=to` into a new element inserted in their place
    pub(crate) fn wrap_children(
        &mut self,
        parent: NodeId,
        from: usize,
        to: usize,
        props: &ElementProps,
    ) -> EditorResult<NodeId> {
        let wrapper = self.tree.alloc(NodeData::Element(props.clone()));
        self.apply_op(Operation::InsertNode {
            parent,
            index: from,
            node: wrapper,
        })?;
        for moved in 0..=(to - from) {
            let child = self.tree.children(parent)[from + 1];
            self.move_id(child, wrapper, moved)?;
        }
        Ok(wrapper)
    }

    /// The child of `block` that contains `node`
    fn unit_in_block(&self, block: NodeId, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.tree.parent(current) {
            if parent == block {
                break;
            }
            current = parent;
        }
        current
    }

    pub(crate) fn unwrap_range(
        &mut self,
        range: &Range,
        matches: &dyn Fn(&ElementProps) -> bool,
        split: Split,
    ) -> EditorResult<usize> {
        let matched: Vec<NodeId> = nodes_in_range(&self.tree, range)
            .into_iter()
            .filter(|node| self.tree.element(*node).is_some_and(|props| matches(props)))
            .collect();

        let mut count = 0;
        for node in matched.into_iter().rev() {
            if !self.tree.is_attached(node) {
                continue;
            }
            let target = match split {
                Split::Whole => node,
                Split::Exact => self.isolate_covered_children(node, range)?,
            };
            self.unwrap_id(target)?;
            count += 1;
        }
        Ok(count)
    }

    /// Split `node` so that one part holds exactly the children touched by `range`
    fn isolate_covered_children(&mut self, node: NodeId, range: &Range) -> EditorResult<NodeId> {
        let (start, end) = range.edges();
        let mut covered = Vec::new();
        for (index, child) in self.tree.children(node).iter().enumerate() {
            let Some(path) = self.tree.path_of(*child) else {
                continue;
            };
            if path.compare(&start.path) != Ordering::Less && path.compare(&end.path) != Ordering::Greater {
                covered.push(index);
            }
        }
        let (Some(low), Some(high)) = (covered.first().copied(), covered.last().copied()) else {
            return Ok(node);
        };

        if high + 1 < self.tree.children(node).len() {
            self.split_id(node, high + 1)?;
        }
        if low > 0 {
            return self.split_id(node, low);
        }
        Ok(node)
    }

    /// Replace an element with its children
    pub(crate) fn unwrap_id(&mut self, node: NodeId) -> EditorResult<()> {
        let (parent, index) = self.position_of(node)?;
        if parent == self.tree.root() && self.tree.children(node).iter().any(|child| !self.tree.is_block(*child)) {
            return Err(EditorError::invalid_operation(
                "unwrapping would leave inline content at the top level",
            ));
        }
        let children = self.tree.children(node).to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            self.move_id(child, parent, index + offset)?;
        }
        self.remove_id(node)
    }

    pub(crate) fn position_of(&self, node: NodeId) -> EditorResult<(NodeId, usize)> {
        let parent = self
            .tree
            .parent(node)
            .ok_or_else(|| EditorError::invalid_operation("node is not attached"))?;
        let index = self
            .tree
            .index_of(node)
            .ok_or_else(|| EditorError::invalid_operation("node is not attached"))?;
        Ok((parent, index))
    }

    pub(crate) fn path(&self, node: NodeId) -> EditorResult<Path> {
        self.tree
            .path_of(node)
            .ok_or_else(|| EditorError::invalid_operation("node is not attached"))
    }
}

fn split_path(at: &Path) -> EditorResult<(Path, usize)> {
    match (at.parent(), at.last()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(EditorError::InvalidPath(at.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::node::{BlockType, InlineType};

    fn editor(nodes: Vec<Node>) -> Editor {
        Editor::load(nodes, None, EditorConfig::default()).unwrap()
    }

    fn range(anchor: ([usize; 2], usize), focus: ([usize; 2], usize)) -> Range {
        Range::new(Point::new(anchor.0, anchor.1), Point::new(focus.0, focus.1))
    }

    #[test]
    fn test_insert_and_remove_node() {
        let mut editor = editor(vec![Node::paragraph("a")]);
        editor.insert_node(Node::paragraph("b"), &Path::from([1])).unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("a"), Node::paragraph("b")]);

        editor.remove_node(&Path::from([0])).unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("b")]);
    }

    #[test]
    fn test_insert_rejects_top_level_text() {
        let mut editor = editor(vec![Node::paragraph("a")]);
        let result = editor.insert_node(Node::text("loose"), &Path::from([1]));
        assert!(matches!(result, Err(EditorError::InvalidOperation(_))));
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_set_node_properties_merges_attributes() {
        let mut editor = editor(vec![Node::paragraph("a")]);
        let patch = NodePatch::block_type(BlockType::Header).attribute("level", "2");
        editor.set_node_properties(&Path::from([0]), patch).unwrap();

        let saved = editor.save();
        let Node::Block(block) = &saved[0] else {
            panic!("expected a block");
        };
        assert_eq!(block.kind, BlockType::Header);
        assert_eq!(block.attributes.get("level").map(String::as_str), Some("2"));
        assert_eq!(saved[0].string(), "a");
    }

    #[test]
    fn test_set_node_properties_rejects_void_with_content() {
        let mut editor = editor(vec![Node::paragraph("a")]);
        let result = editor.set_node_properties(&Path::from([0]), NodePatch::block_type(BlockType::Image));
        assert!(result.is_err());

        let result = editor.set_node_properties(&Path::from([0, 0]), NodePatch::block_type(BlockType::Header));
        assert!(matches!(result, Err(EditorError::NotAnElement(_))));
    }

    #[test]
    fn test_split_node_splits_block() {
        let mut editor = editor(vec![Node::paragraph("hello")]);
        editor.split_node(&Point::new([0, 0], 2), 1).unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("he"), Node::paragraph("llo")]);
    }

    #[test]
    fn test_wrap_inline_splits_exactly() {
        let mut editor = editor(vec![Node::paragraph("hello world")]);
        let link = ElementProps::inline(InlineType::Link).with_attribute("href", "x");
        editor.wrap_node(link, &range(([0, 0], 6), ([0, 0], 11)), true).unwrap();

        let saved = editor.save();
        let children = saved[0].children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], Node::text("hello "));
        assert_eq!(children[1].kind(), Some(crate::node::ElementKind::Inline(InlineType::Link)));
        assert_eq!(children[1].string(), "world");
    }

    #[test]
    fn test_wrap_blocks_in_list() {
        let mut editor = editor(vec![Node::paragraph("a"), Node::paragraph("b"), Node::paragraph("c")]);
        let list = ElementProps::block(BlockType::UnorderedList);
        editor.wrap_node(list, &range(([0, 0], 0), ([1, 0], 1)), false).unwrap();

        let saved = editor.save();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].children().len(), 2);
        assert_eq!(saved[1], Node::paragraph("c"));
    }

    #[test]
    fn test_unwrap_node_with_split_lifts_middle() {
        let item = |text: &str| Node::block(BlockType::ListItem, vec![Node::text(text)]);
        let mut editor = editor(vec![Node::block(
            BlockType::OrderedList,
            vec![item("1"), item("2"), item("3")],
        )]);

        let caret = Range::collapsed(Point::new([0, 1, 0], 0));
        let count = editor
            .unwrap_node(&caret, |props| props.kind.block_type().is_some_and(BlockType::is_list), true)
            .unwrap();
        assert_eq!(count, 1);

        let saved = editor.save();
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[0], Node::block(BlockType::OrderedList, vec![item("1")]));
        assert_eq!(saved[1], item("2"));
        assert_eq!(saved[2], Node::block(BlockType::OrderedList, vec![item("3")]));
    }

    #[test]
    fn test_unwrap_without_match_is_noop() {
        let mut editor = editor(vec![Node::paragraph("a")]);
        let caret = Range::collapsed(Point::new([0, 0], 0));
        let count = editor.unwrap_node(&caret, |props| props.kind.is_inline(), false).unwrap();
        assert_eq!(count, 0);
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_text_attributes_split_boundaries() {
        let mut editor = editor(vec![Node::paragraph("abc")]);
        let marks = Marks::from(["strikethrough"]);
        editor.set_text_attributes(&range(([0, 0], 1), ([0, 0], 2)), &marks).unwrap();
        assert_eq!(
            editor.save()[0].children(),
            &[Node::text("a"), Node::marked("b", marks.clone()), Node::text("c")]
        );

        editor.remove_text_attributes(&range(([0, 0], 0), ([0, 2], 1)), &marks).unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("abc")]);
    }

    #[test]
    fn test_collapsed_text_attributes_are_noop() {
        let mut editor = editor(vec![Node::paragraph("abc")]);
        let caret = Range::collapsed(Point::new([0, 0], 1));
        editor.set_text_attributes(&caret, &Marks::from(["code"])).unwrap();
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_move_and_merge_node() {
        let mut editor = editor(vec![Node::paragraph("a"), Node::paragraph("b")]);
        editor.move_node(&Path::from([1]), &Path::root(), 0).unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("b"), Node::paragraph("a")]);

        editor.merge_node(&Path::from([1])).unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("ba")]);
    }
}
