//! # Selection Model
//!
//! Internally the selection is anchored to node ids, not paths: an
//! [`Anchor`] names a text leaf and a character offset in it. Operations
//! transform anchors as they apply (see [`Operation::apply`](crate::operation::Operation::apply)),
//! and the public [`Range`] is resolved from them on read.
//!
//! This module also holds the range queries the editing algorithms share:
//! covered leaf spans, nodes intersecting a range, and un-hanging.

use crate::errors::{EditorError, LoadError};
use crate::path::{Point, Range};
use crate::tree::{NodeId, Tree};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub node: NodeId,
    pub offset: usize,
}

impl Anchor {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    pub fn resolve(&self, tree: &Tree) -> Option<Point> {
        Some(Point {
            path: tree.path_of(self.node)?,
            offset: self.offset,
        })
    }

    pub fn from_point(tree: &Tree, point: &Point) -> Result<Self, EditorError> {
        let node = tree.text_at(&point.path)?;
        let len = tree.text_len(node);
        if point.offset > len {
            return Err(EditorError::OffsetOutOfRange {
                path: point.path.clone(),
                offset: point.offset,
                len,
            });
        }
        Ok(Self::new(node, point.offset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Anchor,
    pub focus: Anchor,
}

impl Selection {
    pub fn caret(anchor: Anchor) -> Self {
        Self {
            anchor,
            focus: anchor,
        }
    }

    pub fn new(anchor: Anchor, focus: Anchor) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn anchors_mut(&mut self) -> [&mut Anchor; 2] {
        [&mut self.anchor, &mut self.focus]
    }

    pub fn resolve(&self, tree: &Tree) -> Option<Range> {
        Some(Range::new(self.anchor.resolve(tree)?, self.focus.resolve(tree)?))
    }

    pub fn from_range(tree: &Tree, range: &Range) -> Result<Self, EditorError> {
        Ok(Self::new(
            Anchor::from_point(tree, &range.anchor)?,
            Anchor::from_point(tree, &range.focus)?,
        ))
    }

    /// Like [`Selection::from_range`], reporting problems as load errors
    pub fn load(tree: &Tree, range: &Range) -> Result<Self, LoadError> {
        Self::from_range(tree, range).map_err(|err| LoadError::InvalidSelection(err.to_string()))
    }
}

/// The characters `start..end` of one text leaf covered by a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafSpan {
    pub node: NodeId,
    pub start: usize,
    pub end: usize,
    pub len: usize,
}

impl LeafSpan {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_whole(&self) -> bool {
        self.start == 0 && self.end == self.len
    }
}

/// Every text leaf intersecting `range`, in document order
///
/// Boundary leaves get partial spans; a range ending at offset 0 of a leaf
/// still lists that leaf with an empty span.
pub fn leaf_spans(tree: &Tree, range: &Range) -> Vec<LeafSpan> {
    let (start, end) = range.edges();
    let mut spans = Vec::new();
    for node in tree.texts() {
        let Some(path) = tree.path_of(node) else {
            continue;
        };
        if path.compare(&start.path) == Ordering::Less {
            continue;
        }
        if path.compare(&end.path) == Ordering::Greater {
            break;
        }
        let len = tree.text_len(node);
        let from = if path == start.path { start.offset } else { 0 };
        let to = if path == end.path { end.offset } else { len };
        spans.push(LeafSpan {
            node,
            start: from.min(len),
            end: to.min(len),
            len,
        });
    }
    spans
}

/// Spans with at least one covered character, skipping void placeholders
pub fn covered_spans(tree: &Tree, range: &Range) -> Vec<LeafSpan> {
    leaf_spans(tree, range)
        .into_iter()
        .filter(|span| !span.is_empty() && tree.void_of(span.node).is_none())
        .collect()
}

/// Every node whose extent intersects `range`, ancestors included, pre-order
pub fn nodes_in_range(tree: &Tree, range: &Range) -> Vec<NodeId> {
    let (start, end) = range.edges();
    tree.descendants(tree.root())
        .into_iter()
        .filter(|node| *node != tree.root())
        .filter(|node| match tree.path_of(*node) {
            Some(path) => {
                path.compare(&start.path) != Ordering::Less
                    && path.compare(&end.path) != Ordering::Greater
            }
            None => false,
        })
        .collect()
}

/// Lowest blocks touched by `range`, in document order
pub fn blocks_in_range(tree: &Tree, range: &Range) -> Vec<NodeId> {
    let mut blocks: Vec<NodeId> = Vec::new();
    for span in leaf_spans(tree, range) {
        if let Some(block) = tree.block_of(span.node) {
            if !blocks.contains(&block) {
                blocks.push(block);
            }
        }
    }
    blocks
}

/// Pull back an end point that only reaches offset 0 of a following block
///
/// Triple-click style selections run from the start of one block to the
/// very start of the next. Such a range is moved to end at the last
/// non-void text before that block.
pub fn unhang_range(tree: &Tree, range: &Range) -> Range {
    let (start, end) = range.edges();
    if range.is_collapsed() || start.offset != 0 || end.offset != 0 {
        return range.clone();
    }

    let (Ok(start_leaf), Ok(end_leaf)) = (tree.text_at(&start.path), tree.text_at(&end.path))
    else {
        return range.clone();
    };
    let Some(end_block) = tree.block_of(end_leaf) else {
        return range.clone();
    };
    if tree.block_of(start_leaf) == Some(end_block) {
        return range.clone();
    }

    let texts = tree.texts();
    let Some(end_position) = texts.iter().position(|text| *text == end_leaf) else {
        return range.clone();
    };
    let Some(start_position) = texts.iter().position(|text| *text == start_leaf) else {
        return range.clone();
    };

    let new_end = texts[start_position..end_position]
        .iter()
        .rev()
        .copied()
        .find(|text| !tree.is_ancestor(end_block, *text) && tree.void_of(*text).is_none());

    match new_end.and_then(|text| Anchor::new(text, tree.text_len(text)).resolve(tree)) {
        Some(point) => Range::new(start.clone(), point),
        None => range.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BlockType, ElementKind, Node};

    fn tree() -> Tree {
        Tree::from_nodes(&[
            Node::paragraph("hello"),
            Node::void(ElementKind::Block(BlockType::Image)),
            Node::paragraph("world"),
        ])
        .unwrap()
    }

    #[test]
    fn test_leaf_spans_cover_partial_boundaries() {
        let tree = tree();
        let range = Range::new(Point::new([0, 0], 2), Point::new([2, 0], 3));
        let spans = leaf_spans(&tree, &range);
        assert_eq!(spans.len(), 3);
        assert_eq!((spans[0].start, spans[0].end), (2, 5));
        assert!(spans[1].is_empty());
        assert_eq!((spans[2].start, spans[2].end), (0, 3));
        assert_eq!(covered_spans(&tree, &range).len(), 2);
    }

    #[test]
    fn test_nodes_in_range_include_ancestors() {
        let tree = tree();
        let range = Range::collapsed(Point::new([2, 0], 1));
        let nodes = nodes_in_range(&tree, &range);
        assert_eq!(nodes.len(), 2);
        assert!(tree.is_block(nodes[0]));
        assert!(tree.is_text(nodes[1]));
    }

    #[test]
    fn test_unhang_moves_end_back_past_voids() {
        let tree = tree();
        let range = Range::new(Point::new([0, 0], 0), Point::new([2, 0], 0));
        let unhung = unhang_range(&tree, &range);
        assert_eq!(unhung.focus, Point::new([0, 0], 5));
    }

    #[test]
    fn test_unhang_leaves_regular_ranges_alone() {
        let tree = tree();
        let range = Range::new(Point::new([0, 0], 1), Point::new([2, 0], 0));
        assert_eq!(unhang_range(&tree, &range), range);
    }

    #[test]
    fn test_anchor_rejects_out_of_range_offset() {
        let tree = tree();
        let err = Anchor::from_point(&tree, &Point::new([0, 0], 9)).unwrap_err();
        assert!(matches!(err, EditorError::OffsetOutOfRange { len: 5, .. }));
    }
}
