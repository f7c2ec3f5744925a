//! # Normalization
//!
//! Structural repairs that run after every batch of operations, before the
//! batch commits.
//!
//! ## Design
//!
//! Normalization is a set of shallow [`NormalizeRule`]s. A rule looks at one
//! dirty node (and its direct children) and proposes at most one [`Repair`].
//! The editor drives a bounded work-list over dirty nodes:
//!
//! 1. pop a dirty node; skip it when it is no longer attached
//! 2. ask each rule in order for a repair; apply the first one through the
//!    ordinary operation path, which marks more nodes dirty
//! 3. re-queue the node so it is checked again after the repair
//!
//! Repairs are:
//! - **Deterministic**: the same tree always yields the same repair
//! - **Minimal**: one operation per repair, then re-check
//! - **Local**: a rule only reads the node and its children
//!
//! The loop stops once no dirty nodes remain. A budget proportional to the
//! tree size bounds it; running past the budget is a bug in the rules and is
//! reported as [`EditorError::NormalizationDiverged`](crate::EditorError::NormalizationDiverged).

use crate::node::{BlockType, ElementKind, Node};
use crate::tree::{NodeData, NodeId, Tree};

/// One structural repair proposed by a rule
#[derive(Debug, Clone, PartialEq)]
pub enum Repair {
    /// Insert a new node as `parent`'s child at `index`
    Insert {
        parent: NodeId,
        index: usize,
        node: Node,
    },

    /// Remove an attached node
    Remove { node: NodeId },

    /// Merge a text leaf into the text leaf right before it
    MergeIntoPrevious { node: NodeId },
}

/// A shallow check on one dirty node
pub trait NormalizeRule: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn check(&self, tree: &Tree, node: NodeId) -> Option<Repair>;
}

fn is_content_void(tree: &Tree, node: NodeId) -> bool {
    tree.is_block(node)
        && tree.is_void(node)
        && tree.kind(node) != Some(ElementKind::Block(BlockType::VoidSpacer))
}

fn is_spacer(tree: &Tree, node: NodeId) -> bool {
    tree.kind(node) == Some(ElementKind::Block(BlockType::VoidSpacer))
}

/// Every top-level void block sits between spacers; consecutive voids share one
#[derive(Debug)]
pub struct SpacersAroundVoids;

impl NormalizeRule for SpacersAroundVoids {
    fn name(&self) -> &'static str {
        "spacers_around_voids"
    }

    fn check(&self, tree: &Tree, node: NodeId) -> Option<Repair> {
        if node != tree.root() {
            return None;
        }
        let children = tree.children(node);
        for (index, child) in children.iter().enumerate() {
            if !is_content_void(tree, *child) {
                continue;
            }
            let before = index.checked_sub(1).map(|i| children[i]);
            if !before.is_some_and(|sibling| is_spacer(tree, sibling)) {
                return Some(Repair::Insert {
                    parent: node,
                    index,
                    node: Node::void(ElementKind::Block(BlockType::VoidSpacer)),
                });
            }
            let after = children.get(index + 1).copied();
            if !after.is_some_and(|sibling| is_spacer(tree, sibling)) {
                return Some(Repair::Insert {
                    parent: node,
                    index: index + 1,
                    node: Node::void(ElementKind::Block(BlockType::VoidSpacer)),
                });
            }
        }
        None
    }
}

/// Spacers only exist next to a void block, and never two in a row
#[derive(Debug)]
pub struct RemoveOrphanedSpacers;

impl NormalizeRule for RemoveOrphanedSpacers {
    fn name(&self) -> &'static str {
        "remove_orphaned_spacers"
    }

    fn check(&self, tree: &Tree, node: NodeId) -> Option<Repair> {
        if node != tree.root() {
            return None;
        }
        let children = tree.children(node);
        for (index, child) in children.iter().enumerate() {
            if !is_spacer(tree, *child) {
                continue;
            }
            let before = index.checked_sub(1).map(|i| children[i]);
            let after = children.get(index + 1).copied();

            if before.is_some_and(|sibling| is_spacer(tree, sibling)) {
                return Some(Repair::Remove { node: *child });
            }
            let guards_void = before.is_some_and(|sibling| is_content_void(tree, sibling))
                || after.is_some_and(|sibling| is_content_void(tree, sibling));
            if !guards_void {
                return Some(Repair::Remove { node: *child });
            }
        }
        None
    }
}

/// List containers with no items are removed
#[derive(Debug)]
pub struct RemoveEmptyLists;

impl NormalizeRule for RemoveEmptyLists {
    fn name(&self) -> &'static str {
        "remove_empty_lists"
    }

    fn check(&self, tree: &Tree, node: NodeId) -> Option<Repair> {
        let is_list = tree
            .kind(node)
            .and_then(ElementKind::block_type)
            .is_some_and(BlockType::is_list);
        (is_list && tree.children(node).is_empty()).then_some(Repair::Remove { node })
    }
}

/// Elements always hold some content; an empty document holds one paragraph
#[derive(Debug)]
pub struct FillEmptyElements;

impl NormalizeRule for FillEmptyElements {
    fn name(&self) -> &'static str {
        "fill_empty_elements"
    }

    fn check(&self, tree: &Tree, node: NodeId) -> Option<Repair> {
        if !tree.children(node).is_empty() {
            return None;
        }
        let filler = match tree.data(node) {
            NodeData::Root => Node::paragraph(""),
            NodeData::Element(props) if props.kind.block_type().is_some_and(BlockType::is_list) => {
                return None
            }
            NodeData::Element(_) => Node::text(""),
            NodeData::Text { .. } => return None,
        };
        Some(Repair::Insert {
            parent: node,
            index: 0,
            node: filler,
        })
    }
}

/// Adjacent text leaves with identical marks become one leaf
#[derive(Debug)]
pub struct MergeAdjacentTexts;

impl NormalizeRule for MergeAdjacentTexts {
    fn name(&self) -> &'static str {
        "merge_adjacent_texts"
    }

    fn check(&self, tree: &Tree, node: NodeId) -> Option<Repair> {
        let children = tree.children(node);
        for pair in children.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let (Some(left_marks), Some(right_marks)) = (tree.marks(left), tree.marks(right))
            else {
                continue;
            };
            if left_marks == right_marks || tree.text_len(right) == 0 {
                return Some(Repair::MergeIntoPrevious { node: right });
            }
            if tree.text_len(left) == 0 {
                return Some(Repair::Remove { node: left });
            }
        }
        None
    }
}

/// The ordered rule set
#[derive(Debug)]
pub struct Normalizer {
    rules: Vec<Box<dyn NormalizeRule>>,
}

impl Normalizer {
    /// Create a normalizer with the built-in rules
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(SpacersAroundVoids),
                Box::new(RemoveOrphanedSpacers),
                Box::new(RemoveEmptyLists),
                Box::new(FillEmptyElements),
                Box::new(MergeAdjacentTexts),
            ],
        }
    }

    /// The first repair any rule proposes for `node`, with the rule's name
    pub fn check(&self, tree: &Tree, node: NodeId) -> Option<(&'static str, Repair)> {
        self.rules
            .iter()
            .find_map(|rule| rule.check(tree, node).map(|repair| (rule.name(), repair)))
    }

    /// Upper bound on repairs for one pass over a tree of this size
    pub fn budget(tree: &Tree, dirty: usize) -> usize {
        16 * (tree.attached_len() + dirty) + 64
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
