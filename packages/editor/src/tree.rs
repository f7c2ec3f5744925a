//! # Document Tree
//!
//! Arena-backed, mutable representation of the document used while editing.
//!
//! ## Design
//!
//! - Every node lives in one arena slot addressed by a stable [`NodeId`]
//! - Entries keep a parent pointer; a node's [`Path`] is computed on demand
//!   by walking those pointers, so paths are never cached across edits
//! - Removing a node only detaches it. The slot stays allocated so that the
//!   undo log can re-attach the very same ids later
//!
//! The only code that changes structure is [`Operation::apply`](crate::operation::Operation::apply);
//! everything else reads.

use crate::errors::EditorError;
use crate::marks::Marks;
use crate::node::{validate_forest, Element, ElementKind, ElementProps, Node, Text};
use crate::path::Path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Root,
    Text { text: String, marks: Marks },
    Element(ElementProps),
}

#[derive(Debug, Clone)]
struct Entry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Tree {
    entries: Vec<Entry>,
}

impl Tree {
    /// A tree with a root and no content
    pub(crate) fn bare() -> Self {
        Self {
            entries: vec![Entry {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Build the arena from a validated forest
    pub fn from_nodes(nodes: &[Node]) -> Result<Self, EditorError> {
        validate_forest(nodes)?;
        let mut tree = Self::bare();
        let root = tree.root();
        for node in nodes {
            let id = tree.alloc_subtree(node);
            tree.entries[id.index()].parent = Some(root);
            tree.entries[root.index()].children.push(id);
        }
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.entries.len() as u32);
        self.entries.push(Entry {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate a detached copy of `node` and its descendants
    pub(crate) fn alloc_subtree(&mut self, node: &Node) -> NodeId {
        let data = match node {
            Node::Text(text) => NodeData::Text {
                text: text.text.clone(),
                marks: text.marks.clone(),
            },
            Node::Block(element) => NodeData::Element(ElementProps {
                kind: ElementKind::Block(element.kind),
                attributes: element.attributes.clone(),
            }),
            Node::Inline(element) => NodeData::Element(ElementProps {
                kind: ElementKind::Inline(element.kind),
                attributes: element.attributes.clone(),
            }),
        };
        let id = self.alloc(data);
        for child in node.children() {
            let child_id = self.alloc_subtree(child);
            self.entries[child_id.index()].parent = Some(id);
            self.entries[id.index()].children.push(child_id);
        }
        id
    }

    fn entry(&self, id: NodeId) -> &Entry {
        &self.entries[id.index()]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.entries.len()
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.entry(id).data
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.entries[id.index()].data
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.entry(id).children
    }

    pub(crate) fn children_mut(&mut self, id: NodeId) -> &mut Vec<NodeId> {
        &mut self.entries[id.index()].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).parent
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.entries[id.index()].parent = parent;
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    /// True if the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Path of an attached node; `None` for detached ones
    pub fn path_of(&self, id: NodeId) -> Option<Path> {
        let mut indices = Vec::new();
        let mut current = id;
        while current != self.root() {
            let parent = self.parent(current)?;
            indices.push(self.index_of(current)?);
            current = parent;
        }
        indices.reverse();
        Some(Path::new(indices))
    }

    pub fn node_at(&self, path: &Path) -> Result<NodeId, EditorError> {
        let mut current = self.root();
        for &index in path.as_slice() {
            current = *self
                .children(current)
                .get(index)
                .ok_or_else(|| EditorError::InvalidPath(path.clone()))?;
        }
        Ok(current)
    }

    /// The text leaf at `path`
    pub fn text_at(&self, path: &Path) -> Result<NodeId, EditorError> {
        let id = self.node_at(path)?;
        if self.is_text(id) {
            Ok(id)
        } else {
            Err(EditorError::NotAText(path.clone()))
        }
    }

    /// The element at `path`
    pub fn element_at(&self, path: &Path) -> Result<NodeId, EditorError> {
        let id = self.node_at(path)?;
        if self.element(id).is_some() {
            Ok(id)
        } else {
            Err(EditorError::NotAnElement(path.clone()))
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Text { .. })
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn marks(&self, id: NodeId) -> Option<&Marks> {
        match self.data(id) {
            NodeData::Text { marks, .. } => Some(marks),
            _ => None,
        }
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementProps> {
        match self.data(id) {
            NodeData::Element(props) => Some(props),
            _ => None,
        }
    }

    pub fn kind(&self, id: NodeId) -> Option<ElementKind> {
        self.element(id).map(|props| props.kind)
    }

    pub fn is_block(&self, id: NodeId) -> bool {
        self.kind(id).is_some_and(ElementKind::is_block)
    }

    pub fn is_inline(&self, id: NodeId) -> bool {
        self.kind(id).is_some_and(ElementKind::is_inline)
    }

    pub fn is_void(&self, id: NodeId) -> bool {
        self.kind(id).is_some_and(ElementKind::is_void)
    }

    /// Length of a text leaf in characters (zero for elements)
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map_or(0, |text| text.chars().count())
    }

    /// Concatenated text below `id`
    pub fn string(&self, id: NodeId) -> String {
        match self.data(id) {
            NodeData::Text { text, .. } => text.clone(),
            _ => self
                .children(id)
                .iter()
                .map(|child| self.string(*child))
                .collect(),
        }
    }

    /// `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.is_ancestor(ancestor, id)
    }

    /// Ancestors of `id` from its parent up to (and including) the root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            result.push(node);
            current = self.parent(node);
        }
        result
    }

    /// Nearest block at or above `id`
    pub fn block_of(&self, id: NodeId) -> Option<NodeId> {
        if self.is_block(id) {
            return Some(id);
        }
        self.ancestors(id)
            .into_iter()
            .find(|ancestor| self.is_block(*ancestor))
    }

    /// Nearest void element at or above `id`
    pub fn void_of(&self, id: NodeId) -> Option<NodeId> {
        if self.is_void(id) {
            return Some(id);
        }
        self.ancestors(id)
            .into_iter()
            .find(|ancestor| self.is_void(*ancestor))
    }

    /// Nearest inline at or above `id`
    pub fn inline_of(&self, id: NodeId) -> Option<NodeId> {
        if self.is_inline(id) {
            return Some(id);
        }
        self.ancestors(id)
            .into_iter()
            .find(|ancestor| self.is_inline(*ancestor))
    }

    /// Pre-order walk of `id` and its descendants
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        result
    }

    /// Every attached text leaf in document order
    pub fn texts(&self) -> Vec<NodeId> {
        self.texts_in(self.root())
    }

    pub fn texts_in(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node| self.is_text(*node))
            .collect()
    }

    pub fn first_text(&self, id: NodeId) -> Option<NodeId> {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if self.is_text(node) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        None
    }

    pub fn last_text(&self, id: NodeId) -> Option<NodeId> {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if self.is_text(node) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().copied());
        }
        None
    }

    /// Closest text leaf before `id` in document order that is not inside it
    ///
    /// Walks earlier siblings, then earlier siblings of each ancestor.
    pub fn previous_text(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_attached(id) {
            return None;
        }
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let index = self.index_of(current)?;
            let found = self.children(parent)[..index]
                .iter()
                .rev()
                .find_map(|sibling| self.last_text(*sibling));
            if found.is_some() {
                return found;
            }
            current = parent;
        }
        None
    }

    /// Closest text leaf after `id` in document order that is not inside it
    pub fn next_text(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_attached(id) {
            return None;
        }
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let index = self.index_of(current)?;
            let found = self.children(parent)[index + 1..]
                .iter()
                .find_map(|sibling| self.first_text(*sibling));
            if found.is_some() {
                return found;
            }
            current = parent;
        }
        None
    }

    /// Number of attached nodes, root included
    pub fn attached_len(&self) -> usize {
        self.descendants(self.root()).len()
    }

    /// Serialize the subtree at `id` back into a value
    pub fn to_node(&self, id: NodeId) -> Option<Node> {
        let children = || -> Vec<Node> {
            self.children(id)
                .iter()
                .filter_map(|child| self.to_node(*child))
                .collect()
        };
        match self.data(id) {
            NodeData::Root => None,
            NodeData::Text { text, marks } => Some(Node::Text(Text {
                text: text.clone(),
                marks: marks.clone(),
            })),
            NodeData::Element(props) => Some(match props.kind {
                ElementKind::Block(kind) => Node::Block(Element {
                    kind,
                    attributes: props.attributes.clone(),
                    children: children(),
                }),
                ElementKind::Inline(kind) => Node::Inline(Element {
                    kind,
                    attributes: props.attributes.clone(),
                    children: children(),
                }),
            }),
        }
    }

    /// The whole document as a forest of values
    pub fn to_nodes(&self) -> Vec<Node> {
        self.children(self.root())
            .iter()
            .filter_map(|child| self.to_node(*child))
            .collect()
    }
}

/// Byte index of the `offset`-th character of `text`
pub(crate) fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(index, _)| index)
}

/// Characters `start..start + len` of `text`
pub(crate) fn char_slice(text: &str, start: usize, len: usize) -> &str {
    let from = byte_index(text, start);
    let to = byte_index(text, start + len);
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BlockType, InlineType};

    fn sample() -> Tree {
        Tree::from_nodes(&[
            Node::paragraph("one"),
            Node::block(
                BlockType::OrderedList,
                vec![
                    Node::block(BlockType::ListItem, vec![Node::text("a")]),
                    Node::block(BlockType::ListItem, vec![Node::text("b")]),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_paths_are_derived_from_parents() {
        let tree = sample();
        let item = tree.node_at(&Path::from([1, 1])).unwrap();
        assert_eq!(tree.path_of(item), Some(Path::from([1, 1])));
        assert_eq!(tree.string(item), "b");
        assert!(tree.is_attached(item));
    }

    #[test]
    fn test_invalid_path_is_an_error() {
        let tree = sample();
        assert!(matches!(
            tree.node_at(&Path::from([5])),
            Err(EditorError::InvalidPath(_))
        ));
        assert!(matches!(
            tree.text_at(&Path::from([1])),
            Err(EditorError::NotAText(_))
        ));
    }

    #[test]
    fn test_texts_in_document_order() {
        let tree = sample();
        let texts: Vec<String> = tree
            .texts()
            .into_iter()
            .map(|id| tree.string(id))
            .collect();
        assert_eq!(texts, vec!["one", "a", "b"]);
    }

    #[test]
    fn test_previous_and_next_text() {
        let tree = sample();
        let list = tree.node_at(&Path::from([1])).unwrap();
        let before = tree.previous_text(list).unwrap();
        assert_eq!(tree.text(before), Some("one"));
        let first_item = tree.node_at(&Path::from([1, 0])).unwrap();
        let after = tree.next_text(first_item).unwrap();
        assert_eq!(tree.text(after), Some("b"));
        assert_eq!(tree.next_text(list), None);
    }

    #[test]
    fn test_neighbour_texts_skip_empty_elements() {
        let tree = Tree::from_nodes(&[
            Node::paragraph("one"),
            Node::block(BlockType::UnorderedList, vec![]),
            Node::block(
                BlockType::Paragraph,
                vec![Node::text("two"), Node::inline(InlineType::Link, vec![Node::text("three")])],
            ),
        ])
        .unwrap();
        let empty = tree.node_at(&Path::from([1])).unwrap();
        assert_eq!(tree.previous_text(empty).and_then(|t| tree.text(t)), Some("one"));
        assert_eq!(tree.next_text(empty).and_then(|t| tree.text(t)), Some("two"));

        let link = tree.node_at(&Path::from([2, 1])).unwrap();
        assert_eq!(tree.previous_text(link).and_then(|t| tree.text(t)), Some("two"));
        let last = tree.text_at(&Path::from([2, 1, 0])).unwrap();
        assert_eq!(tree.next_text(last), None);
        assert_eq!(tree.last_text(tree.root()), Some(last));
    }

    #[test]
    fn test_round_trip_through_values() {
        let nodes = vec![Node::paragraph("x"), Node::void(ElementKind::Block(BlockType::Image))];
        let tree = Tree::from_nodes(&nodes).unwrap();
        assert_eq!(tree.to_nodes(), nodes);
    }

    #[test]
    fn test_char_helpers_respect_multibyte_text() {
        let text = "héllo";
        assert_eq!(byte_index(text, 2), 3);
        assert_eq!(char_slice(text, 1, 3), "éll");
        assert_eq!(byte_index(text, 9), text.len());
    }
}
