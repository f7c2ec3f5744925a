//! # Document Nodes
//!
//! Serialized shapes of an article body. A document is an ordered forest of
//! [`Node`]s with three shapes:
//!
//! - **Text** leaves carrying a string and a set of [`Marks`]
//! - **Block** elements (paragraph, header, lists, code, image, spacer)
//! - **Inline** elements (link, inline math), only ever inside a block
//!
//! Whether an element is *void* is a property of its type, not of the
//! instance. Void elements carry exactly one empty text leaf as a placeholder;
//! their real content lives in attributes (`src`, `source`, ...).
//!
//! These values are what crosses the load/save boundary. While editing, the
//! document lives in the arena [`Tree`](crate::tree::Tree).

use crate::errors::LoadError;
use crate::marks::Marks;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Attributes = BTreeMap<String, String>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    #[default]
    Paragraph,
    Header,
    OrderedList,
    UnorderedList,
    ListItem,
    Code,
    Image,
    VoidSpacer,
}

impl BlockType {
    pub fn is_void(self) -> bool {
        matches!(self, Self::Image | Self::VoidSpacer)
    }

    /// List containers (ordered/unordered)
    pub fn is_list(self) -> bool {
        matches!(self, Self::OrderedList | Self::UnorderedList)
    }

    pub fn is_spacer(self) -> bool {
        self == Self::VoidSpacer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InlineType {
    Link,
    InlineMath,
}

impl InlineType {
    pub fn is_void(self) -> bool {
        matches!(self, Self::InlineMath)
    }
}

/// Element type tag of either shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", content = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Block(BlockType),
    Inline(InlineType),
}

impl ElementKind {
    pub fn is_void(self) -> bool {
        match self {
            Self::Block(kind) => kind.is_void(),
            Self::Inline(kind) => kind.is_void(),
        }
    }

    pub fn is_inline(self) -> bool {
        matches!(self, Self::Inline(_))
    }

    pub fn is_block(self) -> bool {
        matches!(self, Self::Block(_))
    }

    pub fn block_type(self) -> Option<BlockType> {
        match self {
            Self::Block(kind) => Some(kind),
            Self::Inline(_) => None,
        }
    }

    pub fn inline_type(self) -> Option<InlineType> {
        match self {
            Self::Inline(kind) => Some(kind),
            Self::Block(_) => None,
        }
    }
}

/// Everything about an element except its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementProps {
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl ElementProps {
    pub fn block(kind: BlockType) -> Self {
        Self {
            kind: ElementKind::Block(kind),
            attributes: Attributes::new(),
        }
    }

    pub fn inline(kind: InlineType) -> Self {
        Self {
            kind: ElementKind::Inline(kind),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn is_void(&self) -> bool {
        self.kind.is_void()
    }
}

/// Shallow property changes applied by `set_node_properties`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ElementKind>,
    /// `None` removes the attribute
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Option<String>>,
}

impl NodePatch {
    pub fn kind(kind: ElementKind) -> Self {
        Self {
            kind: Some(kind),
            attributes: BTreeMap::new(),
        }
    }

    pub fn block_type(kind: BlockType) -> Self {
        Self::kind(ElementKind::Block(kind))
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), Some(value.into()));
        self
    }

    pub fn remove_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), None);
        self
    }

    /// Merge this patch onto `props`
    pub fn applied_to(&self, props: &ElementProps) -> ElementProps {
        let mut next = props.clone();
        if let Some(kind) = self.kind {
            next.kind = kind;
        }
        for (name, value) in &self.attributes {
            match value {
                Some(value) => {
                    next.attributes.insert(name.clone(), value.clone());
                }
                None => {
                    next.attributes.remove(name);
                }
            }
        }
        next
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(default, skip_serializing_if = "Marks::is_empty")]
    pub marks: Marks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element<T> {
    #[serde(rename = "type")]
    pub kind: T,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// One node of the serialized document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "lowercase")]
pub enum Node {
    Text(Text),
    Block(Element<BlockType>),
    Inline(Element<InlineType>),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text {
            text: text.into(),
            marks: Marks::new(),
        })
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(Text {
            text: text.into(),
            marks,
        })
    }

    pub fn block(kind: BlockType, children: Vec<Node>) -> Self {
        Node::Block(Element {
            kind,
            attributes: Attributes::new(),
            children,
        })
    }

    pub fn inline(kind: InlineType, children: Vec<Node>) -> Self {
        Node::Inline(Element {
            kind,
            attributes: Attributes::new(),
            children,
        })
    }

    /// Default block holding a single unmarked text leaf
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::block(BlockType::Paragraph, vec![Node::text(text)])
    }

    /// Void element of `kind` with its empty placeholder text
    pub fn void(kind: ElementKind) -> Self {
        let children = vec![Node::text("")];
        match kind {
            ElementKind::Block(kind) => Node::block(kind, children),
            ElementKind::Inline(kind) => Node::inline(kind, children),
        }
    }

    /// Build an element node from props and children
    pub fn element(props: ElementProps, children: Vec<Node>) -> Self {
        match props.kind {
            ElementKind::Block(kind) => Node::Block(Element {
                kind,
                attributes: props.attributes,
                children,
            }),
            ElementKind::Inline(kind) => Node::Inline(Element {
                kind,
                attributes: props.attributes,
                children,
            }),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            Node::Block(element) => {
                element.attributes.insert(name.into(), value.into());
            }
            Node::Inline(element) => {
                element.attributes.insert(name.into(), value.into());
            }
            Node::Text(_) => {}
        }
        self
    }

    pub fn kind(&self) -> Option<ElementKind> {
        match self {
            Node::Text(_) => None,
            Node::Block(element) => Some(ElementKind::Block(element.kind)),
            Node::Inline(element) => Some(ElementKind::Inline(element.kind)),
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Text(_) => &[],
            Node::Block(element) => &element.children,
            Node::Inline(element) => &element.children,
        }
    }

    /// Concatenated text of every leaf below this node
    pub fn string(&self) -> String {
        match self {
            Node::Text(text) => text.text.clone(),
            _ => self.children().iter().map(Node::string).collect(),
        }
    }
}

/// Check a forest against the structural rules a loaded document must obey
///
/// Normalization repairs unnormalized documents; it does not repair these.
pub fn validate_forest(nodes: &[Node]) -> Result<(), LoadError> {
    for (index, node) in nodes.iter().enumerate() {
        let path = Path::from([index]);
        match node {
            Node::Text(_) => return Err(LoadError::TextAtTopLevel { path }),
            Node::Inline(_) => return Err(LoadError::InlineAtTopLevel { path }),
            Node::Block(_) => validate_node(node, &path, false)?,
        }
    }
    Ok(())
}

pub(crate) fn validate_node(node: &Node, path: &Path, inside_inline: bool) -> Result<(), LoadError> {
    let Some(kind) = node.kind() else {
        return Ok(());
    };

    if inside_inline && kind.is_block() {
        return Err(LoadError::BlockInsideInline { path: path.clone() });
    }

    let children = node.children();
    if kind.is_void() {
        if children.len() > 1 {
            return Err(LoadError::VoidChildren {
                path: path.clone(),
                count: children.len(),
            });
        }
        if children.iter().any(|child| !matches!(child, Node::Text(_))) {
            return Err(LoadError::VoidNonTextChild { path: path.clone() });
        }
    }

    for (index, child) in children.iter().enumerate() {
        validate_node(child, &path.child(index), inside_inline || kind.is_inline())?;
    }
    Ok(())
}
