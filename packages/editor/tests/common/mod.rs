//! Shared builders for the integration tests

#![allow(dead_code)]

use folio_editor::{BlockType, Editor, EditorConfig, ElementKind, Node, Path, Point, Range};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn image() -> Node {
    Node::void(ElementKind::Block(BlockType::Image))
}

pub fn spacer() -> Node {
    Node::void(ElementKind::Block(BlockType::VoidSpacer))
}

pub fn code(text: &str) -> Node {
    Node::block(BlockType::Code, vec![Node::text(text)])
}

pub fn item(text: &str) -> Node {
    Node::block(BlockType::ListItem, vec![Node::text(text)])
}

pub fn list(kind: BlockType, items: &[&str]) -> Node {
    Node::block(kind, items.iter().map(|text| item(text)).collect())
}

pub fn caret(path: impl Into<Path>, offset: usize) -> Range {
    Range::collapsed(Point::new(path, offset))
}

/// Range over `from..to` of one text leaf
pub fn span<const N: usize>(path: [usize; N], from: usize, to: usize) -> Range {
    Range::new(Point::new(path, from), Point::new(path, to))
}

pub fn load(doc: Vec<Node>, selection: Range) -> Editor {
    init_tracing();
    Editor::load(doc, Some(selection), EditorConfig::default()).unwrap()
}
