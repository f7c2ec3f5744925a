//! # Folio Editor
//!
//! Structured-document editing engine for the article editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ commands: key events → edit intents         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editing: marks, inlines, blocks, lists,     │
//! │          breaks, typing and deletion        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ transforms: insert/remove/wrap/unwrap/split │
//! │             set properties, set/remove marks│
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ operations on the arena tree + selection    │
//! │ → normalization → commit → undo stack       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Primitives only**: every change compiles to reversible operations
//! 2. **Always normalized**: repairs run before a batch commits, so void
//!    blocks are flanked by spacers and lists are never empty
//! 3. **Atomic batches**: a failed edit is rolled back completely
//! 4. **Stable ids**: nodes are addressed by id internally; paths are derived
//! 5. **Single writer**: one editor owns one tree and one selection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{Editor, EditorConfig, EditCommand, Node, Point, Range};
//!
//! let mut editor = Editor::load(vec![Node::paragraph("voodoo")], None, EditorConfig::default())?;
//! editor.select(Range::new(Point::new([0, 0], 0), Point::new([0, 0], 6)))?;
//!
//! editor.increase_emph()?;
//! editor.execute(&EditCommand::Undo)?;
//!
//! let json = editor.to_json()?;
//! ```

mod commands;
mod config;
mod editing;
mod editor;
mod errors;
mod marks;
mod node;
mod normalize;
mod operation;
mod path;
mod selection;
mod session;
mod transforms;
mod tree;
mod undo_stack;

pub use commands::{normalize_hotkey, EditCommand};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use editor::{Change, ChangeOrigin, Editor};
pub use errors::{EditorError, EditorResult, LoadError};
pub use marks::{intensity_marks, Emphasis, Mark, MarkFamily, Marks, Stress, CODE, CROSS_REFERENCE, STRIKETHROUGH};
pub use node::{
    validate_forest, Attributes, BlockType, Element, ElementKind, ElementProps, InlineType, Node,
    NodePatch, Text,
};
pub use normalize::{NormalizeRule, Normalizer, Repair};
pub use operation::{NodeProperties, Operation};
pub use path::{Path, Point, Range};
pub use selection::{unhang_range, Anchor, LeafSpan, Selection};
pub use session::{EditSession, PendingSave, Snapshot};
pub use transforms::Split;
pub use tree::{NodeData, NodeId, Tree};
pub use undo_stack::{OperationBatch, UndoStack};
