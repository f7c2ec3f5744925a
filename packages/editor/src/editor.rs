//! # Editor
//!
//! One editor owns one document tree and one selection. Every change runs
//! inside a batch:
//!
//! ```text
//! with_batch("bold", |editor| ...)       primitives emit operations
//!         ↓                              each operation marks parents dirty
//! normalize dirty nodes                  repairs are operations too
//!         ↓
//! commit                                 push onto the undo stack,
//!                                        bump the version, notify listeners
//! ```
//!
//! Batches nest; only the outermost one normalizes and commits. When a batch
//! fails, every operation it applied is reverted in reverse order and the
//! selection is restored, so callers never observe a half-applied edit.

use crate::config::EditorConfig;
use crate::errors::{EditorError, EditorResult, LoadError};
use crate::marks::Marks;
use crate::node::Node;
use crate::normalize::{Normalizer, Repair};
use crate::operation::Operation;
use crate::path::{Point, Range};
use crate::selection::{Anchor, Selection};
use crate::tree::{NodeId, Tree};
use crate::undo_stack::{OperationBatch, UndoStack};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// What produced a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOrigin {
    Edit,
    Undo,
    Redo,
}

/// Notification sent to listeners after every commit, undo and redo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub version: u64,
    pub origin: ChangeOrigin,
    pub description: Option<String>,
    /// Operations applied, in application order
    pub operations: Vec<Operation>,
}

type Listener = Box<dyn FnMut(&Change)>;

/// The batch currently being built
#[derive(Debug)]
struct Batch {
    description: String,
    operations: Vec<Operation>,
    selection_before: Option<Selection>,
    marks_before: Option<Marks>,
    dirty: VecDeque<NodeId>,
    queued: HashSet<NodeId>,
}

impl Batch {
    fn new(description: &str, selection_before: Option<Selection>, marks_before: Option<Marks>) -> Self {
        Self {
            description: description.to_string(),
            operations: Vec::new(),
            selection_before,
            marks_before,
            dirty: VecDeque::new(),
            queued: HashSet::new(),
        }
    }

    fn mark_dirty(&mut self, node: NodeId) {
        if self.queued.insert(node) {
            self.dirty.push_back(node);
        }
    }

    fn pop_dirty(&mut self) -> Option<NodeId> {
        let node = self.dirty.pop_front()?;
        self.queued.remove(&node);
        Some(node)
    }
}

pub struct Editor {
    pub(crate) tree: Tree,
    pub(crate) selection: Option<Selection>,
    pub(crate) pending_marks: Option<Marks>,
    pub(crate) config: EditorConfig,
    history: UndoStack,
    normalizer: Normalizer,
    version: u64,
    batch: Option<Batch>,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("version", &self.version)
            .field("selection", &self.selection())
            .field("pending_marks", &self.pending_marks)
            .field("undo_levels", &self.history.undo_levels())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Editor {
    /// Validate and activate a document
    ///
    /// Structurally invalid input is rejected. Valid input is normalized
    /// before it becomes active; those repairs are not part of the history.
    /// Without a selection the caret goes to the start of the first text.
    pub fn load(nodes: Vec<Node>, selection: Option<Range>, config: EditorConfig) -> EditorResult<Self> {
        let tree = Tree::from_nodes(&nodes)?;
        let selection = selection
            .map(|range| Selection::load(&tree, &range))
            .transpose()?;

        let mut editor = Self {
            history: UndoStack::with_max_levels(config.undo_limit),
            tree,
            selection,
            pending_marks: None,
            config,
            normalizer: Normalizer::new(),
            version: 0,
            batch: None,
            listeners: Vec::new(),
        };

        editor.batch = Some(Batch::new("load", selection, None));
        for node in editor.tree.descendants(editor.tree.root()) {
            if !editor.tree.is_text(node) {
                editor.mark_dirty(node);
            }
        }
        let normalized = editor.normalize_dirty();
        let repairs = editor.batch.take().map_or(0, |batch| batch.operations.len());
        normalized?;

        if editor.selection.is_none() {
            editor.selection = editor
                .tree
                .first_text(editor.tree.root())
                .map(|text| Selection::caret(Anchor::new(text, 0)));
        }

        tracing::debug!(repairs, nodes = editor.tree.attached_len(), "document loaded");
        Ok(editor)
    }

    /// Load a serialized forest (the same shape [`Editor::to_json`] emits)
    pub fn from_json(json: &str, config: EditorConfig) -> EditorResult<Self> {
        let nodes: Vec<Node> = serde_json::from_str(json).map_err(LoadError::from)?;
        Self::load(nodes, None, config)
    }

    /// A document holding one empty paragraph
    pub fn new_empty(config: EditorConfig) -> EditorResult<Self> {
        Self::load(Vec::new(), None, config)
    }

    /// The current document, verbatim
    pub fn save(&self) -> Vec<Node> {
        self.tree.to_nodes()
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(&self.save())?)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Incremented by every commit, undo and redo
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> Option<Range> {
        self.selection.and_then(|selection| selection.resolve(&self.tree))
    }

    /// Marks the next inserted text will carry, when set explicitly
    pub fn pending_marks(&self) -> Option<&Marks> {
        self.pending_marks.as_ref()
    }

    pub fn select(&mut self, range: Range) -> EditorResult<()> {
        self.selection = Some(Selection::from_range(&self.tree, &range)?);
        self.pending_marks = None;
        Ok(())
    }

    pub fn select_point(&mut self, point: Point) -> EditorResult<()> {
        self.select(Range::collapsed(point))
    }

    pub fn deselect(&mut self) {
        self.selection = None;
        self.pending_marks = None;
    }

    /// Register a change listener
    pub fn on_change(&mut self, listener: impl FnMut(&Change) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Run `f` as one undoable change
    ///
    /// Nested calls join the outermost batch. The outermost call normalizes
    /// and commits on success; on failure it reverts everything `f` did.
    pub fn with_batch<T>(
        &mut self,
        description: &str,
        f: impl FnOnce(&mut Self) -> EditorResult<T>,
    ) -> EditorResult<T> {
        if self.batch.is_some() {
            return f(self);
        }

        self.batch = Some(Batch::new(description, self.selection, self.pending_marks.clone()));
        let result = f(self).and_then(|value| {
            self.normalize_dirty()?;
            Ok(value)
        });

        match result {
            Ok(value) => {
                self.commit();
                Ok(value)
            }
            Err(err) => {
                self.rollback(&err);
                Err(err)
            }
        }
    }

    fn commit(&mut self) {
        let Some(batch) = self.batch.take() else {
            return;
        };
        if batch.operations.is_empty() {
            return;
        }

        self.version += 1;
        self.pending_marks = None;
        tracing::debug!(
            version = self.version,
            operations = batch.operations.len(),
            description = %batch.description,
            "commit"
        );

        let change = Change {
            version: self.version,
            origin: ChangeOrigin::Edit,
            description: Some(batch.description.clone()),
            operations: batch.operations.clone(),
        };
        self.history.push(
            OperationBatch::new(batch.operations, batch.selection_before, self.selection)
                .with_description(batch.description),
        );
        self.notify(&change);
    }

    fn rollback(&mut self, err: &EditorError) {
        let Some(batch) = self.batch.take() else {
            return;
        };
        tracing::warn!(
            description = %batch.description,
            operations = batch.operations.len(),
            error = %err,
            "rolling back batch"
        );
        for op in batch.operations.iter().rev() {
            if let Err(revert) = op.inverse().apply(&mut self.tree, &mut self.selection) {
                tracing::error!(op = op.name(), error = %revert, "failed to revert operation");
            }
        }
        self.selection = batch.selection_before;
        self.pending_marks = batch.marks_before;
    }

    fn notify(&mut self, change: &Change) {
        for listener in &mut self.listeners {
            listener(change);
        }
    }

    /// Revert the most recent commit; `false` when there is nothing to undo
    pub fn undo(&mut self) -> EditorResult<bool> {
        self.replay_history(ChangeOrigin::Undo)
    }

    /// Reapply the most recently undone commit
    pub fn redo(&mut self) -> EditorResult<bool> {
        self.replay_history(ChangeOrigin::Redo)
    }

    fn replay_history(&mut self, origin: ChangeOrigin) -> EditorResult<bool> {
        if self.batch.is_some() {
            return Err(EditorError::invalid_operation(
                "undo/redo is not allowed inside a batch",
            ));
        }

        let replayed = match origin {
            ChangeOrigin::Undo => self.history.undo(&mut self.tree, &mut self.selection)?,
            _ => self.history.redo(&mut self.tree, &mut self.selection)?,
        };
        let Some(batch) = replayed else {
            return Ok(false);
        };
        let description = batch.description.clone();
        let operations = match origin {
            ChangeOrigin::Undo => batch.inverses(),
            _ => batch.operations.clone(),
        };

        self.version += 1;
        self.pending_marks = None;
        tracing::debug!(version = self.version, ?origin, "history replay");

        let change = Change {
            version: self.version,
            origin,
            description,
            operations,
        };
        self.notify(&change);
        Ok(true)
    }

    /// Apply one operation as part of the current batch
    pub(crate) fn apply_op(&mut self, op: Operation) -> EditorResult<()> {
        if self.batch.is_none() {
            return Err(EditorError::invalid_operation(
                "operations must run inside a batch",
            ));
        }
        op.apply(&mut self.tree, &mut self.selection)?;
        let touched = op.touched(&self.tree);
        if let Some(batch) = self.batch.as_mut() {
            for node in touched {
                batch.mark_dirty(node);
            }
            batch.operations.push(op);
        }
        Ok(())
    }

    fn mark_dirty(&mut self, node: NodeId) {
        if let Some(batch) = self.batch.as_mut() {
            batch.mark_dirty(node);
        }
    }

    /// Run the normalization work-list until no dirty nodes remain
    fn normalize_dirty(&mut self) -> EditorResult<()> {
        let pending = self.batch.as_ref().map_or(0, |batch| batch.dirty.len());
        let budget = Normalizer::budget(&self.tree, pending);
        let mut repairs = 0;

        while let Some(node) = self.batch.as_mut().and_then(Batch::pop_dirty) {
            if !self.tree.is_attached(node) {
                continue;
            }
            let Some((rule, repair)) = self.normalizer.check(&self.tree, node) else {
                continue;
            };

            repairs += 1;
            if repairs > budget {
                tracing::error!(repairs, budget, rule, "normalization did not settle");
                return Err(EditorError::NormalizationDiverged {
                    iterations: repairs,
                });
            }

            tracing::trace!(rule, ?repair, "normalization repair");
            self.apply_repair(repair)?;
            self.mark_dirty(node);
        }
        Ok(())
    }

    fn apply_repair(&mut self, repair: Repair) -> EditorResult<()> {
        match repair {
            Repair::Insert {
                parent,
                index,
                node,
            } => {
                let node = self.tree.alloc_subtree(&node);
                self.apply_op(Operation::InsertNode {
                    parent,
                    index,
                    node,
                })
            }
            Repair::Remove { node } => self.remove_id(node),
            Repair::MergeIntoPrevious { node } => self.merge_id(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BlockType, ElementKind};
    use crate::path::Path;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor(nodes: Vec<Node>) -> Editor {
        Editor::load(nodes, None, EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_document_gets_default_paragraph() {
        let editor = Editor::new_empty(EditorConfig::default()).unwrap();
        assert_eq!(editor.save(), vec![Node::paragraph("")]);
        assert_eq!(editor.selection(), Some(Range::collapsed(Point::new([0, 0], 0))));
        assert_eq!(editor.version(), 0);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_load_normalizes_without_history() {
        let editor = editor(vec![Node::void(ElementKind::Block(BlockType::Image))]);
        assert_eq!(editor.save().len(), 3);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_load_rejects_invalid_selection() {
        let result = Editor::load(
            vec![Node::paragraph("hi")],
            Some(Range::collapsed(Point::new([0, 0], 7))),
            EditorConfig::default(),
        );
        assert!(matches!(
            result,
            Err(EditorError::Load(LoadError::InvalidSelection(_)))
        ));
    }

    #[test]
    fn test_batch_commits_once_and_notifies() {
        let mut editor = editor(vec![Node::paragraph("hi")]);
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        editor.on_change(move |change| sink.borrow_mut().push(change.clone()));

        editor
            .with_batch("outer", |editor| {
                editor.insert_text_at(&Point::new([0, 0], 2), "!")?;
                editor.insert_text_at(&Point::new([0, 0], 3), "?")
            })
            .unwrap();

        assert_eq!(editor.tree().string(editor.tree().root()), "hi!?");
        assert_eq!(editor.version(), 1);
        assert_eq!(editor.history().undo_levels(), 1);
        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].description.as_deref(), Some("outer"));
        assert_eq!(changes[0].operations.len(), 2);
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let mut editor = editor(vec![Node::paragraph("hi")]);
        let result = editor.with_batch("broken", |editor| {
            editor.insert_text_at(&Point::new([0, 0], 2), "!")?;
            editor.remove_node(&Path::from([4]))
        });

        assert!(matches!(result, Err(EditorError::InvalidPath(_))));
        assert_eq!(editor.save(), vec![Node::paragraph("hi")]);
        assert_eq!(editor.version(), 0);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_empty_batch_is_not_committed() {
        let mut editor = editor(vec![Node::paragraph("hi")]);
        editor.with_batch("nothing", |_| Ok(())).unwrap();
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn test_undo_redo_bump_version() {
        let mut editor = editor(vec![Node::paragraph("hi")]);
        editor.insert_text_at(&Point::new([0, 0], 0), ">").unwrap();
        assert!(editor.undo().unwrap());
        assert_eq!(editor.save(), vec![Node::paragraph("hi")]);
        assert!(editor.redo().unwrap());
        assert_eq!(editor.save(), vec![Node::paragraph(">hi")]);
        assert_eq!(editor.version(), 3);
        assert!(!editor.redo().unwrap());
    }

    #[test]
    fn test_operations_outside_batch_are_rejected() {
        let mut editor = editor(vec![Node::paragraph("hi")]);
        let text = editor.tree().text_at(&Path::from([0, 0])).unwrap();
        let result = editor.apply_op(Operation::InsertText {
            node: text,
            offset: 0,
            text: "x".to_string(),
        });
        assert!(result.is_err());
    }
}
