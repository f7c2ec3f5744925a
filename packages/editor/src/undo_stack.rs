//! # Undo/Redo Stack
//!
//! Tracks committed operation batches and replays them backwards or forwards.
//!
//! ## Design
//!
//! - Each committed change is one [`OperationBatch`]: every operation applied
//!   while the change ran, normalization repairs included
//! - Undo applies the inverses in reverse order and restores the selection
//!   the change started from
//! - Redo reapplies the original operations and restores the selection the
//!   change ended with
//! - New batches clear the redo stack
//! - The number of undo levels is capped (0 = unlimited); the oldest batch
//!   is dropped first
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::with_max_levels(100);
//! stack.push(OperationBatch::new(ops, before, after).with_description("bold"));
//!
//! stack.undo(&mut tree, &mut selection)?;
//! stack.redo(&mut tree, &mut selection)?;
//! ```

use crate::errors::EditorError;
use crate::operation::Operation;
use crate::selection::Selection;
use crate::tree::Tree;

/// A group of operations that are undone/redone together
#[derive(Debug, Clone)]
pub struct OperationBatch {
    /// The operations in this batch (in application order)
    pub operations: Vec<Operation>,

    /// Selection before the first operation ran
    pub selection_before: Option<Selection>,

    /// Selection after the last operation ran
    pub selection_after: Option<Selection>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl OperationBatch {
    pub fn new(
        operations: Vec<Operation>,
        selection_before: Option<Selection>,
        selection_after: Option<Selection>,
    ) -> Self {
        Self {
            operations,
            selection_before,
            selection_after,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Inverses in the order they must be applied to revert the batch
    pub fn inverses(&self) -> Vec<Operation> {
        self.operations.iter().rev().map(Operation::inverse).collect()
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Committed batches (most recent last)
    undo_stack: Vec<OperationBatch>,

    /// Undone batches (most recent last)
    redo_stack: Vec<OperationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a committed batch; empty batches are ignored
    pub fn push(&mut self, batch: OperationBatch) {
        if batch.is_empty() {
            return;
        }

        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new change invalidates the undone future
        self.redo_stack.clear();
    }

    /// Undo the most recent batch
    ///
    /// Returns the batch that was reverted, or `None` when there is nothing
    /// to undo.
    pub fn undo(
        &mut self,
        tree: &mut Tree,
        selection: &mut Option<Selection>,
    ) -> Result<Option<&OperationBatch>, EditorError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(None);
        };

        if let Err(err) = replay(&batch.inverses(), tree, selection) {
            self.undo_stack.push(batch);
            return Err(err);
        }

        *selection = batch.selection_before;
        self.redo_stack.push(batch);
        Ok(self.redo_stack.last())
    }

    /// Redo the most recently undone batch
    pub fn redo(
        &mut self,
        tree: &mut Tree,
        selection: &mut Option<Selection>,
    ) -> Result<Option<&OperationBatch>, EditorError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(None);
        };

        if let Err(err) = replay(&batch.operations, tree, selection) {
            self.redo_stack.push(batch);
            return Err(err);
        }

        *selection = batch.selection_after;
        self.undo_stack.push(batch);
        Ok(self.undo_stack.last())
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `ops` in order; on failure, revert the ones that went through
pub(crate) fn replay(
    ops: &[Operation],
    tree: &mut Tree,
    selection: &mut Option<Selection>,
) -> Result<(), EditorError> {
    for (applied, op) in ops.iter().enumerate() {
        if let Err(err) = op.apply(tree, selection) {
            for done in ops[..applied].iter().rev() {
                if let Err(revert) = done.inverse().apply(tree, selection) {
                    tracing::error!(op = done.name(), error = %revert, "failed to revert partial replay");
                }
            }
            return Err(err);
        }
    }
    Ok(())
}
