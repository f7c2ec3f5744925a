//! # Edit Session Management
//!
//! An EditSession is one user's editing session over one document: the
//! editor plus the debounced save that hands snapshots to the persistence
//! layer.
//!
//! Saving never blocks editing. Every commit (re)arms a pending save; once
//! the document has been quiet for the debounce period, [`EditSession::poll_save`]
//! hands off an immutable snapshot of the latest version. A newer commit
//! simply supersedes a pending save. There is no partial-save rollback.

use crate::commands::EditCommand;
use crate::editor::Editor;
use crate::errors::EditorResult;
use std::time::{Duration, Instant};

/// Serialized document handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub version: u64,
    pub json: String,
}

/// Save waiting for the debounce period to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSave {
    /// Document version the save was armed for
    pub version: u64,

    /// Earliest time the snapshot may be handed off
    pub due: Instant,
}

/// Single edit session
#[derive(Debug)]
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Editor owning the document and selection
    pub editor: Editor,

    pending_save: Option<PendingSave>,
    saved_version: u64,
    debounce: Duration,
}

impl EditSession {
    /// Create new edit session; the debounce comes from the editor's config
    pub fn new(id: impl Into<String>, editor: Editor) -> Self {
        let debounce = editor.config().autosave_debounce();
        let saved_version = editor.version();
        Self {
            id: id.into(),
            editor,
            pending_save: None,
            saved_version,
            debounce,
        }
    }

    /// Run a command at time `now`; arms a save if it changed the document
    pub fn execute(&mut self, command: &EditCommand, now: Instant) -> EditorResult<bool> {
        let handled = self.editor.execute(command)?;
        self.track(now);
        Ok(handled)
    }

    /// Run arbitrary edits at time `now`
    pub fn edit<T>(&mut self, now: Instant, f: impl FnOnce(&mut Editor) -> EditorResult<T>) -> EditorResult<T> {
        let result = f(&mut self.editor);
        self.track(now);
        result
    }

    /// Re-arm the pending save when the document moved past what is pending
    fn track(&mut self, now: Instant) {
        let version = self.editor.version();
        let armed = self.pending_save.map_or(self.saved_version, |pending| pending.version);
        if version == armed {
            return;
        }
        if let Some(previous) = self.pending_save {
            tracing::trace!(superseded = previous.version, version, "pending save superseded");
        }
        self.pending_save = Some(PendingSave {
            version,
            due: now + self.debounce,
        });
    }

    /// Hand off a snapshot once the debounce period has elapsed
    pub fn poll_save(&mut self, now: Instant) -> EditorResult<Option<Snapshot>> {
        match self.pending_save {
            Some(pending) if now >= pending.due => self.flush(),
            _ => Ok(None),
        }
    }

    /// Hand off a snapshot immediately (blur, navigation away)
    pub fn flush(&mut self) -> EditorResult<Option<Snapshot>> {
        let Some(pending) = self.pending_save.take() else {
            return Ok(None);
        };
        let snapshot = Snapshot {
            version: self.editor.version(),
            json: self.editor.to_json()?,
        };
        self.saved_version = snapshot.version;
        tracing::debug!(session = %self.id, version = snapshot.version, armed = pending.version, "snapshot handed off");
        Ok(Some(snapshot))
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn pending_save(&self) -> Option<PendingSave> {
        self.pending_save
    }

    /// Version of the last snapshot handed off
    pub fn saved_version(&self) -> u64 {
        self.saved_version
    }
}
