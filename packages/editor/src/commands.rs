//! # Commands
//!
//! Edit intents the UI layer sends after translating keyboard events, and
//! the keymap lookup that produces them.
//!
//! Hotkeys are written as `+`-separated parts, modifiers first
//! (`mod+shift+x`). `ctrl`, `cmd` and `meta` all mean `mod`. Lookup is
//! case-insensitive and ignores modifier order.

use crate::editor::Editor;
use crate::errors::EditorResult;
use crate::marks::Mark;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditCommand {
    ToggleStrikethrough,
    ToggleCrossReference,
    IncreaseStress,
    IncreaseEmphasis,
    Undo,
    Redo,
    /// Arrow down: leaves a trailing soft-break block when possible
    MoveDown,
    InsertBreak,
    DeleteBackward,
    InsertText(String),
}

const MODIFIERS: [&str; 3] = ["mod", "alt", "shift"];

/// Canonical form of a hotkey string
pub fn normalize_hotkey(hotkey: &str) -> String {
    let mut modifiers = Vec::new();
    let mut keys = Vec::new();
    for part in hotkey.split('+').map(|part| part.trim().to_lowercase()) {
        let part = match part.as_str() {
            "ctrl" | "control" | "cmd" | "command" | "meta" => "mod".to_string(),
            "option" => "alt".to_string(),
            _ => part,
        };
        if part.is_empty() {
            continue;
        }
        if MODIFIERS.contains(&part.as_str()) {
            if !modifiers.contains(&part) {
                modifiers.push(part);
            }
        } else {
            keys.push(part);
        }
    }
    modifiers.sort_by_key(|modifier| MODIFIERS.iter().position(|m| *m == modifier.as_str()));
    modifiers.extend(keys);
    modifiers.join("+")
}

impl Editor {
    /// Run a command; returns whether it was handled
    ///
    /// `MoveDown` is only handled when it arrows out of a trailing
    /// soft-break block; otherwise the caller should move the caret.
    pub fn execute(&mut self, command: &EditCommand) -> EditorResult<bool> {
        tracing::trace!(?command, "execute");
        match command {
            EditCommand::ToggleStrikethrough => self.toggle_mark(Mark::strikethrough())?,
            EditCommand::ToggleCrossReference => self.toggle_mark(Mark::cross_reference())?,
            EditCommand::IncreaseStress => self.increase_stress()?,
            EditCommand::IncreaseEmphasis => self.increase_emph()?,
            EditCommand::Undo => return self.undo(),
            EditCommand::Redo => return self.redo(),
            EditCommand::MoveDown => return self.attempt_arrow_out(),
            EditCommand::InsertBreak => self.insert_break()?,
            EditCommand::DeleteBackward => self.delete_backward()?,
            EditCommand::InsertText(text) => self.insert_text(text)?,
        }
        Ok(true)
    }

    /// Resolve `hotkey` through the keymap and run the bound command
    ///
    /// Returns `false` for unbound keys.
    pub fn handle_key(&mut self, hotkey: &str) -> EditorResult<bool> {
        let Some(command) = self.config.command_for(hotkey).cloned() else {
            return Ok(false);
        };
        self.execute(&command)
    }
}
