use crate::commands::{normalize_hotkey, EditCommand};
use crate::errors::EditorError;
use crate::marks::{intensity_marks, Mark, Marks};
use crate::node::{BlockType, ElementKind, InlineType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum number of undo levels (0 = unlimited)
    pub undo_limit: usize,

    /// Block types where a line break inserts `\n` instead of splitting
    pub soft_break_types: Vec<BlockType>,

    /// Groups of mutually exclusive marks; adding one removes the others
    pub exclusive_mark_groups: Vec<Marks>,

    /// Text inserted into a new inline created at a collapsed selection
    pub inline_placeholders: BTreeMap<InlineType, String>,

    /// Quiet period before a pending save is handed off
    pub autosave_debounce_ms: u64,

    /// Hotkey (e.g. `mod+shift+x`) to command
    pub keymap: BTreeMap<String, EditCommand>,
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults if none exists
    pub fn load(dir: &str) -> Result<Self, EditorError> {
        let config_path = PathBuf::from(dir).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let mut config: EditorConfig = serde_json::from_str(json)?;
        config.keymap = config
            .keymap
            .into_iter()
            .map(|(hotkey, command)| (normalize_hotkey(&hotkey), command))
            .collect();
        Ok(config)
    }

    pub fn is_soft_break(&self, kind: ElementKind) -> bool {
        kind.block_type()
            .is_some_and(|block| self.soft_break_types.contains(&block))
    }

    /// The marks that must be cleared when `mark` is added
    pub fn exclusive_group_of(&self, mark: &Mark) -> Marks {
        self.exclusive_mark_groups
            .iter()
            .filter(|group| group.contains(mark))
            .fold(Marks::new(), |acc, group| acc.with_all(group))
    }

    pub fn placeholder(&self, kind: InlineType) -> Option<&str> {
        self.inline_placeholders.get(&kind).map(String::as_str)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn command_for(&self, hotkey: &str) -> Option<&EditCommand> {
        self.keymap.get(&normalize_hotkey(hotkey))
    }
}

fn default_keymap() -> BTreeMap<String, EditCommand> {
    [
        ("mod+shift+x", EditCommand::ToggleStrikethrough),
        ("mod+shift+r", EditCommand::ToggleCrossReference),
        ("mod+b", EditCommand::IncreaseStress),
        ("mod+i", EditCommand::IncreaseEmphasis),
        ("mod+z", EditCommand::Undo),
        ("mod+shift+z", EditCommand::Redo),
        ("arrowdown", EditCommand::MoveDown),
        ("enter", EditCommand::InsertBreak),
        ("backspace", EditCommand::DeleteBackward),
    ]
    .into_iter()
    .map(|(hotkey, command)| (hotkey.to_string(), command))
    .collect()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: 100,
            soft_break_types: vec![BlockType::Code],
            exclusive_mark_groups: vec![intensity_marks()],
            inline_placeholders: BTreeMap::from([(InlineType::Link, "link".to_string())]),
            autosave_debounce_ms: 1000,
            keymap: default_keymap(),
        }
    }
}
