use crate::block::BlockType;
use crate::errors::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "pagesmith.config.json";

/// Editor tunables, read from `pagesmith.config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Quiet period before a suggestion request fires
    pub suggestion_debounce_ms: u64,

    /// Block types that get suggestions without a forced trigger
    pub suggestion_block_types: Vec<BlockType>,

    pub autosave_interval_secs: u64,

    /// Number of undo checkpoints kept
    pub history_limit: usize,

    /// How long fetched symbol definitions stay fresh
    pub definitions_ttl_secs: u64,

    pub max_mention_results: usize,

    /// Advance width used by the headless monospace measurer
    pub monospace_char_width: f32,
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(cwd: impl AsRef<Path>) -> EditorResult<Self> {
        let config_path = cwd.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            // Return default config if none exists
            Ok(Self::default())
        }
    }

    pub fn from_json(content: &str) -> EditorResult<Self> {
        serde_json::from_str(content).map_err(|e| EditorError::Config(e.to_string()))
    }

    pub fn suggestion_debounce(&self) -> Duration {
        Duration::from_millis(self.suggestion_debounce_ms)
    }

    /// Autosave period, never shorter than a second
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }

    pub fn definitions_ttl(&self) -> Duration {
        Duration::from_secs(self.definitions_ttl_secs)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            suggestion_debounce_ms: 300,
            suggestion_block_types: vec![BlockType::H1, BlockType::H2, BlockType::H3, BlockType::Text],
            autosave_interval_secs: 5,
            history_limit: 20,
            definitions_ttl_secs: 60 * 60,
            max_mention_results: 5,
            monospace_char_width: 8.0,
        }
    }
}
