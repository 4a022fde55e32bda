use std::path::PathBuf;

use serde::Deserialize;

/// Retained generations when not configured
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// History persistence settings
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// File holding the serialized log
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Maximum number of generations kept; older ones are evicted
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("image_history.json")
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}
