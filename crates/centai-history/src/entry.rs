use centai_core::{GenerationOptions, GenerationRequest, GenerationResult};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Default number of generations retained
pub const MAX_HISTORY: usize = 50;

/// One successful generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Image the provider produced
    pub result: GenerationResult,
    /// Prompt exactly as submitted
    pub prompt: String,
    /// When the request was submitted (not when it finished)
    pub submitted_at: Timestamp,
    /// Options the request ran with
    pub options: GenerationOptions,
}

impl HistoryEntry {
    pub fn new(request: &GenerationRequest, result: GenerationResult, submitted_at: Timestamp) -> Self {
        Self {
            result,
            prompt: request.prompt().to_owned(),
            submitted_at,
            options: *request.options(),
        }
    }
}

/// Newest-first sequence of history entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Insert at the front and evict from the back until `cap` holds
    pub(crate) fn push_newest(&mut self, entry: HistoryEntry, cap: usize) {
        self.entries.insert(0, entry);
        self.truncate(cap);
    }

    pub(crate) fn truncate(&mut self, cap: usize) {
        self.entries.truncate(cap);
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
