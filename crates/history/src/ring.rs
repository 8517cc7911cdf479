use core_types::term_warn;
use serde::{Deserialize, Serialize};

use crate::store::KeyValueStore;

/// Blob format version written on every save.
pub const HISTORY_VERSION: u32 = 1;

/// Default cap on the number of retained entries.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Storage key the blob lives under.
pub const STORAGE_KEY: &str = "driftterm_history";

/// Persisted envelope for the command history.
///
/// Only `entries` is structurally required on load; older or foreign blobs
/// missing the other fields still yield their entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryBlob {
    #[serde(default)]
    pub version: u32,
    pub entries: Vec<String>,
    #[serde(default)]
    pub updated_at_ms: u64,
}

/// Ordered, deduplicated, size-capped command history.
///
/// Index 0 is the most recent entry. Entries are unique across the whole
/// sequence and never empty or whitespace-only.
#[derive(Debug, Clone)]
pub struct HistoryRing<S: KeyValueStore> {
    store: S,
    key: String,
    max_entries: usize,
    dedupe_head: bool,
}

impl<S: KeyValueStore> HistoryRing<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: STORAGE_KEY.to_string(),
            max_entries: DEFAULT_MAX_ENTRIES,
            dedupe_head: true,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Disable the "same as current head" early-out. Global dedupe still
    /// applies to every insert.
    pub fn with_dedupe_head(mut self, dedupe_head: bool) -> Self {
        self.dedupe_head = dedupe_head;
        self
    }

    /// Read the persisted sequence.
    ///
    /// Absent, malformed, or structurally wrong blobs load as an empty
    /// sequence; this never fails.
    pub fn load(&self) -> Vec<String> {
        self.store
            .get(&self.key)
            .and_then(|text| serde_json::from_str::<HistoryBlob>(&text).ok())
            .map(|blob| blob.entries)
            .unwrap_or_default()
    }

    /// Overwrite the persisted blob with `entries`.
    pub fn save(&self, entries: &[String]) {
        let blob = HistoryBlob {
            version: HISTORY_VERSION,
            entries: entries.to_vec(),
            updated_at_ms: now_ms(),
        };
        match serde_json::to_string(&blob) {
            Ok(text) => self.store.set(&self.key, &text),
            Err(e) => {
                term_warn!("failed to encode history blob: {}", e);
            }
        }
    }

    /// Remove all persisted history.
    pub fn clear(&self) {
        self.store.remove(&self.key);
    }

    /// Record a sent command at the front of the history.
    ///
    /// The command is trimmed first; an empty result is a no-op. When
    /// head-dedupe is enabled a command equal to the current head leaves
    /// both the sequence and the persisted blob untouched. A real insert
    /// removes every prior occurrence, prepends, and truncates to the cap.
    /// Returns the resulting sequence.
    pub fn push_front(&self, cmd: &str) -> Vec<String> {
        let mut entries = self.load();
        let cmd = cmd.trim();
        if cmd.is_empty() {
            return entries;
        }
        if self.dedupe_head && entries.first().is_some_and(|head| head == cmd) {
            return entries;
        }

        entries.retain(|entry| entry != cmd);
        entries.insert(0, cmd.to_string());
        entries.truncate(self.max_entries);

        self.save(&entries);
        entries
    }

    /// Delete the entry at `index` (0 = most recent).
    ///
    /// An out-of-range index is a no-op returning the unmodified sequence.
    pub fn delete_at(&self, index: usize) -> Vec<String> {
        let mut entries = self.load();
        if index >= entries.len() {
            return entries;
        }
        entries.remove(index);
        self.save(&entries);
        entries
    }
}

fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
