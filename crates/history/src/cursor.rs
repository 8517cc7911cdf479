/// Arrow-key navigation over the history ring.
///
/// The cursor tracks where the user is while replaying old commands.
/// Position `None` means "editing a fresh line". The first "older" press
/// snapshots the in-progress draft; walking back past the newest entry
/// restores it. Navigation only rewrites the caller's edit buffer, never
/// the ring.
#[derive(Debug, Clone, Default)]
pub struct HistoryCursor {
    index: Option<usize>,
    draft: String,
}

impl HistoryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position: `None` when not browsing, `Some(0)` at the most
    /// recent entry.
    pub fn position(&self) -> Option<usize> {
        self.index
    }

    pub fn is_browsing(&self) -> bool {
        self.index.is_some()
    }

    /// Step toward the oldest entry, replacing `buffer` with the entry at
    /// the new position. At the oldest entry this is a no-op.
    pub fn older(&mut self, entries: &[String], buffer: &mut String) {
        if entries.is_empty() {
            return;
        }
        let next = match self.index {
            None => {
                self.draft = buffer.clone();
                0
            }
            Some(current) if current + 1 < entries.len() => current + 1,
            Some(_) => return, // already at the oldest entry
        };
        if let Some(entry) = entries.get(next) {
            self.index = Some(next);
            *buffer = entry.clone();
        }
    }

    /// Step back toward the present. Crossing past the newest entry leaves
    /// browsing mode and restores the snapshotted draft.
    pub fn newer(&mut self, entries: &[String], buffer: &mut String) {
        match self.index {
            None => {}
            Some(0) => {
                self.index = None;
                *buffer = std::mem::take(&mut self.draft);
            }
            Some(current) => {
                let next = current - 1;
                if let Some(entry) = entries.get(next) {
                    self.index = Some(next);
                    *buffer = entry.clone();
                }
            }
        }
    }

    /// Leave browsing mode without touching the edit buffer (called when
    /// the user edits a replayed line or the ring is reloaded).
    pub fn reset(&mut self) {
        self.index = None;
        self.draft.clear();
    }
}
