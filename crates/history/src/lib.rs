//! Command history for the terminal input line.
//!
//! The [`HistoryRing`] keeps an ordered, deduplicated, size-capped list of
//! previously sent commands, persisted as a single JSON blob in a
//! key-value store (localStorage in the browser). Every mutation funnels
//! through load -> mutate -> save so the persisted state and the returned
//! sequence are identical after each call; the ring itself keeps no cache.
//!
//! [`HistoryCursor`] implements the arrow-key navigation contract the
//! input layer replays entries with: snapshot the draft line on first
//! "older", restore it when crossing back past the newest entry.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod cursor;
pub mod ring;
pub mod store;

pub use cursor::HistoryCursor;
pub use ring::{HistoryBlob, HistoryRing, DEFAULT_MAX_ENTRIES, HISTORY_VERSION, STORAGE_KEY};
pub use store::{KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use store::LocalStorage;
