//! PrefStore - per-user travel preference memory
//!
//! Remembers a traveler's last stated trip style, interests and a bounded
//! list of recent destinations between planning runs.
//!
//! # Architecture
//!
//! ```text
//! PreferenceStore          soft-failing adapter, per-user locking, bounding
//! └── PreferenceBackend    raw get/put by key
//!     ├── FileBackend      {store}/{user}.json
//!     ├── MemoryBackend    HashMap, for tests
//!     └── NullBackend      remembers nothing
//! ```
//!
//! # Example
//!
//! ```ignore
//! use prefstore::PreferenceStore;
//!
//! let store = PreferenceStore::open("~/.local/share/travelagent/preferences")?;
//! store.remember("alice", "budget-friendly", "hiking, food", "Lisbon");
//! let record = store.load("alice");
//! ```

pub mod backend;
pub mod cli;
pub mod config;
mod record;
mod store;

pub use backend::{FileBackend, MemoryBackend, NullBackend, PreferenceBackend};
pub use record::PreferenceRecord;
pub use store::{PreferenceStore, SaveOutcome};

/// Number of past destinations kept per user
pub const DEFAULT_MAX_DESTINATIONS: usize = 5;
