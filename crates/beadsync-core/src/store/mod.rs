//! Snapshot store
//!
//! - `ordering`: numeric-aware identifier comparison
//! - `snapshot`: the immutable merged item set and its derived views
//! - `loader`: injectable workspace loading, plus the bd-backed loader
//! - `watch`: injectable filesystem watching, plus the notify backend
//! - `snapshot_store`: refresh, debounced reload and lifecycle

mod loader;
mod ordering;
mod snapshot;
mod snapshot_store;
mod watch;

pub use loader::{CliLoader, LoadedDocument, Loader, WorkspaceTarget, BEADS_DIR, ISSUES_FILE};
pub use ordering::compare_ids;
pub use snapshot::{Snapshot, StatusCounts};
pub use snapshot_store::{
    Clock, SnapshotStore, StoreOptions, DEFAULT_STALE_THRESHOLD_HOURS, DEFAULT_WATCH_DEBOUNCE_MS,
};
pub use watch::{
    NotifyWatchAdapter, WatchAdapter, WatchEvent, WatchEventKind, WatchHandle, WatchListener,
    WatchSubscription,
};
