//! Snapshot store lifecycle against workspaces on disk
//!
//! The loader reads each workspace's `.beads/issues.jsonl` export directly;
//! the watcher is driven by hand so reload timing is deterministic.
//!
//! Run with: cargo test --package beadsync-core --test store_lifecycle

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use beadsync_core::{
    store::{
        LoadedDocument, Loader, SnapshotStore, StoreOptions, WatchAdapter, WatchEvent,
        WatchEventKind, WatchHandle, WatchListener, WorkspaceTarget, BEADS_DIR, ISSUES_FILE,
    },
    Error, Item, Result,
};
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════

/// Reads the JSONL export bd keeps next to its database.
struct ExportLoader;

#[async_trait]
impl Loader for ExportLoader {
    async fn load(&self, target: &WorkspaceTarget) -> Result<LoadedDocument> {
        let dir = target.root.join(BEADS_DIR);
        let file_path = dir.join(ISSUES_FILE);
        let text = tokio::fs::read_to_string(&file_path)
            .await
            .map_err(|e| Error::io_error(e.to_string()))?;

        let items = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<Item>(line).map_err(|e| Error::parse_error(e.to_string())))
            .collect::<Result<Vec<_>>>()?;

        Ok(LoadedDocument {
            file_path,
            raw: serde_json::Value::String(text),
            items,
            watch_paths: vec![dir],
        })
    }
}

#[derive(Default)]
struct ManualWatcher {
    listeners: Mutex<Vec<(PathBuf, WatchListener)>>,
    released: Arc<AtomicUsize>,
}

struct ManualHandle(Arc<AtomicUsize>);

impl WatchHandle for ManualHandle {
    fn release(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl WatchAdapter for ManualWatcher {
    fn watch(&self, path: &Path, listener: WatchListener) -> Result<Box<dyn WatchHandle>> {
        self.listeners
            .lock()
            .unwrap()
            .push((path.to_path_buf(), listener));
        Ok(Box::new(ManualHandle(Arc::clone(&self.released))))
    }
}

impl ManualWatcher {
    fn touch(&self, dir: &Path) {
        let listeners = self.listeners.lock().unwrap().clone();
        for (path, listener) in listeners.iter().filter(|(path, _)| path == dir) {
            listener(WatchEvent::new(WatchEventKind::Change, path.join(ISSUES_FILE)));
        }
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

fn workspace(root: &TempDir, name: &str, lines: &[&str]) -> WorkspaceTarget {
    let dir = root.path().join(name);
    std::fs::create_dir_all(dir.join(BEADS_DIR)).unwrap();
    write_export(&dir, lines);
    WorkspaceTarget::from_root(dir)
}

fn write_export(workspace: &Path, lines: &[&str]) {
    std::fs::write(workspace.join(BEADS_DIR).join(ISSUES_FILE), lines.join("\n")).unwrap();
}

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_two_workspaces_merge_reload_and_dispose() {
    let root = tempfile::tempdir().unwrap();
    let api = workspace(
        &root,
        "api",
        &[
            r#"{"id":"api-10","title":"Rate limits","status":"open"}"#,
            r#"{"id":"api-9","title":"Auth","status":"in_progress","updated_at":"2026-02-27T09:00:00Z"}"#,
        ],
    );
    let web = workspace(
        &root,
        "web",
        &[r#"{"id":"web-1","title":"Login page","status":"blocked","dependencies":["api-9"]}"#],
    );

    let watcher = Arc::new(ManualWatcher::default());
    let store = SnapshotStore::new(
        Arc::new(ExportLoader),
        Arc::clone(&watcher) as Arc<dyn WatchAdapter>,
        StoreOptions::default()
            .with_watch_debounce_ms(10)
            .with_clock(now),
    );

    // Given both workspaces are loaded
    let snapshot = store.refresh(vec![api.clone(), web.clone()]).await.unwrap();
    assert_eq!(ids(snapshot.items()), vec!["api-9", "api-10", "web-1"]);
    assert_eq!(snapshot.get("web-1").and_then(|i| i.workspace.as_deref()), Some("web"));
    assert_eq!(snapshot.loaded_at(), Some(now()));
    assert_eq!(store.watched_paths().len(), 2);

    // Then the in-progress item untouched for three days is stale
    assert_eq!(ids(&store.get_stale_items()), vec!["api-9"]);

    // When the api export changes on disk and the watcher reports it
    let mut rx = store.subscribe();
    rx.mark_unchanged();
    write_export(
        &api.root,
        &[
            r#"{"id":"api-10","title":"Rate limits","status":"closed"}"#,
            r#"{"id":"api-9","title":"Auth","status":"closed"}"#,
            r#"{"id":"api-11","title":"Audit log","status":"open"}"#,
        ],
    );
    watcher.touch(&api.root.join(BEADS_DIR));

    // Then subscribers observe the reloaded snapshot
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("reload within timeout")
        .expect("store alive");
    let reloaded = store.snapshot();
    assert_eq!(ids(reloaded.items()), vec!["api-9", "api-10", "api-11", "web-1"]);
    assert_eq!(reloaded.count_by_status().closed, 2);
    assert!(store.get_stale_items().is_empty());

    // When the store is disposed twice
    store.dispose();
    store.dispose();

    // Then each subscription is released exactly once and refresh is refused
    assert_eq!(watcher.released.load(Ordering::SeqCst), 2);
    assert!(matches!(store.refresh(vec![api, web]).await, Err(Error::Disposed)));
}

#[tokio::test]
async fn test_broken_workspace_keeps_previous_snapshot() {
    let root = tempfile::tempdir().unwrap();
    let good = workspace(&root, "good", &[r#"{"id":"g-1","title":"Fine","status":"open"}"#]);
    let bad = workspace(&root, "bad", &["{ not json"]);

    let store = SnapshotStore::new(
        Arc::new(ExportLoader),
        Arc::new(ManualWatcher::default()),
        StoreOptions::default().with_clock(now),
    );

    let first = store.refresh(vec![good.clone()]).await.unwrap();
    assert_eq!(ids(first.items()), vec!["g-1"]);

    let err = store.refresh(vec![good, bad]).await.unwrap_err();
    assert!(matches!(&err, Error::Load { target, .. } if target == "bad"));
    assert!(err.to_string().starts_with("Failed to load workspace 'bad'"));

    // The failed refresh replaced nothing
    assert_eq!(ids(store.snapshot().items()), vec!["g-1"]);
    assert_eq!(store.targets().len(), 2);
}

#[tokio::test]
async fn test_missing_export_is_a_load_error() {
    let root = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(
        Arc::new(ExportLoader),
        Arc::new(ManualWatcher::default()),
        StoreOptions::default(),
    );

    let missing = WorkspaceTarget::from_root(root.path().join("nowhere"));
    let err = store.refresh(vec![missing]).await.unwrap_err();

    assert!(matches!(err, Error::Load { ref target, .. } if target == "nowhere"));
    assert!(store.snapshot().is_empty());
    assert!(store.watched_paths().is_empty());
}
