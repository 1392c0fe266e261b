//! Workspace loading capability

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    cli::{parse_items, BdClient},
    error::Result,
    item::Item,
};

/// Directory bd keeps its data in, relative to a workspace root.
pub const BEADS_DIR: &str = ".beads";

/// Export file bd writes inside [`BEADS_DIR`].
pub const ISSUES_FILE: &str = "issues.jsonl";

/// One workspace the store should load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceTarget {
    pub id: String,
    pub root: PathBuf,
}

impl WorkspaceTarget {
    pub fn new(id: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            root: root.into(),
        }
    }

    /// Target identified by the last component of its root directory.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let id = root
            .file_name()
            .map_or_else(|| root.to_string_lossy().into_owned(), |name| {
                name.to_string_lossy().into_owned()
            });
        Self { id, root }
    }
}

/// What a loader produced for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// The file the items were read from.
    pub file_path: PathBuf,
    /// The document as reported, before item parsing.
    pub raw: serde_json::Value,
    pub items: Vec<Item>,
    /// Paths whose changes should trigger a reload.
    pub watch_paths: Vec<PathBuf>,
}

/// Capability to load one workspace target.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, target: &WorkspaceTarget) -> Result<LoadedDocument>;
}

/// Loader that asks bd for the workspace's items.
#[derive(Debug, Clone)]
pub struct CliLoader {
    client: BdClient,
}

impl CliLoader {
    pub const fn new(client: BdClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Loader for CliLoader {
    async fn load(&self, target: &WorkspaceTarget) -> Result<LoadedDocument> {
        let raw = self.client.in_workspace(&target.root).list_json().await?;
        let items = parse_items(raw.clone())?;
        let beads_dir = beads_dir(&target.root);

        tracing::debug!(target_id = %target.id, items = items.len(), "Loaded workspace");

        Ok(LoadedDocument {
            file_path: beads_dir.join(ISSUES_FILE),
            raw,
            items,
            watch_paths: vec![beads_dir],
        })
    }
}

fn beads_dir(root: &Path) -> PathBuf {
    root.join(BEADS_DIR)
}
