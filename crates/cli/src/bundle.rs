use anyhow::{Context, Result};
use capture_protocol::{CaptureId, TreeId};
use capture_tree::{Capture, Database, GroupRange, TreeSpec};
use serde::Deserialize;
use std::path::Path;

/// A capture file as written by the recorder: the commands plus their grouping.
#[derive(Debug, Deserialize)]
pub struct Bundle {
    pub capture: Capture,
    #[serde(default)]
    pub groups: Vec<GroupRange>,
}

pub struct LoadedBundle {
    pub database: Database,
    pub capture: CaptureId,
    pub tree: TreeId,
}

impl Bundle {
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read capture bundle {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Capture bundle {} is not valid JSON", path.display()))
    }

    /// Register the capture and its tree recipe in a fresh database.
    pub fn into_database(self) -> Result<LoadedBundle> {
        let database = Database::new();
        let commands = self.capture.commands.len();
        let capture = database.add_capture(self.capture)?;
        let tree = database.add_tree(TreeSpec::new(capture, self.groups))?;
        log::debug!("Loaded capture {capture} ({commands} commands), tree {tree}");
        Ok(LoadedBundle {
            database,
            capture,
            tree,
        })
    }
}
