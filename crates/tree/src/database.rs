use capture_protocol::{CaptureId, TreeId};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::builder::TreeSpec;
use crate::error::{ResolveError, Result};
use crate::tree::CommandTree;
use crate::types::Capture;

/// Maps a tree id to its built command tree
pub trait TreeResolver {
    fn resolve_tree(&self, id: &TreeId) -> std::result::Result<Arc<CommandTree>, ResolveError>;
}

/// Maps a capture id to the loaded capture
pub trait CaptureResolver {
    fn resolve_capture(&self, id: &CaptureId) -> std::result::Result<Arc<Capture>, ResolveError>;
}

struct TreeEntry {
    spec: TreeSpec,
    built: OnceCell<std::result::Result<Arc<CommandTree>, ResolveError>>,
}

/// Content-addressed store of captures and command trees.
///
/// Trees are registered as recipes and built on first resolution. Each tree is
/// built at most once: concurrent resolutions of the same id wait for the
/// in-flight build, and later ones get the cached result (failures included).
#[derive(Default)]
pub struct Database {
    captures: RwLock<HashMap<CaptureId, Arc<Capture>>>,
    trees: RwLock<HashMap<TreeId, Arc<TreeEntry>>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_capture(&self, capture: Capture) -> Result<CaptureId> {
        let id = capture.id()?;
        let mut captures = self.captures.write().unwrap_or_else(|e| e.into_inner());
        captures.entry(id).or_insert_with(|| {
            log::debug!(
                "Stored capture {id} '{}' ({} commands)",
                capture.name,
                capture.commands.len()
            );
            Arc::new(capture)
        });
        Ok(id)
    }

    pub fn add_tree(&self, spec: TreeSpec) -> Result<TreeId> {
        let id = spec.id()?;
        let mut trees = self.trees.write().unwrap_or_else(|e| e.into_inner());
        trees.entry(id).or_insert_with(|| {
            Arc::new(TreeEntry {
                spec,
                built: OnceCell::new(),
            })
        });
        Ok(id)
    }

    /// Whether the tree has already been built (successfully or not)
    pub fn is_resolved(&self, id: &TreeId) -> bool {
        self.trees
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .is_some_and(|entry| entry.built.get().is_some())
    }

    fn build_tree(
        &self,
        id: &TreeId,
        spec: &TreeSpec,
    ) -> std::result::Result<Arc<CommandTree>, ResolveError> {
        let capture = self.resolve_capture(&spec.capture)?;
        log::debug!(
            "Building command tree {id} over capture {} ({} groups)",
            spec.capture,
            spec.groups.len()
        );
        spec.build(&capture)
            .map(Arc::new)
            .map_err(|source| ResolveError::Build { id: *id, source })
    }
}

impl TreeResolver for Database {
    fn resolve_tree(&self, id: &TreeId) -> std::result::Result<Arc<CommandTree>, ResolveError> {
        // Clone the entry out so the map lock is not held during the build.
        let entry = self
            .trees
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or(ResolveError::TreeNotFound(*id))?;

        entry
            .built
            .get_or_init(|| self.build_tree(id, &entry.spec))
            .clone()
    }
}

impl CaptureResolver for Database {
    fn resolve_capture(&self, id: &CaptureId) -> std::result::Result<Arc<Capture>, ResolveError> {
        self.captures
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or(ResolveError::CaptureNotFound(*id))
    }
}
