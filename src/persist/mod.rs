//! Model artifact persistence.
//!
//! Every evaluated trial produces an [`Artifact`]: the fitted forest together
//! with the best iteration observed during training. Prediction consumers need
//! both, since the forest retains all trees trained before early stopping
//! fired. [`ArtifactStore`] abstracts over where artifacts land; [`DirStore`]
//! writes JSON files under a directory, [`MemoryStore`] keeps them in memory
//! for tests.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repr::Forest;

// =============================================================================
// Artifact
// =============================================================================

/// A persisted training result: the full forest plus the round to predict at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// The fitted forest, including trees past the early-stopping point.
    pub forest: Forest,
    /// 1-based index of the best round; predict with `limit = best_iteration`.
    pub best_iteration: u32,
}

// =============================================================================
// ArtifactStore
// =============================================================================

/// Errors that can occur while persisting or loading artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("artifact not found: {0}")]
    NotFound(String),
}

/// Destination for trial artifacts.
///
/// Stores must be shareable across threads; `put` with a name that already
/// exists overwrites the previous artifact.
pub trait ArtifactStore: Send + Sync {
    /// Persist an artifact under `name`, replacing any existing one.
    fn put(&self, name: &str, artifact: &Artifact) -> Result<(), StoreError>;

    /// Load a previously stored artifact.
    fn get(&self, name: &str) -> Result<Artifact, StoreError>;
}

// =============================================================================
// DirStore
// =============================================================================

/// Filesystem store writing one JSON file per artifact.
#[derive(Debug)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl ArtifactStore for DirStore {
    fn put(&self, name: &str, artifact: &Artifact) -> Result<(), StoreError> {
        let json = serde_json::to_vec(artifact)?;
        let mut file = std::fs::File::create(self.path_for(name))?;
        file.write_all(&json)?;
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Artifact, StoreError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let json = std::fs::read(path)?;
        Ok(serde_json::from_slice(&json)?)
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: Mutex<HashMap<String, Artifact>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for MemoryStore {
    fn put(&self, name: &str, artifact: &Artifact) -> Result<(), StoreError> {
        self.artifacts
            .lock()
            .unwrap()
            .insert(name.to_string(), artifact.clone());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Artifact, StoreError> {
        self.artifacts
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::Tree;

    fn sample_artifact() -> Artifact {
        let mut tree = Tree::new();
        let leaf = tree.push_leaf(0.5);
        tree.set_root(leaf);
        let mut forest = Forest::new(0.0);
        forest.push_tree(tree);
        Artifact {
            forest,
            best_iteration: 1,
        }
    }

    #[test]
    fn dir_store_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirStore::create(tmp.path().join("models")).unwrap();

        store.put("trial_0", &sample_artifact()).unwrap();
        let loaded = store.get("trial_0").unwrap();
        assert_eq!(loaded.best_iteration, 1);
        assert_eq!(loaded.forest.n_trees(), 1);
    }

    #[test]
    fn dir_store_overwrites_same_name() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirStore::create(tmp.path()).unwrap();

        store.put("model", &sample_artifact()).unwrap();
        let mut second = sample_artifact();
        second.best_iteration = 7;
        store.put("model", &second).unwrap();

        assert_eq!(store.get("model").unwrap().best_iteration, 7);
    }

    #[test]
    fn dir_store_missing_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirStore::create(tmp.path()).unwrap();
        assert!(matches!(store.get("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.put("a", &sample_artifact()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().best_iteration, 1);
    }
}
