//! Artifact store fixtures for error-path tests.

use crate::persist::{Artifact, ArtifactStore, StoreError};

/// Store whose writes always fail.
///
/// Exercises the persistence-failure path: a trial whose artifact cannot be
/// written must surface the error instead of reporting a loss.
#[derive(Debug, Default)]
pub struct FailingStore;

impl ArtifactStore for FailingStore {
    fn put(&self, _name: &str, _artifact: &Artifact) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    fn get(&self, name: &str) -> Result<Artifact, StoreError> {
        Err(StoreError::NotFound(name.to_string()))
    }
}
