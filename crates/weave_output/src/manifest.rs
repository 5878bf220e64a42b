//! The output manifest of the last successful run.
//!
//! Stored as `.weave-outputs.json` in the output root. It lists every file
//! the run produced with its content hash, so the next run can tell which
//! files it no longer produces and remove them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use weave_common::ContentHash;

use crate::error::OutputError;

/// Name of the manifest file within the output root.
pub const MANIFEST_FILE: &str = ".weave-outputs.json";

/// Files produced by one run, keyed by path relative to the output root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputManifest {
    /// Weave version that produced the outputs.
    pub weave_version: String,

    /// Relative path to content hash.
    pub files: BTreeMap<String, ContentHash>,
}

impl OutputManifest {
    /// Creates an empty manifest for the given version.
    pub fn new(weave_version: &str) -> Self {
        Self {
            weave_version: weave_version.to_string(),
            files: BTreeMap::new(),
        }
    }

    /// Loads the manifest from the output root.
    ///
    /// Any error (missing file, bad JSON) yields `None`; the caller then has
    /// no stale files to remove.
    pub fn load(root: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(root.join(MANIFEST_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Saves the manifest into the output root, creating it if needed.
    pub fn save(&self, root: &Path) -> Result<(), OutputError> {
        std::fs::create_dir_all(root).map_err(|e| OutputError::Io {
            path: root.to_path_buf(),
            source: e,
        })?;
        let path = root.join(MANIFEST_FILE);
        let json =
            serde_json::to_string_pretty(self).map_err(|e| OutputError::Manifest(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| OutputError::Io { path, source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = OutputManifest::new("0.1.0");
        m.files.insert(
            "include/geo.abi.h".to_string(),
            ContentHash::from_bytes(b"header"),
        );
        m.save(dir.path()).unwrap();
        assert_eq!(OutputManifest::load(dir.path()), Some(m));
    }

    #[test]
    fn missing_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(OutputManifest::load(dir.path()).is_none());
    }

    #[test]
    fn corrupt_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        assert!(OutputManifest::load(dir.path()).is_none());
    }
}
