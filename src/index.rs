use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Digest, Snapshot, Status};

/// Pending changes for the next commit.
///
/// `added` maps filenames to the digest of their staged content;
/// `removed` lists tracked files that the next commit should drop. A name
/// is never in both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingIndex {
    #[serde(default)]
    added: BTreeMap<String, Digest>,
    #[serde(default)]
    removed: BTreeSet<String>,
}

impl StagingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `filename` with content `digest`, replacing any earlier entry
    /// and clearing a pending removal.
    pub fn stage(&mut self, filename: impl Into<String>, digest: Digest) {
        let filename = filename.into();
        self.removed.remove(&filename);
        self.added.insert(filename, digest);
    }

    /// Drop `filename` from the staged additions. Returns whether it was staged.
    pub fn unstage(&mut self, filename: &str) -> bool {
        self.added.remove(filename).is_some()
    }

    /// Mark a tracked file for removal in the next commit.
    pub fn mark_removed(&mut self, filename: impl Into<String>) {
        let filename = filename.into();
        self.added.remove(&filename);
        self.removed.insert(filename);
    }

    /// Clear a pending removal. Returns whether one was pending.
    pub fn unmark_removed(&mut self, filename: &str) -> bool {
        self.removed.remove(filename)
    }

    /// Staged additions.
    pub fn entries(&self) -> &BTreeMap<String, Digest> {
        &self.added
    }

    /// Staged removals.
    pub fn removals(&self) -> &BTreeSet<String> {
        &self.removed
    }

    pub fn is_staged(&self, filename: &str) -> bool {
        self.added.contains_key(filename)
    }

    pub fn is_removed(&self, filename: &str) -> bool {
        self.removed.contains(filename)
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
    }

    /// Overlay this index onto `base`: staged entries win, removals drop.
    pub fn apply_to(&self, base: &Snapshot) -> Snapshot {
        let mut snapshot = base.clone();
        for (name, digest) in &self.added {
            snapshot.insert(name.clone(), *digest);
        }
        for name in &self.removed {
            snapshot.remove(name);
        }
        snapshot
    }

    pub fn status(&self) -> Status {
        Status {
            staged: self.added.clone(),
            removed: self.removed.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Read an index file.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the file is missing, [`Error::Encoding`] if it
    /// does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::not_found(format!("index {}", path.display())))
            }
            Err(e) => return Err(Error::io(path, e)),
        };
        Ok(serde_json::from_slice(&data)?)
    }

    /// Write the index file, replacing it atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_vec(self)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, data).map_err(|e| Error::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
        log::debug!(
            "saved index: {} staged, {} removed",
            self.added.len(),
            self.removed.len()
        );
        Ok(())
    }
}
