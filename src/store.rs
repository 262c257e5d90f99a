use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{is_hex_prefix, Digest};

/// Write-once, content-addressed object directory.
///
/// Each payload lives in `<dir>/<hex digest>`. There is no update or
/// delete: once a digest is present its bytes never change.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    dir: PathBuf,
}

impl ObjectStore {
    /// Use an existing object directory.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        ObjectStore { dir: dir.into() }
    }

    /// Create the object directory (and parents) if missing.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        Ok(ObjectStore { dir })
    }

    /// Directory holding the objects.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the object for `digest` is (or would be) stored.
    pub fn path_for(&self, digest: &Digest) -> PathBuf {
        self.dir.join(digest.to_hex())
    }

    /// Store `data` and return its digest.
    ///
    /// Storing bytes that are already present is a no-op.
    pub fn put(&self, data: &[u8]) -> Result<Digest> {
        let digest = Digest::of(data);
        let path = self.path_for(&digest);
        if path.exists() {
            log::debug!("object {} already stored", digest.short());
            return Ok(digest);
        }

        // Write to a sibling then rename so a valid name never holds a
        // truncated payload.
        let tmp = self.dir.join(format!("{}.tmp", digest.to_hex()));
        std::fs::write(&tmp, data).map_err(|e| Error::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Error::io(&path, e))?;
        log::debug!("stored object {} ({} bytes)", digest.short(), data.len());
        Ok(digest)
    }

    /// Read the payload stored under `digest`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if no such object exists.
    pub fn get(&self, digest: &Digest) -> Result<Vec<u8>> {
        let path = self.path_for(digest);
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::not_found(format!("object {}", digest)))
            }
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    /// Whether an object with this digest is stored.
    pub fn contains(&self, digest: &Digest) -> bool {
        self.path_for(digest).is_file()
    }

    /// Every stored digest, sorted.
    pub fn digests(&self) -> Result<Vec<Digest>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.dir, e))?;
            let name = entry.file_name();
            // Leftover temp files and anything else foreign are skipped.
            if let Some(digest) = name.to_str().and_then(|n| Digest::from_hex(n).ok()) {
                out.push(digest);
            }
        }
        out.sort();
        Ok(out)
    }

    /// Number of stored objects.
    pub fn len(&self) -> Result<usize> {
        Ok(self.digests()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Resolve a full or abbreviated hex digest to a stored object.
    ///
    /// # Errors
    /// [`Error::NotFound`] when nothing matches, [`Error::AmbiguousRef`] when
    /// more than one object matches, [`Error::InvalidDigest`] when `prefix`
    /// is not hex or is too short.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<Digest> {
        if !is_hex_prefix(prefix) {
            return Err(Error::invalid_digest(prefix));
        }
        let prefix = prefix.to_ascii_lowercase();

        if let Ok(full) = Digest::from_hex(&prefix) {
            return if self.contains(&full) {
                Ok(full)
            } else {
                Err(Error::not_found(format!("object {}", prefix)))
            };
        }

        let mut matches = self
            .digests()?
            .into_iter()
            .filter(|d| d.to_hex().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(d), None) => Ok(d),
            (Some(_), Some(_)) => Err(Error::ambiguous_ref(prefix)),
            (None, _) => Err(Error::not_found(format!("object {}", prefix))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_files_are_not_digests() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::create(dir.path().join("objs")).unwrap();
        let d = store.put(b"payload").unwrap();
        std::fs::write(store.dir().join("junk.tmp"), b"x").unwrap();
        assert_eq!(store.digests().unwrap(), vec![d]);
    }
}
