use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::StagingIndex;
use crate::store::ObjectStore;
use crate::types::{format_timestamp, CommitInfo, Digest, Snapshot};

/// Message of the commit every repository starts with.
pub const ROOT_MESSAGE: &str = "initial commit";

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// An immutable commit record.
///
/// The encoded form is JSON with fields in declaration order and the
/// snapshot keys sorted, so equal field values always encode to equal
/// bytes. The commit's id is the digest of that encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Commit {
    parent: Option<Digest>,
    message: String,
    timestamp: i64,
    snapshot: Snapshot,
}

impl Commit {
    /// The parentless, empty commit created by `init`. Its timestamp is the
    /// Unix epoch so every repository gets the same root digest.
    pub fn root() -> Self {
        Commit {
            parent: None,
            message: ROOT_MESSAGE.to_string(),
            timestamp: 0,
            snapshot: Snapshot::new(),
        }
    }

    /// Build a commit whose snapshot is `parent_snapshot` overlaid with
    /// `staged`. When `parent` is `None` the parent snapshot is ignored and
    /// the overlay starts from nothing.
    pub fn create(
        message: impl Into<String>,
        parent: Option<Digest>,
        parent_snapshot: &Snapshot,
        staged: &StagingIndex,
        timestamp: i64,
    ) -> Self {
        let snapshot = match parent {
            Some(_) => staged.apply_to(parent_snapshot),
            None => staged.apply_to(&Snapshot::new()),
        };
        Commit {
            parent,
            message: message.into(),
            timestamp,
            snapshot,
        }
    }

    /// Assemble a commit from raw fields.
    pub fn from_parts(
        parent: Option<Digest>,
        message: impl Into<String>,
        timestamp: i64,
        snapshot: Snapshot,
    ) -> Self {
        Commit {
            parent,
            message: message.into(),
            timestamp,
            snapshot,
        }
    }

    /// Canonical byte encoding.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a stored record.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Digest of [`encode`](Self::encode).
    pub fn id(&self) -> Result<Digest> {
        Ok(Digest::of(&self.encode()?))
    }

    pub fn parent(&self) -> Option<Digest> {
        self.parent
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Local-time rendering of the timestamp.
    pub fn date(&self) -> String {
        format_timestamp(self.timestamp)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Blob digest of `filename` in this commit, if tracked.
    pub fn tracked(&self, filename: &str) -> Option<Digest> {
        self.snapshot.get(filename).copied()
    }

    pub fn info(&self, id: Digest) -> CommitInfo {
        CommitInfo {
            id,
            parent: self.parent,
            message: self.message.clone(),
            timestamp: self.timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// CommitGraph
// ---------------------------------------------------------------------------

/// Commits addressed by digest. Nodes are never mutated or removed, so a
/// digest always names the same commit.
#[derive(Debug, Clone)]
pub struct CommitGraph {
    store: ObjectStore,
}

impl CommitGraph {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        CommitGraph {
            store: ObjectStore::open(dir),
        }
    }

    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(CommitGraph {
            store: ObjectStore::create(dir)?,
        })
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Persist `commit` and return its id.
    pub fn put(&self, commit: &Commit) -> Result<Digest> {
        self.store.put(&commit.encode()?)
    }

    /// Load the commit with id `digest`.
    ///
    /// # Errors
    /// [`Error::NotFound`](crate::Error::NotFound) if it is not stored.
    pub fn get(&self, digest: &Digest) -> Result<Commit> {
        Commit::decode(&self.store.get(digest)?)
    }

    /// Resolve a full or abbreviated commit id.
    pub fn resolve(&self, reference: &str) -> Result<Digest> {
        self.store.resolve_prefix(reference)
    }

    /// Walk parent links from `head`, most recent first.
    pub fn history(&self, head: Digest) -> History<'_> {
        History {
            graph: self,
            next: Some(head),
        }
    }
}

/// Lazy walk over a commit's ancestry.
///
/// Yields `(id, commit)` pairs. A missing parent yields one error and then
/// ends the walk.
pub struct History<'a> {
    graph: &'a CommitGraph,
    next: Option<Digest>,
}

impl Iterator for History<'_> {
    type Item = Result<(Digest, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.graph.get(&id) {
            Ok(commit) => {
                self.next = commit.parent();
                Some(Ok((id, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl std::iter::FusedIterator for History<'_> {}
