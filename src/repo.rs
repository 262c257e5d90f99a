use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::commit::{Commit, CommitGraph, History};
use crate::diff::Diff;
use crate::error::{Error, Result};
use crate::index::StagingIndex;
use crate::lock::with_repo_lock;
use crate::paths::normalize_path;
use crate::reflog::{read_reflog, write_reflog_entry};
use crate::store::ObjectStore;
use crate::types::{CommitInfo, Digest, ReflogEntry, Status};

/// Name of the repository directory inside the working directory.
pub const REPO_DIR: &str = ".commitstore";

const BLOBS_DIR: &str = "blobs";
const COMMITS_DIR: &str = "commits";
const INDEX_FILE: &str = "index";
const HEAD_FILE: &str = "HEAD";

/// A repository rooted in a working directory.
///
/// Nothing is cached between calls: every operation reads the head and
/// index from disk and writes its changes back before returning. Mutating
/// operations hold the repository lock while they run.
#[derive(Debug, Clone)]
pub struct Repository {
    work_dir: PathBuf,
    root: PathBuf,
    blobs: ObjectStore,
    commits: CommitGraph,
}

impl Repository {
    /// Create a repository in `work_dir` holding only the root commit.
    ///
    /// # Errors
    /// [`Error::AlreadyExists`] if `work_dir` already has one.
    pub fn init(work_dir: impl AsRef<Path>) -> Result<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();
        let root = work_dir.join(REPO_DIR);
        if root.exists() {
            return Err(Error::already_exists(&root));
        }
        std::fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;

        let repo = Repository {
            blobs: ObjectStore::create(root.join(BLOBS_DIR))?,
            commits: CommitGraph::create(root.join(COMMITS_DIR))?,
            work_dir,
            root,
        };
        StagingIndex::new().save(&repo.index_path())?;

        let root_commit = Commit::root();
        let id = repo.commits.put(&root_commit)?;
        repo.write_head(&id)?;
        repo.record_head_move(None, id, root_commit.timestamp(), "init: initial commit");

        log::info!("initialized repository in {}", repo.root.display());
        Ok(repo)
    }

    /// Open the repository in `work_dir`.
    ///
    /// # Errors
    /// [`Error::NotInitialized`] if there is none.
    pub fn open(work_dir: impl AsRef<Path>) -> Result<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();
        let root = work_dir.join(REPO_DIR);
        if !root.is_dir() {
            return Err(Error::not_initialized(&work_dir));
        }
        Ok(Repository {
            blobs: ObjectStore::open(root.join(BLOBS_DIR)),
            commits: CommitGraph::open(root.join(COMMITS_DIR)),
            work_dir,
            root,
        })
    }

    /// The working directory files are read from and written to.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The repository directory (`<work_dir>/.commitstore`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn blobs(&self) -> &ObjectStore {
        &self.blobs
    }

    pub fn commits(&self) -> &CommitGraph {
        &self.commits
    }

    // -----------------------------------------------------------------------
    // Head and index
    // -----------------------------------------------------------------------

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn head_path(&self) -> PathBuf {
        self.root.join(HEAD_FILE)
    }

    /// Digest of the current head commit.
    pub fn head(&self) -> Result<Digest> {
        let path = self.head_path();
        match std::fs::read_to_string(&path) {
            Ok(text) => Digest::from_hex(text.trim()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::not_initialized(&self.work_dir)),
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    /// The current head commit.
    pub fn head_commit(&self) -> Result<Commit> {
        self.commits.get(&self.head()?)
    }

    fn write_head(&self, id: &Digest) -> Result<()> {
        let path = self.head_path();
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, format!("{}\n", id)).map_err(|e| Error::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Error::io(&path, e))?;
        log::debug!("head -> {}", id.short());
        Ok(())
    }

    fn record_head_move(&self, old: Option<Digest>, new: Digest, timestamp: i64, message: &str) {
        let entry = ReflogEntry {
            old,
            new,
            timestamp,
            message: message.to_string(),
        };
        if let Err(e) = write_reflog_entry(&self.root, &entry) {
            log::warn!("could not append reflog entry: {}", e);
        }
    }

    /// The staging index as stored on disk.
    pub fn index(&self) -> Result<StagingIndex> {
        match StagingIndex::load(&self.index_path()) {
            Err(Error::NotFound(_)) => Err(Error::not_initialized(&self.work_dir)),
            other => other,
        }
    }

    // -----------------------------------------------------------------------
    // Staging
    // -----------------------------------------------------------------------

    /// Store the working copy of `filename` and stage it.
    ///
    /// If the bytes equal the head commit's version the file is unstaged
    /// instead, since committing it would change nothing. Either way a
    /// pending removal of the file is cancelled.
    ///
    /// # Errors
    /// [`Error::FileNotFound`] if the working file does not exist.
    pub fn add(&self, filename: &str) -> Result<Digest> {
        let name = normalize_path(filename)?;
        let path = self.work_dir.join(&name);
        if !path.is_file() {
            return Err(Error::file_not_found(name));
        }
        let data = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;

        with_repo_lock(&self.root, || {
            let digest = self.blobs.put(&data)?;
            let mut index = self.index()?;
            let head = self.head_commit()?;

            if head.tracked(&name) == Some(digest) {
                index.unstage(&name);
                index.unmark_removed(&name);
                log::debug!("{} matches head, not staged", name);
            } else {
                index.stage(name.as_str(), digest);
                log::debug!("staged {} as {}", name, digest.short());
            }
            index.save(&self.index_path())?;
            Ok(digest)
        })
    }

    /// Unstage `filename`, and if the head commit tracks it, stage its
    /// removal and delete the working copy.
    ///
    /// # Errors
    /// [`Error::FileNotFound`] if the file is neither staged nor tracked.
    pub fn rm(&self, filename: &str) -> Result<()> {
        let name = normalize_path(filename)?;

        with_repo_lock(&self.root, || {
            let mut index = self.index()?;
            let head = self.head_commit()?;

            let was_staged = index.unstage(&name);
            let tracked = head.tracked(&name).is_some();
            if !was_staged && !tracked {
                return Err(Error::file_not_found(name.as_str()));
            }
            if tracked {
                index.mark_removed(name.as_str());
                let path = self.work_dir.join(&name);
                match std::fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(Error::io(&path, e)),
                }
                log::debug!("staged removal of {}", name);
            }
            index.save(&self.index_path())
        })
    }

    /// The staged additions and removals.
    pub fn status(&self) -> Result<Status> {
        Ok(self.index()?.status())
    }

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Commit the staging index with the current time.
    ///
    /// # Errors
    /// [`Error::EmptyMessage`] if `message` is blank.
    pub fn commit(&self, message: &str) -> Result<Digest> {
        self.commit_at(message, chrono::Utc::now().timestamp())
    }

    /// Commit the staging index with an explicit timestamp (seconds since
    /// the Unix epoch): build a commit from the head snapshot overlaid with
    /// the index, persist it, advance the head, and clear the index.
    pub fn commit_at(&self, message: &str, timestamp: i64) -> Result<Digest> {
        if message.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }

        with_repo_lock(&self.root, || {
            let parent_id = self.head()?;
            let parent = self.commits.get(&parent_id)?;
            let index = self.index()?;

            let commit = Commit::create(message, Some(parent_id), parent.snapshot(), &index, timestamp);
            let id = self.commits.put(&commit)?;
            self.write_head(&id)?;
            StagingIndex::new().save(&self.index_path())?;
            self.record_head_move(Some(parent_id), id, timestamp, &format!("commit: {}", message));

            log::info!(
                "committed {} ({} files tracked)",
                id.short(),
                commit.snapshot().len()
            );
            Ok(id)
        })
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Walk the history from the head, most recent first.
    pub fn history(&self) -> Result<History<'_>> {
        Ok(self.commits.history(self.head()?))
    }

    /// The full history from the head, most recent first.
    pub fn log(&self) -> Result<Vec<CommitInfo>> {
        self.history()?
            .map(|item| item.map(|(id, commit)| commit.info(id)))
            .collect()
    }

    /// The history rendered as printed by `log`: each entry is a `===`
    /// line, `commit <id>`, `Date: <date>`, the message and a blank line.
    pub fn format_log(&self) -> Result<String> {
        let mut out = String::new();
        for info in self.log()? {
            out.push_str(&info.to_string());
            out.push('\n');
        }
        Ok(out)
    }

    /// Head moves, most recent first.
    pub fn reflog(&self) -> Result<Vec<ReflogEntry>> {
        let mut entries = read_reflog(&self.root)?;
        entries.reverse();
        Ok(entries)
    }

    /// Resolve a full or abbreviated commit id.
    ///
    /// # Errors
    /// [`Error::NotFound`] if no commit matches, [`Error::AmbiguousRef`] if
    /// several do.
    pub fn resolve(&self, reference: &str) -> Result<Digest> {
        match self.commits.resolve(reference) {
            Err(Error::InvalidDigest(_)) | Err(Error::NotFound(_)) => Err(Error::not_found(
                format!("no commit with id {}", reference),
            )),
            other => other,
        }
    }

    // -----------------------------------------------------------------------
    // Working tree
    // -----------------------------------------------------------------------

    /// Overwrite the working copy of `filename` with its version in
    /// `commit` (a full or abbreviated id), or in the head commit when
    /// `commit` is `None`. The staging index is left alone.
    ///
    /// # Errors
    /// [`Error::NotFound`] for an unknown commit, [`Error::FileNotFound`]
    /// if the commit does not track `filename`.
    pub fn checkout(&self, commit: Option<&str>, filename: &str) -> Result<()> {
        let name = normalize_path(filename)?;
        let id = match commit {
            Some(reference) => self.resolve(reference)?,
            None => self.head()?,
        };
        let snapshot_commit = self.commits.get(&id)?;
        let blob = snapshot_commit
            .tracked(&name)
            .ok_or_else(|| Error::file_not_found(format!("{} (not in commit {})", name, id.short())))?;
        let data = self.blobs.get(&blob)?;

        let path = self.work_dir.join(&name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(&path, data).map_err(|e| Error::io(&path, e))?;
        log::debug!("checked out {} from {}", name, id.short());
        Ok(())
    }

    /// Diff the head commit's version of `filename` against the working
    /// copy. A side that does not exist counts as empty.
    pub fn diff(&self, filename: &str) -> Result<String> {
        let name = normalize_path(filename)?;
        let committed = match self.head_commit()?.tracked(&name) {
            Some(blob) => String::from_utf8_lossy(&self.blobs.get(&blob)?).into_owned(),
            None => String::new(),
        };
        let path = self.work_dir.join(&name);
        let working = match std::fs::read(&path) {
            Ok(data) => String::from_utf8_lossy(&data).into_owned(),
            Err(e) => {
                log::debug!("diff: {} unreadable, using empty: {}", path.display(), e);
                String::new()
            }
        };
        Ok(Diff::from_texts(&committed, &working).render())
    }
}
