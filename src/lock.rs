use std::fs::OpenOptions;
use std::path::Path;

use fs2::FileExt;

use crate::error::{Error, Result};

/// Name of the lock file inside the repository directory.
pub const LOCK_FILE: &str = "lock";

/// Acquire an exclusive advisory lock on the repository, execute `f`, then
/// release.
///
/// Creates `<root>/lock` if needed and blocks until no other process holds
/// it. Serializes mutations of the index and head across processes.
///
/// # Arguments
/// * `root` - Path to the repository directory.
/// * `f` - Closure to execute while the lock is held.
///
/// # Errors
/// Returns an I/O error if the lock file cannot be opened or locked, or
/// whatever `f` returns.
pub fn with_repo_lock<F, T>(root: &Path, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let lock_path = root.join(LOCK_FILE);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;
    FileExt::lock_exclusive(&file).map_err(|e| Error::io(&lock_path, e))?;

    let result = f();

    if let Err(e) = FileExt::unlock(&file) {
        log::warn!("failed to release {}: {}", lock_path.display(), e);
    }
    result
}
