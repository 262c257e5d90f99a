//! A miniature content-addressed version-control engine.
//!
//! `commitstore` records immutable snapshots of a working directory as a
//! chain of commits. File contents and commits are stored once, keyed by
//! the SHA-1 of their bytes; a staging index collects pending changes; a
//! head file points at the latest commit.
//!
//! # Key types
//!
//! - [`Repository`] — creates or opens the `.commitstore` directory and
//!   runs `add`, `rm`, `commit`, `log` and `checkout`.
//! - [`ObjectStore`] — write-once, content-addressed byte store.
//! - [`Commit`] / [`CommitGraph`] — commit records and their parent chain.
//! - [`StagingIndex`] — changes staged for the next commit.
//! - [`Diff`] — line-based LCS comparison and edit scripts.
//!
//! # Quick example
//!
//! ```rust,no_run
//! use commitstore::Repository;
//!
//! let repo = Repository::init("/tmp/work").unwrap();
//! std::fs::write("/tmp/work/hello.txt", "hello").unwrap();
//! repo.add("hello.txt").unwrap();
//! repo.commit("add greeting").unwrap();
//!
//! std::fs::write("/tmp/work/hello.txt", "bye").unwrap();
//! repo.checkout(None, "hello.txt").unwrap();
//! print!("{}", repo.format_log().unwrap());
//! ```
//!
//! # Concurrency
//!
//! Operations are synchronous. `add`, `rm` and `commit` take an exclusive
//! file lock on the repository, so concurrent invocations against the same
//! working directory run one after another.

pub mod commit;
pub mod diff;
pub mod error;
pub mod index;
pub mod lock;
pub mod paths;
pub mod reflog;
pub mod repo;
pub mod store;
pub mod types;

// Re-export primary public types at crate root.
pub use commit::{Commit, CommitGraph, History, ROOT_MESSAGE};
pub use diff::{CommonRun, Diff, Edit};
pub use error::{Error, Result};
pub use index::StagingIndex;
pub use repo::{Repository, REPO_DIR};
pub use store::ObjectStore;
pub use types::*;
