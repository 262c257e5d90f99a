use std::path::PathBuf;

/// All errors produced by commitstore.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("repository already exists: {0}")]
    AlreadyExists(String),

    #[error("not a repository (run init first): {0}")]
    NotInitialized(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("please enter a commit message")]
    EmptyMessage,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("ambiguous commit reference: {0}")]
    AmbiguousRef(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("corrupt record: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl Error {
    pub fn already_exists(path: impl Into<PathBuf>) -> Self {
        Self::AlreadyExists(path.into().display().to_string())
    }

    pub fn not_initialized(path: impl Into<PathBuf>) -> Self {
        Self::NotInitialized(path.into().display().to_string())
    }

    pub fn file_not_found(name: impl Into<String>) -> Self {
        Self::FileNotFound(name.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn ambiguous_ref(reference: impl Into<String>) -> Self {
        Self::AmbiguousRef(reference.into())
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    pub fn invalid_digest(text: impl Into<String>) -> Self {
        Self::InvalidDigest(text.into())
    }

    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            err.kind(),
            format!("{}: {}", path.into().display(), err),
        ))
    }

    /// Whether this error means "the thing asked for does not exist",
    /// either as a missing object or a missing working file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::FileNotFound(_))
    }
}
