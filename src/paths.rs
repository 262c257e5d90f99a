use crate::error::{Error, Result};
use crate::repo::REPO_DIR;

/// Normalize a working-tree filename: strip leading/trailing slashes,
/// collapse `.` segments and repeated slashes, reject `..`.
///
/// Filenames are always relative to the working directory and use `/` as
/// the separator, whatever the host platform.
///
/// # Arguments
/// * `path` - The raw filename as given by the caller.
///
/// # Errors
/// Returns [`Error::InvalidPath`] if the name is empty, escapes the
/// working directory, contains a NUL or newline, or points inside the
/// repository directory.
pub fn normalize_path(path: &str) -> Result<String> {
    if path.contains(['\0', '\n', '\r']) {
        return Err(Error::invalid_path(format!(
            "{:?} contains a control character",
            path
        )));
    }

    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        if seg.is_empty() || seg == "." {
            continue;
        }
        if seg == ".." {
            return Err(Error::invalid_path(format!(
                "{}: segment '..' is not allowed",
                path
            )));
        }
        segments.push(seg);
    }

    if segments.is_empty() {
        return Err(Error::invalid_path(format!("{:?} names no file", path)));
    }
    if segments[0] == REPO_DIR {
        return Err(Error::invalid_path(format!(
            "{} is inside the repository directory",
            path
        )));
    }

    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_plain() {
        assert_eq!(normalize_path("f.txt").unwrap(), "f.txt");
    }

    #[test]
    fn normalize_strips_slashes() {
        assert_eq!(normalize_path("/a/b/c/").unwrap(), "a/b/c");
    }

    #[test]
    fn normalize_collapses_double_slashes() {
        assert_eq!(normalize_path("a//b///c").unwrap(), "a/b/c");
    }

    #[test]
    fn normalize_collapses_dot() {
        assert_eq!(normalize_path("a/./b").unwrap(), "a/b");
        assert_eq!(normalize_path("./a/b").unwrap(), "a/b");
    }

    #[test]
    fn normalize_empty_is_error() {
        assert!(normalize_path("").is_err());
        assert!(normalize_path(".").is_err());
        assert!(normalize_path("///").is_err());
    }

    #[test]
    fn normalize_rejects_dotdot() {
        assert!(normalize_path("a/../b").is_err());
        assert!(normalize_path("../outside").is_err());
    }

    #[test]
    fn normalize_rejects_repo_dir() {
        assert!(normalize_path(".commitstore/HEAD").is_err());
        assert!(normalize_path("./.commitstore").is_err());
    }

    #[test]
    fn normalize_rejects_newline() {
        assert!(normalize_path("a\nb").is_err());
    }
}
