use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{Digest, ReflogEntry};

/// The digest text used to represent "no previous head" in reflogs.
pub const ZERO_SHA: &str = "0000000000000000000000000000000000000000";

fn log_path(root: &Path) -> PathBuf {
    root.join("logs").join("HEAD")
}

/// Read all head reflog entries, oldest first.
///
/// Parses `<root>/logs/HEAD` line by line. Returns an empty vec if the
/// reflog file does not exist. Lines that do not parse are skipped.
///
/// # Arguments
/// * `root` - Path to the repository directory.
pub fn read_reflog(root: &Path) -> Result<Vec<ReflogEntry>> {
    let path = log_path(root);
    if !path.exists() {
        return Ok(vec![]);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let mut entries = Vec::new();

    for line in content.lines() {
        if line.is_empty() {
            continue;
        }
        // Format: <old> <new> <timestamp> <tz>\t<message>
        let (before_tab, message) = line.split_once('\t').unwrap_or((line, ""));
        let parts: Vec<&str> = before_tab.split(' ').collect();
        if parts.len() < 3 {
            log::warn!("skipping malformed reflog line: {}", line);
            continue;
        }
        let old = if parts[0] == ZERO_SHA {
            None
        } else {
            match Digest::from_hex(parts[0]) {
                Ok(d) => Some(d),
                Err(_) => continue,
            }
        };
        let (Ok(new), Ok(timestamp)) = (Digest::from_hex(parts[1]), parts[2].parse::<i64>()) else {
            log::warn!("skipping malformed reflog line: {}", line);
            continue;
        };
        entries.push(ReflogEntry {
            old,
            new,
            timestamp,
            message: message.to_string(),
        });
    }

    Ok(entries)
}

/// Append a single entry to `<root>/logs/HEAD`.
///
/// Creates the `logs` directory if it does not exist. The entry is written
/// as `<old> <new> <timestamp> +0000\t<message>`; newlines in the message
/// are folded to spaces so each entry stays on one line.
///
/// # Arguments
/// * `root` - Path to the repository directory.
/// * `entry` - The [`ReflogEntry`] to append.
pub fn write_reflog_entry(root: &Path, entry: &ReflogEntry) -> Result<()> {
    let path = log_path(root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    use std::io::Write;
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| Error::io(&path, e))?;

    let old = entry
        .old
        .map(|d| d.to_hex())
        .unwrap_or_else(|| ZERO_SHA.to_string());
    let message = entry.message.replace(['\n', '\r'], " ");
    writeln!(
        f,
        "{} {} {} +0000\t{}",
        old, entry.new, entry.timestamp, message,
    )
    .map_err(|e| Error::io(&path, e))?;

    Ok(())
}
