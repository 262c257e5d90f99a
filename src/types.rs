use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest as _, Sha1};

use crate::error::{Error, Result};

/// Length of a digest in bytes.
pub const DIGEST_LEN: usize = 20;

/// Shortest hex prefix accepted when resolving an abbreviated commit id.
pub const MIN_PREFIX_LEN: usize = 4;

/// `strftime` pattern for `Date:` lines in the log.
pub const DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

/// A 160-bit SHA-1 content digest.
///
/// Equal byte payloads always produce equal digests. The textual form is
/// 40 lowercase hex characters, which is also how digests are serialized.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Compute the digest of `data`.
    pub fn of(data: &[u8]) -> Self {
        let hash = Sha1::digest(data);
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&hash);
        Digest(bytes)
    }

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Parse a 40-character hex string (either case).
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != DIGEST_LEN * 2 || !hex.is_ascii() {
            return Err(Error::invalid_digest(hex));
        }
        let mut bytes = [0u8; DIGEST_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::invalid_digest(hex))?;
        }
        Ok(Digest(bytes))
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The first seven hex characters, for display.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Digest::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Digest::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Whether `text` could be an abbreviated or full digest.
pub fn is_hex_prefix(text: &str) -> bool {
    (MIN_PREFIX_LEN..=DIGEST_LEN * 2).contains(&text.len())
        && text.bytes().all(|b| b.is_ascii_hexdigit())
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Complete filename → blob digest mapping. Ordered, so it always
/// encodes the same way.
pub type Snapshot = BTreeMap<String, Digest>;

// ---------------------------------------------------------------------------
// CommitInfo
// ---------------------------------------------------------------------------

/// One entry of the commit history, as printed by `log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: Digest,
    pub parent: Option<Digest>,
    pub message: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl CommitInfo {
    /// The timestamp formatted in the local time zone.
    pub fn date(&self) -> String {
        format_timestamp(self.timestamp)
    }
}

impl fmt::Display for CommitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===")?;
        writeln!(f, "commit {}", self.id)?;
        writeln!(f, "Date: {}", self.date())?;
        writeln!(f, "{}", self.message)
    }
}

/// Format epoch seconds with [`DATE_FORMAT`] in the local time zone.
///
/// Out-of-range timestamps are clamped to the epoch.
pub fn format_timestamp(seconds: i64) -> String {
    let utc = DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default();
    utc.with_timezone(&Local).format(DATE_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Pending changes in the staging index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// Files staged for addition, with the digest of their staged content.
    pub staged: BTreeMap<String, Digest>,
    /// Files staged for removal.
    pub removed: BTreeSet<String>,
}

impl Status {
    /// `true` when nothing is staged.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.removed.is_empty()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Staged Files ===")?;
        for name in self.staged.keys() {
            writeln!(f, "{}", name)?;
        }
        writeln!(f)?;
        writeln!(f, "=== Removed Files ===")?;
        for name in &self.removed {
            writeln!(f, "{}", name)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ReflogEntry
// ---------------------------------------------------------------------------

/// A single head reflog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    /// Previous head, or `None` for the move that created the root.
    pub old: Option<Digest>,
    pub new: Digest,
    pub timestamp: i64,
    pub message: String,
}
