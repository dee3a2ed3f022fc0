//! Snapshot of the monitored surface and its content fingerprint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sampled text observation of the monitored surface at a point in time.
///
/// Created once per polling tick by the screen source, folded into the
/// dialog history if it survives validation, then discarded. Snapshots are
/// never persisted individually.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Extracted text of the monitored region.
    pub text: String,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Whether the snapshot passed validation.
    pub valid: bool,
}

impl Snapshot {
    pub fn new(text: impl Into<String>, timestamp: DateTime<Utc>, valid: bool) -> Self {
        Self {
            text: text.into(),
            timestamp,
            valid,
        }
    }

    /// Fingerprint of this snapshot's text.
    pub fn fingerprint(&self) -> ContentFingerprint {
        ContentFingerprint::of(&self.text)
    }
}

/// Normalized content hash used as the dedup key.
///
/// Normalization is case folding plus stripping all whitespace, so cosmetic
/// OCR differences (spacing, capitalization) map to the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Compute the fingerprint of a piece of snapshot text.
    pub fn of(text: &str) -> Self {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        Self(blake3::hash(normalized.as_bytes()).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short())
    }
}

/// Monitored screen region in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) {}x{}", self.x, self.y, self.width, self.height)
    }
}
