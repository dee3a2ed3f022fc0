//! Snapshot validation.
//!
//! Degraded OCR passes emit placeholder tokens instead of real text;
//! snapshots carrying them, or carrying almost nothing, must never enter the
//! dialog history or advance the stability timers.

use crate::domain::models::{LimitsConfig, MarkerConfig};

/// Pure predicate over raw snapshot text. No side effects.
#[derive(Debug, Clone)]
pub struct SnapshotValidator {
    min_chars: usize,
    invalid_markers: Vec<String>,
}

impl SnapshotValidator {
    pub fn new(limits: &LimitsConfig, markers: &MarkerConfig) -> Self {
        Self {
            min_chars: limits.min_snapshot_chars,
            invalid_markers: markers.invalid.iter().map(|m| m.to_lowercase()).collect(),
        }
    }

    /// Whether the text is usable as a snapshot.
    ///
    /// Rejects near-empty text (shorter than the configured minimum after
    /// trimming) and text containing any known capture-noise marker.
    pub fn validate(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.chars().count() < self.min_chars {
            return false;
        }

        let lowered = trimmed.to_lowercase();
        !self
            .invalid_markers
            .iter()
            .any(|marker| lowered.contains(marker.as_str()))
    }
}
