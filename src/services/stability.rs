//! Content-change tracking and the bounded dialog history.
//!
//! The tracker decides whether a snapshot represents a real content change,
//! active generation (length growth under a busy marker), or an interface
//! refresh (length shrink), and maintains the stable-duration clock the
//! stuck detection runs on.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::LimitsConfig;

/// One entry of the dialog history.
#[derive(Debug, Clone)]
pub struct DialogEntry {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// Result of folding one snapshot into the tracker.
#[derive(Debug, Clone)]
pub struct StabilityReport {
    /// The snapshot was a real content change.
    pub changed: bool,
    /// Time since the last real change.
    pub stable_duration: Duration,
    /// Length grew past the margin this tick (active generation).
    pub grew: bool,
}

/// Tracks last-change time and owns the dialog history exclusively.
#[derive(Debug)]
pub struct StabilityTracker {
    last_text: String,
    last_change: DateTime<Utc>,
    history: VecDeque<DialogEntry>,
    growth_margin: usize,
    history_cap: usize,
    history_trim: usize,
}

impl StabilityTracker {
    pub fn new(limits: &LimitsConfig, now: DateTime<Utc>) -> Self {
        Self {
            last_text: String::new(),
            last_change: now,
            history: VecDeque::new(),
            growth_margin: limits.growth_margin_chars,
            history_cap: limits.dialog_history_cap,
            history_trim: limits.dialog_history_trim,
        }
    }

    /// Fold a validated snapshot into the tracker.
    ///
    /// The four-way comparison against the previous snapshot:
    /// - equal: not a change, the stable clock keeps running
    /// - grew past the margin with a busy marker present: active generation,
    ///   clock resets, not recorded as a change
    /// - shrank: interface refresh, clock resets, not recorded as a change
    /// - differs at comparable length: a real change; the clock resets and
    ///   the entry is appended to the dialog history
    pub fn update(&mut self, text: &str, busy_marker: bool, now: DateTime<Utc>) -> StabilityReport {
        if text == self.last_text {
            return StabilityReport {
                changed: false,
                stable_duration: now - self.last_change,
                grew: false,
            };
        }

        if self.last_text.is_empty() {
            return self.record_change(text, now, false);
        }

        let current_len = text.chars().count();
        let previous_len = self.last_text.chars().count();

        if current_len > previous_len + self.growth_margin && busy_marker {
            // Active generation: new output is still streaming in.
            self.last_change = now;
            self.last_text = text.to_string();
            return StabilityReport {
                changed: false,
                stable_duration: Duration::zero(),
                grew: true,
            };
        }

        if current_len < previous_len {
            // Interface refresh or content cleared.
            self.last_change = now;
            self.last_text = text.to_string();
            return StabilityReport {
                changed: false,
                stable_duration: Duration::zero(),
                grew: false,
            };
        }

        self.record_change(text, now, current_len > previous_len + self.growth_margin)
    }

    fn record_change(&mut self, text: &str, now: DateTime<Utc>, grew: bool) -> StabilityReport {
        self.last_change = now;
        self.last_text = text.to_string();
        self.history.push_back(DialogEntry {
            timestamp: now,
            text: text.to_string(),
        });
        if self.history.len() > self.history_cap {
            while self.history.len() > self.history_trim {
                self.history.pop_front();
            }
        }
        StabilityReport {
            changed: true,
            stable_duration: Duration::zero(),
            grew,
        }
    }

    /// The last observed snapshot text, if any.
    pub fn last_text(&self) -> Option<&str> {
        if self.last_text.is_empty() {
            None
        } else {
            Some(&self.last_text)
        }
    }

    /// Restart the stable clock without recording a change. Used after a
    /// successful dispatch so the just-handled content does not immediately
    /// re-trigger the stuck detection.
    pub fn reset_clock(&mut self, now: DateTime<Utc>) {
        self.last_change = now;
    }

    pub fn stable_duration(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_change
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> impl Iterator<Item = &DialogEntry> {
        self.history.iter()
    }

    /// Drop all tracked state and restart the clock.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.last_text.clear();
        self.last_change = now;
        self.history.clear();
    }
}
