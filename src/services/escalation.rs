//! Stuck escalation and repeated-content backoff.
//!
//! Two valves with different severities. The forced-progress valve is the
//! hard safety net: when every other gate has kept suppressing for longer
//! than the stuck ceiling, all suppression state is cleared and exactly one
//! forced intervention goes out. The repeat backoff is the mild one: a run
//! of near-identical snapshots pauses polling briefly instead of escalating.

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::{LimitsConfig, TimingConfig};

/// What the backoff counter wants the loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatAction {
    /// Keep polling normally.
    Continue,
    /// Pause polling for the given number of seconds before the next tick.
    Pause(u64),
}

/// Safety-net valve tracking wall-clock progress.
#[derive(Debug)]
pub struct EscalationValve {
    /// Last time a dispatch actually went out (or the valve was reset).
    last_progress: DateTime<Utc>,
    max_stuck: Duration,

    // Repeated-content backoff.
    repeat_count: u32,
    repeat_run_started: Option<DateTime<Utc>>,
    max_repeats: u32,
    pause_secs: u64,
    reset_window: Duration,
}

impl EscalationValve {
    pub fn new(limits: &LimitsConfig, timing: &TimingConfig, now: DateTime<Utc>) -> Self {
        Self {
            last_progress: now,
            max_stuck: Duration::seconds(timing.max_stuck_secs as i64),
            repeat_count: 0,
            repeat_run_started: None,
            max_repeats: limits.backoff_max_repeats,
            pause_secs: timing.backoff_pause_secs,
            reset_window: Duration::seconds(timing.backoff_reset_secs as i64),
        }
    }

    /// Whether the hard ceiling has been exceeded.
    ///
    /// True means the caller must clear all suppression state and issue
    /// exactly one forced intervention, bypassing cooldown and dedup for
    /// that single dispatch.
    pub fn check_forced_progress(&self, now: DateTime<Utc>) -> bool {
        now - self.last_progress > self.max_stuck
    }

    /// Record a successful (non-suppressed) intervention.
    pub fn record_progress(&mut self, now: DateTime<Utc>) {
        self.last_progress = now;
    }

    /// Seconds since the last successful intervention.
    pub fn stalled_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_progress
    }

    /// Feed one substantially-same observation into the backoff counter.
    ///
    /// A run of repeats older than the reset window is forgotten before
    /// counting. Once the counter reaches the configured maximum it resets
    /// and asks the loop to pause.
    pub fn record_repeat(&mut self, now: DateTime<Utc>) -> RepeatAction {
        match self.repeat_run_started {
            Some(started) if now - started > self.reset_window => {
                self.repeat_count = 0;
                self.repeat_run_started = Some(now);
            }
            Some(_) => {}
            None => self.repeat_run_started = Some(now),
        }

        self.repeat_count += 1;
        if self.repeat_count >= self.max_repeats {
            self.repeat_count = 0;
            self.repeat_run_started = None;
            RepeatAction::Pause(self.pause_secs)
        } else {
            RepeatAction::Continue
        }
    }

    /// Break the current run of repeats (content changed).
    pub fn reset_repeats(&mut self) {
        self.repeat_count = 0;
        self.repeat_run_started = None;
    }

    /// Drop all valve state and restart the progress clock.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.last_progress = now;
        self.reset_repeats();
    }
}
