//! The supervisor: per-tick decision state machine and polling loop.
//!
//! Each tick walks Idle -> Evaluating -> (Suppressed | Dispatching) -> Idle,
//! with Dispatching -> Forced reachable only through the escalation valve.
//! Nothing that happens inside a tick is allowed to escape it: collaborator
//! failures are logged, answered with the fallback instruction where
//! possible, and the loop moves on to the next tick.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::models::{
    CompletionSignal, Config, InterventionKind, InterventionReason, InterventionState, Region,
    SignalLabel, Snapshot, SuppressReason,
};
use crate::domain::ports::{ActionExecutor, InstructionGenerator, ScreenSource};
use crate::infrastructure::status_journal::StatusJournal;
use crate::services::classifier::SignalClassifier;
use crate::services::cooldown::CooldownLock;
use crate::services::duplicate_guard::DuplicateGuard;
use crate::services::escalation::{EscalationValve, RepeatAction};
use crate::services::stability::StabilityTracker;
use crate::services::turns::TurnManager;
use crate::services::validator::SnapshotValidator;

/// Generator output shorter than this (after trimming) is replaced by the
/// fallback instruction.
const MIN_INSTRUCTION_CHARS: usize = 10;

/// Why a tick ended without evaluating the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipCause {
    /// The screen source produced no snapshot this tick.
    CaptureFailed,
    /// The snapshot failed validation; no state was touched.
    InvalidSnapshot,
}

/// The single outcome of one polling tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No usable snapshot this tick.
    Skipped(SkipCause),
    /// Nothing called for an intervention.
    Idle,
    /// A reason existed but the guard suppressed it.
    Suppressed(SuppressReason),
    /// An instruction was delivered.
    Dispatched {
        kind: InterventionKind,
        forced: bool,
        instruction: String,
    },
    /// The dispatch path ran but delivery failed; no state was recorded.
    DispatchFailed { kind: InterventionKind },
    /// The repeat backoff asked the loop to pause before the next tick.
    Paused(u64),
}

/// Point-in-time view of the supervisor for operators.
#[derive(Debug, Clone)]
pub struct SupervisorStats {
    pub last_label: SignalLabel,
    pub stable_secs: i64,
    pub dialog_entries: usize,
    pub completed_turns: usize,
    pub dispatches: u64,
    pub forced_dispatches: u64,
    pub last_intervention_time: Option<DateTime<Utc>>,
}

/// Composes the decision services into one outcome per tick and owns the
/// only mutable [`InterventionState`].
pub struct Supervisor<S, G, E> {
    validator: SnapshotValidator,
    classifier: SignalClassifier,
    stability: StabilityTracker,
    guard: DuplicateGuard,
    lock: CooldownLock,
    valve: EscalationValve,
    turns: TurnManager,
    state: InterventionState,

    source: S,
    generator: G,
    executor: E,
    journal: Option<StatusJournal>,

    region: Region,
    fallback_instruction: String,
    repeat_window: Duration,
    poll_interval: StdDuration,

    last_label: SignalLabel,
    dispatches: u64,
    forced_dispatches: u64,
}

impl<S, G, E> Supervisor<S, G, E>
where
    S: ScreenSource,
    G: InstructionGenerator,
    E: ActionExecutor,
{
    pub fn new(
        config: &Config,
        region: Region,
        source: S,
        generator: G,
        executor: E,
        journal: Option<StatusJournal>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            validator: SnapshotValidator::new(&config.limits, &config.markers),
            classifier: SignalClassifier::new(&config.markers, &config.timing),
            stability: StabilityTracker::new(&config.limits, now),
            guard: DuplicateGuard::new(&config.limits, &config.timing),
            lock: CooldownLock::new(&config.timing),
            valve: EscalationValve::new(&config.limits, &config.timing, now),
            turns: TurnManager::new(&config.limits, &config.markers),
            state: InterventionState::default(),
            source,
            generator,
            executor,
            journal,
            region,
            fallback_instruction: config.generator.fallback_instruction.clone(),
            repeat_window: Duration::seconds(config.timing.repeat_window_secs as i64),
            poll_interval: StdDuration::from_secs(config.timing.poll_interval_secs),
            last_label: SignalLabel::Normal,
            dispatches: 0,
            forced_dispatches: 0,
        }
    }

    /// Run one polling tick against the snapshot captured at `now`.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let raw = match self.source.capture(&self.region).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "capture failed, skipping tick");
                return TickOutcome::Skipped(SkipCause::CaptureFailed);
            }
        };

        let valid = self.validator.validate(&raw);
        let snapshot = Snapshot::new(raw, now, valid);
        if !snapshot.valid {
            debug!("snapshot rejected by validator, skipping tick");
            return TickOutcome::Skipped(SkipCause::InvalidSnapshot);
        }
        let text = snapshot.text.clone();

        let busy_marker = self.classifier.has_busy_marker(&text);
        let previous_text = self.stability.last_text().map(str::to_owned);
        let substantially_same = self
            .guard
            .is_substantially_same(&text, previous_text.as_deref());
        let report = self.stability.update(&text, busy_marker, now);
        if report.changed {
            self.turns.observe(&text, now, busy_marker);
            // Cosmetic OCR drift still counts toward the repeat run; only a
            // real content change breaks it.
            if !substantially_same {
                self.valve.reset_repeats();
            }
        }

        let signal = self.classifier.classify(&text, &report);
        self.last_label = signal.label();

        // Completed pre-empts everything. Stuck acts even when a busy marker
        // is visible - the classifier already granted busy content the longer
        // threshold, so a stuck-while-busy snapshot has earned the timeout.
        let reason = if signal.completed {
            Some(self.completion_reason(&text))
        } else if signal.stuck {
            Some(InterventionReason::new(
                InterventionKind::ContentTimeout,
                format!(
                    "content unchanged for {}s",
                    report.stable_duration.num_seconds()
                ),
            ))
        } else {
            None
        };

        let Some(reason) = reason else {
            if substantially_same && report.stable_duration < self.repeat_window {
                if let RepeatAction::Pause(secs) = self.valve.record_repeat(now) {
                    warn!(pause_secs = secs, "repeat backoff tripped, pausing polling");
                    return TickOutcome::Paused(secs);
                }
            }
            return TickOutcome::Idle;
        };

        match self
            .guard
            .should_suppress(&text, now, &self.state, previous_text.as_deref())
        {
            Some(suppress) => {
                if self.valve.check_forced_progress(now) {
                    let stalled = self.valve.stalled_for(now).num_seconds();
                    warn!(
                        stalled_secs = stalled,
                        "suppression exceeded the stuck ceiling, forcing progress"
                    );
                    self.guard.clear();
                    self.lock.release(&mut self.state);
                    let forced = InterventionReason::new(
                        InterventionKind::ForcedProgress,
                        format!("forced progress after {stalled}s without a dispatch"),
                    );
                    return self.dispatch(&snapshot, &forced, true, now).await;
                }
                debug!(reason = %suppress, "tick suppressed");
                TickOutcome::Suppressed(suppress)
            }
            None => self.dispatch(&snapshot, &reason, false, now).await,
        }
    }

    fn completion_reason(&self, text: &str) -> InterventionReason {
        match self.classifier.completion_signal(text) {
            Some(CompletionSignal::Review) => InterventionReason::new(
                InterventionKind::ReviewCompleted,
                "review marker present, the session finished its edit",
            ),
            _ => InterventionReason::new(
                InterventionKind::ResponseCompleted,
                "completion wording present, the response looks finished",
            ),
        }
    }

    /// The dispatch critical section. The lock is taken before any
    /// collaborator call and released on every exit path.
    async fn dispatch(
        &mut self,
        snapshot: &Snapshot,
        reason: &InterventionReason,
        forced: bool,
        now: DateTime<Utc>,
    ) -> TickOutcome {
        if !self.lock.acquire(&mut self.state) {
            warn!("dispatch lock unexpectedly held, skipping tick");
            return TickOutcome::Suppressed(SuppressReason::DispatchInFlight);
        }
        let outcome = self.dispatch_locked(snapshot, reason, forced, now).await;
        self.lock.release(&mut self.state);
        outcome
    }

    async fn dispatch_locked(
        &mut self,
        snapshot: &Snapshot,
        reason: &InterventionReason,
        forced: bool,
        now: DateTime<Utc>,
    ) -> TickOutcome {
        let context = self.turns.latest_context();
        info!(
            kind = reason.kind.as_str(),
            detail = %reason.detail,
            forced,
            "dispatching intervention"
        );

        let instruction = match self
            .generator
            .generate(&context, &reason.detail, reason.kind)
            .await
        {
            Ok(generated) if generated.trim().chars().count() >= MIN_INSTRUCTION_CHARS => generated,
            Ok(_) => {
                warn!("generator returned near-empty output, using fallback instruction");
                self.fallback_instruction.clone()
            }
            Err(err) => {
                warn!(error = %err, "generation failed, using fallback instruction");
                self.fallback_instruction.clone()
            }
        };

        let (sent, delivered) = match self.executor.dispatch(&instruction).await {
            Ok(true) => (true, instruction),
            Ok(false) => {
                error!("executor reported delivery failure");
                (false, instruction)
            }
            Err(err) => {
                error!(error = %err, "dispatch failed, attempting fallback instruction");
                match self.executor.dispatch(&self.fallback_instruction).await {
                    Ok(true) => {
                        info!("fallback instruction delivered");
                        (true, self.fallback_instruction.clone())
                    }
                    Ok(false) | Err(_) => (false, instruction),
                }
            }
        };

        if !sent {
            return TickOutcome::DispatchFailed { kind: reason.kind };
        }

        self.guard.mark_processed(&snapshot.text);
        self.state
            .record_dispatch(now, delivered.clone(), snapshot.fingerprint());
        self.valve.record_progress(now);
        self.stability.reset_clock(now);
        self.dispatches += 1;
        if forced {
            self.forced_dispatches += 1;
        }

        if let Some(journal) = &self.journal {
            if let Err(err) = journal.record(&delivered, &snapshot.text) {
                warn!(error = %err, "status journal update failed");
            }
        }

        TickOutcome::Dispatched {
            kind: reason.kind,
            forced,
            instruction: delivered,
        }
    }

    /// Run the polling loop until the shutdown signal flips.
    ///
    /// The signal is checked at the top of each tick; a tick that is already
    /// dispatching completes before the loop exits. Ticks never overlap -
    /// the next one only starts after the previous tick and its sleep
    /// finished.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            region = %self.region,
            "supervisor loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let outcome = self.tick(Utc::now()).await;
            let mut sleep_for = self.poll_interval;
            if let TickOutcome::Paused(secs) = outcome {
                sleep_for += StdDuration::from_secs(secs);
            }

            tokio::select! {
                () = tokio::time::sleep(sleep_for) => {}
                _ = shutdown.changed() => break,
            }
        }

        let stats = self.stats(Utc::now());
        info!(
            dispatches = stats.dispatches,
            forced = stats.forced_dispatches,
            "supervisor loop stopped"
        );
    }

    /// Current monitoring statistics.
    pub fn stats(&self, now: DateTime<Utc>) -> SupervisorStats {
        SupervisorStats {
            last_label: self.last_label,
            stable_secs: self.stability.stable_duration(now).num_seconds(),
            dialog_entries: self.stability.history_len(),
            completed_turns: self.turns.history_len(),
            dispatches: self.dispatches,
            forced_dispatches: self.forced_dispatches,
            last_intervention_time: self.state.last_intervention_time,
        }
    }

    /// Drop all decision state and restart the clocks.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.stability.reset(now);
        self.guard.clear();
        self.valve.reset(now);
        self.turns.reset();
        self.state = InterventionState::default();
        self.last_label = SignalLabel::Normal;
    }

    /// Read-only view of the dispatch record, for tests and diagnostics.
    pub fn intervention_state(&self) -> &InterventionState {
        &self.state
    }
}
