//! End-to-end walks of the supervisor state machine with mock collaborators
//! and explicit clocks.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use vigil::domain::models::{Config, InterventionKind, Region, SuppressReason};
use vigil::domain::ports::CaptureError;
use vigil::infrastructure::collaborators::{MockExecutor, MockGenerator, ScriptedScreenSource};
use vigil::services::{SkipCause, Supervisor, TickOutcome};

type TestSupervisor =
    Supervisor<Arc<ScriptedScreenSource>, Arc<MockGenerator>, Arc<MockExecutor>>;

struct Harness {
    supervisor: TestSupervisor,
    source: Arc<ScriptedScreenSource>,
    generator: Arc<MockGenerator>,
    executor: Arc<MockExecutor>,
    start: DateTime<Utc>,
}

impl Harness {
    fn new(generator: MockGenerator) -> Self {
        let source = Arc::new(ScriptedScreenSource::new());
        let generator = Arc::new(generator);
        let executor = Arc::new(MockExecutor::new());
        let start = Utc::now();
        let supervisor = Supervisor::new(
            &Config::default(),
            Region::new(0, 0, 800, 600),
            Arc::clone(&source),
            Arc::clone(&generator),
            Arc::clone(&executor),
            None,
            start,
        );
        Self {
            supervisor,
            source,
            generator,
            executor,
            start,
        }
    }

    fn with_instruction(instruction: &str) -> Self {
        Self::new(MockGenerator::with_response(instruction))
    }

    async fn tick_at(&mut self, offset_secs: i64) -> TickOutcome {
        self.supervisor
            .tick(self.start + Duration::seconds(offset_secs))
            .await
    }
}

const NEUTRAL_TEXT: &str = "Let me reconsider the module layout";

// ---------------------------------------------------------------------------
// Scenario A: a review marker triggers one dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn review_marker_dispatches_immediately() {
    let mut h = Harness::with_instruction("Please summarize what changed and run the tests");
    h.source.push("Review Changes").await;

    let outcome = h.tick_at(0).await;
    match outcome {
        TickOutcome::Dispatched {
            kind,
            forced,
            instruction,
        } => {
            assert_eq!(kind, InterventionKind::ReviewCompleted);
            assert!(!forced);
            assert_eq!(instruction, "Please summarize what changed and run the tests");
        }
        other => panic!("expected a dispatch, got {other:?}"),
    }

    assert_eq!(h.executor.delivered().await.len(), 1);
    assert!(h.supervisor.intervention_state().has_dispatched());
    assert_eq!(
        h.supervisor.intervention_state().last_intervention_time,
        Some(h.start)
    );
}

// ---------------------------------------------------------------------------
// Scenario B: busy content is left alone under the 60s busy threshold
// ---------------------------------------------------------------------------

#[tokio::test]
async fn busy_content_is_not_stuck_before_sixty_seconds() {
    let mut h = Harness::with_instruction("long enough instruction text");
    h.source.push("Generating response...").await;

    assert_eq!(h.tick_at(0).await, TickOutcome::Idle);
    // The script is exhausted, so the same snapshot repeats unchanged.
    assert_eq!(h.tick_at(20).await, TickOutcome::Idle);
    assert_eq!(h.tick_at(45).await, TickOutcome::Idle);

    assert!(h.executor.delivered().await.is_empty());
}

#[tokio::test]
async fn busy_content_becomes_stuck_past_sixty_seconds() {
    let mut h = Harness::with_instruction("long enough instruction text");
    h.source.push("Generating response...").await;

    assert_eq!(h.tick_at(0).await, TickOutcome::Idle);
    let outcome = h.tick_at(61).await;
    match outcome {
        TickOutcome::Dispatched { kind, .. } => {
            assert_eq!(kind, InterventionKind::ContentTimeout);
        }
        other => panic!("expected a dispatch, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Scenario C: identical content dispatches once, then stays suppressed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identical_content_dispatches_once_then_suppresses() {
    let mut h = Harness::with_instruction("a sufficiently long nudge instruction");
    h.source.push(NEUTRAL_TEXT).await;

    // Fresh content, nothing to do yet.
    assert_eq!(h.tick_at(0).await, TickOutcome::Idle);

    // Past the 30s stuck threshold: one dispatch.
    match h.tick_at(31).await {
        TickOutcome::Dispatched { kind, .. } => {
            assert_eq!(kind, InterventionKind::ContentTimeout);
        }
        other => panic!("expected a dispatch, got {other:?}"),
    }

    // Same content again: suppressed by the processed fingerprint.
    assert_eq!(
        h.tick_at(62).await,
        TickOutcome::Suppressed(SuppressReason::AlreadyProcessed)
    );
    assert_eq!(
        h.tick_at(93).await,
        TickOutcome::Suppressed(SuppressReason::AlreadyProcessed)
    );

    assert_eq!(h.executor.delivered().await.len(), 1);
}

// ---------------------------------------------------------------------------
// P2: strictly growing busy content never counts as stuck
// ---------------------------------------------------------------------------

#[tokio::test]
async fn growth_under_busy_marker_is_exempt_from_stuck() {
    let mut h = Harness::with_instruction("long enough instruction text");

    let mut text = String::from("Generating the requested module");
    for i in 0..6 {
        h.source.push(text.clone()).await;
        let outcome = h.tick_at(i * 20).await;
        assert_eq!(outcome, TickOutcome::Idle, "tick {i} should stay idle");
        // Strictly increasing length, well past the growth margin.
        text.push_str(&"x".repeat(60));
    }

    assert!(h.executor.delivered().await.is_empty());
}

// ---------------------------------------------------------------------------
// P4: forced progress after 120s of suppression
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forced_progress_fires_after_stuck_ceiling() {
    let mut h = Harness::with_instruction("a sufficiently long nudge instruction");
    h.source.push(NEUTRAL_TEXT).await;

    assert_eq!(h.tick_at(0).await, TickOutcome::Idle);
    assert!(matches!(
        h.tick_at(31).await,
        TickOutcome::Dispatched { forced: false, .. }
    ));

    // Every following tick is suppressed by the processed fingerprint...
    for offset in [62, 93, 124] {
        assert_eq!(
            h.tick_at(offset).await,
            TickOutcome::Suppressed(SuppressReason::AlreadyProcessed)
        );
    }

    // ...until more than 120s have passed without a dispatch: exactly one
    // forced intervention goes out and clears suppression state.
    match h.tick_at(155).await {
        TickOutcome::Dispatched { kind, forced, .. } => {
            assert_eq!(kind, InterventionKind::ForcedProgress);
            assert!(forced);
        }
        other => panic!("expected a forced dispatch, got {other:?}"),
    }
    assert_eq!(h.executor.delivered().await.len(), 2);

    // The forced dispatch re-marked the content, so suppression resumes.
    assert_eq!(
        h.tick_at(186).await,
        TickOutcome::Suppressed(SuppressReason::AlreadyProcessed)
    );
}

// ---------------------------------------------------------------------------
// P5: echo immunity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn echoed_instruction_never_retriggers() {
    let instruction = "Please continue with the next feature";
    let mut h = Harness::with_instruction(instruction);

    h.source.push("Review Changes").await;
    assert!(matches!(h.tick_at(0).await, TickOutcome::Dispatched { .. }));

    // The next snapshot shows our own instruction in the input box, together
    // with wording that would otherwise classify as completed.
    h.source
        .push(format!("Input: {instruction} | Review Changes"))
        .await;
    assert_eq!(
        h.tick_at(20).await,
        TickOutcome::Suppressed(SuppressReason::InstructionEcho)
    );

    assert_eq!(h.executor.delivered().await.len(), 1);
}

// ---------------------------------------------------------------------------
// Cooldown spacing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cooldown_suppresses_close_dispatches() {
    let mut h = Harness::with_instruction("a sufficiently long nudge instruction");

    h.source.push("Review Changes").await;
    assert!(matches!(h.tick_at(0).await, TickOutcome::Dispatched { .. }));

    // Different completed content only 5s later: inside the 8s cooldown.
    h.source
        .push("Implementation complete, the feature is in place")
        .await;
    assert!(matches!(
        h.tick_at(5).await,
        TickOutcome::Suppressed(SuppressReason::CooldownActive { .. })
    ));

    // Fresh completed content after the cooldown goes through.
    h.source
        .push("All checks green now, implementation complete and verified")
        .await;
    assert!(matches!(h.tick_at(14).await, TickOutcome::Dispatched { .. }));
    assert_eq!(h.executor.delivered().await.len(), 2);
}

// ---------------------------------------------------------------------------
// Validation and capture failures never touch state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn capture_failure_skips_the_tick() {
    let mut h = Harness::with_instruction("long enough instruction text");
    h.source.push_failure(CaptureError::Empty).await;

    assert_eq!(
        h.tick_at(0).await,
        TickOutcome::Skipped(SkipCause::CaptureFailed)
    );
    let stats = h.supervisor.stats(h.start);
    assert_eq!(stats.dialog_entries, 0);
}

#[tokio::test]
async fn invalid_snapshots_do_not_advance_timers() {
    let mut h = Harness::with_instruction("long enough instruction text");

    // Noise for the first 40s, then real content.
    h.source.push("dark_content region at 120,40 detected").await;
    assert_eq!(
        h.tick_at(0).await,
        TickOutcome::Skipped(SkipCause::InvalidSnapshot)
    );
    h.source.push("dark_content region at 120,40 detected").await;
    assert_eq!(
        h.tick_at(20).await,
        TickOutcome::Skipped(SkipCause::InvalidSnapshot)
    );

    h.source.push(NEUTRAL_TEXT).await;
    assert_eq!(h.tick_at(40).await, TickOutcome::Idle);
    let stats = h.supervisor.stats(h.start + Duration::seconds(40));
    // Only the valid snapshot entered the history.
    assert_eq!(stats.dialog_entries, 1);

    // The stable clock started at the valid snapshot, not at start-up: 29s
    // after it, nothing is stuck yet.
    assert_eq!(h.tick_at(69).await, TickOutcome::Idle);
    // 31s after it, the stuck path opens.
    assert!(matches!(h.tick_at(71).await, TickOutcome::Dispatched { .. }));
}

// ---------------------------------------------------------------------------
// Collaborator failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generator_failure_falls_back_to_fixed_instruction() {
    let mut h = Harness::new(MockGenerator::failing_first("unused response text", 1));
    h.source.push("Review Changes").await;

    let fallback = Config::default().generator.fallback_instruction;
    match h.tick_at(0).await {
        TickOutcome::Dispatched { instruction, .. } => assert_eq!(instruction, fallback),
        other => panic!("expected a fallback dispatch, got {other:?}"),
    }
    assert_eq!(h.executor.delivered().await, vec![fallback]);
}

#[tokio::test]
async fn near_empty_generator_output_falls_back() {
    let mut h = Harness::with_instruction("ok");
    h.source.push("Review Changes").await;

    let fallback = Config::default().generator.fallback_instruction;
    match h.tick_at(0).await {
        TickOutcome::Dispatched { instruction, .. } => assert_eq!(instruction, fallback),
        other => panic!("expected a fallback dispatch, got {other:?}"),
    }
}

#[tokio::test]
async fn executor_error_triggers_fallback_attempt() {
    let mut h = Harness::with_instruction("a sufficiently long nudge instruction");
    h.executor.fail_next(1).await;
    h.source.push("Review Changes").await;

    let fallback = Config::default().generator.fallback_instruction;
    match h.tick_at(0).await {
        TickOutcome::Dispatched { instruction, .. } => assert_eq!(instruction, fallback),
        other => panic!("expected the fallback to be delivered, got {other:?}"),
    }
    assert_eq!(h.executor.delivered().await, vec![fallback]);
}

#[tokio::test]
async fn refused_delivery_leaves_no_dispatch_record_and_retries() {
    let mut h = Harness::with_instruction("a sufficiently long nudge instruction");
    h.executor.refuse_next(2).await;
    h.source.push("Review Changes").await;

    assert!(matches!(
        h.tick_at(0).await,
        TickOutcome::DispatchFailed { .. }
    ));
    assert!(!h.supervisor.intervention_state().has_dispatched());
    // The lock is back down after the failed dispatch.
    assert!(!h.supervisor.intervention_state().in_flight);

    // Nothing was marked processed, so the next tick retries the dispatch.
    h.executor.refuse_next(0).await;
    assert!(matches!(h.tick_at(31).await, TickOutcome::Dispatched { .. }));
}

// ---------------------------------------------------------------------------
// Repeated-content backoff
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cosmetic_drift_trips_the_backoff_pause() {
    let mut h = Harness::with_instruction("long enough instruction text");

    // Alternate punctuation so every snapshot is a "change" yet normalizes
    // to the same content: no reason ever fires, the repeat counter climbs.
    // The first snapshot is fresh content; the five that follow are repeats.
    let base = "the assistant is mulling over the module graph";
    for i in 0..6 {
        let text = if i % 2 == 0 {
            base.to_string()
        } else {
            format!("{base}.")
        };
        h.source.push(text).await;
        let outcome = h.tick_at(i * 5).await;
        if i < 5 {
            assert_eq!(outcome, TickOutcome::Idle, "tick {i} should stay idle");
        } else {
            // Fifth consecutive repeat pauses polling for 30s.
            assert_eq!(outcome, TickOutcome::Paused(30));
        }
    }

    assert!(h.executor.delivered().await.is_empty());
}

// ---------------------------------------------------------------------------
// Turn context reaches the generator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generator_sees_conversation_context() {
    let mut h = Harness::with_instruction("a sufficiently long nudge instruction");

    h.source
        .push("please implement the export feature for reports")
        .await;
    assert_eq!(h.tick_at(0).await, TickOutcome::Idle);

    h.source
        .push("The export feature is finished and tests are passing")
        .await;
    assert!(matches!(h.tick_at(20).await, TickOutcome::Dispatched { .. }));

    let calls = h.generator.calls().await;
    assert_eq!(calls.len(), 1);
    let (context, reason, kind) = &calls[0];
    assert!(context.contains("previous turn:"));
    assert!(context.contains("export feature"));
    assert!(reason.contains("completion wording"));
    assert_eq!(*kind, InterventionKind::ResponseCompleted);
}
