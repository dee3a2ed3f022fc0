//! Intervention bookkeeping: why an intervention fires, why one is
//! suppressed, and the single mutable dispatch record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::ContentFingerprint;

/// The kind of intervention being dispatched, passed through to the
/// instruction generator so it can tailor the nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    /// A review-family marker appeared: the session finished an edit.
    ReviewCompleted,
    /// A completion phrase or question prompt appeared.
    ResponseCompleted,
    /// Content sat unchanged past the stuck threshold.
    ContentTimeout,
    /// Safety-valve dispatch after prolonged suppression.
    ForcedProgress,
}

impl InterventionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReviewCompleted => "review_completed",
            Self::ResponseCompleted => "response_completed",
            Self::ContentTimeout => "content_timeout",
            Self::ForcedProgress => "forced_progress",
        }
    }
}

/// A concrete reason to intervene, computed once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterventionReason {
    pub kind: InterventionKind,
    /// Human-readable detail for logs and the generator prompt.
    pub detail: String,
}

impl InterventionReason {
    pub fn new(kind: InterventionKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Why the duplicate guard suppressed a tick, first match wins.
#[derive(Debug, Clone, PartialEq)]
pub enum SuppressReason {
    /// A dispatch is already in flight.
    DispatchInFlight,
    /// The cooldown window since the last dispatch has not elapsed.
    CooldownActive { remaining_secs: i64 },
    /// This content's fingerprint was already acted upon.
    AlreadyProcessed,
    /// The same raw content hit the repetition cap.
    RepetitionCap { count: u32 },
    /// The snapshot echoes the instruction we just sent.
    InstructionEcho,
    /// Near-exact positional match with the last dialog entry.
    NearExactMatch { similarity: f64 },
}

impl std::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DispatchInFlight => write!(f, "dispatch in flight"),
            Self::CooldownActive { remaining_secs } => {
                write!(f, "cooldown active ({remaining_secs}s remaining)")
            }
            Self::AlreadyProcessed => write!(f, "content already processed"),
            Self::RepetitionCap { count } => write!(f, "repetition cap reached ({count})"),
            Self::InstructionEcho => write!(f, "echo of last sent instruction"),
            Self::NearExactMatch { similarity } => {
                write!(f, "near-exact match ({similarity:.4})")
            }
        }
    }
}

/// The single mutable dispatch record.
///
/// Owned by the supervisor; every other component only reads it. `in_flight`
/// is true for the entire duration of one dispatch and false otherwise - no
/// second dispatch may begin while it is set.
#[derive(Debug, Clone, Default)]
pub struct InterventionState {
    /// A dispatch critical section is currently executing.
    pub in_flight: bool,
    /// When the last successful dispatch finished. Suppressed ticks do not
    /// update this.
    pub last_intervention_time: Option<DateTime<Utc>>,
    /// The instruction text most recently sent to the executor.
    pub last_sent_instruction: Option<String>,
    /// Fingerprint of the snapshot that triggered the last dispatch.
    pub last_sent_fingerprint: Option<ContentFingerprint>,
}

impl InterventionState {
    /// Record a successful dispatch.
    pub fn record_dispatch(
        &mut self,
        now: DateTime<Utc>,
        instruction: String,
        fingerprint: ContentFingerprint,
    ) {
        self.last_intervention_time = Some(now);
        self.last_sent_instruction = Some(instruction);
        self.last_sent_fingerprint = Some(fingerprint);
    }

    /// Whether any dispatch has completed yet.
    pub fn has_dispatched(&self) -> bool {
        self.last_intervention_time.is_some()
    }
}
