//! The decision engine.
//!
//! Each service owns one concern of the per-tick decision; the
//! [`Supervisor`] composes them into a single outcome per polling tick.

pub mod classifier;
pub mod cooldown;
pub mod duplicate_guard;
pub mod escalation;
pub mod stability;
pub mod supervisor;
pub mod turns;
pub mod validator;

pub use classifier::SignalClassifier;
pub use cooldown::CooldownLock;
pub use duplicate_guard::DuplicateGuard;
pub use escalation::{EscalationValve, RepeatAction};
pub use stability::{StabilityReport, StabilityTracker};
pub use supervisor::{SkipCause, Supervisor, SupervisorStats, TickOutcome};
pub use turns::TurnManager;
pub use validator::SnapshotValidator;
