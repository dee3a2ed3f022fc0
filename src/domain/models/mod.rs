//! Domain models.

pub mod config;
pub mod intervention;
pub mod signal;
pub mod snapshot;
pub mod turn;

pub use config::{
    CaptureConfig, Config, ExecutorConfig, GeneratorConfig, JournalConfig, LimitsConfig,
    LoggingConfig, MarkerConfig, TimingConfig,
};
pub use intervention::{InterventionKind, InterventionReason, InterventionState, SuppressReason};
pub use signal::{CompletionSignal, SignalLabel, SignalReport};
pub use snapshot::{ContentFingerprint, Region, Snapshot};
pub use turn::{ConversationTurn, TurnResponse, TurnStatus};
