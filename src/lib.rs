//! Vigil - Screen-Session Supervisor
//!
//! Vigil watches the OCR text of a monitored screen region (an AI-assisted
//! editor session), decides when the session has completed a step or stalled,
//! and dispatches a nudge instruction back into it.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, port traits, and domain errors
//! - **Service Layer** (`services`): The decision engine - validation,
//!   stability tracking, signal classification, duplicate suppression,
//!   cooldown/lock discipline, stuck escalation, turn management, and the
//!   supervisor loop that composes them
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading,
//!   collaborator adapters (capture, generation, dispatch), status journal
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use vigil::services::Supervisor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load config, build collaborators, run the supervisor loop
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, ContentFingerprint, InterventionKind, InterventionReason, InterventionState, Region,
    SignalLabel, SignalReport, Snapshot, SuppressReason,
};
pub use domain::ports::{ActionExecutor, InstructionGenerator, ScreenSource};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Supervisor, TickOutcome};
