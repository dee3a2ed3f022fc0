//! Domain errors for the Vigil supervisor.

use thiserror::Error;

use crate::domain::ports::{CaptureError, DispatchError, GenerateError};

/// Domain-level errors that can occur while supervising a session.
///
/// None of these is allowed to terminate the polling loop; every variant
/// degrades to "do nothing productive this tick, try again next tick".
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("instruction generation failed: {0}")]
    Generation(#[from] GenerateError),

    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("dispatch lock already held")]
    LockHeld,

    #[error("invalid region configuration: {0}")]
    InvalidRegion(String),

    #[error("status journal error: {0}")]
    Journal(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
