//! Action executor port.

use async_trait::async_trait;
use thiserror::Error;

/// Error types for instruction dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("executor command failed: {0}")]
    CommandFailed(String),

    #[error("dispatch timed out after {0}s")]
    Timeout(u64),

    #[error("executor io error: {0}")]
    Io(String),
}

/// Port trait for the external action executor.
///
/// Returns `Ok(false)` when the executor ran but could not deliver the
/// instruction (e.g. the input box was not focusable). Failures are logged
/// by the supervisor; there is no automatic retry within the same tick.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Deliver an instruction into the monitored session.
    async fn dispatch(&self, instruction: &str) -> Result<bool, DispatchError>;
}

#[async_trait]
impl<T: ActionExecutor + ?Sized> ActionExecutor for std::sync::Arc<T> {
    async fn dispatch(&self, instruction: &str) -> Result<bool, DispatchError> {
        (**self).dispatch(instruction).await
    }
}
