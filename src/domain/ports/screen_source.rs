//! Screen source port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::Region;

/// Error types for capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture command failed: {0}")]
    CommandFailed(String),

    #[error("capture timed out after {0}s")]
    Timeout(u64),

    #[error("capture produced no output")]
    Empty,

    #[error("capture io error: {0}")]
    Io(String),
}

/// Port trait for the screen text source.
///
/// A capture may legitimately fail on any tick (window minimized, OCR
/// backend unavailable); the supervisor treats every failure as "no snapshot
/// this tick" and moves on without mutating state.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for use across tokio tasks.
#[async_trait]
pub trait ScreenSource: Send + Sync {
    /// Capture the current text of the monitored region.
    async fn capture(&self, region: &Region) -> Result<String, CaptureError>;
}

#[async_trait]
impl<T: ScreenSource + ?Sized> ScreenSource for std::sync::Arc<T> {
    async fn capture(&self, region: &Region) -> Result<String, CaptureError> {
        (**self).capture(region).await
    }
}
