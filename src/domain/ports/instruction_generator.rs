//! Instruction generator port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::InterventionKind;

/// Error types for instruction generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generator not configured: {0}")]
    NotConfigured(String),

    #[error("generation request failed: {0}")]
    RequestFailed(String),

    #[error("generation timed out after {0}s")]
    Timeout(u64),

    #[error("invalid generator response: {0}")]
    InvalidResponse(String),
}

/// Port trait for the external instruction generator.
///
/// The generator may throw or return short/empty text; the supervisor
/// substitutes a fixed fallback instruction on either condition, so
/// implementations do not need their own fallback logic.
#[async_trait]
pub trait InstructionGenerator: Send + Sync {
    /// Produce the next instruction for the monitored session.
    ///
    /// # Arguments
    /// * `context` - Rendered conversation context from the turn manager
    /// * `reason` - Human-readable reason the supervisor decided to intervene
    /// * `kind` - The intervention kind, for prompt tailoring
    async fn generate(
        &self,
        context: &str,
        reason: &str,
        kind: InterventionKind,
    ) -> Result<String, GenerateError>;
}

#[async_trait]
impl<T: InstructionGenerator + ?Sized> InstructionGenerator for std::sync::Arc<T> {
    async fn generate(
        &self,
        context: &str,
        reason: &str,
        kind: InterventionKind,
    ) -> Result<String, GenerateError> {
        (**self).generate(context, reason, kind).await
    }
}
