//! The `ChemService` trait.

use async_trait::async_trait;

use chempredict_core::types::{ModelVariant, PredictionRequest, PredictionResult};

use crate::error::TransportError;
use crate::wire::{ChatReply, ChatRequest, HealthStatus};

/// Remote prediction and chat backend.
///
/// Every method issues exactly one request. Implementations never retry and
/// never fall back from one model variant to the other.
#[async_trait]
pub trait ChemService: Send + Sync {
    /// Predict the outcome of combining two reactants with the given variant.
    async fn predict(
        &self,
        variant: ModelVariant,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, TransportError>;

    /// Send one chat message and return the assistant reply.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, TransportError>;

    /// Drop the server-side conversation for a session.
    async fn clear_chat(&self, session_id: &str) -> Result<(), TransportError>;

    /// Check that the backend is up.
    async fn health(&self) -> Result<HealthStatus, TransportError>;
}
