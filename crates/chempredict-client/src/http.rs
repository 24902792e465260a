//! reqwest-backed `ChemService`.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use chempredict_core::config::ServiceConfig;
use chempredict_core::types::{ModelVariant, PredictionRequest, PredictionResult};

use crate::error::TransportError;
use crate::service::ChemService;
use crate::wire::{ChatReply, ChatRequest, HealthStatus, PredictResponse};

/// Talks to the FastAPI backend over HTTP/JSON.
///
/// No client-side timeout is configured; a pending request lasts as long as
/// the transport keeps it open.
pub struct HttpChemService {
    client: Client,
    config: ServiceConfig,
}

impl HttpChemService {
    pub fn new(config: ServiceConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn predict_url(&self, variant: ModelVariant) -> String {
        match variant {
            ModelVariant::RuleBased => self.config.endpoint(&self.config.predict_path),
            ModelVariant::ModelBacked => self.config.endpoint(&self.config.predict_all_path),
        }
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(classify_send_error)?;
        read_json(response).await
    }
}

fn classify_send_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Client(err.to_string())
    } else {
        TransportError::Connect(err.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    status = status.as_u16(),
                    error = %e,
                    "Could not read error response body"
                );
                String::new()
            }
        };
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Connect(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
}

#[async_trait]
impl ChemService for HttpChemService {
    async fn predict(
        &self,
        variant: ModelVariant,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, TransportError> {
        let url = self.predict_url(variant);
        tracing::debug!(%url, %variant, "Sending prediction request");
        let resp: PredictResponse = self.post_json(&url, request).await?;
        Ok(resp.into())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        let url = self.config.endpoint(&self.config.chat_path);
        tracing::debug!(%url, session_id = %request.session_id, "Sending chat message");
        self.post_json(&url, request).await
    }

    async fn clear_chat(&self, session_id: &str) -> Result<(), TransportError> {
        let url = self.config.endpoint(&self.config.chat_clear_path);
        let response = self
            .client
            .post(&url)
            .query(&[("session_id", session_id)])
            .send()
            .await
            .map_err(classify_send_error)?;
        let _: serde_json::Value = read_json(response).await?;
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        let url = self.config.endpoint(&self.config.health_path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(classify_send_error)?;
        read_json(response).await
    }
}
