//! Scripted in-memory `ChemService` for driving the managers without a
//! network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use chempredict_client::{ChatReply, ChatRequest, ChemService, HealthStatus, TransportError};
use chempredict_core::types::{ModelVariant, PredictionRequest, PredictionResult};

/// Holds a request open until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
pub struct ScriptedService {
    predict_script: Mutex<VecDeque<Result<PredictionResult, TransportError>>>,
    chat_script: Mutex<VecDeque<Result<ChatReply, TransportError>>>,
    clear_script: Mutex<VecDeque<Result<(), TransportError>>>,
    pub predict_calls: Mutex<Vec<(ModelVariant, PredictionRequest)>>,
    pub chat_calls: Mutex<Vec<ChatRequest>>,
    pub clear_calls: Mutex<Vec<String>>,
    gate: Option<Arc<Gate>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request waits on `gate` before answering.
    pub fn gated(gate: Arc<Gate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_prediction(&self, outcome: Result<PredictionResult, TransportError>) {
        self.predict_script.lock().unwrap().push_back(outcome);
    }

    pub fn push_chat(&self, outcome: Result<ChatReply, TransportError>) {
        self.chat_script.lock().unwrap().push_back(outcome);
    }

    pub fn push_clear(&self, outcome: Result<(), TransportError>) {
        self.clear_script.lock().unwrap().push_back(outcome);
    }

    pub fn predict_count(&self) -> usize {
        self.predict_calls.lock().unwrap().len()
    }

    pub fn chat_count(&self) -> usize {
        self.chat_calls.lock().unwrap().len()
    }

    async fn hold(&self) {
        if let Some(ref gate) = self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

#[async_trait]
impl ChemService for ScriptedService {
    async fn predict(
        &self,
        variant: ModelVariant,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, TransportError> {
        self.predict_calls
            .lock()
            .unwrap()
            .push((variant, request.clone()));
        self.hold().await;
        let next = self.predict_script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(PredictionResult::minimal("Substitution", "80%")))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        self.chat_calls.lock().unwrap().push(request.clone());
        self.hold().await;
        let next = self.chat_script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(ChatReply::text("ok")))
    }

    async fn clear_chat(&self, session_id: &str) -> Result<(), TransportError> {
        self.clear_calls.lock().unwrap().push(session_id.to_string());
        self.hold().await;
        let next = self.clear_script.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        Ok(HealthStatus {
            message: "ChemPredict AI API is running".to_string(),
        })
    }
}

pub fn connection_refused() -> TransportError {
    TransportError::Connect("error sending request: connection refused".to_string())
}
