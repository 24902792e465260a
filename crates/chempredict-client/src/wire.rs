//! JSON payloads exchanged with the backend.

use serde::{Deserialize, Serialize};

use chempredict_core::types::{HazardLevel, PredictionResult};

/// Success body of `/predict` and `/predict_all`.
///
/// Only `reaction_type` and `predicted_yield` are guaranteed; the rule-based
/// endpoint may leave out everything else.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub reaction_type: String,
    pub predicted_yield: String,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub safety_hazard_level: Option<String>,
    #[serde(default)]
    pub reaction_description: Option<String>,
    #[serde(default)]
    pub reactant1_smiles: Option<String>,
    #[serde(default)]
    pub reactant2_smiles: Option<String>,
    #[serde(default)]
    pub product_smiles: Option<String>,
    #[serde(default)]
    pub prediction_method: Option<String>,
}

impl From<PredictResponse> for PredictionResult {
    fn from(resp: PredictResponse) -> Self {
        Self {
            reaction_type: resp.reaction_type,
            predicted_yield: resp.predicted_yield,
            product: resp.product,
            safety_hazard_level: resp
                .safety_hazard_level
                .as_deref()
                .map(HazardLevel::from_label)
                .unwrap_or_default(),
            reaction_description: resp.reaction_description,
            reactant1_smiles: resp.reactant1_smiles,
            reactant2_smiles: resp.reactant2_smiles,
            // The model-backed service reports a missing product as "N/A".
            product_smiles: resp.product_smiles.filter(|s| s != "N/A"),
            prediction_method: resp.prediction_method,
        }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

/// Success body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl ChatReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            sources: Vec::new(),
            session_id: None,
            timestamp: None,
            model: None,
        }
    }
}

/// Success body of the health check (`GET /`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub message: String,
}
