use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator between the two reactants in a history label.
pub const COMPOUND_SEPARATOR: &str = " + ";

// =============================================================================
// Enums
// =============================================================================

/// Safety hazard reported for a predicted reaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardLevel {
    Low,
    Medium,
    High,
    /// Absent from the response, or a label the client does not recognize.
    #[default]
    Unknown,
}

impl HazardLevel {
    /// Map a service label to a level. Matching is exact: `"low"` is not `Low`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Low" => HazardLevel::Low,
            "Medium" => HazardLevel::Medium,
            "High" => HazardLevel::High,
            _ => HazardLevel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardLevel::Low => "Low",
            HazardLevel::Medium => "Medium",
            HazardLevel::High => "High",
            HazardLevel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HazardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which remote predictor answers a prediction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Lightweight rule-based predictor (`/predict`).
    #[default]
    RuleBased,
    /// Heavier model-backed predictor (`/predict_all`).
    ModelBacked,
}

impl ModelVariant {
    pub fn from_alternate_flag(use_alternate_model: bool) -> Self {
        if use_alternate_model {
            ModelVariant::ModelBacked
        } else {
            ModelVariant::RuleBased
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::RuleBased => "rule_based",
            ModelVariant::ModelBacked => "model_backed",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a chat turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

// =============================================================================
// Prediction
// =============================================================================

/// A validated pair of reactants ready to be sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub reactant1: String,
    pub reactant2: String,
}

impl PredictionRequest {
    /// Build a request from raw input, trimming both reactants.
    ///
    /// Returns `None` when either reactant is empty after trimming.
    pub fn from_input(reactant1: &str, reactant2: &str) -> Option<Self> {
        let reactant1 = reactant1.trim();
        let reactant2 = reactant2.trim();
        if reactant1.is_empty() || reactant2.is_empty() {
            return None;
        }
        Some(Self {
            reactant1: reactant1.to_string(),
            reactant2: reactant2.to_string(),
        })
    }

    /// `"reactant1 + reactant2"`, the label shown in history.
    pub fn compound_label(&self) -> String {
        format!("{}{}{}", self.reactant1, COMPOUND_SEPARATOR, self.reactant2)
    }
}

/// Outcome of a successful prediction. Immutable once received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub reaction_type: String,
    pub predicted_yield: String,
    /// The rule-based endpoint may omit the fields below.
    pub product: Option<String>,
    pub safety_hazard_level: HazardLevel,
    pub reaction_description: Option<String>,
    pub reactant1_smiles: Option<String>,
    pub reactant2_smiles: Option<String>,
    pub product_smiles: Option<String>,
    pub prediction_method: Option<String>,
}

impl PredictionResult {
    /// A result carrying only the two always-present fields.
    pub fn minimal(reaction_type: impl Into<String>, predicted_yield: impl Into<String>) -> Self {
        Self {
            reaction_type: reaction_type.into(),
            predicted_yield: predicted_yield.into(),
            product: None,
            safety_hazard_level: HazardLevel::Unknown,
            reaction_description: None,
            reactant1_smiles: None,
            reactant2_smiles: None,
            product_smiles: None,
            prediction_method: None,
        }
    }

    /// Whether any structure (SMILES) information was returned.
    pub fn has_structures(&self) -> bool {
        self.reactant1_smiles.is_some()
            || self.reactant2_smiles.is_some()
            || self.product_smiles.is_some()
    }
}

// =============================================================================
// History
// =============================================================================

/// Summary of one past successful prediction. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub compound_label: String,
    pub reaction_type: String,
    pub predicted_yield: String,
    pub created_at: DateTime<Local>,
}

impl HistoryEntry {
    pub fn from_prediction(request: &PredictionRequest, result: &PredictionResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            compound_label: request.compound_label(),
            reaction_type: result.reaction_type.clone(),
            predicted_yield: result.predicted_yield.clone(),
            created_at: Local::now(),
        }
    }

    /// Recover the two reactants from the label.
    ///
    /// Returns `None` unless splitting on `" + "` yields exactly two
    /// non-blank parts. Reactant names that themselves contain the separator
    /// cannot be recovered.
    pub fn reactants(&self) -> Option<(String, String)> {
        let mut parts = self.compound_label.split(COMPOUND_SEPARATOR);
        let first = parts.next()?;
        let second = parts.next()?;
        if parts.next().is_some() || first.trim().is_empty() || second.trim().is_empty() {
            return None;
        }
        Some((first.to_string(), second.to_string()))
    }
}

// =============================================================================
// Chat
// =============================================================================

/// One entry in the chat transcript. Append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: Uuid,
    pub content: String,
    pub role: ChatRole,
    pub created_at: DateTime<Local>,
    /// References cited by the assistant, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content.into(), Vec::new())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content.into(), Vec::new())
    }

    pub fn assistant_with_sources(content: impl Into<String>, sources: Vec<String>) -> Self {
        Self::new(ChatRole::Assistant, content.into(), sources)
    }

    fn new(role: ChatRole, content: String, sources: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            role,
            created_at: Local::now(),
            sources,
        }
    }
}
