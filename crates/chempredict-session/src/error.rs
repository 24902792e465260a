//! Classified request failures.
//!
//! All classification happens here, at the orchestrator boundary. The view
//! layer gets an `ErrorKind` to branch on and a ready-to-show message.

use serde::Serialize;

use chempredict_client::TransportError;

use crate::lifecycle::LifecycleStatus;

/// HTTP status the backend uses when an upstream dependency (model, API
/// credential) is missing.
const SERVICE_UNAVAILABLE_STATUS: u16 = 503;

/// Machine-distinguishable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Connectivity,
    Server,
    ServiceUnavailable,
    InvalidResponse,
}

/// A failed prediction or chat request. Every variant is terminal; nothing
/// is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Local input was rejected; no request was sent.
    #[error("validation error: {0}")]
    Validation(String),
    /// No response was obtained from the backend.
    #[error("backend not reachable: {0}")]
    Connectivity(String),
    /// Non-2xx response.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    /// Non-2xx response caused by a missing upstream dependency.
    #[error("service unavailable {status}: {body}")]
    ServiceUnavailable { status: u16, body: String },
    /// 2xx response that could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Validation(_) => ErrorKind::Validation,
            RequestError::Connectivity(_) => ErrorKind::Connectivity,
            RequestError::Server { .. } => ErrorKind::Server,
            RequestError::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            RequestError::InvalidResponse(_) => ErrorKind::InvalidResponse,
        }
    }

    /// True for every non-2xx response, including the unavailable sub-case.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            RequestError::Server { .. } | RequestError::ServiceUnavailable { .. }
        )
    }

    /// Message shown next to the prediction form.
    pub fn user_message(&self) -> String {
        match self {
            RequestError::Validation(reason) => reason.clone(),
            RequestError::Connectivity(_) => {
                "Cannot connect to backend. Please ensure the prediction server is running."
                    .to_string()
            }
            RequestError::Server { status, body } => {
                format!("Error: Server error: {} - {}", status, body)
            }
            RequestError::ServiceUnavailable { status, body } => format!(
                "The prediction service is unavailable ({}): {}",
                status, body
            ),
            RequestError::InvalidResponse(detail) => {
                format!("Error: unexpected response from server ({})", detail)
            }
        }
    }
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect(detail) | TransportError::Client(detail) => {
                RequestError::Connectivity(detail)
            }
            TransportError::Status { status, body } if status == SERVICE_UNAVAILABLE_STATUS => {
                RequestError::ServiceUnavailable { status, body }
            }
            TransportError::Status { status, body } => RequestError::Server { status, body },
            TransportError::Decode(detail) => RequestError::InvalidResponse(detail),
        }
    }
}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("invalid lifecycle transition: {0} -> {1}")]
    InvalidTransition(LifecycleStatus, LifecycleStatus),
}
