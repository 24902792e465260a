//! Outbound request surface of the ChemPredict backend.
//!
//! Defines the `ChemService` trait the session managers talk to, the JSON
//! wire format, and a reqwest-backed implementation.

pub mod error;
pub mod http;
pub mod service;
pub mod wire;

pub use error::TransportError;
pub use http::HttpChemService;
pub use service::ChemService;
pub use wire::{ChatReply, ChatRequest, HealthStatus, PredictResponse};
