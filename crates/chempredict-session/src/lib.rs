//! Client-side interaction orchestration for ChemPredict.
//!
//! Drives prediction and chat requests through their lifecycle, classifies
//! failures into user-readable messages, keeps the recent-prediction history,
//! and renders downloadable reports.

pub mod chat;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod orchestrator;
pub mod report;

pub use chat::{ChatSessionManager, ClearOutcome, SendOutcome};
pub use error::{ErrorKind, LifecycleError, RequestError};
pub use history::{HistoryStore, HISTORY_CAPACITY};
pub use lifecycle::{Lifecycle, LifecycleState, LifecycleStatus};
pub use orchestrator::{PredictionDraft, RequestOrchestrator, SubmitOutcome};
pub use report::{ReportArtifact, ReportGenerator, REPORT_MIME_TYPE};
