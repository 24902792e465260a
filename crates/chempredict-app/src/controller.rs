//! Top-level application controller.
//!
//! Owns the active view, the prediction orchestrator and the chat session,
//! and turns user intents into calls on them. Everything a frontend needs to
//! draw is available from `snapshot()`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use chempredict_client::{ChemService, HealthStatus};
use chempredict_core::types::{ChatTurn, HistoryEntry, PredictionResult};
use chempredict_core::{ChemError, ChemPredictConfig};
use chempredict_session::{
    ChatSessionManager, ClearOutcome, LifecycleState, PredictionDraft, ReportArtifact,
    ReportGenerator, RequestError, RequestOrchestrator, SendOutcome, SubmitOutcome,
};

/// Which of the three top-level views is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveView {
    #[default]
    Home,
    Predict,
    Research,
}

impl ActiveView {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveView::Home => "home",
            ActiveView::Predict => "predict",
            ActiveView::Research => "research",
        }
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActiveView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(ActiveView::Home),
            "predict" | "prediction" => Ok(ActiveView::Predict),
            "research" | "chat" => Ok(ActiveView::Research),
            other => Err(format!("unknown view: {}", other)),
        }
    }
}

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectView(ActiveView),
    EditReactants { reactant1: String, reactant2: String },
    ToggleModel(bool),
    Submit,
    /// Re-run the history entry at this position (0 = most recent).
    Replay(usize),
    Acknowledge,
    ExportReport,
    SendChat(String),
    ClearChat,
    CheckHealth,
}

/// What a dispatched intent produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    ViewChanged(ActiveView),
    DraftUpdated,
    Prediction(SubmitOutcome),
    Acknowledged(bool),
    Exported(PathBuf),
    NothingToExport,
    Chat(SendOutcome),
    ChatCleared(ClearOutcome),
    Health(Result<HealthStatus, RequestError>),
}

/// Everything needed to draw the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub active_view: ActiveView,
    pub draft: PredictionDraft,
    pub prediction: LifecycleState<PredictionResult>,
    pub history: Vec<HistoryEntry>,
    pub transcript: Vec<ChatTurn>,
    pub awaiting_reply: bool,
    pub clearing_chat: bool,
    pub session_id: String,
}

pub struct AppController {
    active_view: ActiveView,
    service: Arc<dyn ChemService>,
    orchestrator: RequestOrchestrator,
    chat: ChatSessionManager,
    report_dir: PathBuf,
}

impl AppController {
    pub fn new(service: Arc<dyn ChemService>, config: &ChemPredictConfig) -> Self {
        Self {
            active_view: ActiveView::default(),
            orchestrator: RequestOrchestrator::new(Arc::clone(&service)),
            chat: ChatSessionManager::new(Arc::clone(&service), &config.chat),
            service,
            report_dir: PathBuf::from(&config.report.output_dir),
        }
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            active_view: self.active_view,
            draft: self.orchestrator.draft(),
            prediction: self.orchestrator.state(),
            history: self.orchestrator.history(),
            transcript: self.chat.transcript(),
            awaiting_reply: self.chat.is_awaiting_reply(),
            clearing_chat: self.chat.is_clearing(),
            session_id: self.chat.session_id().to_string(),
        }
    }

    /// Apply one intent. Only report export can fail locally; request
    /// failures are carried inside the returned feedback.
    pub async fn dispatch(&mut self, intent: Intent) -> Result<Feedback, ChemError> {
        debug!(?intent, view = %self.active_view, "Dispatching intent");
        let feedback = match intent {
            Intent::SelectView(view) => {
                self.active_view = view;
                Feedback::ViewChanged(view)
            }
            Intent::EditReactants {
                reactant1,
                reactant2,
            } => {
                self.orchestrator.set_reactants(reactant1, reactant2);
                Feedback::DraftUpdated
            }
            Intent::ToggleModel(on) => {
                self.orchestrator.set_use_alternate_model(on);
                Feedback::DraftUpdated
            }
            Intent::Submit => Feedback::Prediction(self.orchestrator.submit_draft().await),
            Intent::Replay(index) => match self.orchestrator.history().get(index) {
                Some(entry) => Feedback::Prediction(self.orchestrator.replay(entry).await),
                None => Feedback::Prediction(SubmitOutcome::Ignored),
            },
            Intent::Acknowledge => Feedback::Acknowledged(self.orchestrator.acknowledge()),
            Intent::ExportReport => match self.render_report() {
                Some(artifact) => Feedback::Exported(self.write_report(&artifact).await?),
                None => Feedback::NothingToExport,
            },
            Intent::SendChat(text) => Feedback::Chat(self.chat.send_message(&text).await),
            Intent::ClearChat => Feedback::ChatCleared(self.chat.clear().await),
            Intent::CheckHealth => {
                Feedback::Health(self.service.health().await.map_err(RequestError::from))
            }
        };
        Ok(feedback)
    }

    /// Report for the currently displayed result, if there is one.
    pub fn render_report(&self) -> Option<ReportArtifact> {
        let (request, result) = self.orchestrator.completed_prediction()?;
        Some(ReportGenerator::generate(
            &result,
            &request.reactant1,
            &request.reactant2,
        ))
    }

    /// Write a report into the configured output directory.
    pub async fn write_report(&self, artifact: &ReportArtifact) -> Result<PathBuf, ChemError> {
        write_artifact(&self.report_dir, artifact).await
    }

    /// Drop anything still pending. Used when the frontend goes away.
    pub fn teardown(&self) {
        self.orchestrator.detach();
        self.chat.detach();
        info!("Views detached");
    }
}

/// Replace characters that would escape the output directory.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "ChemPredict_Report.txt".to_string()
    } else {
        cleaned
    }
}

async fn write_artifact(dir: &Path, artifact: &ReportArtifact) -> Result<PathBuf, ChemError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(sanitize_file_name(&artifact.suggested_file_name));
    tokio::fs::write(&path, artifact.content.as_bytes())
        .await
        .map_err(|e| ChemError::Export(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), bytes = artifact.content.len(), "Report saved");
    Ok(path)
}
