//! Prediction request orchestrator.
//!
//! Owns the prediction lifecycle, the input draft, and the history store.
//! At most one prediction is in flight per instance; a submission made while
//! one is pending is ignored, not queued. Dropping a `submit` future before it
//! completes returns the lifecycle to `Idle`.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chempredict_client::ChemService;
use chempredict_core::types::{HistoryEntry, ModelVariant, PredictionRequest, PredictionResult};

use crate::error::RequestError;
use crate::history::HistoryStore;
use crate::lifecycle::{Lifecycle, LifecycleState, LifecycleStatus};

const MISSING_REACTANTS: &str = "Please enter both reactants.";

/// Text currently in the prediction form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionDraft {
    pub reactant1: String,
    pub reactant2: String,
    pub use_alternate_model: bool,
}

/// What happened to one `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another prediction was already in flight; nothing changed.
    Ignored,
    Succeeded(PredictionResult),
    Failed(RequestError),
    /// The orchestrator was detached while the request was pending; the
    /// response was dropped.
    Discarded,
}

struct OrchestratorState {
    lifecycle: Lifecycle<PredictionResult>,
    draft: PredictionDraft,
    /// Inputs of the current or most recent request.
    last_request: Option<PredictionRequest>,
    history: HistoryStore,
    /// Bumped by `detach`; responses from an older epoch are dropped.
    epoch: u64,
}

/// Resets an `InFlight` lifecycle to `Idle` when the owning `submit` future
/// is dropped before its response is recorded.
struct InFlightGuard<'a> {
    orchestrator: &'a RequestOrchestrator,
    epoch: u64,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.orchestrator.lock();
        if state.epoch == self.epoch && state.lifecycle.status() == LifecycleStatus::InFlight {
            let _ = state.lifecycle.reset();
            debug!(epoch = self.epoch, "Prediction cancelled before a response arrived");
        }
    }
}

/// Drives single-shot prediction requests.
pub struct RequestOrchestrator {
    service: Arc<dyn ChemService>,
    state: Mutex<OrchestratorState>,
}

impl RequestOrchestrator {
    pub fn new(service: Arc<dyn ChemService>) -> Self {
        Self {
            service,
            state: Mutex::new(OrchestratorState {
                lifecycle: Lifecycle::new(),
                draft: PredictionDraft::default(),
                last_request: None,
                history: HistoryStore::new(),
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OrchestratorState> {
        // A panic while holding the lock cannot leave the state half-written:
        // every mutation is a single assignment.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -- Snapshots for the view layer --

    pub fn state(&self) -> LifecycleState<PredictionResult> {
        self.lock().lifecycle.state().clone()
    }

    pub fn status(&self) -> LifecycleStatus {
        self.lock().lifecycle.status()
    }

    pub fn is_in_flight(&self) -> bool {
        self.status() == LifecycleStatus::InFlight
    }

    pub fn draft(&self) -> PredictionDraft {
        self.lock().draft.clone()
    }

    /// History, most recent first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock().history.all()
    }

    /// The succeeded result together with the reactants that produced it.
    pub fn completed_prediction(&self) -> Option<(PredictionRequest, PredictionResult)> {
        let state = self.lock();
        let result = state.lifecycle.state().result()?.clone();
        let request = state.last_request.clone()?;
        Some((request, result))
    }

    // -- Draft editing --

    pub fn set_reactants(&self, reactant1: impl Into<String>, reactant2: impl Into<String>) {
        let mut state = self.lock();
        state.draft.reactant1 = reactant1.into();
        state.draft.reactant2 = reactant2.into();
    }

    pub fn set_use_alternate_model(&self, use_alternate_model: bool) {
        self.lock().draft.use_alternate_model = use_alternate_model;
    }

    // -- Intents --

    /// Submit whatever is currently in the draft.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let draft = self.draft();
        self.submit(&draft.reactant1, &draft.reactant2, draft.use_alternate_model)
            .await
    }

    /// Validate, send one prediction request, and record the outcome.
    ///
    /// `use_alternate_model` picks the model-backed endpoint instead of the
    /// rule-based one. There is no fallback between the two.
    pub async fn submit(
        &self,
        reactant1: &str,
        reactant2: &str,
        use_alternate_model: bool,
    ) -> SubmitOutcome {
        let variant = ModelVariant::from_alternate_flag(use_alternate_model);

        let (request, epoch) = {
            let mut state = self.lock();
            if !state.lifecycle.status().can_transition_to(LifecycleStatus::InFlight) {
                debug!("Prediction already in flight; submission ignored");
                return SubmitOutcome::Ignored;
            }

            let Some(request) = PredictionRequest::from_input(reactant1, reactant2) else {
                let err = RequestError::Validation(MISSING_REACTANTS.to_string());
                state.last_request = None;
                if let Err(e) = state.lifecycle.fail(err.clone()) {
                    warn!(error = %e, "Could not record validation failure");
                }
                return SubmitOutcome::Failed(err);
            };

            if let Err(e) = state.lifecycle.begin() {
                debug!(error = %e, "Submission rejected by lifecycle");
                return SubmitOutcome::Ignored;
            }
            state.last_request = Some(request.clone());
            (request, state.epoch)
        };

        info!(
            reactant1 = %request.reactant1,
            reactant2 = %request.reactant2,
            %variant,
            "Submitting prediction"
        );
        let mut in_flight = InFlightGuard {
            orchestrator: self,
            epoch,
            armed: true,
        };
        let response = self.service.predict(variant, &request).await;
        in_flight.disarm();

        let mut state = self.lock();
        if state.epoch != epoch {
            debug!(
                label = %request.compound_label(),
                "Discarding prediction response for detached view"
            );
            return SubmitOutcome::Discarded;
        }

        match response {
            Ok(result) => {
                if let Err(e) = state.lifecycle.succeed(result.clone()) {
                    warn!(error = %e, "Dropping prediction result");
                    return SubmitOutcome::Discarded;
                }
                state
                    .history
                    .append(HistoryEntry::from_prediction(&request, &result));
                info!(
                    reaction_type = %result.reaction_type,
                    predicted_yield = %result.predicted_yield,
                    "Prediction succeeded"
                );
                SubmitOutcome::Succeeded(result)
            }
            Err(transport) => {
                let err = RequestError::from(transport);
                warn!(
                    kind = ?err.kind(),
                    server_error = err.is_server_error(),
                    error = %err,
                    "Prediction failed"
                );
                if let Err(e) = state.lifecycle.fail(err.clone()) {
                    warn!(error = %e, "Could not record prediction failure");
                }
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Re-run a history entry.
    ///
    /// The reactants are recovered by splitting the entry's label on `" + "`.
    /// If that does not give exactly two non-blank parts, or a prediction is
    /// already in flight, nothing changes and `Ignored` is returned.
    pub async fn replay(&self, entry: &HistoryEntry) -> SubmitOutcome {
        let Some((reactant1, reactant2)) = entry.reactants() else {
            debug!(label = %entry.compound_label, "Ambiguous history label; replay ignored");
            return SubmitOutcome::Ignored;
        };

        let use_alternate_model = {
            let mut state = self.lock();
            if state.lifecycle.status() == LifecycleStatus::InFlight {
                debug!("Prediction already in flight; replay ignored");
                return SubmitOutcome::Ignored;
            }
            state.draft.reactant1 = reactant1.clone();
            state.draft.reactant2 = reactant2.clone();
            state.draft.use_alternate_model
        };

        self.submit(&reactant1, &reactant2, use_alternate_model)
            .await
    }

    /// Move a finished prediction back to `Idle`. No-op when idle or in flight.
    pub fn acknowledge(&self) -> bool {
        let mut state = self.lock();
        match state.lifecycle.status() {
            LifecycleStatus::Succeeded | LifecycleStatus::Failed => {
                state.lifecycle.reset().is_ok()
            }
            _ => false,
        }
    }

    /// Tear down the current view. Any pending response will be dropped and
    /// the lifecycle returns to `Idle`. History is kept.
    pub fn detach(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        if state.lifecycle.status() != LifecycleStatus::Idle {
            let _ = state.lifecycle.reset();
        }
        debug!(epoch = state.epoch, "Prediction view detached");
    }
}
