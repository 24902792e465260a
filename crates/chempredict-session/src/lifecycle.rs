//! Request lifecycle state machine.
//!
//! Idle -> InFlight -> Succeeded | Failed -> Idle
//!
//! A new submission from a terminal state re-enters InFlight directly. A
//! submission rejected by local validation goes straight to Failed. Nothing
//! may enter InFlight while already InFlight.

use std::fmt;

use serde::Serialize;

use crate::error::{LifecycleError, RequestError};

/// Payload-free view of the lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStatus::Idle => write!(f, "idle"),
            LifecycleStatus::InFlight => write!(f, "in_flight"),
            LifecycleStatus::Succeeded => write!(f, "succeeded"),
            LifecycleStatus::Failed => write!(f, "failed"),
        }
    }
}

impl LifecycleStatus {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: LifecycleStatus) -> bool {
        use LifecycleStatus::*;
        matches!(
            (self, target),
            (Idle, InFlight)
                | (Idle, Failed)
                | (InFlight, Succeeded)
                | (InFlight, Failed)
                // Teardown while a request is pending
                | (InFlight, Idle)
                | (Succeeded, InFlight)
                | (Succeeded, Failed)
                | (Succeeded, Idle)
                | (Failed, InFlight)
                | (Failed, Failed)
                | (Failed, Idle)
        )
    }
}

/// Exactly one of these holds per manager at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState<T> {
    Idle,
    InFlight,
    Succeeded(T),
    Failed(RequestError),
}

impl<T> LifecycleState<T> {
    pub fn status(&self) -> LifecycleStatus {
        match self {
            LifecycleState::Idle => LifecycleStatus::Idle,
            LifecycleState::InFlight => LifecycleStatus::InFlight,
            LifecycleState::Succeeded(_) => LifecycleStatus::Succeeded,
            LifecycleState::Failed(_) => LifecycleStatus::Failed,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, LifecycleState::InFlight)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            LifecycleState::Succeeded(value) => Some(value),
            _ => None,
        }
    }
}

/// Owner of one `LifecycleState`, applying only validated transitions.
#[derive(Debug, Clone)]
pub struct Lifecycle<T> {
    state: LifecycleState<T>,
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Lifecycle<T> {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Idle,
        }
    }

    pub fn state(&self) -> &LifecycleState<T> {
        &self.state
    }

    pub fn status(&self) -> LifecycleStatus {
        self.state.status()
    }

    /// Enter `InFlight`, dropping any previous result or error.
    pub fn begin(&mut self) -> Result<(), LifecycleError> {
        self.apply(LifecycleState::InFlight)
    }

    pub fn succeed(&mut self, value: T) -> Result<(), LifecycleError> {
        self.apply(LifecycleState::Succeeded(value))
    }

    pub fn fail(&mut self, err: RequestError) -> Result<(), LifecycleError> {
        self.apply(LifecycleState::Failed(err))
    }

    /// Return to `Idle` from any other state.
    pub fn reset(&mut self) -> Result<(), LifecycleError> {
        self.apply(LifecycleState::Idle)
    }

    fn apply(&mut self, next: LifecycleState<T>) -> Result<(), LifecycleError> {
        let from = self.state.status();
        let to = next.status();
        if !from.can_transition_to(to) {
            return Err(LifecycleError::InvalidTransition(from, to));
        }
        tracing::debug!("Lifecycle: {} -> {}", from, to);
        self.state = next;
        Ok(())
    }
}
