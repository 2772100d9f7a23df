//! Readiness state machine for the task worker.

use serde::{Deserialize, Serialize};

/// Readiness of a task worker instance.
///
/// Transitions are monotonic and one-directional; a worker never regresses
/// to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    /// No environment construction has started.
    Uninitialized,
    /// Environment construction is in flight.
    Initializing,
    /// Environment is built; requests are accepted indefinitely.
    Ready,
}

impl ReadinessState {
    /// Check if this state allows transitioning to another state.
    pub fn can_transition_to(&self, target: ReadinessState) -> bool {
        use ReadinessState::*;

        matches!(
            (self, target),
            (Uninitialized, Initializing) | (Initializing, Ready)
        )
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl std::fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
        };
        write!(f, "{s}")
    }
}

/// Tracks a worker's readiness, refusing illegal moves.
#[derive(Debug)]
pub struct Readiness {
    state: ReadinessState,
}

impl Readiness {
    pub fn new() -> Self {
        Self {
            state: ReadinessState::Uninitialized,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// Advance to `target` if the move is legal. An illegal move is refused
    /// and the current state is left untouched.
    pub fn transition_to(&mut self, target: ReadinessState) -> Result<(), String> {
        if !self.state.can_transition_to(target) {
            return Err(format!(
                "cannot transition from {} to {}",
                self.state, target
            ));
        }
        self.state = target;
        Ok(())
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
