//! Access decision state machine.
//!
//! The controller is either waiting for a card or running the output
//! sequence for the last decision.
//!
//! # States
//!
//! - `Idle`: polling the reader for a new card
//! - `Dispatching`: a grant or deny sequence is driving the outputs; no new
//!   card is processed until it finishes
//!
//! # Valid Transitions
//!
//! - Idle → Dispatching(grant | deny)
//! - Dispatching → Idle
//!
//! There is no terminal state.
//!
//! # Examples
//!
//! ```
//! use doorlock_controller::{AccessState, SequenceKind, StateMachine};
//! use std::time::Duration;
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), AccessState::Idle);
//!
//! let dispatching = AccessState::Dispatching { sequence: SequenceKind::Grant };
//! machine.transition_to(dispatching, Duration::from_millis(10)).unwrap();
//!
//! // A second decision cannot start while one is in flight
//! assert!(machine.transition_to(dispatching, Duration::from_millis(20)).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use doorlock_core::{Error, Result};

use crate::sequence::SequenceKind;

/// Maximum number of state transitions to keep in history.
///
/// Each access decision produces two transitions, so this covers the last
/// fifty scans.
const MAX_HISTORY_SIZE: usize = 100;

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    /// Waiting for a card.
    Idle,

    /// Running the output sequence for a decision.
    Dispatching { sequence: SequenceKind },
}

impl AccessState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_controller::{AccessState, SequenceKind};
    ///
    /// let deny = AccessState::Dispatching { sequence: SequenceKind::Deny };
    /// assert!(AccessState::Idle.can_transition_to(&deny));
    /// assert!(deny.can_transition_to(&AccessState::Idle));
    /// assert!(!AccessState::Idle.can_transition_to(&AccessState::Idle));
    /// ```
    pub fn can_transition_to(&self, target: &AccessState) -> bool {
        matches!(
            (self, target),
            (AccessState::Idle, AccessState::Dispatching { .. })
                | (AccessState::Dispatching { .. }, AccessState::Idle)
        )
    }

    /// Returns `true` while a sequence is in progress.
    pub fn is_dispatching(&self) -> bool {
        matches!(self, AccessState::Dispatching { .. })
    }
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessState::Idle => write!(f, "Idle"),
            AccessState::Dispatching { sequence } => write!(f, "Dispatching({sequence})"),
        }
    }
}

/// A single state transition, stamped with the controller clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: AccessState,

    /// The state transitioned to.
    pub to: AccessState,

    /// Clock tick at which the transition happened.
    pub at: Duration,
}

/// State machine enforcing the Idle ↔ Dispatching cycle.
///
/// Time is supplied by the caller on every transition, so the machine never
/// reads a clock itself.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current state.
    current_state: AccessState,

    /// Tick at which the current state was entered.
    state_entered_at: Duration,

    /// History of state transitions (limited to MAX_HISTORY_SIZE).
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self {
            current_state: AccessState::Idle,
            state_entered_at: Duration::ZERO,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> AccessState {
        self.current_state
    }

    /// Time spent in the current state as of `now`.
    pub fn time_in_current_state(&self, now: Duration) -> Duration {
        now.saturating_sub(self.state_entered_at)
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last N state transitions.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).copied().collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not
    /// allowed from the current state. The machine is left unchanged.
    pub fn transition_to(&mut self, new_state: AccessState, at: Duration) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        Ok(self.perform_state_change(new_state, at))
    }

    /// Force the machine back to Idle regardless of current state.
    ///
    /// Used by hardware resets that abort an in-flight sequence. The reset is
    /// recorded in history even when the machine was already idle.
    pub fn reset(&mut self, at: Duration) -> StateTransition {
        self.perform_state_change(AccessState::Idle, at)
    }

    fn perform_state_change(&mut self, new_state: AccessState, at: Duration) -> StateTransition {
        let transition = StateTransition {
            from: self.current_state,
            to: new_state,
            at,
        };

        self.current_state = new_state;
        self.state_entered_at = at;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        transition
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
