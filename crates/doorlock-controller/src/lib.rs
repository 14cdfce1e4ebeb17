//! Door lock access controller.
//!
//! This crate contains the decision loop that turns card scans into lock
//! actions: the [`AccessController`] itself, the Idle/Dispatching
//! [`StateMachine`], the timed grant and deny [`SequencePlan`]s, and the
//! operator [`console`].

pub mod console;
pub mod controller;
pub mod error;
pub mod sequence;
pub mod state_machine;

pub use console::{Command, Response};
pub use controller::{AccessController, PollOutcome, ScanRecord, Session, StatusReport};
pub use error::{Error, Result};
pub use sequence::{ActiveSequence, SequenceKind, SequencePlan, Step};
pub use state_machine::{AccessState, StateMachine, StateTransition};
