//! The access decision loop.
//!
//! [`AccessController`] owns the reader, the output bank and the clock. Each
//! call to [`poll`](AccessController::poll) does at most one unit of work:
//! advance the running sequence, or check for a card and decide on it. The
//! caller decides how often to poll; nothing in here sleeps.
//!
//! # Examples
//!
//! ```
//! use doorlock_controller::{AccessController, PollOutcome};
//! use doorlock_core::{AccessConfig, ManualClock};
//! use doorlock_hardware::mock::{MockOutputs, MockReader};
//! use doorlock_hardware::OutputLine;
//!
//! #[tokio::main]
//! async fn main() -> doorlock_controller::Result<()> {
//!     let (reader, cards) = MockReader::new();
//!     let clock = ManualClock::new();
//!     let mut controller = AccessController::new(
//!         reader,
//!         MockOutputs::new(),
//!         clock.clone(),
//!         AccessConfig::default(),
//!     )?;
//!     controller.initialize().await?;
//!
//!     cards.present_card("12345678".parse().unwrap()).await?;
//!     let outcome = controller.poll().await;
//!     assert!(matches!(outcome, PollOutcome::Decided { decision, .. } if decision.is_granted()));
//!
//!     clock.advance_ms(500);
//!     controller.poll().await;
//!     assert!(controller.outputs().is_high(OutputLine::LockRelay));
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use doorlock_core::{AccessConfig, AccessDecision, CardUid, Clock, SystemClock};
use doorlock_hardware::{CardReader, Level, OutputBank, OutputLine};

use crate::Result;
use crate::sequence::{ActiveSequence, SequenceKind, SequencePlan, Step};
use crate::state_machine::{AccessState, StateMachine, StateTransition};

/// What a single poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The activity flag is cleared.
    Inactive,

    /// The last read is more recent than the debounce interval.
    Debounced,

    /// No new card in the field.
    NoCard,

    /// A card was detected but its identifier could not be read. Handled
    /// exactly like `NoCard`; the card is retried on the next poll.
    ReadFailed,

    /// A card was read and a sequence started.
    Decided {
        uid: CardUid,
        decision: AccessDecision,
    },

    /// A sequence is running; card processing is blocked.
    InProgress {
        sequence: SequenceKind,
        remaining: Duration,
    },

    /// The running sequence finished on this poll.
    Completed { sequence: SequenceKind },

    /// The lock relay could not be driven low. Nothing else happens until a
    /// retry on a later poll succeeds.
    LockFault,
}

/// Per-process decision loop state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Polls are no-ops while cleared.
    pub active: bool,

    /// Clock tick of the last successful read.
    pub last_read: Option<Duration>,
}

impl Session {
    /// Returns `true` if a read happened less than `interval` before `now`.
    pub fn is_debouncing(&self, now: Duration, interval: Duration) -> bool {
        self.last_read
            .is_some_and(|last| now.saturating_sub(last) < interval)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            active: true,
            last_read: None,
        }
    }
}

/// The last processed scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRecord {
    pub uid: CardUid,
    pub decision: AccessDecision,
    /// Controller clock tick of the read.
    pub tick: Duration,
    /// Wall-clock time of the read.
    pub at: DateTime<Utc>,
}

/// Snapshot of the controller for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub state: AccessState,
    pub active: bool,
    pub granted: u64,
    pub denied: u64,
    pub last_scan: Option<ScanRecord>,
    /// The relay may still be energized after a failed write.
    pub lock_fault: bool,
}

/// Polls a card reader and drives the lock outputs.
pub struct AccessController<R, O, C = SystemClock> {
    reader: R,
    outputs: O,
    clock: C,
    config: AccessConfig,
    session: Session,
    machine: StateMachine,
    active: Option<ActiveSequence>,
    relay_release_pending: bool,
    granted: u64,
    denied: u64,
    last_scan: Option<ScanRecord>,
}

impl<R, O, C> AccessController<R, O, C>
where
    R: CardReader,
    O: OutputBank,
    C: Clock,
{
    /// Create a controller. Hardware is not touched until
    /// [`initialize`](Self::initialize).
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(reader: R, outputs: O, clock: C, config: AccessConfig) -> Result<Self> {
        config.validate()?;
        if config.allow_list.is_empty() {
            warn!("Allow-list is empty, every card will be denied");
        }

        Ok(Self {
            reader,
            outputs,
            clock,
            config,
            session: Session::default(),
            machine: StateMachine::new(),
            active: None,
            relay_release_pending: false,
            granted: 0,
            denied: 0,
            last_scan: None,
        })
    }

    /// Drive every output low and bring up the reader.
    ///
    /// # Errors
    ///
    /// Returns the first hardware error. Outputs are initialized before the
    /// reader, so a reader failure still leaves the lock closed. If the
    /// outputs fail, later polls keep retrying the relay before reading
    /// cards.
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing door lock controller");

        if let Err(e) = self.outputs.initialize().await {
            self.relay_release_pending = true;
            return Err(e.into());
        }
        self.relay_release_pending = false;
        self.reader.initialize().await?;

        match self.reader.reader_info().await {
            Ok(info) => info!("Card reader: {}", info),
            Err(e) => warn!("Could not query reader info: {}", e),
        }

        info!(
            "System initialized, {} authorized card(s), ready to scan",
            self.config.allow_list.len()
        );
        Ok(())
    }

    /// Reinitialize the reader and outputs in place.
    ///
    /// Aborts any running sequence (outputs end up low) and returns to Idle.
    /// Session state, including the debounce timestamp, is kept.
    ///
    /// # Errors
    ///
    /// Returns the first hardware error from [`initialize`](Self::initialize).
    pub async fn reinitialize_hardware(&mut self) -> Result<()> {
        info!("System reset initiated");
        self.abort_sequence();
        self.initialize().await
    }

    /// Clear the debounce timestamp and re-activate polling.
    pub fn reset_session(&mut self) {
        debug!("Decision loop session reset");
        self.session = Session::default();
    }

    /// Set the activity flag. While inactive, polls do nothing.
    pub fn set_active(&mut self, active: bool) {
        if self.session.active != active {
            info!("Access control {}", if active { "enabled" } else { "disabled" });
        }
        self.session.active = active;
    }

    /// Abort any running sequence and drive every output low.
    ///
    /// # Errors
    ///
    /// Returns the first output error.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.abort_sequence();
        self.outputs.all_low().await?;
        info!("Outputs released, controller stopped");
        Ok(())
    }

    /// Run one iteration of the decision loop.
    ///
    /// Never fails: reader faults count as "no card" and output faults are
    /// logged, so nothing propagates past the current poll. A relay that
    /// failed to release blocks card processing until it is released.
    pub async fn poll(&mut self) -> PollOutcome {
        let now = self.clock.now();

        if self.active.is_some() {
            return self.advance_sequence(now).await;
        }

        if self.relay_release_pending && !self.release_relay().await {
            return PollOutcome::LockFault;
        }

        if !self.session.active {
            return PollOutcome::Inactive;
        }

        if self
            .session
            .is_debouncing(now, self.config.debounce_interval())
        {
            return PollOutcome::Debounced;
        }

        match self.reader.is_new_card_present().await {
            Ok(true) => {}
            Ok(false) => return PollOutcome::NoCard,
            Err(e) => {
                warn!("Card presence check failed: {}", e);
                return PollOutcome::NoCard;
            }
        }

        let uid = match self.reader.read_identifier().await {
            Ok(Some(uid)) => uid,
            Ok(None) => {
                debug!("Card detected but serial could not be read");
                return PollOutcome::ReadFailed;
            }
            Err(e) => {
                warn!("Card read failed: {}", e);
                return PollOutcome::ReadFailed;
            }
        };

        self.session.last_read = Some(now);

        if let Err(e) = self.reader.release_card().await {
            warn!("Failed to halt card {}: {}", uid, e);
        }

        let decision = self.decide(&uid, now);
        self.start_sequence(decision, now).await;

        PollOutcome::Decided { uid, decision }
    }

    fn decide(&mut self, uid: &CardUid, now: Duration) -> AccessDecision {
        info!("RFID card detected - UID: {}", uid);
        debug!("UID (decimal): {}", uid.to_decimal_string());

        let decision = self.config.allow_list.check(uid);
        match decision {
            AccessDecision::Granted { entry } => {
                self.granted += 1;
                info!("Access granted - authorized card {} recognized", entry + 1);
            }
            AccessDecision::Denied => {
                self.denied += 1;
                warn!("Access denied - unauthorized card {}", uid);
            }
        }

        self.last_scan = Some(ScanRecord {
            uid: uid.clone(),
            decision,
            tick: now,
            at: Utc::now(),
        });

        decision
    }

    async fn start_sequence(&mut self, decision: AccessDecision, now: Duration) {
        let plan = SequencePlan::for_decision(decision, &self.config);
        let target = AccessState::Dispatching {
            sequence: plan.kind(),
        };

        if let Err(e) = self.machine.transition_to(target, now) {
            error!("Cannot start {} sequence: {}", plan.kind(), e);
            return;
        }

        let mut active = ActiveSequence::start(plan, now);
        let steps = active.take_due(now);
        self.active = Some(active);
        self.apply_steps(&steps).await;
    }

    async fn advance_sequence(&mut self, now: Duration) -> PollOutcome {
        let Some(mut active) = self.active.take() else {
            return PollOutcome::NoCard;
        };

        let steps = active.take_due(now);
        self.apply_steps(&steps).await;

        let sequence = active.kind();
        if !active.is_complete(now) {
            let remaining = active.remaining(now);
            self.active = Some(active);
            return PollOutcome::InProgress {
                sequence,
                remaining,
            };
        }

        // Stay in Dispatching until the relay is confirmed low
        if self.relay_release_pending && !self.release_relay().await {
            self.active = Some(active);
            return PollOutcome::LockFault;
        }

        if let Err(e) = self.machine.transition_to(AccessState::Idle, now) {
            error!("Cannot finish {} sequence: {}", sequence, e);
            self.machine.reset(now);
        }

        match sequence {
            SequenceKind::Grant => info!("Door locked - ready for next scan"),
            SequenceKind::Deny => info!("Deny sequence finished - ready for next scan"),
        }

        PollOutcome::Completed { sequence }
    }

    async fn apply_steps(&mut self, steps: &[Step]) {
        for step in steps {
            if let Err(e) = self.outputs.set(step.line, step.level).await {
                error!("Failed to drive {} {}: {}", step.line, step.level, e);
                if step.line == OutputLine::LockRelay && !step.level.is_high() {
                    self.relay_release_pending = true;
                }
                continue;
            }

            if step.line == OutputLine::LockRelay {
                match step.level {
                    Level::High => info!(
                        "Relay activated - solenoid unlocked for {}ms",
                        self.config.unlock_duration_ms
                    ),
                    Level::Low => {
                        self.relay_release_pending = false;
                        info!("Relay deactivated - solenoid locked");
                    }
                }
            }
        }
    }

    /// Retry driving the relay low. Returns `true` once it is released.
    async fn release_relay(&mut self) -> bool {
        match self.outputs.set(OutputLine::LockRelay, Level::Low).await {
            Ok(()) => {
                self.relay_release_pending = false;
                info!("Relay deactivated - solenoid locked");
                true
            }
            Err(e) => {
                error!("Relay still not released, door may be unlocked: {}", e);
                false
            }
        }
    }

    fn abort_sequence(&mut self) {
        if let Some(active) = self.active.take() {
            warn!("Aborting {} sequence", active.kind());
            self.machine.reset(self.clock.now());
        }
    }

    pub fn state(&self) -> AccessState {
        self.machine.current_state()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_active(&self) -> bool {
        self.session.active
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Recent state transitions, oldest first.
    pub fn history(&self) -> Vec<StateTransition> {
        self.machine.history().iter().copied().collect()
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut O {
        &mut self.outputs
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            state: self.state(),
            active: self.session.active,
            granted: self.granted,
            denied: self.denied,
            last_scan: self.last_scan.clone(),
            lock_fault: self.relay_release_pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_session_defaults() {
        let session = Session::default();
        assert!(session.active);
        assert_eq!(session.last_read, None);
    }

    #[test]
    fn test_first_read_is_never_debounced() {
        let session = Session::default();
        assert!(!session.is_debouncing(ms(0), ms(1000)));
    }

    #[test]
    fn test_debounce_window() {
        let session = Session {
            active: true,
            last_read: Some(ms(2000)),
        };
        assert!(session.is_debouncing(ms(2000), ms(1000)));
        assert!(session.is_debouncing(ms(2999), ms(1000)));
        assert!(!session.is_debouncing(ms(3000), ms(1000)));
    }

    #[test]
    fn test_zero_debounce_never_blocks() {
        let session = Session {
            active: true,
            last_read: Some(ms(5)),
        };
        assert!(!session.is_debouncing(ms(5), Duration::ZERO));
    }
}
