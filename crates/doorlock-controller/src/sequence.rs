//! Timed output sequences for grant and deny outcomes.
//!
//! A [`SequencePlan`] is the full list of level changes for one outcome,
//! each stamped with its offset from the start of the sequence. The
//! controller starts an [`ActiveSequence`] from a plan and, on every poll,
//! applies the steps whose offset has passed. Nothing here waits.

use std::fmt;
use std::time::Duration;

use doorlock_core::constants::{DENY_PULSE_COUNT, GRANT_PULSE_COUNT};
use doorlock_core::{AccessConfig, AccessDecision};
use doorlock_hardware::{Level, OutputLine};
use serde::{Deserialize, Serialize};

/// Which outcome a sequence signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Grant,
    Deny,
}

impl From<AccessDecision> for SequenceKind {
    fn from(decision: AccessDecision) -> Self {
        match decision {
            AccessDecision::Granted { .. } => SequenceKind::Grant,
            AccessDecision::Denied => SequenceKind::Deny,
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceKind::Grant => f.write_str("grant"),
            SequenceKind::Deny => f.write_str("deny"),
        }
    }
}

/// One level change at a fixed offset from the sequence start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub offset: Duration,
    pub line: OutputLine,
    pub level: Level,
}

/// Ordered level changes for one outcome.
///
/// # Examples
///
/// ```
/// use doorlock_controller::SequencePlan;
/// use doorlock_core::AccessConfig;
/// use doorlock_hardware::OutputLine;
/// use std::time::Duration;
///
/// let plan = SequencePlan::grant(&AccessConfig::default());
///
/// assert_eq!(plan.total_duration(), Duration::from_millis(3500));
/// assert_eq!(
///     plan.high_window(OutputLine::LockRelay),
///     Some((Duration::from_millis(500), Duration::from_millis(3500)))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePlan {
    kind: SequenceKind,
    steps: Vec<Step>,
    total: Duration,
}

impl SequencePlan {
    /// Green indicator on, two short pulses, relay held for the unlock
    /// duration, then relay and green indicator off.
    pub fn grant(config: &AccessConfig) -> Self {
        let mut plan = PlanBuilder::new(SequenceKind::Grant);

        plan.set(OutputLine::GreenLed, Level::High);
        plan.set(OutputLine::RedLed, Level::Low);
        plan.pulses(GRANT_PULSE_COUNT, config.pulse(), config.grant_pulse_gap(), false);

        plan.set(OutputLine::LockRelay, Level::High);
        plan.wait(config.unlock_duration());
        plan.set(OutputLine::LockRelay, Level::Low);
        plan.set(OutputLine::GreenLed, Level::Low);

        plan.build()
    }

    /// Red indicator on, three pulses each followed by a pause, red held,
    /// then cleared. The relay is never touched.
    pub fn deny(config: &AccessConfig) -> Self {
        let mut plan = PlanBuilder::new(SequenceKind::Deny);

        plan.set(OutputLine::RedLed, Level::High);
        plan.set(OutputLine::GreenLed, Level::Low);
        plan.pulses(DENY_PULSE_COUNT, config.pulse(), config.deny_pulse_gap(), true);

        plan.wait(config.deny_hold());
        plan.set(OutputLine::RedLed, Level::Low);

        plan.build()
    }

    /// Plan matching `decision`.
    pub fn for_decision(decision: AccessDecision, config: &AccessConfig) -> Self {
        match SequenceKind::from(decision) {
            SequenceKind::Grant => Self::grant(config),
            SequenceKind::Deny => Self::deny(config),
        }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// Steps in application order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Offset at which the sequence is finished.
    pub fn total_duration(&self) -> Duration {
        self.total
    }

    /// First interval during which `line` is driven high, as
    /// `(rise offset, fall offset)`.
    pub fn high_window(&self, line: OutputLine) -> Option<(Duration, Duration)> {
        let mut on_line = self.steps.iter().filter(|s| s.line == line);
        let rise = on_line.find(|s| s.level.is_high())?.offset;
        let fall = on_line.find(|s| !s.level.is_high())?.offset;
        Some((rise, fall))
    }
}

/// Cursor-based builder: `set` stamps a step at the cursor, `wait` moves it.
struct PlanBuilder {
    kind: SequenceKind,
    steps: Vec<Step>,
    cursor: Duration,
}

impl PlanBuilder {
    fn new(kind: SequenceKind) -> Self {
        Self {
            kind,
            steps: Vec::new(),
            cursor: Duration::ZERO,
        }
    }

    fn set(&mut self, line: OutputLine, level: Level) {
        self.steps.push(Step {
            offset: self.cursor,
            line,
            level,
        });
    }

    fn wait(&mut self, duration: Duration) {
        self.cursor += duration;
    }

    /// `count` buzzer pulses of `pulse` length. The gap follows every pulse
    /// when `trailing_gap` is set, otherwise only sits between pulses.
    fn pulses(&mut self, count: usize, pulse: Duration, gap: Duration, trailing_gap: bool) {
        for i in 0..count {
            self.set(OutputLine::Buzzer, Level::High);
            self.wait(pulse);
            self.set(OutputLine::Buzzer, Level::Low);
            if trailing_gap || i + 1 < count {
                self.wait(gap);
            }
        }
    }

    fn build(self) -> SequencePlan {
        SequencePlan {
            kind: self.kind,
            steps: self.steps,
            total: self.cursor,
        }
    }
}

/// A plan in progress.
#[derive(Debug, Clone)]
pub struct ActiveSequence {
    plan: SequencePlan,
    started_at: Duration,
    next_step: usize,
}

impl ActiveSequence {
    /// Start `plan` at clock tick `now`. No step is applied yet.
    pub fn start(plan: SequencePlan, now: Duration) -> Self {
        Self {
            plan,
            started_at: now,
            next_step: 0,
        }
    }

    pub fn kind(&self) -> SequenceKind {
        self.plan.kind
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    /// Take every step that is due at `now` and mark it applied.
    ///
    /// A late poll returns all overdue steps at once, in plan order.
    pub fn take_due(&mut self, now: Duration) -> Vec<Step> {
        let elapsed = now.saturating_sub(self.started_at);
        let due = self.plan.steps[self.next_step..]
            .iter()
            .take_while(|step| step.offset <= elapsed)
            .count();
        let steps = self.plan.steps[self.next_step..self.next_step + due].to_vec();
        self.next_step += due;
        steps
    }

    /// Returns `true` once every step was taken and the plan's duration has
    /// elapsed.
    pub fn is_complete(&self, now: Duration) -> bool {
        self.next_step == self.plan.steps.len()
            && now.saturating_sub(self.started_at) >= self.plan.total
    }

    /// Time left until completion as of `now`.
    pub fn remaining(&self, now: Duration) -> Duration {
        self.plan
            .total
            .saturating_sub(now.saturating_sub(self.started_at))
    }
}
