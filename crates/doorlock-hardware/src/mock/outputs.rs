//! Mock output bank that records every level change.

use std::collections::HashMap;

use crate::{
    HardwareError, Result,
    traits::OutputBank,
    types::{Level, OutputLine},
};

/// A single recorded level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputChange {
    pub line: OutputLine,
    pub level: Level,
}

/// Output bank that keeps the current level of each line in memory.
///
/// Only actual changes are recorded in the history, so counting `High`
/// entries for a line counts its rising edges.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockOutputs;
/// use doorlock_hardware::traits::OutputBank;
/// use doorlock_hardware::types::{Level, OutputLine};
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let mut outputs = MockOutputs::new();
///     outputs.set(OutputLine::Buzzer, Level::High).await?;
///     outputs.set(OutputLine::Buzzer, Level::Low).await?;
///
///     assert_eq!(outputs.rising_edges(OutputLine::Buzzer), 1);
///     assert!(!outputs.is_high(OutputLine::Buzzer));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockOutputs {
    levels: HashMap<OutputLine, Level>,
    history: Vec<OutputChange>,
    failing: Option<OutputLine>,
    initializations: usize,
}

impl MockOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of `line` (lines never driven are low).
    pub fn level(&self, line: OutputLine) -> Level {
        self.levels.get(&line).copied().unwrap_or_default()
    }

    pub fn is_high(&self, line: OutputLine) -> bool {
        self.level(line).is_high()
    }

    /// Every recorded change, oldest first.
    pub fn history(&self) -> &[OutputChange] {
        &self.history
    }

    /// Recorded changes for one line, oldest first.
    pub fn history_for(&self, line: OutputLine) -> Vec<Level> {
        self.history
            .iter()
            .filter(|change| change.line == line)
            .map(|change| change.level)
            .collect()
    }

    /// Number of low-to-high transitions recorded for `line`.
    pub fn rising_edges(&self, line: OutputLine) -> usize {
        self.history_for(line)
            .into_iter()
            .filter(|level| level.is_high())
            .count()
    }

    /// Forget recorded changes, keeping current levels.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Make writes to `line` fail until cleared with `None`.
    pub fn fail_line(&mut self, line: Option<OutputLine>) {
        self.failing = line;
    }

    /// Number of `initialize` calls.
    pub fn init_count(&self) -> usize {
        self.initializations
    }

    fn apply(&mut self, line: OutputLine, level: Level) -> Result<()> {
        if self.failing == Some(line) {
            return Err(HardwareError::output(line, "simulated fault"));
        }
        let previous = self.levels.insert(line, level).unwrap_or_default();
        if previous != level {
            self.history.push(OutputChange { line, level });
        }
        Ok(())
    }
}

impl OutputBank for MockOutputs {
    async fn initialize(&mut self) -> Result<()> {
        self.initializations += 1;
        self.all_low().await
    }

    async fn set(&mut self, line: OutputLine, level: Level) -> Result<()> {
        self.apply(line, level)
    }
}
