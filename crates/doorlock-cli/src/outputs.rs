//! Output bank that reports line changes through `tracing`.

use std::collections::HashMap;

use doorlock_hardware::{Level, OutputBank, OutputLine, Result};
use tracing::{debug, info};

/// Stand-in for the relay and indicator pins when no board is attached.
///
/// Only actual level changes are logged; repeated writes of the same level
/// are silent.
#[derive(Debug, Default)]
pub struct TracingOutputs {
    levels: HashMap<OutputLine, Level>,
}

impl TracingOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn level(&self, line: OutputLine) -> Level {
        self.levels.get(&line).copied().unwrap_or_default()
    }

    fn latch(&mut self, line: OutputLine, level: Level) -> bool {
        self.levels.insert(line, level) != Some(level)
    }
}

impl OutputBank for TracingOutputs {
    async fn initialize(&mut self) -> Result<()> {
        debug!("Configuring {} output lines", OutputLine::ALL.len());
        self.levels.clear();
        self.all_low().await
    }

    async fn set(&mut self, line: OutputLine, level: Level) -> Result<()> {
        if self.latch(line, level) {
            info!("{} -> {}", line, level);
        }
        Ok(())
    }
}
