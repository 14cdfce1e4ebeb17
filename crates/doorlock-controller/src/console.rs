//! Line-oriented operator commands.
//!
//! Three case-sensitive commands are recognized after trimming surrounding
//! whitespace: `STATUS`, `RESET` and `HELP`. Anything else is ignored
//! without a reply.
//!
//! # Examples
//!
//! ```
//! use doorlock_controller::console::Command;
//!
//! assert_eq!(Command::parse("  STATUS\r\n"), Some(Command::Status));
//! assert_eq!(Command::parse("status"), None);
//! ```

use std::fmt;

use doorlock_core::Clock;
use doorlock_hardware::{CardReader, OutputBank};
use tracing::{debug, error};

use crate::controller::AccessController;

/// Fixed reply to `STATUS`.
pub const STATUS_BLOCK: [&str; 4] = [
    "=== SYSTEM STATUS ===",
    "RFID Door Unlock System - ACTIVE",
    "Ready to scan authorized cards",
    "=====================",
];

/// Fixed reply to `HELP`.
pub const HELP_BLOCK: [&str; 5] = [
    "=== SERIAL COMMANDS ===",
    "STATUS - Display system status",
    "RESET  - Reset the system",
    "HELP   - Show this help message",
    "=======================",
];

/// Operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status,
    Reset,
    Help,
}

impl Command {
    /// Parse one input line. Returns `None` for anything unrecognized.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "STATUS" => Some(Command::Status),
            "RESET" => Some(Command::Reset),
            "HELP" => Some(Command::Help),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Status => f.write_str("STATUS"),
            Command::Reset => f.write_str("RESET"),
            Command::Help => f.write_str("HELP"),
        }
    }
}

/// Multi-line reply to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    lines: Vec<String>,
}

impl Response {
    fn from_block(block: &[&str]) -> Self {
        Self {
            lines: block.iter().map(|line| line.to_string()).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Lines joined with `\n`, without a trailing newline.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

impl<R, O, C> AccessController<R, O, C>
where
    R: CardReader,
    O: OutputBank,
    C: Clock,
{
    /// Handle one line of operator input.
    ///
    /// Returns `None` for unrecognized input.
    pub async fn handle_line(&mut self, line: &str) -> Option<Response> {
        let Some(command) = Command::parse(line) else {
            debug!("Ignoring console input {:?}", line);
            return None;
        };
        Some(self.execute(command).await)
    }

    /// Execute a parsed command.
    ///
    /// `RESET` reinitializes the hardware only; the debounce state survives.
    pub async fn execute(&mut self, command: Command) -> Response {
        debug!("Console command {}", command);
        match command {
            Command::Status => Response::from_block(&STATUS_BLOCK),
            Command::Help => Response::from_block(&HELP_BLOCK),
            Command::Reset => {
                let mut lines = vec!["System reset initiated...".to_string()];
                match self.reinitialize_hardware().await {
                    Ok(()) => {
                        lines.push("System initialized successfully!".to_string());
                        lines.push("Ready to scan RFID cards...".to_string());
                    }
                    Err(e) => {
                        error!("Hardware reset failed: {}", e);
                        lines.push(format!("System reset failed: {e}"));
                    }
                }
                Response { lines }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("STATUS", Some(Command::Status))]
    #[case("RESET", Some(Command::Reset))]
    #[case("HELP", Some(Command::Help))]
    #[case("  HELP  ", Some(Command::Help))]
    #[case("STATUS\r", Some(Command::Status))]
    #[case("\tRESET\n", Some(Command::Reset))]
    #[case("status", None)]
    #[case("Help", None)]
    #[case("STATUS NOW", None)]
    #[case("", None)]
    #[case("UNLOCK", None)]
    fn test_parse(#[case] input: &str, #[case] expected: Option<Command>) {
        assert_eq!(Command::parse(input), expected);
    }

    #[test]
    fn test_response_display() {
        let response = Response::from_block(&STATUS_BLOCK);
        assert_eq!(response.lines().len(), 4);
        assert_eq!(
            response.to_string(),
            "=== SYSTEM STATUS ===\n\
             RFID Door Unlock System - ACTIVE\n\
             Ready to scan authorized cards\n\
             ====================="
        );
    }

    #[test]
    fn test_command_display_round_trips_parse() {
        for command in [Command::Status, Command::Reset, Command::Help] {
            assert_eq!(Command::parse(&command.to_string()), Some(command));
        }
    }
}
