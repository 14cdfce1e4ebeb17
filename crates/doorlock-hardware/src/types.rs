//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card reader information.
///
/// Contains reader metadata such as supported protocols and the chip
/// firmware version reported during initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// List of supported protocols (e.g., ["ISO14443A"]).
    pub protocols: Vec<String>,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, protocols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            protocols,
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

impl fmt::Display for ReaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(version) = &self.firmware_version {
            write!(f, " (firmware {version})")?;
        }
        Ok(())
    }
}

/// Binary output lines driven by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLine {
    /// Relay switching the solenoid lock. High means unlocked.
    LockRelay,

    /// Access granted indicator.
    GreenLed,

    /// Access denied indicator.
    RedLed,

    /// Audio feedback.
    Buzzer,
}

impl OutputLine {
    /// Every line, in initialization order.
    pub const ALL: [OutputLine; 4] = [
        OutputLine::LockRelay,
        OutputLine::GreenLed,
        OutputLine::RedLed,
        OutputLine::Buzzer,
    ];
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputLine::LockRelay => "lock relay",
            OutputLine::GreenLed => "green LED",
            OutputLine::RedLed => "red LED",
            OutputLine::Buzzer => "buzzer",
        };
        f.write_str(name)
    }
}

/// Logic level of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Inactive. Every line starts and resets here.
    #[default]
    Low,

    /// Active.
    High,
}

impl Level {
    #[inline]
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(active: bool) -> Self {
        if active { Level::High } else { Level::Low }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => f.write_str("LOW"),
            Level::High => f.write_str("HIGH"),
        }
    }
}
