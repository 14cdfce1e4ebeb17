//! Error types for hardware operations.
//!
//! This module defines error types specific to the card reader and the
//! output lines, covering device disconnection, failed reads and failed
//! output writes.

use crate::types::OutputLine;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Card reading error.
    #[error("Card read error: {message}")]
    CardReadError { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Driving an output line failed.
    #[error("Output {line} failed: {message}")]
    OutputError { line: OutputLine, message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new card read error.
    pub fn card_read(message: impl Into<String>) -> Self {
        Self::CardReadError {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new output error for `line`.
    pub fn output(line: OutputLine, message: impl Into<String>) -> Self {
        Self::OutputError {
            line,
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

impl From<doorlock_core::Error> for HardwareError {
    fn from(err: doorlock_core::Error) -> Self {
        Self::invalid_data(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("MFRC522");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: MFRC522");
    }

    #[test]
    fn test_card_read_error() {
        let error = HardwareError::card_read("collision");
        assert!(matches!(error, HardwareError::CardReadError { .. }));
        assert_eq!(error.to_string(), "Card read error: collision");
    }

    #[test]
    fn test_output_error_names_line() {
        let error = HardwareError::output(OutputLine::LockRelay, "pin not configured");
        assert_eq!(error.to_string(), "Output lock relay failed: pin not configured");
    }

    #[test]
    fn test_core_error_conversion() {
        let core = doorlock_core::CardUid::new(vec![0x01]).unwrap_err();
        let error: HardwareError = core.into();
        assert!(matches!(error, HardwareError::InvalidData { .. }));
    }
}
