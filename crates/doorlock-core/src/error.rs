use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identifier errors
    #[error("Card UID must be {min}-{max} bytes, got {len}")]
    InvalidUidLength { len: usize, min: usize, max: usize },

    #[error("Invalid card UID format: {0}")]
    InvalidUidFormat(String),

    // State machine errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
