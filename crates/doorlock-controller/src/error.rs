use doorlock_hardware::HardwareError;

/// Errors surfaced by the controller outside of `poll`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration or state transition.
    #[error(transparent)]
    Core(#[from] doorlock_core::Error),

    /// Reader or output initialization failed.
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

pub type Result<T> = std::result::Result<T, Error>;
