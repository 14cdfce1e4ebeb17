//! Hardware device abstraction layer for the door lock controller.
//!
//! This crate provides trait-based abstractions for the peripherals of a
//! single-door access point: the proximity card reader and the bank of
//! binary outputs (lock relay, green and red indicators, buzzer). The traits
//! allow swapping the mock implementations used in tests and emulation for
//! real drivers.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations use native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return `Result<T>` with detailed error
//!   information.
//! - **Timing-free**: Devices only latch levels and report cards. Pulse and
//!   hold timing belongs to the controller.
//!
//! # Card Reader
//!
//! ```no_run
//! use doorlock_hardware::traits::CardReader;
//! use doorlock_hardware::error::Result;
//!
//! async fn poll_once<R: CardReader>(reader: &mut R) -> Result<()> {
//!     if reader.is_new_card_present().await? {
//!         if let Some(uid) = reader.read_identifier().await? {
//!             println!("card {uid}");
//!         }
//!         reader.release_card().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Outputs
//!
//! ```no_run
//! use doorlock_hardware::traits::OutputBank;
//! use doorlock_hardware::types::{Level, OutputLine};
//! use doorlock_hardware::error::Result;
//!
//! async fn lock<O: OutputBank>(outputs: &mut O) -> Result<()> {
//!     outputs.set(OutputLine::LockRelay, Level::Low).await
//! }
//! ```
//!
//! # Mock Implementations
//!
//! [`mock::MockReader`] is fed through a [`mock::MockReaderHandle`];
//! [`mock::MockOutputs`] records every level change for assertions.

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{CardReader, OutputBank};
pub use types::{Level, OutputLine, ReaderInfo};
