//! Hardware device trait definitions.
//!
//! These traits are the seam between the access controller and the
//! peripherals it drives. The card reader driver (SPI framing, anticollision,
//! card select) lives behind [`CardReader`]; the relay, LEDs and buzzer live
//! behind [`OutputBank`].
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use doorlock_core::CardUid;

use crate::error::Result;
use crate::types::{Level, OutputLine, ReaderInfo};

/// Proximity card reader abstraction.
///
/// Mirrors the three operations the controller needs from a reader driver
/// ("new card present?", "read serial", "halt") plus initialization.
///
/// # Object Safety
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters:
///
/// ```no_run
/// use doorlock_hardware::traits::CardReader;
/// use doorlock_hardware::error::Result;
///
/// async fn scan_once<R: CardReader>(reader: &mut R) -> Result<Option<String>> {
///     if !reader.is_new_card_present().await? {
///         return Ok(None);
///     }
///     let uid = reader.read_identifier().await?;
///     reader.release_card().await?;
///     Ok(uid.map(|uid| uid.to_string()))
/// }
/// ```
pub trait CardReader: Send + Sync {
    /// Bring the reader into a known state.
    ///
    /// Called at startup and again on every hardware reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not respond or rejects its
    /// configuration.
    async fn initialize(&mut self) -> Result<()>;

    /// Check whether a card that has not been halted yet is in the field.
    ///
    /// Returns immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn is_new_card_present(&mut self) -> Result<bool>;

    /// Select the card in the field and read its identifier.
    ///
    /// Returns `Ok(None)` when the card left the field or could not be
    /// selected; callers treat that the same as no card.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn read_identifier(&mut self) -> Result<Option<CardUid>>;

    /// Halt the selected card so it is not reported again until it
    /// re-enters the field.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn release_card(&mut self) -> Result<()>;

    /// Get reader information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// reader information.
    async fn reader_info(&self) -> Result<ReaderInfo>;
}

/// Bank of binary output lines (lock relay, indicators, buzzer).
///
/// Implementations only need to latch the requested level; all timing is
/// done by the caller.
///
/// # Examples
///
/// ```no_run
/// use doorlock_hardware::traits::OutputBank;
/// use doorlock_hardware::types::{Level, OutputLine};
/// use doorlock_hardware::error::Result;
///
/// async fn unlock<O: OutputBank>(outputs: &mut O) -> Result<()> {
///     outputs.set(OutputLine::GreenLed, Level::High).await?;
///     outputs.set(OutputLine::LockRelay, Level::High).await
/// }
/// ```
pub trait OutputBank: Send + Sync {
    /// Configure every line as an output and drive it low.
    ///
    /// # Errors
    ///
    /// Returns an error if any line cannot be configured.
    async fn initialize(&mut self) -> Result<()>;

    /// Drive `line` to `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be driven.
    async fn set(&mut self, line: OutputLine, level: Level) -> Result<()>;

    /// Drive every line low.
    ///
    /// Attempts every line even if one fails and reports the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    async fn all_low(&mut self) -> Result<()> {
        let mut first_error = None;
        for line in OutputLine::ALL {
            if let Err(e) = self.set(line, Level::Low).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
