//! Mock card reader implementation for testing and development.
//!
//! This module provides a simulated proximity card reader that can be
//! controlled programmatically without requiring physical hardware.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use doorlock_core::CardUid;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::{HardwareError, Result, traits::CardReader, types::ReaderInfo};

/// Mock card reader for testing and development.
///
/// Cards are queued through the paired [`MockReaderHandle`]. Each queued card
/// is reported as present until it is read, after which the next queued card
/// (if any) becomes visible.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockReader;
/// use doorlock_hardware::traits::CardReader;
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut reader, handle) = MockReader::new();
///
///     handle.present_card("12345678".parse().unwrap()).await?;
///
///     assert!(reader.is_new_card_present().await?);
///     let uid = reader.read_identifier().await?.unwrap();
///     assert_eq!(uid.to_string(), "12 34 56 78");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockReader {
    /// Channel receiver for card events
    event_rx: mpsc::Receiver<CardEvent>,

    /// Event currently in the field, not yet read
    pending: Option<CardEvent>,

    /// Device name
    name: String,

    /// State shared with the handle
    shared: Arc<SharedState>,
}

impl MockReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockReader, MockReaderHandle) where the handle
    /// can be used to simulate card presentations.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_name("Mock MFRC522".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let shared = Arc::new(SharedState::default());

        let reader = Self {
            event_rx,
            pending: None,
            name: name.clone(),
            shared: Arc::clone(&shared),
        };

        let handle = MockReaderHandle {
            event_tx,
            name,
            shared,
        };

        (reader, handle)
    }
}

impl Default for MockReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl CardReader for MockReader {
    async fn initialize(&mut self) -> Result<()> {
        if self.shared.fail_init.load(Ordering::SeqCst) {
            return Err(HardwareError::initialization_failed(format!(
                "{} did not respond",
                self.name
            )));
        }
        self.shared.initializations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn is_new_card_present(&mut self) -> Result<bool> {
        if self.pending.is_none() {
            match self.event_rx.try_recv() {
                Ok(event) => self.pending = Some(event),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    return Err(HardwareError::disconnected("card event channel closed"));
                }
            }
        }
        Ok(self.pending.is_some())
    }

    async fn read_identifier(&mut self) -> Result<Option<CardUid>> {
        match self.pending.take() {
            Some(CardEvent::Presented(uid)) => Ok(Some(uid)),
            Some(CardEvent::Unreadable) | None => Ok(None),
            Some(CardEvent::ReadError(message)) => Err(HardwareError::card_read(message)),
        }
    }

    async fn release_card(&mut self) -> Result<()> {
        self.shared.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reader_info(&self) -> Result<ReaderInfo> {
        Ok(
            ReaderInfo::new(self.name.clone(), vec!["ISO14443A".to_string()])
                .with_firmware_version("v2.0 (mock)"),
        )
    }
}

/// Internal event type for the mock reader.
#[derive(Debug, Clone)]
enum CardEvent {
    /// A readable card entered the field.
    Presented(CardUid),

    /// A card was detected but left before it could be selected.
    Unreadable,

    /// The driver reported an error while reading.
    ReadError(String),
}

#[derive(Debug, Default)]
struct SharedState {
    initializations: AtomicUsize,
    releases: AtomicUsize,
    fail_init: AtomicBool,
}

/// Handle for controlling a mock card reader.
///
/// Clones feed the same reader.
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    /// Channel sender for card events
    event_tx: mpsc::Sender<CardEvent>,

    /// Device name
    name: String,

    /// State shared with the reader
    shared: Arc<SharedState>,
}

impl MockReaderHandle {
    /// Queue a readable card.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_card(&self, uid: CardUid) -> Result<()> {
        self.send(CardEvent::Presented(uid)).await
    }

    /// Queue a card from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid UID or the reader has
    /// been dropped.
    pub async fn present_bytes(&self, bytes: &[u8]) -> Result<()> {
        let uid = CardUid::try_from(bytes)?;
        self.present_card(uid).await
    }

    /// Queue a card that is detected but cannot be read.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_unreadable(&self) -> Result<()> {
        self.send(CardEvent::Unreadable).await
    }

    /// Queue a card whose read fails with a driver error.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_read_error(&self, message: impl Into<String>) -> Result<()> {
        self.send(CardEvent::ReadError(message.into())).await
    }

    /// Make subsequent `initialize` calls fail (or succeed again).
    pub fn set_init_failure(&self, fail: bool) {
        self.shared.fail_init.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `initialize` calls.
    pub fn init_count(&self) -> usize {
        self.shared.initializations.load(Ordering::SeqCst)
    }

    /// Number of `release_card` calls.
    pub fn release_count(&self) -> usize {
        self.shared.releases.load(Ordering::SeqCst)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, event: CardEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("card event channel closed"))
    }
}
