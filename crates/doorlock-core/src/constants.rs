//! Compiled-in defaults for the door lock controller.
//!
//! These values reproduce the timing of the reference installation: a
//! three-second unlock window, 200 ms buzzer pulses and a one-second
//! debounce between processed scans. They seed [`AccessConfig::default`],
//! which is what actually reaches the controller, so tests and deployments
//! can override any of them without recompiling.
//!
//! # Timeline
//!
//! With the defaults, a granted scan produces:
//!
//! ```text
//! t=0      green on, red off, buzzer on
//! t=200    buzzer off
//! t=300    buzzer on
//! t=500    buzzer off, relay on
//! t=3500   relay off, green off
//! ```
//!
//! and a denied scan:
//!
//! ```text
//! t=0      red on, green off, buzzer on
//! t=200    buzzer off
//! t=500    buzzer on
//! t=700    buzzer off
//! t=1000   buzzer on
//! t=1200   buzzer off
//! t=2500   red off
//! ```
//!
//! [`AccessConfig::default`]: crate::config::AccessConfig

// ============================================================================
// Card Identifiers
// ============================================================================

/// Minimum UID length in bytes (ISO 14443 single size UID).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum UID length in bytes (ISO 14443 triple size UID).
pub const MAX_UID_LENGTH: usize = 10;

/// Identifiers authorized out of the box.
///
/// Placeholders for the cards of the reference installation. Replace them
/// through [`AccessConfig`](crate::config::AccessConfig) for a real door.
pub const DEFAULT_ALLOW_LIST: [[u8; 4]; 3] = [
    [0x12, 0x34, 0x56, 0x78],
    [0xAB, 0xCD, 0xEF, 0x01],
    [0x23, 0x45, 0x67, 0x89],
];

// ============================================================================
// Timing (milliseconds)
// ============================================================================

/// How long the lock relay stays active after a granted scan.
pub const DEFAULT_UNLOCK_DURATION_MS: u64 = 3000;

/// Length of a single buzzer pulse.
pub const DEFAULT_PULSE_MS: u64 = 200;

/// Minimum time between two processed scans.
///
/// # Examples
///
/// ```
/// use doorlock_core::constants::DEFAULT_DEBOUNCE_MS;
/// use std::time::Duration;
///
/// let debounce = Duration::from_millis(DEFAULT_DEBOUNCE_MS);
/// assert_eq!(debounce.as_secs(), 1);
/// ```
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Pause between the two pulses of the grant pattern.
pub const DEFAULT_GRANT_PULSE_GAP_MS: u64 = 100;

/// Pause after each pulse of the deny pattern.
pub const DEFAULT_DENY_PULSE_GAP_MS: u64 = 300;

/// How long the red indicator stays lit after the deny pulses.
pub const DEFAULT_DENY_HOLD_MS: u64 = 1000;

// ============================================================================
// Patterns
// ============================================================================

/// Number of buzzer pulses emitted when access is granted.
pub const GRANT_PULSE_COUNT: usize = 2;

/// Number of buzzer pulses emitted when access is denied.
pub const DENY_PULSE_COUNT: usize = 3;
