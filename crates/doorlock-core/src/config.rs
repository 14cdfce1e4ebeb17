//! Controller configuration.
//!
//! [`AccessConfig`] carries everything that used to be a compiled-in
//! constant: the allow-list and every timing parameter. It is built once and
//! handed to the controller, which never mutates it.
//!
//! # Examples
//!
//! ```
//! use doorlock_core::{AccessConfig, AllowList};
//! use std::time::Duration;
//!
//! let config = AccessConfig::builder()
//!     .with_allow_list(AllowList::new(vec!["04A1B2C3".parse().unwrap()]))
//!     .with_unlock_duration(Duration::from_secs(5))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.unlock_duration(), Duration::from_secs(5));
//! assert_eq!(config.debounce_interval(), Duration::from_millis(1000));
//! ```
//!
//! The same structure deserializes from JSON, with every field optional:
//!
//! ```
//! use doorlock_core::AccessConfig;
//!
//! let config: AccessConfig = serde_json::from_str(r#"{
//!     "allow_list": ["12 34 56 78", "04:A1:B2:C3:D4:E5:F6"],
//!     "unlock_duration_ms": 5000
//! }"#).unwrap();
//!
//! assert_eq!(config.allow_list.len(), 2);
//! assert_eq!(config.pulse_ms, 200);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::allow_list::AllowList;
use crate::constants::{
    DEFAULT_ALLOW_LIST, DEFAULT_DEBOUNCE_MS, DEFAULT_DENY_HOLD_MS, DEFAULT_DENY_PULSE_GAP_MS,
    DEFAULT_GRANT_PULSE_GAP_MS, DEFAULT_PULSE_MS, DEFAULT_UNLOCK_DURATION_MS, DENY_PULSE_COUNT,
    GRANT_PULSE_COUNT,
};
use crate::error::Error;
use crate::types::CardUid;
use crate::Result;

/// Allow-list and timing parameters for the access controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Authorized identifiers, in priority order.
    pub allow_list: AllowList,

    /// Lock relay active time after a granted scan.
    pub unlock_duration_ms: u64,

    /// Length of one buzzer pulse.
    pub pulse_ms: u64,

    /// Minimum time between two processed scans.
    pub debounce_ms: u64,

    /// Pause between the grant pulses.
    pub grant_pulse_gap_ms: u64,

    /// Pause after each deny pulse.
    pub deny_pulse_gap_ms: u64,

    /// Red indicator hold time after the deny pulses.
    pub deny_hold_ms: u64,
}

impl AccessConfig {
    /// Create a builder seeded with the default values.
    pub fn builder() -> AccessConfigBuilder {
        AccessConfigBuilder::default()
    }

    /// Check the parameters for values the controller cannot work with.
    ///
    /// # Errors
    /// Returns `Error::Config` if the pulse length or unlock duration is zero,
    /// or if a grant or deny sequence would be longer than `u64::MAX` ms.
    pub fn validate(&self) -> Result<()> {
        if self.pulse_ms == 0 {
            return Err(Error::Config("pulse_ms must be greater than zero".into()));
        }
        if self.unlock_duration_ms == 0 {
            return Err(Error::Config(
                "unlock_duration_ms must be greater than zero".into(),
            ));
        }
        if self.grant_total_ms().is_none() {
            return Err(Error::Config("grant sequence timing overflows".into()));
        }
        if self.deny_total_ms().is_none() {
            return Err(Error::Config("deny sequence timing overflows".into()));
        }
        Ok(())
    }

    /// Pulses, the gaps between them, then the unlock hold.
    fn grant_total_ms(&self) -> Option<u64> {
        let count = GRANT_PULSE_COUNT as u64;
        let pulses = self.pulse_ms.checked_mul(count)?;
        let gaps = self.grant_pulse_gap_ms.checked_mul(count.saturating_sub(1))?;
        pulses.checked_add(gaps)?.checked_add(self.unlock_duration_ms)
    }

    /// Pulses each followed by a gap, then the red hold.
    fn deny_total_ms(&self) -> Option<u64> {
        let count = DENY_PULSE_COUNT as u64;
        let cycle = self.pulse_ms.checked_add(self.deny_pulse_gap_ms)?;
        cycle.checked_mul(count)?.checked_add(self.deny_hold_ms)
    }

    pub fn unlock_duration(&self) -> Duration {
        Duration::from_millis(self.unlock_duration_ms)
    }

    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn grant_pulse_gap(&self) -> Duration {
        Duration::from_millis(self.grant_pulse_gap_ms)
    }

    pub fn deny_pulse_gap(&self) -> Duration {
        Duration::from_millis(self.deny_pulse_gap_ms)
    }

    pub fn deny_hold(&self) -> Duration {
        Duration::from_millis(self.deny_hold_ms)
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        let allow_list = DEFAULT_ALLOW_LIST
            .iter()
            .filter_map(|bytes| CardUid::new(bytes.to_vec()).ok())
            .collect();

        Self {
            allow_list,
            unlock_duration_ms: DEFAULT_UNLOCK_DURATION_MS,
            pulse_ms: DEFAULT_PULSE_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            grant_pulse_gap_ms: DEFAULT_GRANT_PULSE_GAP_MS,
            deny_pulse_gap_ms: DEFAULT_DENY_PULSE_GAP_MS,
            deny_hold_ms: DEFAULT_DENY_HOLD_MS,
        }
    }
}

/// Builder for [`AccessConfig`].
///
/// Unset fields keep their defaults. [`build`](Self::build) validates the
/// result.
#[derive(Debug, Default)]
pub struct AccessConfigBuilder {
    config: AccessConfig,
}

impl AccessConfigBuilder {
    /// Replace the allow-list.
    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.config.allow_list = allow_list;
        self
    }

    pub fn with_unlock_duration(mut self, duration: Duration) -> Self {
        self.config.unlock_duration_ms = millis(duration);
        self
    }

    pub fn with_pulse(mut self, duration: Duration) -> Self {
        self.config.pulse_ms = millis(duration);
        self
    }

    pub fn with_debounce_interval(mut self, duration: Duration) -> Self {
        self.config.debounce_ms = millis(duration);
        self
    }

    pub fn with_grant_pulse_gap(mut self, duration: Duration) -> Self {
        self.config.grant_pulse_gap_ms = millis(duration);
        self
    }

    pub fn with_deny_pulse_gap(mut self, duration: Duration) -> Self {
        self.config.deny_pulse_gap_ms = millis(duration);
        self
    }

    pub fn with_deny_hold(mut self, duration: Duration) -> Self {
        self.config.deny_hold_ms = millis(duration);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if validation fails.
    pub fn build(self) -> Result<AccessConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_installation() {
        let config = AccessConfig::default();

        assert_eq!(config.allow_list.len(), 3);
        assert_eq!(config.unlock_duration(), Duration::from_secs(3));
        assert_eq!(config.pulse(), Duration::from_millis(200));
        assert_eq!(config.debounce_interval(), Duration::from_secs(1));
        assert_eq!(config.grant_pulse_gap(), Duration::from_millis(100));
        assert_eq!(config.deny_pulse_gap(), Duration::from_millis(300));
        assert_eq!(config.deny_hold(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = AccessConfig::builder()
            .with_allow_list(AllowList::new(vec!["01020304".parse().unwrap()]))
            .with_unlock_duration(Duration::from_millis(1500))
            .with_pulse(Duration::from_millis(50))
            .with_debounce_interval(Duration::ZERO)
            .with_grant_pulse_gap(Duration::from_millis(10))
            .with_deny_pulse_gap(Duration::from_millis(20))
            .with_deny_hold(Duration::from_millis(30))
            .build()
            .unwrap();

        assert_eq!(config.allow_list.len(), 1);
        assert_eq!(config.unlock_duration_ms, 1500);
        assert_eq!(config.pulse_ms, 50);
        assert_eq!(config.debounce_ms, 0);
        assert_eq!(config.grant_pulse_gap_ms, 10);
        assert_eq!(config.deny_pulse_gap_ms, 20);
        assert_eq!(config.deny_hold_ms, 30);
    }

    #[test]
    fn test_zero_pulse_rejected() {
        let err = AccessConfig::builder()
            .with_pulse(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_unlock_rejected() {
        let result = AccessConfig::builder()
            .with_unlock_duration(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_sequence_overflow_rejected() {
        let config = AccessConfig {
            unlock_duration_ms: u64::MAX,
            ..AccessConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: grant sequence timing overflows");

        let config = AccessConfig {
            deny_hold_ms: u64::MAX - 1,
            ..AccessConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: deny sequence timing overflows");
    }

    #[test]
    fn test_long_but_representable_timing_accepted() {
        let config = AccessConfig {
            unlock_duration_ms: u64::MAX / 2,
            ..AccessConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AccessConfig = serde_json::from_str(r#"{"debounce_ms": 250}"#).unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.allow_list, AccessConfig::default().allow_list);
    }

    #[test]
    fn test_json_with_bad_uid_fails() {
        let result = serde_json::from_str::<AccessConfig>(r#"{"allow_list": ["1234"]}"#);
        assert!(result.is_err());
    }
}
