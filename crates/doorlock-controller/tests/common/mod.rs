//! Shared test rig for controller integration tests.

#![allow(dead_code)]

use std::time::Duration;

use doorlock_controller::{AccessController, PollOutcome};
use doorlock_core::{AccessConfig, AllowList, CardUid, ManualClock};
use doorlock_hardware::mock::{MockOutputs, MockReader, MockReaderHandle};

pub type TestController = AccessController<MockReader, MockOutputs, ManualClock>;

/// Controller wired to mock devices and a manual clock.
pub struct Rig {
    pub controller: TestController,
    pub cards: MockReaderHandle,
    pub clock: ManualClock,
}

impl Rig {
    /// Build and initialize a controller with `config`.
    pub async fn new(config: AccessConfig) -> Self {
        let (reader, cards) = MockReader::new();
        let clock = ManualClock::new();
        let mut controller =
            AccessController::new(reader, MockOutputs::new(), clock.clone(), config)
                .expect("valid config");
        controller.initialize().await.expect("mock hardware initializes");
        controller.outputs_mut().clear_history();

        Self {
            controller,
            cards,
            clock,
        }
    }

    /// Rig with the default timing and the given allow-list.
    pub async fn with_allow_list(entries: &[&str]) -> Self {
        let allow_list: AllowList = entries.iter().map(|s| uid(s)).collect();
        let config = AccessConfig::builder()
            .with_allow_list(allow_list)
            .build()
            .expect("valid config");
        Self::new(config).await
    }

    pub async fn present(&self, card: &str) {
        self.cards.present_card(uid(card)).await.expect("reader alive");
    }

    pub async fn poll(&mut self) -> PollOutcome {
        self.controller.poll().await
    }

    /// Advance the clock by `ms` and poll once.
    pub async fn tick(&mut self, ms: u64) -> PollOutcome {
        self.clock.advance_ms(ms);
        self.controller.poll().await
    }

    /// Tick in `step_ms` increments until a sequence completes.
    ///
    /// Panics if nothing completes within `limit_ms`.
    pub async fn run_until_idle(&mut self, step_ms: u64, limit_ms: u64) -> Duration {
        let start = self.clock_now();
        while self.clock_now() - start <= Duration::from_millis(limit_ms) {
            if let PollOutcome::Completed { .. } = self.tick(step_ms).await {
                return self.clock_now() - start;
            }
        }
        panic!("sequence did not complete within {limit_ms}ms");
    }

    pub fn clock_now(&self) -> Duration {
        use doorlock_core::Clock;
        self.clock.now()
    }

    pub fn outputs(&self) -> &MockOutputs {
        self.controller.outputs()
    }
}

pub fn uid(s: &str) -> CardUid {
    s.parse().expect("valid test UID")
}

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}
