mod common;

use common::{Rig, ms};
use doorlock_controller::console::{HELP_BLOCK, STATUS_BLOCK};
use doorlock_controller::{AccessState, Command, PollOutcome};
use doorlock_core::{AccessConfig, AllowList};
use doorlock_hardware::OutputLine;
use rstest::rstest;

#[rstest]
#[case("STATUS", &STATUS_BLOCK[..])]
#[case("HELP", &HELP_BLOCK[..])]
#[case("  HELP\r\n", &HELP_BLOCK[..])]
#[tokio::test]
async fn test_informational_commands(#[case] input: &str, #[case] expected: &[&str]) {
    let mut rig = Rig::with_allow_list(&["12345678"]).await;

    let response = rig.controller.handle_line(input).await.unwrap();
    assert_eq!(response.lines(), expected);

    assert_eq!(rig.controller.state(), AccessState::Idle);
    assert!(rig.outputs().history().is_empty());
    assert_eq!(rig.cards.init_count(), 1);
}

#[rstest]
#[case("status")]
#[case("reset")]
#[case("")]
#[case("OPEN")]
#[case("RESET now")]
#[tokio::test]
async fn test_unrecognized_input_is_ignored(#[case] input: &str) {
    let mut rig = Rig::with_allow_list(&["12345678"]).await;

    assert_eq!(rig.controller.handle_line(input).await, None);
    assert_eq!(rig.cards.init_count(), 1);
}

#[tokio::test]
async fn test_reset_reinitializes_hardware() {
    let mut rig = Rig::with_allow_list(&["12345678"]).await;

    let response = rig.controller.handle_line("RESET").await.unwrap();
    assert_eq!(
        response.lines(),
        [
            "System reset initiated...",
            "System initialized successfully!",
            "Ready to scan RFID cards...",
        ]
    );
    assert_eq!(rig.cards.init_count(), 2);
    assert_eq!(rig.outputs().init_count(), 2);
}

#[tokio::test]
async fn test_reset_failure_is_reported() {
    let mut rig = Rig::with_allow_list(&["12345678"]).await;
    rig.cards.set_init_failure(true);

    let response = rig.controller.execute(Command::Reset).await;
    assert_eq!(
        response.to_string(),
        "System reset initiated...\n\
         System reset failed: Initialization failed: Mock MFRC522 did not respond"
    );

    // The loop keeps running after a failed reset
    rig.cards.set_init_failure(false);
    rig.present("12345678").await;
    assert!(matches!(rig.tick(10).await, PollOutcome::Decided { .. }));
}

#[tokio::test]
async fn test_reset_aborts_running_unlock() {
    let mut rig = Rig::with_allow_list(&["12345678"]).await;
    rig.present("12345678").await;
    rig.poll().await;
    rig.tick(1000).await;
    assert!(rig.outputs().is_high(OutputLine::LockRelay));

    rig.controller.handle_line("RESET").await.unwrap();

    assert_eq!(rig.controller.state(), AccessState::Idle);
    for line in OutputLine::ALL {
        assert!(!rig.outputs().is_high(line), "{line} left high after reset");
    }

    // Later polls must not resume the aborted sequence
    assert_eq!(rig.tick(5000).await, PollOutcome::NoCard);
    assert!(!rig.outputs().is_high(OutputLine::LockRelay));
}

#[tokio::test]
async fn test_reset_keeps_debounce_state() {
    let config = AccessConfig::builder()
        .with_allow_list(AllowList::new(Vec::new()))
        .with_pulse(ms(10))
        .with_deny_pulse_gap(ms(0))
        .with_deny_hold(ms(0))
        .build()
        .unwrap();
    let mut rig = Rig::new(config).await;

    rig.present("00000000").await;
    rig.poll().await;
    rig.run_until_idle(10, 1000).await;

    rig.controller.handle_line("RESET").await.unwrap();
    assert_eq!(rig.controller.session().last_read, Some(ms(0)));

    rig.present("11111111").await;
    assert_eq!(rig.tick(10).await, PollOutcome::Debounced);
}

#[tokio::test]
async fn test_reset_session_clears_debounce() {
    let mut rig = Rig::with_allow_list(&["12345678"]).await;
    rig.present("00000000").await;
    rig.poll().await;
    rig.run_until_idle(100, 10_000).await;

    rig.controller.set_active(false);
    rig.controller.reset_session();

    assert!(rig.controller.is_active());
    assert_eq!(rig.controller.session().last_read, None);
}

#[tokio::test]
async fn test_reset_with_stuck_relay_blocks_card_processing() {
    let mut rig = Rig::with_allow_list(&["12345678"]).await;
    rig.controller
        .outputs_mut()
        .fail_line(Some(OutputLine::LockRelay));

    let response = rig.controller.execute(Command::Reset).await;
    assert_eq!(
        response.lines().last().map(String::as_str),
        Some("System reset failed: Output lock relay failed: simulated fault")
    );
    assert!(rig.controller.status().lock_fault);

    rig.present("12345678").await;
    assert_eq!(rig.tick(10).await, PollOutcome::LockFault);

    rig.controller.outputs_mut().fail_line(None);
    assert!(matches!(rig.tick(10).await, PollOutcome::Decided { .. }));
    assert!(!rig.controller.status().lock_fault);
}
