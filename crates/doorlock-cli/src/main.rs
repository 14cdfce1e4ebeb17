//! doorlock entry point.
//!
//! Runs the access controller against the mock card reader. Output line
//! changes are logged, operator commands are read from stdin, and
//! `--present` feeds scripted card scans into the reader. The process runs
//! until Ctrl-C; closing stdin only stops the console.

mod outputs;

use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use doorlock_controller::{AccessController, PollOutcome};
use doorlock_core::{AccessConfig, CardUid, Clock, SystemClock};
use doorlock_hardware::mock::{MockReader, MockReaderHandle};
use doorlock_hardware::{CardReader, OutputBank};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::outputs::TracingOutputs;

#[derive(Debug, Parser)]
#[command(name = "doorlock")]
#[command(about = "RFID door lock controller", version, long_about = None)]
struct Args {
    /// JSON access configuration (allow-list and timing)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Poll period in milliseconds
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    /// Card UID to present to the reader, in hex. Repeat for several scans.
    #[arg(long = "present", value_name = "UID")]
    present: Vec<CardUid>,

    /// Interval between scripted card presentations in milliseconds
    #[arg(long, default_value_t = 1500)]
    present_every_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    info!("doorlock v{} starting", doorlock_core::VERSION);

    let config = load_config(args.config.as_deref())?;
    let (reader, cards) = MockReader::new();
    let mut controller =
        AccessController::new(reader, TracingOutputs::new(), SystemClock::new(), config)
            .context("invalid access configuration")?;
    controller
        .initialize()
        .await
        .context("hardware initialization failed")?;

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let timing = LoopTiming {
        tick: period(args.tick_ms),
        present_every: period(args.present_every_ms),
    };

    run(
        &mut controller,
        &cards,
        args.present.into(),
        lines,
        tokio::signal::ctrl_c(),
        timing,
    )
    .await
}

/// Poll and scripted-presentation periods.
#[derive(Debug, Clone, Copy)]
struct LoopTiming {
    tick: Duration,
    present_every: Duration,
}

/// Drive the controller until `shutdown` resolves, then release the outputs.
///
/// End of `lines` disables the console; polling and scripted presentations
/// continue.
async fn run<R, O, C, L>(
    controller: &mut AccessController<R, O, C>,
    cards: &MockReaderHandle,
    mut script: VecDeque<CardUid>,
    mut lines: Lines<L>,
    shutdown: impl Future<Output = std::io::Result<()>>,
    timing: LoopTiming,
) -> Result<()>
where
    R: CardReader,
    O: OutputBank,
    C: Clock,
    L: AsyncBufRead + Unpin,
{
    let mut ticker = tokio::time::interval(timing.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut presenter = tokio::time::interval(timing.present_every);
    let mut console_open = true;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let PollOutcome::Completed { sequence } = controller.poll().await {
                    debug!("{} sequence completed", sequence);
                }
            }
            _ = presenter.tick(), if !script.is_empty() => {
                if let Some(uid) = script.pop_front() {
                    debug!("Presenting card {}", uid);
                    cards.present_card(uid).await.context("mock reader closed")?;
                }
            }
            line = lines.next_line(), if console_open => {
                match line.context("failed to read stdin")? {
                    Some(line) => {
                        if let Some(response) = controller.handle_line(&line).await {
                            println!("{response}");
                        }
                    }
                    None => {
                        info!("stdin closed, console disabled; press Ctrl-C to stop");
                        console_open = false;
                    }
                }
            }
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                info!("Interrupt received, shutting down");
                break;
            }
        }
    }

    controller
        .shutdown()
        .await
        .context("failed to release outputs")?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// Read the access configuration, or fall back to the compiled-in defaults.
fn load_config(path: Option<&Path>) -> Result<AccessConfig> {
    let Some(path) = path else {
        info!("No config file given, using built-in allow-list and timing");
        return Ok(AccessConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: AccessConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Tokio intervals panic on a zero period.
fn period(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlock_core::ManualClock;
    use doorlock_hardware::mock::MockOutputs;
    use doorlock_hardware::{Level, OutputLine};

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["doorlock"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.tick_ms, 10);
        assert!(args.present.is_empty());
        assert_eq!(args.present_every_ms, 1500);
    }

    #[test]
    fn test_args_repeated_present() {
        let args = Args::try_parse_from([
            "doorlock",
            "--present",
            "12345678",
            "--present",
            "00:00:00:00",
            "--tick-ms",
            "5",
        ])
        .unwrap();

        let expected: Vec<CardUid> = vec!["12345678".parse().unwrap(), "00000000".parse().unwrap()];
        assert_eq!(args.present, expected);
        assert_eq!(args.tick_ms, 5);
    }

    #[test]
    fn test_args_reject_bad_uid() {
        assert!(Args::try_parse_from(["doorlock", "--present", "12ZZ"]).is_err());
        assert!(Args::try_parse_from(["doorlock", "--present", "1234"]).is_err());
    }

    #[test]
    fn test_load_config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), AccessConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("doorlock-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "allow_list": ["DE AD BE EF"], "unlock_duration_ms": 5000 }"#)
            .unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.unlock_duration_ms, 5000);
        assert_eq!(config.allow_list.len(), 1);
        assert_eq!(config.pulse_ms, AccessConfig::default().pulse_ms);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/doorlock.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_keeps_polling_after_stdin_closes() {
        let (reader, cards) = MockReader::new();
        let mut controller =
            AccessController::new(reader, MockOutputs::new(), ManualClock::new(), AccessConfig::default())
                .unwrap();
        controller.initialize().await.unwrap();

        let script = VecDeque::from(vec!["12345678".parse::<CardUid>().unwrap()]);
        let shutdown = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), std::io::Error>(())
        };
        let timing = LoopTiming {
            tick: Duration::from_millis(10),
            present_every: Duration::from_millis(100),
        };

        let started = tokio::time::Instant::now();
        run(&mut controller, &cards, script, tokio::io::empty().lines(), shutdown, timing)
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(controller.status().granted, 1);
        assert_eq!(
            controller.outputs().history_for(OutputLine::GreenLed),
            vec![Level::High, Level::Low]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_answers_console_then_stops_on_shutdown() {
        let (reader, cards) = MockReader::new();
        let mut controller =
            AccessController::new(reader, MockOutputs::new(), ManualClock::new(), AccessConfig::default())
                .unwrap();
        controller.initialize().await.unwrap();

        let input: &[u8] = b"HELP\nRESET\n";
        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<(), std::io::Error>(())
        };
        let timing = LoopTiming {
            tick: Duration::from_millis(10),
            present_every: Duration::from_millis(100),
        };

        run(&mut controller, &cards, VecDeque::new(), input.lines(), shutdown, timing)
            .await
            .unwrap();

        // RESET reinitialized the reader once more
        assert_eq!(cards.init_count(), 2);
        for line in OutputLine::ALL {
            assert!(!controller.outputs().is_high(line));
        }
    }

    #[test]
    fn test_period_never_zero() {
        assert_eq!(period(0), Duration::from_millis(1));
        assert_eq!(period(25), Duration::from_millis(25));
    }
}
