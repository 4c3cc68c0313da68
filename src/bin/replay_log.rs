//! Headless log replay
//!
//! Replays an instrument run log against the labware model and prints the
//! final deck state.

use clap::Parser;
use labware_replay::labware::LabwareState;
use labware_replay::labware::state::TIP_USED;
use labware_replay::protocol::WellCoord;
use labware_replay::{ReplayConfig, SimulationSession, TickOutcome};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "replay_log")]
#[command(about = "Replay an instrument run log and print the resulting labware state")]
#[command(version)]
struct Args {
    /// Run log to replay
    log_path: PathBuf,

    /// Print the final deck as JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// Apply one step per interval instead of all at once
    #[arg(long)]
    realtime: bool,

    /// Delay between steps in milliseconds (clamped to the configured range)
    #[arg(long)]
    interval: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let text = std::fs::read_to_string(&args.log_path).map_err(|source| ReplayError::Read {
        path: args.log_path.clone(),
        source,
    })?;

    let (config, _) = ReplayConfig::load_or_default();
    let mut session = SimulationSession::new(config);
    if let Some(ms) = args.interval {
        session.set_interval(ms);
    }

    session.run(&text, Instant::now());

    if args.realtime {
        // Drive the session the way the UI does, sleeping between ticks
        while let Some(wait) = session.next_wakeup(Instant::now()) {
            std::thread::sleep(wait);
            if let Some(TickOutcome::Stepped(report)) = session.poll(Instant::now()) {
                let (applied, total) = session.progress();
                eprintln!("[{}/{}] {}", applied, total, report.command);
            }
        }
    } else {
        session.run_to_end();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.store().snapshot())?);
    } else {
        print_summary(&session);
    }

    Ok(())
}

fn print_summary(session: &SimulationSession) {
    let (applied, total) = session.progress();
    println!(
        "Replayed {} / {} steps ({} lines ignored)",
        applied,
        total,
        session.skipped_lines()
    );

    for (key, state) in session.store().iter() {
        println!("\nSlot {} - {}", key.slot, key.kind);
        match state {
            LabwareState::Reservoir(columns) => {
                for (i, volume) in columns.iter().enumerate() {
                    println!("  A{:<3} {:>10.1} uL", i + 1, volume);
                }
            }
            LabwareState::WellPlate(wells) => {
                for (row, line) in wells.iter().enumerate() {
                    for (col, volume) in line.iter().enumerate() {
                        if *volume > 0.0 {
                            println!("  {:<4} {:>10.1} uL", WellCoord::new(row, col).label(), volume);
                        }
                    }
                }
            }
            LabwareState::TipRack(tips) => {
                let total: usize = tips.iter().map(Vec::len).sum();
                let used = tips.iter().flatten().filter(|flag| **flag == TIP_USED).count();
                println!("  {} tips used, {} available", used, total - used);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["replay_log", "run.log"]).unwrap();
        assert_eq!(args.log_path, PathBuf::from("run.log"));
        assert!(!args.json);
        assert!(!args.realtime);
        assert_eq!(args.interval, None);
    }

    #[test]
    fn test_args_flags() {
        let args = Args::try_parse_from([
            "replay_log",
            "--json",
            "--interval",
            "250",
            "run.log",
            "--realtime",
        ])
        .unwrap();
        assert!(args.json);
        assert!(args.realtime);
        assert_eq!(args.interval, Some(250));
    }

    #[test]
    fn test_args_rejected() {
        assert!(Args::try_parse_from(["replay_log"]).is_err());
        assert!(Args::try_parse_from(["replay_log", "run.log", "--interval", "fast"]).is_err());
        assert!(Args::try_parse_from(["replay_log", "run.log", "--loop"]).is_err());
    }
}
