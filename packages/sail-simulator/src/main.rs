//! main.rs — Race training simulator entry point
//!
//! Loads a scenario (file or built-in preset), wires the chosen log sink and
//! drives the session on the simulation clock until the run length is
//! reached, every boat has finished, a batch fails, or Ctrl-C.

use std::io;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use sail_simulator::{
    scenarios, ClockConfig, ClockStatus, JsonLinesSink, LogSink, MajorOnly, Scenario, Simulation,
    SimulationClock, TracingSink,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sail-sim", about = "Dinghy racing tactics and manoeuvre simulator")]
struct Args {
    /// Scenario file path
    #[arg(short, long, default_value = "scenario.toml")]
    scenario: String,
    /// Run a built-in preset instead (windward-leeward, oscillating, tidal-gradient)
    #[arg(short, long)]
    preset: Option<String>,
    /// Simulated time over wall-clock time (overrides the scenario)
    #[arg(long)]
    speedup: Option<f64>,
    /// Simulated seconds to run (overrides the scenario)
    #[arg(long)]
    seconds: Option<u64>,
    /// Write events to stdout as JSON lines
    #[arg(long)]
    json: bool,
    /// Only flow shifts, MAJOR turns and roundings
    #[arg(long)]
    major_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to --json
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sail_simulator=info".into()),
        )
        .init();

    let args = Args::parse();

    let scenario = match &args.preset {
        Some(name) => scenarios::preset(name)?,
        None => load_scenario(&args.scenario)?,
    };
    let seconds = args.seconds.unwrap_or(scenario.settings.run_seconds);
    let mut config = ClockConfig::from_settings(&scenario.settings);
    if let Some(speedup) = args.speedup {
        config = config.with_speedup(speedup);
    }

    info!(
        "⛵ Sail simulator starting — '{}', {} boats, {} marks, {seconds}s at {}×",
        scenario.name,
        scenario.boats.len(),
        scenario.course.leg_count(),
        config.speedup
    );

    let mut clock = SimulationClock::new(Simulation::new(scenario, sink(&args)), config)?;
    let session = clock.session();
    let mut elapsed = clock.elapsed();
    let mut status = clock.status();
    clock.start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut failure = None;

    loop {
        tokio::select! {
            changed = elapsed.changed() => {
                if changed.is_err() {
                    break;
                }
                let t = *elapsed.borrow_and_update();
                if t >= seconds {
                    info!("⏱ Reached t={t}");
                    break;
                }
                if session.read().await.all_finished() {
                    info!("🏁 All boats finished at t={t}");
                    break;
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                if let ClockStatus::Failed(message) = &*status.borrow_and_update() {
                    failure = Some(message.clone());
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }
    clock.stop().await;

    if let Some(message) = failure {
        bail!("simulation failed: {message}");
    }

    let session = session.read().await;
    for boat in session.boats() {
        info!("  {} at {} heading {} on leg {}", boat.name, boat.location, boat.heading, boat.leg);
    }
    Ok(())
}

fn load_scenario(path: &str) -> anyhow::Result<Scenario> {
    match std::fs::read_to_string(path) {
        Ok(text) => Scenario::from_toml(&text).with_context(|| format!("invalid scenario {path}")),
        Err(_) => {
            info!("📋 No {path}, using the bundled scenario");
            Scenario::from_toml(include_str!("../scenario.toml")).context("invalid bundled scenario")
        }
    }
}

fn sink(args: &Args) -> Box<dyn LogSink> {
    match (args.json, args.major_only) {
        (true, true) => Box::new(MajorOnly(JsonLinesSink::new(io::stdout()))),
        (true, false) => Box::new(JsonLinesSink::new(io::stdout())),
        (false, true) => Box::new(MajorOnly(TracingSink)),
        (false, false) => Box::new(TracingSink),
    }
}
