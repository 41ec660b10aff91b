//! Headless runner: simulates a level from an input script, records replay
//! logs and verifies them.
//!
//! ```text
//! hopper-sim <level.json> [--inputs inputs.json] [--constants constants.json]
//!            [--config config.json] [--ticks N] [--record out.json]
//! hopper-sim <level.json> --verify log.json [--constants constants.json]
//! ```
//!
//! The default grounding rule reads the literal `on_ground` flag, which a
//! body resting on a platform never sets, so jumps never fire. For a playable
//! run pass `--config` with `{"grounding": "resolved_above"}`.
//!
//! Set `RUST_LOG=hopper_sim=debug` for grounded-state and goal events.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use hopper_sim::prelude::*;
use serde::Serialize;

const DEFAULT_TICKS: u64 = 600;

#[derive(Debug, Parser)]
#[command(name = "hopper-sim")]
#[command(about = "Headless fixed-step platformer simulation with replay verification")]
#[command(after_help = "Jumps only fire under the default grounding rule if the body is \
flagged on_ground, which resting on a platform never does. Pass --config with \
{\"grounding\": \"resolved_above\"} for playable runs.")]
struct Args {
    /// Level JSON file
    level: PathBuf,

    /// JSON array of input frames, one per tick
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Physics constants JSON; missing fields take defaults
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Simulation config JSON (fixed_dt, grounding, resolve_order)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks to run; defaults to the script length, or 600 without one
    #[arg(long)]
    ticks: Option<u64>,

    /// Write a replay log of the run to this file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Replay and verify a recorded log instead of running a script
    #[arg(long, conflicts_with_all = ["inputs", "record", "ticks"])]
    verify: Option<PathBuf>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {what} file '{}'", path.display()))
}

#[derive(Serialize)]
struct RunSummary<'a> {
    level: &'a str,
    level_hash: String,
    ticks: u64,
    sim_time: f64,
    goal_tick: Option<u64>,
    goal_time: Option<f64>,
    body: &'a Body,
    state_hash: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let level = Level::load(&args.level)?;
    let constants: PhysicsConstants = match &args.constants {
        Some(path) => read_json(path, "constants")?,
        None => PhysicsConstants::default(),
    };
    constants.validate()?;
    let config: SimConfig = match &args.config {
        Some(path) => read_json(path, "config")?,
        None => SimConfig::default(),
    };
    if !(config.fixed_dt > 0.0 && config.fixed_dt.is_finite()) {
        anyhow::bail!("config fixed_dt must be positive and finite, got {}", config.fixed_dt);
    }

    let mut sim = Simulation::new(level, constants, config);

    if let Some(path) = &args.verify {
        let log: ReplayLog = read_json(path, "replay log")?;
        let result = replay(&mut sim, &log)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        if let Some(divergence) = &result.first_divergence {
            anyhow::bail!("replay diverged at tick {}", divergence.tick);
        }
        return Ok(());
    }

    let script: Vec<InputFrame> = match &args.inputs {
        Some(path) => read_json(path, "inputs")?,
        None => Vec::new(),
    };
    // Without a script the body idles for the requested ticks.
    let tick_count = args.ticks.unwrap_or(if script.is_empty() {
        DEFAULT_TICKS
    } else {
        script.len() as u64
    });
    let script: Vec<InputFrame> = (0..tick_count)
        .map(|i| script.get(i as usize).copied().unwrap_or_default())
        .collect();

    tracing::info!(
        level = %sim.level().name,
        ticks = tick_count,
        "running simulation"
    );

    match &args.record {
        Some(path) => {
            let log = record_script(&mut sim, &script, 60);
            let json = serde_json::to_string_pretty(&log)?;
            std::fs::write(path, json)
                .with_context(|| format!("failed to write replay log '{}'", path.display()))?;
            tracing::info!(path = %path.display(), ticks = log.total_ticks, "recorded replay");
        }
        None => {
            for frame in &script {
                sim.set_input(*frame);
                sim.tick();
            }
        }
    }

    let summary = RunSummary {
        level: &sim.level().name,
        level_hash: sim.level().content_hash(),
        ticks: sim.tick_count(),
        sim_time: sim.sim_time(),
        goal_tick: sim.goal_tick(),
        goal_time: sim.goal_time(),
        body: sim.body(),
        state_hash: sim.state_hash(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("hopper-sim").chain(args.iter().copied()))
    }

    #[test]
    fn parses_level_and_flags() {
        let args = parse(&["level.json", "--ticks", "30", "--record", "out.json"]).unwrap();
        assert_eq!(args.level, PathBuf::from("level.json"));
        assert_eq!(args.ticks, Some(30));
        assert_eq!(args.record, Some(PathBuf::from("out.json")));
        assert!(args.verify.is_none());
    }

    #[test]
    fn missing_level_is_error() {
        let err = parse(&["--ticks", "5"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn bad_tick_count_is_error() {
        let err = parse(&["level.json", "--ticks", "many"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("--ticks"));
    }

    #[test]
    fn verify_excludes_record_and_inputs() {
        for other in ["--record", "--inputs"] {
            let err = parse(&["l.json", "--verify", "a.json", other, "b.json"]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict, "{other}");
        }
        let args = parse(&["l.json", "--verify", "a.json", "--constants", "c.json"]).unwrap();
        assert_eq!(args.verify, Some(PathBuf::from("a.json")));
    }

    #[test]
    fn unknown_flag_is_error() {
        let err = parse(&["l.json", "--fast"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn resolved_above_config_enables_playable_runs() {
        let config: SimConfig = serde_json::from_str(r#"{"grounding": "resolved_above"}"#).unwrap();
        assert_eq!(config.grounding, GroundingRule::ResolvedAbove);
        assert_eq!(config.fixed_dt, SimConfig::default().fixed_dt);
    }
}
