//! Input recording and deterministic replay verification.
//!
//! A [`ReplayLog`] pins the level, physics constants and resolver settings a
//! run was recorded against, holds the snapshot the run started from, and
//! lists the non-empty inputs plus periodic state-hash checkpoints. The state
//! after the last tick is always hashed as well, so edits past the last
//! interval checkpoint are caught. [`replay`] re-simulates the log and reports
//! the first checkpoint whose hash differs, along with the simulated time and
//! goal tick the re-simulation produced. Those figures are what a run
//! validator compares against a claimed completion time.
//!
//! ```
//! use hopper_sim::prelude::*;
//!
//! let level = Level::from_json_str(r#"{
//!     "name": "replay",
//!     "spawn": {"x": 0, "y": 0},
//!     "platforms": [{"x": -100, "y": 100, "width": 400, "height": 20}],
//!     "goal": {"x": 120, "y": 0, "width": 20, "height": 100}
//! }"#).unwrap();
//! let constants = PhysicsConstants::default();
//!
//! let right = InputFrame { direction: Direction::Right, jump: false };
//! let mut recording = Simulation::new(level.clone(), constants, SimConfig::default());
//! let log = record_script(&mut recording, &vec![right; 120], 10);
//!
//! let mut verifier = Simulation::new(level, constants, SimConfig::default());
//! let result = replay(&mut verifier, &log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! assert_eq!(result.goal_tick, recording.goal_tick());
//! ```

use std::collections::BTreeMap;

use hopper_physics::collision::ResolveOrder;
use hopper_physics::constants::PhysicsConstants;
use serde::{Deserialize, Serialize};

use crate::snapshot::SimSnapshot;
use crate::tick::{GroundingRule, InputFrame, Simulation};

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// A recorded run: starting snapshot, pinned level, constants and resolver
/// settings, and the ordered inputs and checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Replay begins by restoring this snapshot.
    pub initial_snapshot: SimSnapshot,
    /// Name of the level the run was recorded on. Informational.
    pub level_name: String,
    /// [`Level::content_hash`](crate::level::Level::content_hash) of that level.
    pub level_hash: String,
    /// Physics constants in force during recording.
    pub constants: PhysicsConstants,
    /// Platform visiting order in force during recording.
    pub resolve_order: ResolveOrder,
    /// Grounding rule in force during recording.
    pub grounding: GroundingRule,
    /// Number of ticks recorded. Replay executes exactly this many.
    pub total_ticks: u64,
    /// Inputs and checkpoints in recording order.
    pub entries: Vec<ReplayEntry>,
    /// State hash after the last recorded tick.
    pub final_hash: String,
}

/// One entry of a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// A non-empty input active during `tick`.
    Input { tick: u64, input: InputFrame },
    /// State hash taken after the tick's input was set and before it ran.
    Checkpoint { tick: u64, state_hash: String },
}

/// Outcome of replaying a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// All recorded ticks ran without a checkpoint mismatch.
    pub completed: bool,
    /// Ticks executed before completion or divergence.
    pub ticks_replayed: u64,
    /// Simulated seconds elapsed when the replay stopped.
    pub sim_time: f64,
    /// Tick count at which the goal was first reached during replay.
    pub goal_tick: Option<u64>,
    /// The first checkpoint that did not match, if any.
    pub first_divergence: Option<ReplayDivergence>,
}

/// A checkpoint whose replayed hash differs from the recorded one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub tick: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Builds a [`ReplayLog`] tick by tick.
///
/// Call [`record_tick`](Self::record_tick) after setting the tick's input and
/// before running the tick, then [`finish`](Self::finish) once the last tick
/// has run to seal the log with the final state hash.
pub struct ReplayRecorder {
    log: ReplayLog,
    checkpoint_interval: u64,
    ticks_recorded: u64,
    last_tick: Option<u64>,
}

impl ReplayRecorder {
    /// Start recording from the simulation's current state.
    ///
    /// With `checkpoint_interval` N > 0, checkpoints land on ticks divisible by
    /// N. With 0, every tick that is given a hash gets a checkpoint.
    pub fn new(sim: &Simulation, checkpoint_interval: u64) -> Self {
        Self {
            log: ReplayLog {
                initial_snapshot: sim.capture_snapshot(),
                level_name: sim.level().name.clone(),
                level_hash: sim.level().content_hash(),
                constants: *sim.constants(),
                resolve_order: sim.config().resolve_order,
                grounding: sim.config().grounding,
                total_ticks: 0,
                entries: Vec::new(),
                final_hash: String::new(),
            },
            checkpoint_interval,
            ticks_recorded: 0,
            last_tick: None,
        }
    }

    /// Whether a hash supplied for `tick` would be recorded as a checkpoint.
    pub fn wants_checkpoint(&self, tick: u64) -> bool {
        self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0
    }

    /// Record one tick.
    ///
    /// # Panics
    ///
    /// Panics if `tick` is not strictly greater than the previous call's.
    pub fn record_tick(&mut self, tick: u64, input: &InputFrame, state_hash: Option<String>) {
        if let Some(prev) = self.last_tick {
            assert!(
                tick > prev,
                "ReplayRecorder::record_tick: tick {tick} is not strictly greater \
                 than previous tick {prev}"
            );
        }
        self.last_tick = Some(tick);
        self.ticks_recorded += 1;

        if !input.is_empty() {
            self.log.entries.push(ReplayEntry::Input {
                tick,
                input: *input,
            });
        }

        if let Some(hash) = state_hash {
            if self.wants_checkpoint(tick) {
                self.log.entries.push(ReplayEntry::Checkpoint {
                    tick,
                    state_hash: hash,
                });
            }
        }
    }

    /// Take the log, sealing it with the state hash of `sim` after the last
    /// recorded tick.
    pub fn finish(mut self, sim: &Simulation) -> ReplayLog {
        self.log.total_ticks = self.ticks_recorded;
        self.log.final_hash = sim.state_hash();
        self.log
    }
}

/// Run `script` on `sim` from its current state, one frame per tick,
/// recording every tick.
///
/// The whole script is recorded even after the goal is reached.
pub fn record_script(
    sim: &mut Simulation,
    script: &[InputFrame],
    checkpoint_interval: u64,
) -> ReplayLog {
    let mut recorder = ReplayRecorder::new(sim, checkpoint_interval);
    for frame in script {
        sim.set_input(*frame);
        let tick = sim.tick_count();
        let hash = recorder.wants_checkpoint(tick).then(|| sim.state_hash());
        recorder.record_tick(tick, frame, hash);
        sim.tick();
    }
    recorder.finish(sim)
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `sim`, verifying every checkpoint.
///
/// For each tick the recorded input (or an empty one) is set, the checkpoint
/// for that tick is compared, and then the tick runs. After the last tick the
/// final state is compared against [`ReplayLog::final_hash`], reported as a
/// divergence at the end tick. Replay stops at the first mismatch.
///
/// # Errors
///
/// Returns an error, leaving `sim` untouched, if the log was recorded on a
/// different level, with different constants or with a different resolve
/// order or grounding rule, contains duplicate entries,
/// overflows the tick range, or carries an invalid initial snapshot.
pub fn replay(sim: &mut Simulation, log: &ReplayLog) -> anyhow::Result<ReplayResult> {
    let level_hash = sim.level().content_hash();
    if level_hash != log.level_hash {
        anyhow::bail!(
            "replay log was recorded on level '{}' ({}) but simulation has '{}' ({})",
            log.level_name,
            log.level_hash,
            sim.level().name,
            level_hash
        );
    }
    if sim.constants() != &log.constants {
        anyhow::bail!("replay log was recorded with different physics constants");
    }
    let config = sim.config();
    if config.resolve_order != log.resolve_order || config.grounding != log.grounding {
        anyhow::bail!(
            "replay log was recorded with resolve order {:?} and grounding {:?} \
             but simulation uses {:?} and {:?}",
            log.resolve_order,
            log.grounding,
            config.resolve_order,
            config.grounding
        );
    }

    let mut input_map: BTreeMap<u64, InputFrame> = BTreeMap::new();
    let mut checkpoint_map: BTreeMap<u64, &str> = BTreeMap::new();
    for entry in &log.entries {
        match entry {
            ReplayEntry::Input { tick, input } => {
                if input_map.insert(*tick, *input).is_some() {
                    anyhow::bail!("replay log contains duplicate Input entry at tick {tick}");
                }
            }
            ReplayEntry::Checkpoint { tick, state_hash } => {
                if checkpoint_map.insert(*tick, state_hash).is_some() {
                    anyhow::bail!(
                        "replay log contains duplicate Checkpoint entry at tick {tick}"
                    );
                }
            }
        }
    }

    let start_tick = log.initial_snapshot.tick_counter;
    let total_ticks = log.total_ticks;
    let end_tick = start_tick.checked_add(total_ticks).ok_or_else(|| {
        anyhow::anyhow!(
            "tick range overflow: start_tick ({start_tick}) + total_ticks ({total_ticks}) \
             exceeds u64::MAX"
        )
    })?;

    sim.restore_from_snapshot(&log.initial_snapshot)
        .map_err(|e| anyhow::anyhow!("failed to restore initial snapshot for replay: {e}"))?;

    let mut ticks_replayed = 0u64;
    for tick in start_tick..end_tick {
        sim.set_input(input_map.get(&tick).copied().unwrap_or_default());

        if let Some(&expected_hash) = checkpoint_map.get(&tick) {
            let actual_hash = sim.state_hash();
            if actual_hash != expected_hash {
                tracing::warn!(
                    tick,
                    expected = expected_hash,
                    actual = %actual_hash,
                    "replay diverged"
                );
                return Ok(ReplayResult {
                    completed: false,
                    ticks_replayed,
                    sim_time: sim.sim_time(),
                    goal_tick: sim.goal_tick(),
                    first_divergence: Some(ReplayDivergence {
                        tick,
                        expected_hash: expected_hash.to_owned(),
                        actual_hash,
                    }),
                });
            }
        }

        sim.tick();
        ticks_replayed += 1;
    }

    let actual_hash = sim.state_hash();
    if actual_hash != log.final_hash {
        tracing::warn!(
            tick = end_tick,
            expected = %log.final_hash,
            actual = %actual_hash,
            "replay final state diverged"
        );
        return Ok(ReplayResult {
            completed: false,
            ticks_replayed,
            sim_time: sim.sim_time(),
            goal_tick: sim.goal_tick(),
            first_divergence: Some(ReplayDivergence {
                tick: end_tick,
                expected_hash: log.final_hash.clone(),
                actual_hash,
            }),
        });
    }

    Ok(ReplayResult {
        completed: true,
        ticks_replayed,
        sim_time: sim.sim_time(),
        goal_tick: sim.goal_tick(),
        first_divergence: None,
    })
}
