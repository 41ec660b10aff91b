//! Simulation snapshot and restore with BLAKE3 hashing.
//!
//! A [`SimSnapshot`] captures everything that changes while a [`Simulation`]
//! runs: the body, the tick counter, the fixed time step, the current input and
//! the goal tick. The level and physics constants are immutable for the life of
//! a simulation and are not part of the snapshot; replay logs pin them
//! separately.
//!
//! ```
//! use hopper_sim::prelude::*;
//!
//! let level = Level::from_json_str(r#"{"name": "s", "spawn": {"x": 0, "y": 0}}"#).unwrap();
//! let mut sim = Simulation::new(level, PhysicsConstants::default(), SimConfig::default());
//! sim.run_ticks(10);
//!
//! let snapshot = sim.capture_snapshot();
//! assert_eq!(snapshot.tick_counter, 10);
//! assert_eq!(snapshot.hash.len(), 64);
//!
//! sim.run_ticks(10);
//! sim.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(sim.tick_count(), 10);
//! assert_eq!(sim.state_hash(), snapshot.hash);
//! ```

use hopper_physics::body::Body;
use serde::{Deserialize, Serialize};

use crate::hash::StateHasher;
use crate::tick::{InputFrame, Simulation};

/// A serializable snapshot of the mutable simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// Body state at capture time.
    pub body: Body,
    /// Number of ticks executed at capture time.
    pub tick_counter: u64,
    /// Fixed time step in seconds per tick.
    pub fixed_dt: f64,
    /// Input the next tick would have used.
    pub current_input: InputFrame,
    /// Tick count at which the goal was reached, if it was.
    pub goal_tick: Option<u64>,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the fields above.
    pub hash: String,
}

fn compute_hash(
    body: &Body,
    tick_counter: u64,
    fixed_dt: f64,
    input: &InputFrame,
    goal_tick: Option<u64>,
) -> String {
    StateHasher::new("hopper.snapshot.v1")
        .body(body)
        .u64(tick_counter)
        .f64(fixed_dt)
        .input(input)
        .opt_u64(goal_tick)
        .finish()
}

impl SimSnapshot {
    /// Whether the stored hash matches the snapshot's contents.
    pub fn verify(&self) -> bool {
        compute_hash(
            &self.body,
            self.tick_counter,
            self.fixed_dt,
            &self.current_input,
            self.goal_tick,
        ) == self.hash
    }
}

impl Simulation {
    /// Capture the current mutable state.
    pub fn capture_snapshot(&self) -> SimSnapshot {
        let body = *self.body();
        let tick_counter = self.tick_count();
        let fixed_dt = self.fixed_dt();
        let current_input = *self.current_input();
        let goal_tick = self.goal_tick();
        let hash = compute_hash(&body, tick_counter, fixed_dt, &current_input, goal_tick);

        SimSnapshot {
            body,
            tick_counter,
            fixed_dt,
            current_input,
            goal_tick,
            hash,
        }
    }

    /// Restore state from a snapshot.
    ///
    /// The snapshot is checked before anything is touched; on error the
    /// simulation is unchanged. The last tick outcome is cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if `fixed_dt` is not positive and finite, or if the
    /// stored hash does not match the snapshot's contents.
    pub fn restore_from_snapshot(&mut self, snapshot: &SimSnapshot) -> anyhow::Result<()> {
        if !(snapshot.fixed_dt > 0.0 && snapshot.fixed_dt.is_finite()) {
            tracing::warn!(fixed_dt = snapshot.fixed_dt, "rejected snapshot");
            anyhow::bail!(
                "snapshot has invalid fixed_dt: {}. Must be positive and finite.",
                snapshot.fixed_dt
            );
        }

        let expected_hash = compute_hash(
            &snapshot.body,
            snapshot.tick_counter,
            snapshot.fixed_dt,
            &snapshot.current_input,
            snapshot.goal_tick,
        );
        if expected_hash != snapshot.hash {
            tracing::warn!(
                recorded = %snapshot.hash,
                recomputed = %expected_hash,
                "rejected snapshot"
            );
            anyhow::bail!(
                "snapshot hash mismatch: recorded {} but recomputed {}",
                snapshot.hash,
                expected_hash
            );
        }

        self.set_body(snapshot.body);
        self.set_tick_counter(snapshot.tick_counter);
        self.set_fixed_dt(snapshot.fixed_dt);
        self.set_input(snapshot.current_input);
        self.set_goal_tick(snapshot.goal_tick);
        self.clear_last_outcome();
        Ok(())
    }

    /// BLAKE3 hash of the current state, equal to `capture_snapshot().hash`.
    pub fn state_hash(&self) -> String {
        compute_hash(
            self.body(),
            self.tick_count(),
            self.fixed_dt(),
            self.current_input(),
            self.goal_tick(),
        )
    }

    /// Same as [`capture_snapshot`](Self::capture_snapshot), for branching.
    pub fn fork_snapshot(&self) -> SimSnapshot {
        self.capture_snapshot()
    }
}
