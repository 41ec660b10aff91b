//! Hopper Sim -- deterministic fixed-step driver for the Hopper platformer.
//!
//! This crate builds on [`hopper_physics`] to provide the game-loop side of a
//! tick: it owns one body and a [`Level`](level::Level), feeds player input
//! through the integrator, resolves the body against the level's platforms,
//! and carries the grounded state into the next tick. On top of that it offers
//! BLAKE3-hashed snapshots and input recording with replay verification, so a
//! run can be re-simulated bit-for-bit and its elapsed simulated time checked.
//!
//! # Quick Start
//!
//! ```
//! use hopper_sim::prelude::*;
//!
//! let level = Level::from_json_str(r#"{
//!     "name": "flat",
//!     "spawn": {"x": 0.0, "y": 0.0},
//!     "platforms": [{"x": -100.0, "y": 100.0, "width": 400.0, "height": 20.0}]
//! }"#).unwrap();
//!
//! let mut sim = Simulation::new(level, PhysicsConstants::default(), SimConfig::default());
//! sim.set_input(InputFrame { direction: Direction::Right, jump: false });
//! sim.run_ticks(120);
//!
//! assert_eq!(sim.tick_count(), 120);
//! assert_eq!(sim.body().y, 60.0); // resting on the floor
//! ```

#![deny(unsafe_code)]

mod hash;
pub mod level;
pub mod replay;
pub mod snapshot;
pub mod tick;

/// Re-export the physics crate for convenience.
pub use hopper_physics;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use hopper_physics::prelude::*;

    pub use crate::level::{Level, LevelError, Point};
    pub use crate::replay::{
        record_script, replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder,
        ReplayResult,
    };
    pub use crate::snapshot::SimSnapshot;
    pub use crate::tick::{GroundingRule, InputFrame, SimConfig, Simulation, TickOutcome};
}
