//! Fixed-timestep driver for one body in one level.
//!
//! Each call to [`Simulation::tick`]:
//!
//! 1. Starts a jump if the current input asks for one and the body was
//!    grounded at the end of the previous tick.
//! 2. Integrates velocity (movement, friction from the previous tick's grounded
//!    state, gravity) and then position.
//! 3. Resolves the body against every level platform with the configured
//!    [`ResolveOrder`]. The whole platform list is the candidate set; there is
//!    no broad phase at this level.
//! 4. Derives the grounded state for the next tick per [`GroundingRule`].
//! 5. Checks the goal and advances the tick counter.
//!
//! Nothing in a tick reads the clock, draws random numbers, or iterates a
//! hash map, so the same level, constants, config and input sequence always
//! produce the same body states.
//!
//! # Example
//!
//! ```
//! use hopper_sim::prelude::*;
//!
//! let level = Level {
//!     name: "drop".to_owned(),
//!     spawn: Point { x: 0.0, y: 0.0 },
//!     size: Size::Small,
//!     platforms: vec![Platform::new(-50.0, 60.0, 200.0, 10.0)],
//!     goal: None,
//! };
//! let mut sim = Simulation::new(level, PhysicsConstants::default(), SimConfig::default());
//!
//! for _ in 0..100 {
//!     sim.tick();
//! }
//! assert_eq!(sim.tick_count(), 100);
//! assert_eq!(sim.body().y, 40.0);
//! ```

use std::sync::Arc;

use hopper_physics::prelude::*;
use serde::{Deserialize, Serialize};

use crate::level::Level;

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Which resolver flag marks the body as grounded for the next tick.
///
/// The resolver sets `on_ground` when it pushes a body *below* a platform and
/// `hit_ceiling` when it pushes a body *on top* of one. Which of those the game
/// loop should treat as standing on something has never been settled, so both
/// readings are available.
///
/// Under the default `OnGroundFlag` a body resting on a floor is never
/// grounded, so jump inputs do nothing. Playable runs use `ResolvedAbove`
/// (`{"grounding": "resolved_above"}` in a config file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingRule {
    /// Grounded iff some platform reported `on_ground`.
    #[default]
    OnGroundFlag,
    /// Grounded iff some platform reported `hit_ceiling` (resolved above).
    ResolvedAbove,
}

/// Configuration for the fixed-timestep driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seconds of simulated time per tick. Must be positive and finite.
    pub fixed_dt: f64,
    /// Platform visiting order for multi-platform resolution.
    pub resolve_order: ResolveOrder,
    /// Grounded-state derivation.
    pub grounding: GroundingRule,
}

impl Default for SimConfig {
    /// 60 Hz, ascending-penetration order, literal `on_ground` flag.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            resolve_order: ResolveOrder::default(),
            grounding: GroundingRule::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// InputFrame
// ---------------------------------------------------------------------------

/// Player input for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputFrame {
    /// Held horizontal direction.
    #[serde(default)]
    pub direction: Direction,
    /// Jump requested. Only takes effect while grounded.
    #[serde(default)]
    pub jump: bool,
}

impl InputFrame {
    /// No direction held and no jump.
    pub fn is_empty(&self) -> bool {
        self.direction == Direction::None && !self.jump
    }
}

// ---------------------------------------------------------------------------
// TickOutcome
// ---------------------------------------------------------------------------

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// Index of the tick that produced this outcome (0 for the first tick).
    pub tick: u64,
    /// Indices of the level platforms that corrected the body, in order.
    pub contacts: Vec<usize>,
    /// Some platform reported `on_ground`.
    pub on_ground: bool,
    /// Some platform reported `hit_ceiling`.
    pub hit_ceiling: bool,
    /// Grounded state carried into the next tick.
    pub grounded: bool,
    /// A jump was started this tick.
    pub jumped: bool,
    /// The body overlapped the goal for the first time this tick.
    pub reached_goal: bool,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// The deterministic fixed-timestep simulation of one body in one level.
///
/// Physics constants are shared read-only behind an [`Arc`], so any number of
/// simulations can run concurrently off one configuration. Everything mutable
/// is owned by the simulation itself.
pub struct Simulation {
    level: Level,
    constants: Arc<PhysicsConstants>,
    config: SimConfig,
    body: Body,
    /// Number of ticks executed so far.
    tick_counter: u64,
    /// Input applied by the next tick. Persists until replaced.
    current_input: InputFrame,
    /// Tick count at which the goal was first reached.
    goal_tick: Option<u64>,
    last_outcome: Option<TickOutcome>,
}

impl Simulation {
    /// Create a simulation with the body at the level's spawn point.
    ///
    /// The level and constants are assumed already validated
    /// ([`Level::validate`], [`PhysicsConstants::validate`]).
    ///
    /// # Panics
    ///
    /// Panics if `config.fixed_dt` is not positive and finite.
    pub fn new(
        level: Level,
        constants: impl Into<Arc<PhysicsConstants>>,
        config: SimConfig,
    ) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        let body = level.spawn_body();
        Self {
            level,
            constants: constants.into(),
            config,
            body,
            tick_counter: 0,
            current_input: InputFrame::default(),
            goal_tick: None,
            last_outcome: None,
        }
    }

    /// Execute one simulation tick with the current input.
    pub fn tick(&mut self) -> TickOutcome {
        let tick = self.tick_counter;
        let input = self.current_input;
        let was_grounded = self.body.on_ground;

        let jumped = input.jump && was_grounded;
        if jumped {
            self.body.vy = self.constants.jump_velocity();
        }

        integrate_velocity(&self.constants, &mut self.body, input.direction);
        integrate_position(&mut self.body);

        let contacts = resolve_all(&self.body, &self.level.platforms, self.config.resolve_order);
        self.body = contacts.body;

        let grounded = match self.config.grounding {
            GroundingRule::OnGroundFlag => contacts.on_ground,
            GroundingRule::ResolvedAbove => contacts.resolved_above(),
        };
        if grounded != was_grounded {
            tracing::debug!(tick, grounded, y = self.body.y, "grounded state changed");
        }
        self.body.on_ground = grounded;

        let reached_goal = self.goal_tick.is_none()
            && self
                .level
                .goal
                .as_ref()
                .is_some_and(|goal| check_collision(&self.body, goal));

        self.tick_counter += 1;
        if reached_goal {
            self.goal_tick = Some(self.tick_counter);
            tracing::debug!(
                ticks = self.tick_counter,
                sim_time = self.sim_time(),
                "goal reached"
            );
        }

        tracing::trace!(
            tick,
            x = self.body.x,
            y = self.body.y,
            vx = self.body.vx,
            vy = self.body.vy,
            contacts = contacts.count(),
            "tick"
        );

        let outcome = TickOutcome {
            tick,
            contacts: contacts.resolved,
            on_ground: contacts.on_ground,
            hit_ceiling: contacts.hit_ceiling,
            grounded,
            jumped,
            reached_goal,
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Run `count` ticks with the current input. Returns the total number of
    /// platform contacts resolved.
    pub fn run_ticks(&mut self, count: u64) -> u64 {
        let mut total_contacts = 0u64;
        for _ in 0..count {
            total_contacts += self.tick().contacts.len() as u64;
        }
        total_contacts
    }

    /// Run one tick per frame of `script`, stopping early once the goal is
    /// reached. Returns the goal tick count, if reached.
    ///
    /// The last frame's input stays current after the script ends.
    pub fn run_script(&mut self, script: &[InputFrame]) -> Option<u64> {
        for frame in script {
            self.set_input(*frame);
            if self.tick().reached_goal {
                break;
            }
        }
        self.goal_tick
    }

    /// Tick with the current input until the goal is reached or `max_ticks`
    /// ticks have run. Returns the goal tick count, if reached.
    pub fn run_until_goal(&mut self, max_ticks: u64) -> Option<u64> {
        for _ in 0..max_ticks {
            if self.goal_tick.is_some() {
                break;
            }
            self.tick();
        }
        self.goal_tick
    }

    // -- accessors ----------------------------------------------------------

    /// The number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulated seconds elapsed.
    ///
    /// Computed as `tick_count * fixed_dt` so it does not drift with repeated
    /// addition.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.config.fixed_dt
    }

    /// The fixed time step in seconds per tick.
    pub fn fixed_dt(&self) -> f64 {
        self.config.fixed_dt
    }

    /// Current body state.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Replace the body state. Intended for setup and tests.
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn constants(&self) -> &PhysicsConstants {
        &self.constants
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Tick count at which the goal was first reached.
    pub fn goal_tick(&self) -> Option<u64> {
        self.goal_tick
    }

    /// Simulated seconds from spawn to goal, if reached.
    pub fn goal_time(&self) -> Option<f64> {
        self.goal_tick.map(|t| t as f64 * self.config.fixed_dt)
    }

    /// Outcome of the most recent tick.
    pub fn last_outcome(&self) -> Option<&TickOutcome> {
        self.last_outcome.as_ref()
    }

    /// Set the input for subsequent ticks.
    pub fn set_input(&mut self, input: InputFrame) {
        self.current_input = input;
    }

    /// The input the next tick will use.
    pub fn current_input(&self) -> &InputFrame {
        &self.current_input
    }

    /// Put the body back at spawn and clear all progress.
    pub fn reset(&mut self) {
        self.body = self.level.spawn_body();
        self.tick_counter = 0;
        self.current_input = InputFrame::default();
        self.goal_tick = None;
        self.last_outcome = None;
    }

    // -- crate-internal setters used by snapshot restore ----------------------

    pub(crate) fn set_tick_counter(&mut self, tick: u64) {
        self.tick_counter = tick;
    }

    pub(crate) fn set_fixed_dt(&mut self, fixed_dt: f64) {
        assert!(
            fixed_dt > 0.0 && fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {fixed_dt}"
        );
        self.config.fixed_dt = fixed_dt;
    }

    pub(crate) fn set_goal_tick(&mut self, goal_tick: Option<u64>) {
        self.goal_tick = goal_tick;
    }

    pub(crate) fn clear_last_outcome(&mut self) {
        self.last_outcome = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Point;

    fn floor_level() -> Level {
        Level {
            name: "floor".to_owned(),
            spawn: Point { x: 0.0, y: 0.0 },
            size: Size::Default,
            platforms: vec![Platform::new(-1000.0, 100.0, 3000.0, 20.0)],
            goal: None,
        }
    }

    fn sim_with(grounding: GroundingRule) -> Simulation {
        let config = SimConfig {
            grounding,
            ..Default::default()
        };
        Simulation::new(floor_level(), PhysicsConstants::default(), config)
    }

    // -- construction ---------------------------------------------------------

    #[test]
    fn new_simulation_starts_at_spawn() {
        let sim = sim_with(GroundingRule::OnGroundFlag);
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.sim_time(), 0.0);
        assert_eq!(sim.body(), &floor_level().spawn_body());
        assert!(sim.last_outcome().is_none());
        assert!(sim.goal_tick().is_none());
    }

    #[test]
    fn default_config_is_60hz() {
        let config = SimConfig::default();
        assert!((config.fixed_dt - 1.0 / 60.0).abs() < f64::EPSILON);
        assert_eq!(config.resolve_order, ResolveOrder::AscendingPenetration);
        assert_eq!(config.grounding, GroundingRule::OnGroundFlag);
    }

    #[test]
    #[should_panic(expected = "fixed_dt must be positive")]
    fn zero_dt_panics() {
        let config = SimConfig {
            fixed_dt: 0.0,
            ..Default::default()
        };
        let _sim = Simulation::new(floor_level(), PhysicsConstants::default(), config);
    }

    #[test]
    #[should_panic(expected = "fixed_dt must be positive")]
    fn infinite_dt_panics() {
        let config = SimConfig {
            fixed_dt: f64::INFINITY,
            ..Default::default()
        };
        let _sim = Simulation::new(floor_level(), PhysicsConstants::default(), config);
    }

    // -- ticking ----------------------------------------------------------------

    #[test]
    fn first_tick_applies_gravity_then_position() {
        let mut sim = sim_with(GroundingRule::OnGroundFlag);
        let outcome = sim.tick();
        assert_eq!(outcome.tick, 0);
        assert_eq!(sim.body().vy, 0.042);
        assert_eq!(sim.body().y, 0.042);
        assert!(outcome.contacts.is_empty());
    }

    #[test]
    fn tick_advances_counter_and_time() {
        let mut sim = sim_with(GroundingRule::OnGroundFlag);
        sim.run_ticks(30);
        assert_eq!(sim.tick_count(), 30);
        assert!((sim.sim_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn body_lands_and_reports_hit_ceiling() {
        let mut sim = sim_with(GroundingRule::OnGroundFlag);
        let mut landed = None;
        for _ in 0..200 {
            let outcome = sim.tick();
            if outcome.hit_ceiling && landed.is_none() {
                landed = Some(outcome);
            }
        }
        let landed = landed.expect("body should land");
        assert_eq!(landed.contacts, vec![0]);
        assert!(!landed.on_ground);
        assert_eq!(sim.body().y, 60.0);
        assert_eq!(sim.body().vy, 0.0);
    }

    #[test]
    fn literal_grounding_never_grounds_a_resting_body() {
        let mut sim = sim_with(GroundingRule::OnGroundFlag);
        sim.run_ticks(200);
        assert!(!sim.body().on_ground);
        assert!(!sim.last_outcome().unwrap().grounded);
    }

    #[test]
    fn resolved_above_grounding_grounds_a_resting_body() {
        let mut sim = sim_with(GroundingRule::ResolvedAbove);
        sim.run_ticks(200);
        assert!(sim.body().on_ground);
        assert!(sim.last_outcome().unwrap().grounded);
    }

    #[test]
    fn friction_follows_previous_tick_grounding() {
        let mut sim = sim_with(GroundingRule::ResolvedAbove);
        sim.run_ticks(200);
        assert!(sim.body().on_ground);

        let mut body = *sim.body();
        body.vx = 2.0;
        sim.set_body(body);
        sim.tick();
        assert!((sim.body().vx - 2.0 * 0.94).abs() < 1e-12);

        let mut airborne = *sim.body();
        airborne.on_ground = false;
        airborne.vx = 2.0;
        sim.set_body(airborne);
        sim.tick();
        assert!((sim.body().vx - 2.0 * 0.88).abs() < 1e-12);
    }

    #[test]
    fn jump_requires_grounded_state() {
        let mut sim = sim_with(GroundingRule::OnGroundFlag);
        sim.run_ticks(200);
        sim.set_input(InputFrame {
            direction: Direction::None,
            jump: true,
        });
        let outcome = sim.tick();
        assert!(!outcome.jumped, "literal rule never grounds a resting body");

        let mut sim = sim_with(GroundingRule::ResolvedAbove);
        sim.run_ticks(200);
        sim.set_input(InputFrame {
            direction: Direction::None,
            jump: true,
        });
        let outcome = sim.tick();
        assert!(outcome.jumped);
        // -3.70 + gravity, then position integrated upward from 60.
        assert!((sim.body().vy - (-3.70 + 0.042)).abs() < 1e-12);
        assert!(sim.body().y < 60.0);
        assert!(outcome.contacts.is_empty());
    }

    #[test]
    fn input_persists_between_ticks() {
        let mut sim = sim_with(GroundingRule::OnGroundFlag);
        sim.set_input(InputFrame {
            direction: Direction::Right,
            jump: false,
        });
        sim.run_ticks(10);
        assert!(sim.body().x > 0.0);
        assert_eq!(sim.current_input().direction, Direction::Right);
    }

    #[test]
    fn horizontal_speed_never_exceeds_limit() {
        let mut sim = sim_with(GroundingRule::ResolvedAbove);
        sim.set_input(InputFrame {
            direction: Direction::Left,
            jump: true,
        });
        for _ in 0..500 {
            sim.tick();
            assert!(sim.body().vx.abs() <= 3.5);
        }
    }

    #[test]
    fn goal_reached_once() {
        let mut level = floor_level();
        level.goal = Some(Aabb::new(100.0, 0.0, 20.0, 100.0));
        let mut sim = Simulation::new(level, PhysicsConstants::default(), SimConfig::default());
        sim.set_input(InputFrame {
            direction: Direction::Right,
            jump: false,
        });

        let goal_tick = sim.run_until_goal(1_000).expect("goal should be reached");
        assert_eq!(sim.tick_count(), goal_tick);
        assert_eq!(sim.last_outcome().unwrap().tick + 1, goal_tick);
        assert!(sim.last_outcome().unwrap().reached_goal);
        assert_eq!(sim.goal_time(), Some(goal_tick as f64 / 60.0));

        let later = sim.tick();
        assert!(!later.reached_goal, "goal is only reported the first time");
        assert_eq!(sim.goal_tick(), Some(goal_tick));
    }

    #[test]
    fn run_script_stops_at_goal() {
        let mut level = floor_level();
        level.goal = Some(Aabb::new(30.0, 0.0, 20.0, 100.0));
        let mut sim = Simulation::new(level, PhysicsConstants::default(), SimConfig::default());
        let script = vec![
            InputFrame {
                direction: Direction::Right,
                jump: false,
            };
            500
        ];
        let goal_tick = sim.run_script(&script).expect("goal should be reached");
        assert_eq!(sim.tick_count(), goal_tick);
        assert!(goal_tick < 500);
    }

    #[test]
    fn reset_returns_to_spawn() {
        let mut sim = sim_with(GroundingRule::OnGroundFlag);
        sim.set_input(InputFrame {
            direction: Direction::Right,
            jump: false,
        });
        sim.run_ticks(50);
        sim.reset();
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.body(), &floor_level().spawn_body());
        assert!(sim.current_input().is_empty());
    }

    #[test]
    fn identical_runs_are_bitwise_identical() {
        fn run() -> Vec<(u64, u64)> {
            let mut sim = sim_with(GroundingRule::ResolvedAbove);
            let mut trace = Vec::new();
            for i in 0..300u64 {
                sim.set_input(InputFrame {
                    direction: Direction::from_axis((i % 3) as i8 - 1),
                    jump: i % 40 == 0,
                });
                sim.tick();
                trace.push((sim.body().x.to_bits(), sim.body().y.to_bits()));
            }
            trace
        }
        assert_eq!(run(), run());
    }

    #[test]
    fn shared_constants_across_simulations() {
        let constants = Arc::new(PhysicsConstants::default());
        let mut a = Simulation::new(floor_level(), Arc::clone(&constants), SimConfig::default());
        let mut b = Simulation::new(floor_level(), Arc::clone(&constants), SimConfig::default());
        a.run_ticks(10);
        b.run_ticks(10);
        assert_eq!(a.body(), b.body());
        assert_eq!(Arc::strong_count(&constants), 3);
    }
}
