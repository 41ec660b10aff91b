//! Kinematic integrator: per-tick velocity updates.
//!
//! One tick applies, in this order:
//!
//! 1. [`apply_movement`](PhysicsConstants::apply_movement) -- input
//!    acceleration with the horizontal speed clamp.
//! 2. [`apply_friction`](PhysicsConstants::apply_friction) -- selected by the
//!    grounded state resolved on the *previous* tick.
//! 3. [`apply_gravity`](PhysicsConstants::apply_gravity) -- unconditionally.
//! 4. Position integration, `x += vx; y += vy` (semi-implicit Euler: velocity
//!    first, then position with the new velocity).
//!
//! [`integrate_velocity`] and [`integrate_position`] bundle those steps for
//! callers that do not interleave other forces.

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::constants::PhysicsConstants;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Horizontal movement input for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    #[default]
    None,
    Right,
}

impl Direction {
    /// -1, 0 or 1.
    pub fn as_f64(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::None => 0.0,
            Direction::Right => 1.0,
        }
    }

    /// Map a raw input axis to a direction by sign.
    pub fn from_axis(axis: i8) -> Self {
        match axis.signum() {
            -1 => Direction::Left,
            1 => Direction::Right,
            _ => Direction::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Scalar operations
// ---------------------------------------------------------------------------

/// Jump height in pixels for a body whose size is `size` pixels.
pub fn calculate_jump_height(size: f64) -> f64 {
    size * 4.0 + 2.0
}

impl PhysicsConstants {
    /// Accelerate `vx` toward `direction` and clamp to `[-max_speed, max_speed]`.
    ///
    /// The clamp applies to the result regardless of how `vx` got there, so an
    /// out-of-range velocity set externally is pulled back in range even with
    /// no input.
    pub fn apply_movement(&self, vx: f64, direction: Direction) -> f64 {
        let vx = vx + direction.as_f64() * self.move_acceleration;
        // NaN passes through unclamped.
        if vx > self.max_speed {
            self.max_speed
        } else if vx < -self.max_speed {
            -self.max_speed
        } else {
            vx
        }
    }

    /// Scale `vx` by ground friction or air resistance.
    pub fn apply_friction(&self, vx: f64, is_on_ground: bool) -> f64 {
        let factor = if is_on_ground {
            self.ground_friction
        } else {
            self.air_resistance
        };
        vx * factor
    }

    /// Add one tick of gravity to `vy`. No terminal velocity.
    pub fn apply_gravity(&self, vy: f64) -> f64 {
        vy + self.gravity
    }

    /// Vertical velocity a jump sets. Negative because `y` grows downward.
    pub fn jump_velocity(&self) -> f64 {
        -self.jump_power
    }
}

// ---------------------------------------------------------------------------
// Body-level steps
// ---------------------------------------------------------------------------

/// Apply movement, friction and gravity to `body`'s velocity.
///
/// Friction is selected by `body.on_ground`, which must still hold the
/// grounded state from the previous tick's collision resolution.
pub fn integrate_velocity(constants: &PhysicsConstants, body: &mut Body, direction: Direction) {
    body.vx = constants.apply_movement(body.vx, direction);
    body.vx = constants.apply_friction(body.vx, body.on_ground);
    body.vy = constants.apply_gravity(body.vy);
}

/// Advance `body`'s position by its current velocity.
pub fn integrate_position(body: &mut Body) {
    body.x += body.vx;
    body.y += body.vy;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
