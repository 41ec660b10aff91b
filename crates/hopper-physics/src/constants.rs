//! Fixed physics configuration.
//!
//! [`PhysicsConstants`] is constructed once (usually via [`Default`] or from a
//! JSON config file), validated, and then shared read-only by every
//! simulation. Units are pixels and ticks: velocities are pixels per tick and
//! accelerations pixels per tick squared. The y axis points down, so positive
//! gravity pulls bodies toward larger `y`.

use serde::{Deserialize, Serialize};

use crate::PhysicsError;

/// Downward acceleration applied every tick.
pub const GRAVITY: f64 = 0.042;
/// Horizontal acceleration applied per tick of held input.
pub const MOVE_ACCELERATION: f64 = 0.28;
/// Base upward impulse of a jump.
pub const JUMP_POWER: f64 = 3.70;
/// Horizontal speed limit enforced by [`PhysicsConstants::apply_movement`].
pub const MAX_SPEED: f64 = 3.5;
/// Horizontal velocity multiplier while grounded.
pub const GROUND_FRICTION: f64 = 0.94;
/// Horizontal velocity multiplier while airborne.
pub const AIR_RESISTANCE: f64 = 0.88;

/// Immutable physics configuration shared by all simulations.
///
/// There is intentionally no vertical speed limit: gravity accumulates without
/// bound and a fast enough body can pass through a thin platform between
/// ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConstants {
    /// Added to `vy` every tick.
    pub gravity: f64,
    /// Added to `vx` per unit of input direction.
    pub move_acceleration: f64,
    /// Magnitude of the upward velocity a jump sets.
    pub jump_power: f64,
    /// Clamp bound for `|vx|` after movement.
    pub max_speed: f64,
    /// `vx` multiplier when the body was grounded on the previous tick.
    pub ground_friction: f64,
    /// `vx` multiplier when the body was airborne on the previous tick.
    pub air_resistance: f64,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            move_acceleration: MOVE_ACCELERATION,
            jump_power: JUMP_POWER,
            max_speed: MAX_SPEED,
            ground_friction: GROUND_FRICTION,
            air_resistance: AIR_RESISTANCE,
        }
    }
}

impl PhysicsConstants {
    /// Check that every constant is usable.
    ///
    /// Gravity may have either sign. Speed limits and accelerations must be
    /// non-negative (`max_speed` strictly positive) and friction coefficients
    /// must lie in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns the first offending constant as a [`PhysicsError`].
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let fields = [
            ("gravity", self.gravity),
            ("move_acceleration", self.move_acceleration),
            ("jump_power", self.jump_power),
            ("max_speed", self.max_speed),
            ("ground_friction", self.ground_friction),
            ("air_resistance", self.air_resistance),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PhysicsError::NonFinite { name, value });
            }
        }

        if self.max_speed <= 0.0 {
            return Err(PhysicsError::OutOfRange {
                name: "max_speed",
                expected: "positive",
                value: self.max_speed,
            });
        }
        for (name, value) in [
            ("move_acceleration", self.move_acceleration),
            ("jump_power", self.jump_power),
        ] {
            if value < 0.0 {
                return Err(PhysicsError::OutOfRange {
                    name,
                    expected: "non-negative",
                    value,
                });
            }
        }
        for (name, value) in [
            ("ground_friction", self.ground_friction),
            ("air_resistance", self.air_resistance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PhysicsError::OutOfRange {
                    name,
                    expected: "within [0, 1]",
                    value,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let c = PhysicsConstants::default();
        assert_eq!(c.gravity, 0.042);
        assert_eq!(c.move_acceleration, 0.28);
        assert_eq!(c.jump_power, 3.70);
        assert_eq!(c.max_speed, 3.5);
        assert_eq!(c.ground_friction, 0.94);
        assert_eq!(c.air_resistance, 0.88);
    }

    #[test]
    fn defaults_validate() {
        assert!(PhysicsConstants::default().validate().is_ok());
    }

    #[test]
    fn nan_constant_rejected() {
        let c = PhysicsConstants {
            gravity: f64::NAN,
            ..Default::default()
        };
        let err = c.validate().unwrap_err();
        assert!(matches!(err, PhysicsError::NonFinite { name: "gravity", .. }));
    }

    #[test]
    fn zero_max_speed_rejected() {
        let c = PhysicsConstants {
            max_speed: 0.0,
            ..Default::default()
        };
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("max_speed"));
    }

    #[test]
    fn friction_above_one_rejected() {
        let c = PhysicsConstants {
            air_resistance: 1.2,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(PhysicsError::OutOfRange {
                name: "air_resistance",
                ..
            })
        ));
    }

    #[test]
    fn negative_gravity_allowed() {
        let c = PhysicsConstants {
            gravity: -0.042,
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: PhysicsConstants = serde_json::from_str(r#"{"gravity": 0.1}"#).unwrap();
        assert_eq!(c.gravity, 0.1);
        assert_eq!(c.max_speed, MAX_SPEED);
    }
}
