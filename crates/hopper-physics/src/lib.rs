//! Hopper Physics -- deterministic fixed-step kinematics and AABB collision
//! resolution for a 2D platformer.
//!
//! The crate is the narrow-phase core of the Hopper platformer. It advances a
//! moving rectangular [`Body`](body::Body) under gravity, input-driven
//! acceleration and friction, then pushes it out of static axis-aligned
//! [`Platform`](body::Platform)s along the axis of least penetration.
//!
//! Every operation is a pure function of its arguments and an immutable
//! [`PhysicsConstants`](constants::PhysicsConstants) value. Nothing here holds
//! state between calls, performs I/O, or selects candidate platforms (broad
//! phase is the caller's concern).
//!
//! # Quick Start
//!
//! ```
//! use hopper_physics::prelude::*;
//!
//! let constants = PhysicsConstants::default();
//! let mut body = Body::new(0.0, 90.0, Size::Default);
//! body.vy = 1.0;
//!
//! let floor = Platform::new(0.0, 100.0, 200.0, 20.0);
//! let res = resolve_collision(&body, &floor);
//! assert_eq!(res.y, 60.0);
//! assert_eq!(res.vy, 0.0);
//! assert!(res.hit_ceiling);
//!
//! // One integrator step never exceeds the horizontal speed limit.
//! let vx = constants.apply_movement(3.4, Direction::Right);
//! assert_eq!(vx, constants.max_speed);
//! ```
//!
//! # Determinism
//!
//! Given identical constants, an identical ordered input sequence and the same
//! floating-point evaluation order, results are bit-for-bit reproducible. No
//! operation uses randomness, wall-clock time, or hash-map iteration order.
//!
//! # Preconditions
//!
//! All coordinates and velocities are assumed finite and all dimensions
//! positive. Violations are not rejected: NaN propagates arithmetically. Use
//! [`Body::is_well_formed`](body::Body::is_well_formed) and
//! [`Rect::is_well_formed`](body::Rect::is_well_formed) to validate at the
//! boundary before calling in.

#![deny(unsafe_code)]

pub mod body;
pub mod collision;
pub mod constants;
pub mod geometry;
pub mod integrator;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced when validating physics configuration.
///
/// The simulation operations themselves never fail; this type only covers
/// rejecting a [`PhysicsConstants`](constants::PhysicsConstants) value before
/// it is shared with a simulation.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// A constant was NaN or infinite.
    #[error("physics constant '{name}' must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    /// A constant was outside its permitted range.
    #[error("physics constant '{name}' must be {expected}, got {value}")]
    OutOfRange {
        name: &'static str,
        expected: &'static str,
        value: f64,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::body::{Aabb, Body, Platform, Rect, Size};
    pub use crate::collision::{
        check_collision, overlap, resolve_all, resolve_collision, Axis, Contacts, Overlap,
        ResolveOrder, Resolution,
    };
    pub use crate::constants::PhysicsConstants;
    pub use crate::geometry::{distance, point_in_rect};
    pub use crate::integrator::{
        calculate_jump_height, integrate_position, integrate_velocity, Direction,
    };
    pub use crate::PhysicsError;
}
