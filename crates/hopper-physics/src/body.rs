//! Rectangles, platforms and the moving body.
//!
//! All rectangles use a top-left origin with `y` growing downward. The
//! [`Rect`] trait is the seam every collision and geometry operation is
//! generic over, so callers can pass their own rectangle-shaped types.

use serde::{Deserialize, Serialize};

use crate::integrator::calculate_jump_height;

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// Any axis-aligned rectangle described by its top-left corner and extent.
pub trait Rect {
    /// Left edge.
    fn x(&self) -> f64;
    /// Top edge.
    fn y(&self) -> f64;
    /// Horizontal extent.
    fn width(&self) -> f64;
    /// Vertical extent.
    fn height(&self) -> f64;

    /// Right edge (`x + width`).
    fn right(&self) -> f64 {
        self.x() + self.width()
    }

    /// Bottom edge (`y + height`).
    fn bottom(&self) -> f64 {
        self.y() + self.height()
    }

    /// Finite origin and positive, finite extent.
    fn is_well_formed(&self) -> bool {
        self.x().is_finite()
            && self.y().is_finite()
            && self.width().is_finite()
            && self.height().is_finite()
            && self.width() > 0.0
            && self.height() > 0.0
    }
}

impl<T: Rect + ?Sized> Rect for &T {
    fn x(&self) -> f64 {
        (**self).x()
    }
    fn y(&self) -> f64 {
        (**self).y()
    }
    fn width(&self) -> f64 {
        (**self).width()
    }
    fn height(&self) -> f64 {
        (**self).height()
    }
}

// ---------------------------------------------------------------------------
// Aabb
// ---------------------------------------------------------------------------

/// Plain axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl Rect for Aabb {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
    fn width(&self) -> f64 {
        self.width
    }
    fn height(&self) -> f64 {
        self.height
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// A static obstacle. Owned by level data and never modified by the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Platform(Aabb);

impl Platform {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self(Aabb::new(x, y, width, height))
    }

    /// The platform's rectangle.
    pub fn bounds(&self) -> Aabb {
        self.0
    }
}

impl From<Aabb> for Platform {
    fn from(rect: Aabb) -> Self {
        Self(rect)
    }
}

impl Rect for Platform {
    fn x(&self) -> f64 {
        self.0.x
    }
    fn y(&self) -> f64 {
        self.0.y
    }
    fn width(&self) -> f64 {
        self.0.width
    }
    fn height(&self) -> f64 {
        self.0.height
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// Discrete body size category. Determines the body's square dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    Small,
    #[default]
    Default,
    Large,
}

impl Size {
    /// Edge length in pixels: 20, 40 or 80.
    pub fn pixels(self) -> f64 {
        match self {
            Size::Small => 20.0,
            Size::Default => 40.0,
            Size::Large => 80.0,
        }
    }

    /// Jump height in pixels for a body of this size.
    pub fn jump_height(self) -> f64 {
        calculate_jump_height(self.pixels())
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// The moving entity.
///
/// Snapshots of this value are passed into the core by the owning game loop;
/// the core returns updated values and never stores a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal velocity in pixels per tick.
    pub vx: f64,
    /// Vertical velocity in pixels per tick (positive is down).
    pub vy: f64,
    pub width: f64,
    pub height: f64,
    /// Grounded state carried over from the previous tick's resolution.
    pub on_ground: bool,
}

impl Body {
    /// A body at rest with square dimensions taken from `size`.
    pub fn new(x: f64, y: f64, size: Size) -> Self {
        let edge = size.pixels();
        Self::with_dimensions(x, y, edge, edge)
    }

    /// A body at rest with explicit dimensions.
    pub fn with_dimensions(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            width,
            height,
            on_ground: false,
        }
    }

    /// Builder-style velocity setter.
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    /// The body's current rectangle.
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    /// Rectangle well-formed and both velocity components finite.
    pub fn is_well_formed(&self) -> bool {
        Rect::is_well_formed(self) && self.vx.is_finite() && self.vy.is_finite()
    }
}

impl Rect for Body {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
    fn width(&self) -> f64 {
        self.width
    }
    fn height(&self) -> f64 {
        self.height
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_pixels() {
        assert_eq!(Size::Small.pixels(), 20.0);
        assert_eq!(Size::Default.pixels(), 40.0);
        assert_eq!(Size::Large.pixels(), 80.0);
    }

    #[test]
    fn size_jump_heights() {
        assert_eq!(Size::Small.jump_height(), 82.0);
        assert_eq!(Size::Default.jump_height(), 162.0);
        assert_eq!(Size::Large.jump_height(), 322.0);
    }

    #[test]
    fn body_from_size_is_square_and_at_rest() {
        let b = Body::new(5.0, 6.0, Size::Large);
        assert_eq!((b.width, b.height), (80.0, 80.0));
        assert_eq!((b.vx, b.vy), (0.0, 0.0));
        assert!(!b.on_ground);
    }

    #[test]
    fn rect_edges() {
        let r = Aabb::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
    }

    #[test]
    fn well_formed_checks() {
        assert!(Aabb::new(0.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!Aabb::new(0.0, 0.0, 0.0, 1.0).is_well_formed());
        assert!(!Aabb::new(0.0, 0.0, -1.0, 1.0).is_well_formed());
        assert!(!Aabb::new(f64::NAN, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!Body::new(0.0, 0.0, Size::Small)
            .with_velocity(f64::INFINITY, 0.0)
            .is_well_formed());
    }

    #[test]
    fn platform_serializes_as_plain_rect() {
        let p = Platform::new(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0})
        );
    }

    #[test]
    fn size_serializes_snake_case() {
        let json = serde_json::to_string(&Size::Large).unwrap();
        assert_eq!(json, "\"large\"");
    }
}
