//! AABB overlap test and minimal-penetration collision resolution.
//!
//! [`resolve_collision`] handles one (body, platform) pair: if the two
//! rectangles overlap, the body is pushed out along the axis with the smaller
//! penetration depth and the velocity component on that axis is zeroed.
//! Exact ties resolve vertically. The push places the body flush against the
//! platform edge, so no residual penetration remains on the resolved axis.
//!
//! # Vertical flags
//!
//! The vertical branch reports its outcome through two flags whose names are
//! kept as the game loop has always consumed them:
//!
//! - `hit_ceiling` is set when `body.y < platform.y`. The body is placed
//!   *above* the platform, i.e. geometrically it landed on the top surface.
//! - `on_ground` is set when `body.y >= platform.y`. The body is placed
//!   *below* the platform, i.e. geometrically it bumped the underside.
//!
//! Callers that want names matching the geometry should use
//! [`Resolution::resolved_above`] and [`Resolution::resolved_below`].
//!
//! # Several platforms
//!
//! [`resolve_all`] resolves a body against a list of candidates sequentially,
//! feeding each corrected state into the next call. The result depends on the
//! order, which is chosen explicitly with [`ResolveOrder`].

use serde::{Deserialize, Serialize};

use crate::body::{Body, Rect};

// ---------------------------------------------------------------------------
// Overlap test
// ---------------------------------------------------------------------------

/// Whether two rectangles overlap on both axes.
///
/// All four comparisons are strict: rectangles that only share an edge do not
/// collide, and a zero-width or zero-height rectangle never collides with
/// anything.
pub fn check_collision(a: &impl Rect, b: &impl Rect) -> bool {
    a.x() < b.x() + b.width()
        && a.x() + a.width() > b.x()
        && a.y() < b.y() + b.height()
        && a.y() + a.height() > b.y()
}

/// Resolution axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Penetration depth of a body into a platform on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub x: f64,
    pub y: f64,
}

impl Overlap {
    /// The axis a resolution would push along: horizontal only when strictly
    /// shallower, otherwise vertical.
    pub fn axis(&self) -> Axis {
        if self.x < self.y {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// Depth along the resolution axis.
    pub fn depth(&self) -> f64 {
        match self.axis() {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// Penetration depths of `body` into `platform`, or `None` if they do not
/// collide.
pub fn overlap(body: &impl Rect, platform: &impl Rect) -> Option<Overlap> {
    if !check_collision(body, platform) {
        return None;
    }
    let x =
        (body.x() + body.width() - platform.x()).min(platform.x() + platform.width() - body.x());
    let y =
        (body.y() + body.height() - platform.y()).min(platform.y() + platform.height() - body.y());
    Some(Overlap { x, y })
}

// ---------------------------------------------------------------------------
// Single-platform resolution
// ---------------------------------------------------------------------------

/// Corrected body state after resolving against one platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Vertical resolution pushed the body below the platform.
    pub on_ground: bool,
    /// Vertical resolution pushed the body above the platform.
    pub hit_ceiling: bool,
    /// Axis that was resolved, `None` if nothing collided.
    pub axis: Option<Axis>,
}

impl Resolution {
    fn unchanged(body: &Body) -> Self {
        Self {
            x: body.x,
            y: body.y,
            vx: body.vx,
            vy: body.vy,
            on_ground: false,
            hit_ceiling: false,
            axis: None,
        }
    }

    /// Whether any correction was applied.
    pub fn collided(&self) -> bool {
        self.axis.is_some()
    }

    /// The body now rests on top of the platform. Same as `hit_ceiling`.
    pub fn resolved_above(&self) -> bool {
        self.hit_ceiling
    }

    /// The body now sits against the platform's underside. Same as `on_ground`.
    pub fn resolved_below(&self) -> bool {
        self.on_ground
    }

    /// Copy the corrected position and velocity into `body`.
    ///
    /// `body.on_ground` is left alone; deciding what feeds the next tick's
    /// friction is the game loop's call.
    pub fn apply_to(&self, body: &mut Body) {
        body.x = self.x;
        body.y = self.y;
        body.vx = self.vx;
        body.vy = self.vy;
    }
}

/// Resolve `body` against a single `platform`.
///
/// Returns the body's state unchanged with both flags cleared when the two do
/// not overlap. Otherwise:
///
/// - Horizontal (`overlap.x < overlap.y`): `x` is snapped to the platform edge
///   the body approached from and `vx` is zeroed.
/// - Vertical (including ties): `y` is snapped above the platform if
///   `body.y < platform.y` (`hit_ceiling`), else below it (`on_ground`), and
///   `vy` is zeroed.
pub fn resolve_collision(body: &Body, platform: &impl Rect) -> Resolution {
    let mut result = Resolution::unchanged(body);

    let Some(overlap) = overlap(body, platform) else {
        return result;
    };

    match overlap.axis() {
        Axis::Horizontal => {
            result.x = if body.x < platform.x() {
                platform.x() - body.width
            } else {
                platform.x() + platform.width()
            };
            result.vx = 0.0;
        }
        Axis::Vertical => {
            if body.y < platform.y() {
                result.y = platform.y() - body.height;
                result.hit_ceiling = true;
            } else {
                result.y = platform.y() + platform.height();
                result.on_ground = true;
            }
            result.vy = 0.0;
        }
    }
    result.axis = Some(overlap.axis());
    result
}

// ---------------------------------------------------------------------------
// Multi-platform resolution
// ---------------------------------------------------------------------------

/// Order in which [`resolve_all`] visits candidate platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveOrder {
    /// Visit platforms in the order supplied.
    AsGiven,
    /// Visit platforms by ascending penetration depth measured against the
    /// body *before* any resolution. Non-colliding platforms go last; ties
    /// keep the supplied order.
    #[default]
    AscendingPenetration,
}

/// Accumulated outcome of resolving a body against several platforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Contacts {
    /// Body after all corrections. `on_ground` is carried over unchanged from
    /// the input body.
    pub body: Body,
    /// Some platform reported `on_ground`.
    pub on_ground: bool,
    /// Some platform reported `hit_ceiling`.
    pub hit_ceiling: bool,
    /// Indices into the platform slice that produced a correction, in
    /// visiting order.
    pub resolved: Vec<usize>,
}

impl Contacts {
    /// Some platform pushed the body on top of itself.
    pub fn resolved_above(&self) -> bool {
        self.hit_ceiling
    }

    /// Some platform pushed the body beneath itself.
    pub fn resolved_below(&self) -> bool {
        self.on_ground
    }

    /// Number of platforms that corrected the body.
    pub fn count(&self) -> usize {
        self.resolved.len()
    }
}

/// Visiting order of `platforms` for `body` under `order`.
pub fn visit_order<P: Rect>(body: &Body, platforms: &[P], order: ResolveOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..platforms.len()).collect();
    if order == ResolveOrder::AscendingPenetration {
        let depths: Vec<Option<f64>> = platforms
            .iter()
            .map(|p| overlap(body, p).map(|o| o.depth()))
            .collect();
        // Stable sort: equal depths keep their supplied order.
        indices.sort_by(|&a, &b| match (depths[a], depths[b]) {
            (Some(da), Some(db)) => da.total_cmp(&db),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }
    indices
}

/// Resolve `body` against every platform in `platforms`, sequentially.
///
/// Each platform is tested against the body as already corrected by the
/// platforms visited before it, so a body can be pushed clear of a platform it
/// initially overlapped. No platform is revisited.
pub fn resolve_all<P: Rect>(body: &Body, platforms: &[P], order: ResolveOrder) -> Contacts {
    let mut contacts = Contacts {
        body: *body,
        on_ground: false,
        hit_ceiling: false,
        resolved: Vec::new(),
    };

    for index in visit_order(body, platforms, order) {
        let res = resolve_collision(&contacts.body, &platforms[index]);
        if !res.collided() {
            continue;
        }
        tracing::trace!(
            platform = index,
            axis = ?res.axis,
            x = res.x,
            y = res.y,
            "resolved contact"
        );
        res.apply_to(&mut contacts.body);
        contacts.on_ground |= res.on_ground;
        contacts.hit_ceiling |= res.hit_ceiling;
        contacts.resolved.push(index);
    }

    contacts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
