//! Small geometry helpers shared by gameplay code.

use crate::body::Rect;

/// Whether the point `(px, py)` lies inside `rect`, edges included.
pub fn point_in_rect(px: f64, py: f64, rect: &impl Rect) -> bool {
    px >= rect.x()
        && px <= rect.x() + rect.width()
        && py >= rect.y()
        && py <= rect.y() + rect.height()
}

/// Euclidean distance between two points.
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Aabb;

    #[test]
    fn point_inside_and_on_edges() {
        let r = Aabb::new(10.0, 10.0, 20.0, 20.0);
        assert!(point_in_rect(15.0, 15.0, &r));
        assert!(point_in_rect(10.0, 10.0, &r));
        assert!(point_in_rect(30.0, 30.0, &r));
        assert!(point_in_rect(30.0, 10.0, &r));
    }

    #[test]
    fn point_outside() {
        let r = Aabb::new(10.0, 10.0, 20.0, 20.0);
        assert!(!point_in_rect(9.999, 15.0, &r));
        assert!(!point_in_rect(15.0, 30.001, &r));
    }

    #[test]
    fn distance_345() {
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(distance(3.0, 4.0, 0.0, 0.0), 5.0);
        assert_eq!(distance(-1.0, -1.0, -1.0, -1.0), 0.0);
    }
}
