//! Curved connector support: initial control placement and cubic evaluation.

#[cfg(test)]
#[path = "bezier_test.rs"]
mod bezier_test;

use crate::consts::{BEZIER_CONTROL_MAX, BEZIER_CONTROL_RATIO};
use crate::doc::ConnectorKind;
use crate::geom::{Point, direction_sign, distance};

/// Initial controls for a new curved connector from `start` to `end`.
///
/// Each control is offset horizontally from its own endpoint toward the other
/// endpoint by `min(0.3 * distance, 100)`. Coincident endpoints yield controls
/// on the endpoints themselves.
#[must_use]
pub fn initial_controls(start: Point, end: Point) -> (Point, Point) {
    let offset = (distance(start, end) * BEZIER_CONTROL_RATIO).min(BEZIER_CONTROL_MAX);
    let toward_end = direction_sign(end.x - start.x);
    (
        Point::new(start.x + toward_end * offset, start.y),
        Point::new(end.x - toward_end * offset, end.y),
    )
}

/// Curved connector kind with initial controls for the given endpoints.
#[must_use]
pub fn curved_kind(start: Point, end: Point) -> ConnectorKind {
    let (control1, control2) = initial_controls(start, end);
    ConnectorKind::Curved { control1, control2 }
}

/// Point on the cubic curve at parameter `t` in `[0, 1]`.
#[must_use]
pub fn cubic_at(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}
