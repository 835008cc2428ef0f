//! Connector endpoint resolution: anchor-pair selection, free-point snapping,
//! and the Shift axis lock.
//!
//! All functions are pure and re-entrant; they read element geometry and return
//! points. Existence checks on element ids belong to the caller (see
//! [`crate::connector`]).

#[cfg(test)]
#[path = "routing_test.rs"]
mod routing_test;

use crate::anchor::{Anchor, Side, element_anchors, side_anchors};
use crate::consts::DIRECTION_PENALTY;
use crate::doc::CanvasElement;
use crate::geom::{Point, distance_sq, manhattan};

/// Chosen start/end anchors and the cost that selected them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPair {
    pub start: Anchor,
    pub end: Anchor,
    pub cost: f64,
}

/// Penalty for leaving `side` at `from` toward `to` against the side's facing.
///
/// A side faces outward: `left` expects `dx <= 0`, `right` expects `dx >= 0`,
/// `top` expects `dy <= 0`, `bottom` expects `dy >= 0`. Compliant directions
/// cost nothing; anything else costs [`DIRECTION_PENALTY`].
#[must_use]
pub fn direction_penalty(side: Side, from: Point, to: Point) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let compliant = match side {
        Side::Left => dx <= 0.0,
        Side::Right => dx >= 0.0,
        Side::Top => dy <= 0.0,
        Side::Bottom => dy >= 0.0,
    };
    if compliant { 0.0 } else { DIRECTION_PENALTY }
}

/// Routing cost of connecting `s` to `t`: Manhattan length plus both facing penalties.
#[must_use]
pub fn pair_cost(s: &Anchor, t: &Anchor) -> f64 {
    manhattan(s.point, t.point)
        + direction_penalty(s.side, s.point, t.point)
        + direction_penalty(t.side, t.point, s.point)
}

/// Pick the (source side, target side) pair with the lowest [`pair_cost`].
///
/// Enumerates the 4×4 side combinations in top, right, bottom, left order;
/// the first pair with the minimum cost wins, so results are deterministic.
#[must_use]
pub fn choose_best_anchor_pair(source: &CanvasElement, target: &CanvasElement) -> AnchorPair {
    let sources = side_anchors(source);
    let targets = side_anchors(target);

    let mut best = AnchorPair {
        start: sources[0],
        end: targets[0],
        cost: pair_cost(&sources[0], &targets[0]),
    };
    for s in &sources {
        for t in &targets {
            let cost = pair_cost(s, t);
            if cost < best.cost {
                best = AnchorPair { start: *s, end: *t, cost };
            }
        }
    }
    best
}

/// Nearest anchor (sides and center) of any box-like element, with its squared distance.
///
/// Scans every anchor without allocating. Linear in the element count; scenes large
/// enough for this to matter would need a spatial index.
#[must_use]
pub fn nearest_anchor<'a, I>(point: Point, elements: I) -> Option<(Point, f64)>
where
    I: IntoIterator<Item = &'a CanvasElement>,
{
    let mut best: Option<(Point, f64)> = None;
    for el in elements {
        if !el.kind().is_box() {
            continue;
        }
        for anchor in element_anchors(el) {
            let d2 = distance_sq(point, anchor);
            if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
                best = Some((anchor, d2));
            }
        }
    }
    best
}

/// Snap `point` to the nearest anchor within `threshold` (stage units), else return it unchanged.
///
/// The threshold is compared inclusively. Callers working at zoom ≠ 1 pass a
/// threshold already converted from screen pixels.
#[must_use]
pub fn snap_point<'a, I>(point: Point, elements: I, threshold: f64) -> Point
where
    I: IntoIterator<Item = &'a CanvasElement>,
{
    match nearest_anchor(point, elements) {
        Some((anchor, d2)) if d2 <= threshold * threshold => anchor,
        _ => point,
    }
}

/// Lock `current` to the dominant axis relative to `start` when `constrained`.
///
/// Horizontal wins ties (`|dx| >= |dy|` keeps `y = start.y`).
#[must_use]
pub fn apply_axis_constraint(start: Point, current: Point, constrained: bool) -> Point {
    if !constrained {
        return current;
    }
    let dx = (current.x - start.x).abs();
    let dy = (current.y - start.y).abs();
    if dx >= dy {
        Point::new(current.x, start.y)
    } else {
        Point::new(start.x, current.y)
    }
}
