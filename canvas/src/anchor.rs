//! Anchor model: canonical attachment points on an element's bounding box.
//!
//! Anchors are derived on demand from the element's current `position`/`size`
//! and are never cached, so a moved element always yields fresh anchors.

#[cfg(test)]
#[path = "anchor_test.rs"]
mod anchor_test;

use serde::{Deserialize, Serialize};

use crate::doc::{CanvasElement, ElementId};
use crate::geom::Point;

/// Side of a bounding box an anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All sides in anchor enumeration order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];
}

/// A side-midpoint anchor of a specific element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub point: Point,
    pub side: Side,
    pub owner: ElementId,
}

/// The 4 side midpoints plus the center, in the order top, right, bottom, left, center.
///
/// Zero-size elements yield five coincident points.
#[must_use]
pub fn element_anchors(el: &CanvasElement) -> [Point; 5] {
    let [top, right, bottom, left] = side_points(el);
    [top, right, bottom, left, el.center()]
}

/// The 4 side anchors labeled with their side, center excluded.
#[must_use]
pub fn side_anchors(el: &CanvasElement) -> [Anchor; 4] {
    Side::ALL.map(|side| anchor_on(el, side))
}

/// The anchor on `side` of the element.
#[must_use]
pub fn anchor_on(el: &CanvasElement, side: Side) -> Anchor {
    let [top, right, bottom, left] = side_points(el);
    let point = match side {
        Side::Top => top,
        Side::Right => right,
        Side::Bottom => bottom,
        Side::Left => left,
    };
    Anchor { point, side, owner: el.id }
}

/// The side anchor an outgoing direction vector leaves through.
///
/// The dominant axis decides; on |dx| == |dy| the horizontal side wins, and a
/// zero component counts as positive (right / bottom).
#[must_use]
pub fn side_anchor_toward(el: &CanvasElement, dir: Point) -> Anchor {
    let side = if dir.x.abs() >= dir.y.abs() {
        if dir.x >= 0.0 { Side::Right } else { Side::Left }
    } else if dir.y >= 0.0 {
        Side::Bottom
    } else {
        Side::Top
    };
    anchor_on(el, side)
}

fn side_points(el: &CanvasElement) -> [Point; 4] {
    let Point { x, y } = el.position;
    let w = el.size.width;
    let h = el.size.height;
    let c = el.center();
    [
        Point::new(c.x, y),
        Point::new(x + w, c.y),
        Point::new(c.x, y + h),
        Point::new(x, c.y),
    ]
}
