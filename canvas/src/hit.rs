//! Hit-testing: which element, handle, or anchor lies under a stage point.
//!
//! Handle radii are fixed in screen pixels, so every function takes the
//! current zoom and converts them to stage units.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::anchor::{Anchor, side_anchors};
use crate::consts::{
    ANCHOR_HANDLE_RADIUS_PX, CONTROL_HANDLE_RADIUS_PX, ENDPOINT_HANDLE_RADIUS_PX, LINE_HIT_SLOP_PX, RESIZE_HANDLE_HALF_PX,
};
use crate::doc::{CanvasElement, ConnectorKind, ElementData, ElementId, ElementKind, ElementStore};
use crate::geom::{Point, distance_sq, point_segment_distance};
use crate::path::line_polyline;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    LineEndpoint(LineEnd),
    ControlHandle(ControlPoint),
    ResizeHandle(ResizeHandle),
}

/// Which end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    Start,
    End,
}

/// Which control point of a curved line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPoint {
    First,
    Second,
}

/// One of the square handles on a selected box's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
    ];

    /// Handles offered by `el`. Text boxes only resize horizontally; lines and
    /// connection points have none.
    #[must_use]
    pub fn for_element(el: &CanvasElement) -> &'static [ResizeHandle] {
        match el.kind() {
            ElementKind::Text => &[Self::Left, Self::Right],
            kind if kind.is_box() => &Self::ALL,
            _ => &[],
        }
    }

    /// Horizontal edge moved by this handle: `-1` left, `1` right, `0` neither.
    #[must_use]
    pub fn x_edge(self) -> i8 {
        match self {
            Self::TopLeft | Self::Left | Self::BottomLeft => -1,
            Self::TopRight | Self::Right | Self::BottomRight => 1,
            Self::Top | Self::Bottom => 0,
        }
    }

    /// Vertical edge moved by this handle: `-1` top, `1` bottom, `0` neither.
    #[must_use]
    pub fn y_edge(self) -> i8 {
        match self {
            Self::TopLeft | Self::Top | Self::TopRight => -1,
            Self::BottomLeft | Self::Bottom | Self::BottomRight => 1,
            Self::Left | Self::Right => 0,
        }
    }

    /// Handle center on `el`'s bounds.
    #[must_use]
    pub fn center(self, el: &CanvasElement) -> Point {
        let b = el.bounds();
        let pick = |edge: i8, lo: f64, hi: f64| match edge {
            -1 => lo,
            1 => hi,
            _ => (lo + hi) * 0.5,
        };
        Point::new(pick(self.x_edge(), b.min.x, b.max.x), pick(self.y_edge(), b.min.y, b.max.y))
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Test what is under `point`, checking the selected element's handles first.
#[must_use]
pub fn hit_test<S: ElementStore>(point: Point, store: &S, zoom: f64, selected: Option<ElementId>) -> Option<Hit> {
    if let Some(el) = selected.and_then(|id| store.element(&id)) {
        let handle = line_handle_at(point, el, zoom)
            .or_else(|| resize_handle_at(point, el, zoom).map(HitPart::ResizeHandle));
        if let Some(part) = handle {
            return Some(Hit { element_id: el.id, part });
        }
    }
    element_at(point, store, zoom, None).map(|element_id| Hit { element_id, part: HitPart::Body })
}

/// Topmost element whose body contains `point`, skipping `exclude`.
///
/// Lines are hit along their drawn path within the stroke half-width plus a
/// screen-space slop; every other kind by its bounding box.
#[must_use]
pub fn element_at<S: ElementStore>(point: Point, store: &S, zoom: f64, exclude: Option<ElementId>) -> Option<ElementId> {
    store
        .elements()
        .iter()
        .rev()
        .filter(|el| Some(el.id) != exclude)
        .find(|el| body_contains(el, point, zoom))
        .map(|el| el.id)
}

/// Topmost box element under `point`, skipping `exclude`. Used for connector hover.
#[must_use]
pub fn box_element_at<S: ElementStore>(point: Point, store: &S, exclude: Option<ElementId>) -> Option<ElementId> {
    store
        .elements()
        .iter()
        .rev()
        .filter(|el| Some(el.id) != exclude && el.kind().is_box())
        .find(|el| el.contains(point))
        .map(|el| el.id)
}

/// Side anchor handle of `el` under `point`, if any.
#[must_use]
pub fn anchor_handle_at(point: Point, el: &CanvasElement, zoom: f64) -> Option<Anchor> {
    if !el.kind().is_box() {
        return None;
    }
    let r = screen_radius(ANCHOR_HANDLE_RADIUS_PX, zoom);
    side_anchors(el).into_iter().find(|a| distance_sq(a.point, point) <= r * r)
}

/// Endpoint or control handle of a line element under `point`.
///
/// Endpoints win over controls when both overlap.
#[must_use]
pub fn line_handle_at(point: Point, el: &CanvasElement, zoom: f64) -> Option<HitPart> {
    let line = el.as_line()?;
    let r = screen_radius(ENDPOINT_HANDLE_RADIUS_PX, zoom);
    if distance_sq(line.start(), point) <= r * r {
        return Some(HitPart::LineEndpoint(LineEnd::Start));
    }
    if distance_sq(line.end(), point) <= r * r {
        return Some(HitPart::LineEndpoint(LineEnd::End));
    }
    if let ConnectorKind::Curved { control1, control2 } = line.connector {
        let r = screen_radius(CONTROL_HANDLE_RADIUS_PX, zoom);
        if distance_sq(control1, point) <= r * r {
            return Some(HitPart::ControlHandle(ControlPoint::First));
        }
        if distance_sq(control2, point) <= r * r {
            return Some(HitPart::ControlHandle(ControlPoint::Second));
        }
    }
    None
}

/// Resize handle of `el` under `point`. Handles are squares centered on the
/// bounds' corners and edge midpoints.
#[must_use]
pub fn resize_handle_at(point: Point, el: &CanvasElement, zoom: f64) -> Option<ResizeHandle> {
    let half = screen_radius(RESIZE_HANDLE_HALF_PX, zoom);
    ResizeHandle::for_element(el).iter().copied().find(|h| {
        let c = h.center(el);
        (point.x - c.x).abs() <= half && (point.y - c.y).abs() <= half
    })
}

fn body_contains(el: &CanvasElement, point: Point, zoom: f64) -> bool {
    match &el.data {
        ElementData::Line(line) => {
            let tolerance = el.style.stroke_width_or_default() * 0.5 + screen_radius(LINE_HIT_SLOP_PX, zoom);
            let poly = line_polyline(line, &el.style);
            match poly.as_slice() {
                [] => false,
                [only] => distance_sq(*only, point) <= tolerance * tolerance,
                _ => poly.windows(2).any(|w| point_segment_distance(point, w[0], w[1]) <= tolerance),
            }
        }
        _ => el.contains(point),
    }
}

/// Convert a screen-pixel radius to stage units. Unusable zoom falls back to 1.
fn screen_radius(px: f64, zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 { px / zoom } else { px }
}
