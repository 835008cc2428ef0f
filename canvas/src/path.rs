//! Path construction for line elements.
//!
//! Converts a line's endpoints and connector kind into a list of
//! [`PathSegment`]s, the equivalent path command string (`M`, `L`, `Q`, `C`),
//! arrowhead triangles, and the cap to use at each end. Everything here is a
//! pure function of its inputs: identical inputs produce identical commands.
//!
//! Orthogonal routing uses one vertical channel at the horizontal midpoint of
//! the two ends, whatever sides they attach from, with each bend rounded by a
//! quadratic arc whose radius never exceeds half of either adjacent segment.

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

use crate::bezier;
use crate::consts::BEZIER_HIT_SAMPLES;
use crate::doc::{ArrowEnds, ConnectorKind, ElementStyle, LineCap, LineData};
use crate::geom::{Point, direction_sign, manhattan, midpoint};

/// One drawing instruction of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic Bezier used for rounded corners.
    QuadTo { control: Point, end: Point },
    /// Cubic Bezier used by curved connectors.
    CubicTo { control1: Point, control2: Point, end: Point },
}

/// Filled triangle drawn at a connector end. The tip sits exactly on the anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

impl ArrowHead {
    /// Closed triangle path command.
    #[must_use]
    pub fn command(&self) -> String {
        format!(
            "M {} {} L {} {} L {} {} Z",
            num(self.tip.x),
            num(self.tip.y),
            num(self.left.x),
            num(self.left.y),
            num(self.right.x),
            num(self.right.y)
        )
    }
}

/// A fully built stroke: segments, their command string, arrowheads, and caps.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub segments: Vec<PathSegment>,
    pub command: String,
    pub arrows: Vec<ArrowHead>,
    pub start_cap: LineCap,
    pub end_cap: LineCap,
    /// Effective radius used at each bend, in route order.
    pub corner_radii: Vec<f64>,
}

impl RoutedPath {
    fn from_segments(segments: Vec<PathSegment>) -> Self {
        let command = to_command(&segments);
        Self {
            segments,
            command,
            arrows: Vec::new(),
            start_cap: LineCap::Round,
            end_cap: LineCap::Round,
            corner_radii: Vec::new(),
        }
    }

    /// Approximate the path as a polyline, sampling curves with `samples` steps.
    #[must_use]
    pub fn flatten(&self, samples: usize) -> Vec<Point> {
        let steps = samples.max(1);
        let mut out = Vec::new();
        let mut cursor = Point::default();
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => {
                    out.push(p);
                    cursor = p;
                }
                PathSegment::QuadTo { control, end } => {
                    for i in 1..=steps {
                        out.push(quad_at(cursor, control, end, step_t(i, steps)));
                    }
                    cursor = end;
                }
                PathSegment::CubicTo { control1, control2, end } => {
                    for i in 1..=steps {
                        out.push(bezier::cubic_at(cursor, control1, control2, end, step_t(i, steps)));
                    }
                    cursor = end;
                }
            }
        }
        out
    }
}

/// Inputs for [`build_orthogonal_path`] beyond the two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthogonalParams {
    pub corner_radius: f64,
    pub arrow_size: f64,
    pub arrow_ends: ArrowEnds,
    pub stroke_width: f64,
}

/// Waypoints of the orthogonal route, before rounding and arrow insets:
/// `start, (mx, start.y), (mx, end.y), end` with `mx` the horizontal midpoint.
#[must_use]
pub fn orthogonal_waypoints(start: Point, end: Point) -> Vec<Point> {
    let mx = midpoint(start, end).x;
    vec![start, Point::new(mx, start.y), Point::new(mx, end.y), end]
}

/// Build the rounded orthogonal path with optional arrowheads.
///
/// An end carrying an arrowhead is inset by `arrow_size + stroke_width` along its
/// approaching segment (never past the previous bend) and uses a butt cap; the
/// arrowhead itself, `arrow_size` long and wide, keeps its tip on the un-inset
/// endpoint. Ends without an arrowhead use a round cap. A zero-length route
/// degenerates to a single `M` command.
#[must_use]
pub fn build_orthogonal_path(start: Point, end: Point, params: &OrthogonalParams) -> RoutedPath {
    let mut pts = simplify(orthogonal_waypoints(start, end));
    if pts.len() < 2 {
        return RoutedPath::from_segments(vec![PathSegment::MoveTo(start)]);
    }

    let inset = (params.arrow_size + params.stroke_width).max(0.0);
    let mut arrows = Vec::new();
    if params.arrow_ends.at_start() {
        arrows.push(arrow_head(pts[1], pts[0], params.arrow_size));
        pts[0] = pull_toward(pts[0], pts[1], inset);
    }
    if params.arrow_ends.at_end() {
        let n = pts.len();
        arrows.push(arrow_head(pts[n - 2], pts[n - 1], params.arrow_size));
        pts[n - 1] = pull_toward(pts[n - 1], pts[n - 2], inset);
    }

    let mut segments = vec![PathSegment::MoveTo(pts[0])];
    let mut pen = pts[0];
    let mut corner_radii = Vec::with_capacity(pts.len().saturating_sub(2));
    for i in 1..pts.len() - 1 {
        let (prev, bend, next) = (pts[i - 1], pts[i], pts[i + 1]);
        let radius = params
            .corner_radius
            .min(manhattan(prev, bend) * 0.5)
            .min(manhattan(bend, next) * 0.5)
            .max(0.0);
        corner_radii.push(radius);
        if radius > 0.0 {
            let entry = Point::new(
                bend.x - direction_sign(bend.x - prev.x) * radius,
                bend.y - direction_sign(bend.y - prev.y) * radius,
            );
            let exit = Point::new(
                bend.x + direction_sign(next.x - bend.x) * radius,
                bend.y + direction_sign(next.y - bend.y) * radius,
            );
            line_to(&mut segments, &mut pen, entry);
            segments.push(PathSegment::QuadTo { control: bend, end: exit });
            pen = exit;
        } else {
            line_to(&mut segments, &mut pen, bend);
        }
    }
    line_to(&mut segments, &mut pen, pts[pts.len() - 1]);

    let mut path = RoutedPath::from_segments(segments);
    path.arrows = arrows;
    path.corner_radii = corner_radii;
    path.start_cap = cap_for(params.arrow_ends.at_start());
    path.end_cap = cap_for(params.arrow_ends.at_end());
    path
}

/// Polyline through every point, round caps at both ends.
#[must_use]
pub fn straight_path(points: &[Point]) -> RoutedPath {
    let mut segments = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        segments.push(if i == 0 { PathSegment::MoveTo(*p) } else { PathSegment::LineTo(*p) });
    }
    RoutedPath::from_segments(segments)
}

/// Cubic path from `start` to `end` through two controls, round caps at both ends.
#[must_use]
pub fn curved_path(start: Point, control1: Point, control2: Point, end: Point) -> RoutedPath {
    RoutedPath::from_segments(vec![
        PathSegment::MoveTo(start),
        PathSegment::CubicTo { control1, control2, end },
    ])
}

/// Build the drawn path of a line element from its connector kind.
#[must_use]
pub fn route_line(line: &LineData, style: &ElementStyle) -> RoutedPath {
    match line.connector {
        ConnectorKind::Straight => straight_path(&line.points),
        ConnectorKind::Curved { control1, control2 } => curved_path(line.start(), control1, control2, line.end()),
        ConnectorKind::Orthogonal { corner_radius, arrow_size, arrow_ends } => {
            let params = OrthogonalParams {
                corner_radius,
                arrow_size,
                arrow_ends,
                stroke_width: style.stroke_width_or_default(),
            };
            build_orthogonal_path(line.start(), line.end(), &params)
        }
    }
}

/// Polyline approximation of a line element's drawn path, for hit-testing.
#[must_use]
pub fn line_polyline(line: &LineData, style: &ElementStyle) -> Vec<Point> {
    route_line(line, style).flatten(BEZIER_HIT_SAMPLES)
}

/// Serialize segments as a path command string.
#[must_use]
pub fn to_command(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(|seg| match *seg {
            PathSegment::MoveTo(p) => format!("M {} {}", num(p.x), num(p.y)),
            PathSegment::LineTo(p) => format!("L {} {}", num(p.x), num(p.y)),
            PathSegment::QuadTo { control, end } => {
                format!("Q {} {} {} {}", num(control.x), num(control.y), num(end.x), num(end.y))
            }
            PathSegment::CubicTo { control1, control2, end } => format!(
                "C {} {} {} {} {} {}",
                num(control1.x),
                num(control1.y),
                num(control2.x),
                num(control2.y),
                num(end.x),
                num(end.y)
            ),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a coordinate, folding `-0` into `0`.
fn num(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Append a straight segment unless the pen already sits on `to`.
fn line_to(segments: &mut Vec<PathSegment>, pen: &mut Point, to: Point) {
    if *pen != to {
        segments.push(PathSegment::LineTo(to));
        *pen = to;
    }
}

fn cap_for(has_arrow: bool) -> LineCap {
    if has_arrow { LineCap::Butt } else { LineCap::Round }
}

/// Drop repeated waypoints and collinear middle points.
fn simplify(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last() == Some(&p) {
            continue;
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let collinear = (a.x == b.x && b.x == p.x) || (a.y == b.y && b.y == p.y);
            if collinear {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

/// Move `from` toward `to` by `amount`, stopping at `to`.
fn pull_toward(from: Point, to: Point, amount: f64) -> Point {
    let len = manhattan(from, to);
    let step = amount.min(len);
    Point::new(
        from.x + direction_sign(to.x - from.x) * step,
        from.y + direction_sign(to.y - from.y) * step,
    )
}

/// Triangle with its tip on `tip`, pointing along the axis-aligned segment `from → tip`.
fn arrow_head(from: Point, tip: Point, size: f64) -> ArrowHead {
    let dx = direction_sign(tip.x - from.x);
    let dy = direction_sign(tip.y - from.y);
    let base = Point::new(tip.x - dx * size, tip.y - dy * size);
    let half = size * 0.5;
    // Perpendicular of (dx, dy) is (-dy, dx).
    ArrowHead {
        tip,
        left: Point::new(base.x - dy * half, base.y + dx * half),
        right: Point::new(base.x + dy * half, base.y - dx * half),
    }
}

fn quad_at(p0: Point, c: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * p0.x + 2.0 * u * t * c.x + t * t * p1.x,
        u * u * p0.y + 2.0 * u * t * c.y + t * t * p1.y,
    )
}

#[allow(clippy::cast_precision_loss)]
fn step_t(i: usize, steps: usize) -> f64 {
    i as f64 / steps as f64
}
