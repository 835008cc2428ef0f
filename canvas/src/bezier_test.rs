#![allow(clippy::float_cmp)]

use super::*;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn assert_near(a: Point, b: Point) {
    assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
}

#[test]
fn controls_offset_toward_other_end() {
    // distance 100 -> offset 30
    let (c1, c2) = initial_controls(pt(0.0, 0.0), pt(100.0, 0.0));
    assert_near(c1, pt(30.0, 0.0));
    assert_near(c2, pt(70.0, 0.0));
}

#[test]
fn controls_flip_when_end_is_left() {
    let (c1, c2) = initial_controls(pt(100.0, 0.0), pt(0.0, 0.0));
    assert_near(c1, pt(70.0, 0.0));
    assert_near(c2, pt(30.0, 0.0));
}

#[test]
fn controls_keep_their_endpoint_y() {
    let (c1, c2) = initial_controls(pt(0.0, 0.0), pt(30.0, 40.0));
    // distance 50 -> offset 15
    assert_near(c1, pt(15.0, 0.0));
    assert_near(c2, pt(15.0, 40.0));
}

#[test]
fn controls_offset_capped() {
    let (c1, c2) = initial_controls(pt(0.0, 0.0), pt(1000.0, 0.0));
    assert_eq!(c1, pt(100.0, 0.0));
    assert_eq!(c2, pt(900.0, 0.0));
}

#[test]
fn coincident_endpoints_put_controls_on_them() {
    let (c1, c2) = initial_controls(pt(5.0, 5.0), pt(5.0, 5.0));
    assert_eq!(c1, pt(5.0, 5.0));
    assert_eq!(c2, pt(5.0, 5.0));
}

#[test]
fn curved_kind_wraps_controls() {
    let kind = curved_kind(pt(0.0, 0.0), pt(1000.0, 0.0));
    assert_eq!(kind, ConnectorKind::Curved { control1: pt(100.0, 0.0), control2: pt(900.0, 0.0) });
}

#[test]
fn cubic_endpoints_and_midpoint() {
    let (p0, c1, c2, p1) = (pt(0.0, 0.0), pt(0.0, 100.0), pt(100.0, 100.0), pt(100.0, 0.0));
    assert_eq!(cubic_at(p0, c1, c2, p1, 0.0), p0);
    assert_eq!(cubic_at(p0, c1, c2, p1, 1.0), p1);
    assert_eq!(cubic_at(p0, c1, c2, p1, 0.5), pt(50.0, 75.0));
}
