#![allow(clippy::float_cmp)]

use super::*;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[test]
fn distance_is_euclidean() {
    assert_eq!(distance(pt(0.0, 0.0), pt(3.0, 4.0)), 5.0);
    assert_eq!(distance_sq(pt(0.0, 0.0), pt(3.0, 4.0)), 25.0);
}

#[test]
fn manhattan_sums_axis_deltas() {
    assert_eq!(manhattan(pt(1.0, 1.0), pt(-2.0, 5.0)), 7.0);
}

#[test]
fn midpoint_halves_both_axes() {
    assert_eq!(midpoint(pt(0.0, 10.0), pt(20.0, -10.0)), pt(10.0, 0.0));
}

#[test]
fn sub_points_from_a_to_b() {
    assert_eq!(sub(pt(5.0, 7.0), pt(2.0, 3.0)), pt(3.0, 4.0));
}

#[test]
fn direction_sign_keeps_zero() {
    assert_eq!(direction_sign(12.5), 1.0);
    assert_eq!(direction_sign(-0.1), -1.0);
    assert_eq!(direction_sign(0.0), 0.0);
}

#[test]
fn offset_translates() {
    assert_eq!(pt(1.0, 2.0).offset(3.0, -4.0), pt(4.0, -2.0));
}

#[test]
fn point_segment_distance_projects_inside() {
    let d = point_segment_distance(pt(5.0, 3.0), pt(0.0, 0.0), pt(10.0, 0.0));
    assert_eq!(d, 3.0);
}

#[test]
fn point_segment_distance_clamps_to_endpoint() {
    let d = point_segment_distance(pt(13.0, 4.0), pt(0.0, 0.0), pt(10.0, 0.0));
    assert_eq!(d, 5.0);
}

#[test]
fn point_segment_distance_degenerate_segment() {
    let d = point_segment_distance(pt(3.0, 4.0), pt(0.0, 0.0), pt(0.0, 0.0));
    assert_eq!(d, 5.0);
}

#[test]
fn bounds_from_corners_normalizes() {
    let b = Bounds::from_corners(pt(10.0, 2.0), pt(4.0, 8.0));
    assert_eq!(b.min, pt(4.0, 2.0));
    assert_eq!(b.max, pt(10.0, 8.0));
    assert_eq!(b.width(), 6.0);
    assert_eq!(b.height(), 6.0);
}

#[test]
fn bounds_enclosing_points() {
    let b = Bounds::enclosing([pt(3.0, 1.0), pt(-2.0, 5.0), pt(0.0, 0.0)]).unwrap();
    assert_eq!(b, Bounds { min: pt(-2.0, 0.0), max: pt(3.0, 5.0) });
    assert!(Bounds::enclosing(std::iter::empty()).is_none());
}

#[test]
fn bounds_intersect_when_touching() {
    let a = Bounds::from_corners(pt(0.0, 0.0), pt(10.0, 10.0));
    assert!(a.intersects(&Bounds::from_corners(pt(10.0, 10.0), pt(20.0, 20.0))));
    assert!(a.intersects(&Bounds::from_corners(pt(2.0, 2.0), pt(3.0, 3.0))));
    assert!(!a.intersects(&Bounds::from_corners(pt(11.0, 0.0), pt(20.0, 5.0))));
}
