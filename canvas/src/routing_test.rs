#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::SNAP_THRESHOLD_PX;
use crate::doc::{ConnectorKind, ElementData, ElementStyle, Size};

fn rect(x: f64, y: f64, w: f64, h: f64) -> CanvasElement {
    CanvasElement::new(
        ElementData::Rect { rx: 0.0, ry: 0.0 },
        Point::new(x, y),
        Size::new(w, h),
        ElementStyle::default(),
    )
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// direction_penalty
// =============================================================

#[test]
fn penalty_zero_when_leaving_through_facing() {
    let o = pt(0.0, 0.0);
    assert_eq!(direction_penalty(Side::Right, o, pt(10.0, 0.0)), 0.0);
    assert_eq!(direction_penalty(Side::Left, o, pt(-10.0, 0.0)), 0.0);
    assert_eq!(direction_penalty(Side::Top, o, pt(0.0, -10.0)), 0.0);
    assert_eq!(direction_penalty(Side::Bottom, o, pt(0.0, 10.0)), 0.0);
}

#[test]
fn penalty_applies_against_facing() {
    let o = pt(0.0, 0.0);
    assert_eq!(direction_penalty(Side::Right, o, pt(-1.0, 0.0)), DIRECTION_PENALTY);
    assert_eq!(direction_penalty(Side::Left, o, pt(1.0, 0.0)), DIRECTION_PENALTY);
    assert_eq!(direction_penalty(Side::Top, o, pt(0.0, 1.0)), DIRECTION_PENALTY);
    assert_eq!(direction_penalty(Side::Bottom, o, pt(0.0, -1.0)), DIRECTION_PENALTY);
}

#[test]
fn penalty_zero_on_perpendicular_or_equal() {
    let o = pt(0.0, 0.0);
    assert_eq!(direction_penalty(Side::Left, o, pt(0.0, 50.0)), 0.0);
    assert_eq!(direction_penalty(Side::Bottom, o, pt(-50.0, 0.0)), 0.0);
}

// =============================================================
// choose_best_anchor_pair
// =============================================================

#[test]
fn pair_for_target_to_the_right() {
    let a = rect(0.0, 0.0, 100.0, 100.0);
    let b = rect(400.0, 0.0, 100.0, 100.0);
    let pair = choose_best_anchor_pair(&a, &b);
    assert_eq!(pair.start.side, Side::Right);
    assert_eq!(pair.end.side, Side::Left);
    assert_eq!(pair.start.point, pt(100.0, 50.0));
    assert_eq!(pair.end.point, pt(400.0, 50.0));
    assert_eq!(pair.cost, 300.0);
    assert_eq!(pair.start.owner, a.id);
    assert_eq!(pair.end.owner, b.id);
}

#[test]
fn pair_for_target_below() {
    let a = rect(0.0, 0.0, 100.0, 100.0);
    let b = rect(0.0, 300.0, 100.0, 100.0);
    let pair = choose_best_anchor_pair(&a, &b);
    assert_eq!(pair.start.side, Side::Bottom);
    assert_eq!(pair.end.side, Side::Top);
}

#[test]
fn pair_for_target_to_the_left() {
    let a = rect(400.0, 0.0, 100.0, 100.0);
    let b = rect(0.0, 0.0, 100.0, 100.0);
    let pair = choose_best_anchor_pair(&a, &b);
    assert_eq!(pair.start.side, Side::Left);
    assert_eq!(pair.end.side, Side::Right);
}

#[test]
fn pair_is_deterministic() {
    let a = rect(13.0, 27.0, 80.0, 45.0);
    let b = rect(250.0, 190.0, 60.0, 120.0);
    let first = choose_best_anchor_pair(&a, &b);
    for _ in 0..10 {
        assert_eq!(choose_best_anchor_pair(&a, &b), first);
    }
}

#[test]
fn pair_ties_keep_first_enumerated() {
    // Coincident zero-size elements: every pair costs the same, so top/top wins.
    let a = rect(10.0, 10.0, 0.0, 0.0);
    let b = rect(10.0, 10.0, 0.0, 0.0);
    let pair = choose_best_anchor_pair(&a, &b);
    assert_eq!(pair.start.side, Side::Top);
    assert_eq!(pair.end.side, Side::Top);
    assert_eq!(pair.cost, 0.0);
}

#[test]
fn pair_cost_matches_components() {
    let a = rect(0.0, 0.0, 100.0, 100.0);
    let b = rect(400.0, 0.0, 100.0, 100.0);
    let s = crate::anchor::anchor_on(&a, Side::Left);
    let t = crate::anchor::anchor_on(&b, Side::Right);
    // 500 Manhattan + both sides pointing away from each other.
    assert_eq!(pair_cost(&s, &t), 500.0 + 2.0 * DIRECTION_PENALTY);
}

// =============================================================
// snap_point
// =============================================================

#[test]
fn snap_empty_scene_returns_input() {
    let p = pt(3.0, 4.0);
    assert_eq!(snap_point(p, std::iter::empty::<&CanvasElement>(), SNAP_THRESHOLD_PX), p);
}

#[test]
fn snap_at_threshold_boundary() {
    let a = rect(0.0, 0.0, 100.0, 100.0);
    let right = pt(100.0, 50.0);
    // Exactly 8 away from the right anchor snaps.
    assert_eq!(snap_point(pt(108.0, 50.0), [&a], SNAP_THRESHOLD_PX), right);
    // 8.01 away does not.
    let outside = pt(108.01, 50.0);
    let got = snap_point(outside, [&a], SNAP_THRESHOLD_PX);
    assert!((got.x - outside.x).abs() < 1e-6 && (got.y - outside.y).abs() < 1e-6);
}

#[test]
fn snap_picks_nearest_across_elements() {
    let a = rect(0.0, 0.0, 100.0, 100.0);
    let b = rect(104.0, 0.0, 100.0, 100.0);
    // a.right = (100,50), b.left = (104,50); pointer at 103 is closer to b.
    assert_eq!(snap_point(pt(103.0, 50.0), [&a, &b], SNAP_THRESHOLD_PX), pt(104.0, 50.0));
}

#[test]
fn snap_includes_center() {
    let a = rect(0.0, 0.0, 100.0, 100.0);
    assert_eq!(snap_point(pt(52.0, 47.0), [&a], SNAP_THRESHOLD_PX), pt(50.0, 50.0));
}

#[test]
fn snap_ignores_lines() {
    let line = CanvasElement::line(
        vec![pt(0.0, 0.0), pt(100.0, 0.0)],
        ConnectorKind::Straight,
        ElementStyle::default(),
    );
    assert_eq!(snap_point(pt(1.0, 1.0), [&line], SNAP_THRESHOLD_PX), pt(1.0, 1.0));
}

#[test]
fn snap_threshold_scales_with_caller() {
    let a = rect(0.0, 0.0, 100.0, 100.0);
    // At zoom 2 the caller passes 4 stage units.
    assert_eq!(snap_point(pt(106.0, 50.0), [&a], 4.0), pt(106.0, 50.0));
    assert_eq!(snap_point(pt(103.0, 50.0), [&a], 4.0), pt(100.0, 50.0));
}

#[test]
fn nearest_anchor_reports_distance() {
    let a = rect(0.0, 0.0, 100.0, 100.0);
    let (p, d2) = nearest_anchor(pt(100.0, 53.0), [&a]).unwrap();
    assert_eq!(p, pt(100.0, 50.0));
    assert_eq!(d2, 9.0);
}

// =============================================================
// apply_axis_constraint
// =============================================================

#[test]
fn axis_unconstrained_passthrough() {
    assert_eq!(apply_axis_constraint(pt(0.0, 0.0), pt(10.0, 3.0), false), pt(10.0, 3.0));
}

#[test]
fn axis_horizontal_dominates() {
    assert_eq!(apply_axis_constraint(pt(0.0, 0.0), pt(10.0, 3.0), true), pt(10.0, 0.0));
}

#[test]
fn axis_vertical_dominates() {
    assert_eq!(apply_axis_constraint(pt(0.0, 0.0), pt(3.0, 10.0), true), pt(0.0, 10.0));
}

#[test]
fn axis_tie_is_horizontal() {
    assert_eq!(apply_axis_constraint(pt(5.0, 5.0), pt(-5.0, 15.0), true), pt(-5.0, 5.0));
}
