#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Camera defaults ---

#[test]
fn camera_default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
    assert_eq!(cam.zoom, 1.0);
    assert!(cam.is_usable());
}

#[test]
fn camera_zero_zoom_is_unusable() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.0 };
    assert!(!cam.is_usable());
    let cam = Camera { pan_x: f64::NAN, pan_y: 0.0, zoom: 1.0 };
    assert!(!cam.is_usable());
}

// --- screen_to_world / world_to_screen ---

#[test]
fn screen_to_world_identity() {
    let cam = Camera::default();
    let world = cam.screen_to_world(Point::new(50.0, 75.0));
    assert!(point_approx_eq(world, Point::new(50.0, 75.0)));
}

#[test]
fn screen_to_world_with_zoom_and_pan() {
    let cam = Camera { pan_x: 100.0, pan_y: 50.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(140.0, 90.0));
    assert!(point_approx_eq(world, Point::new(20.0, 20.0)));
}

#[test]
fn world_screen_roundtrip() {
    let cam = Camera { pan_x: -37.5, pan_y: 12.25, zoom: 1.7 };
    let p = Point::new(123.0, -45.0);
    assert!(point_approx_eq(cam.screen_to_world(cam.world_to_screen(p)), p));
}

#[test]
fn screen_dist_scales_inverse_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    assert_eq!(cam.screen_dist_to_world(8.0), 4.0);
}

// --- pan / zoom ---

#[test]
fn pan_by_accumulates() {
    let mut cam = Camera::default();
    cam.pan_by(10.0, -5.0);
    cam.pan_by(2.0, 1.0);
    assert_eq!(cam.pan_x, 12.0);
    assert_eq!(cam.pan_y, -4.0);
}

#[test]
fn zoom_at_keeps_pointer_fixed() {
    let mut cam = Camera { pan_x: 30.0, pan_y: -20.0, zoom: 1.0 };
    let screen = Point::new(200.0, 150.0);
    let before = cam.screen_to_world(screen);
    cam.zoom_at(screen, 1.05);
    assert!(approx_eq(cam.zoom, 1.05));
    assert!(point_approx_eq(cam.screen_to_world(screen), before));
}

#[test]
fn visible_rect_accounts_for_zoom() {
    let cam = Camera { pan_x: -100.0, pan_y: 0.0, zoom: 2.0 };
    let (origin, w, h) = cam.visible_world_rect(800.0, 600.0);
    assert!(point_approx_eq(origin, Point::new(50.0, 0.0)));
    assert_eq!(w, 400.0);
    assert_eq!(h, 300.0);
}
