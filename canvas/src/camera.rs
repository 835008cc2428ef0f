#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::geom::Point;

/// Viewport state for pan/zoom on the infinite canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Whether the camera can map between screen and stage space.
    ///
    /// A zero, negative, or non-finite zoom means the stage is not ready; input
    /// handlers treat it as an absent viewport and skip the event.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.zoom.is_finite() && self.zoom > 0.0 && self.pan_x.is_finite() && self.pan_y.is_finite()
    }

    /// Convert a screen-space point (CSS pixels) to stage coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a stage-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to stage-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Shift the pan offset by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply the zoom by `factor`, keeping the stage point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        self.set_zoom_at(screen, self.zoom * factor);
    }

    /// Set the zoom to exactly `zoom`, keeping the stage point under `screen` fixed.
    pub fn set_zoom_at(&mut self, screen: Point, zoom: f64) {
        let anchor = self.screen_to_world(screen);
        self.zoom = zoom;
        self.pan_x = screen.x - anchor.x * self.zoom;
        self.pan_y = screen.y - anchor.y * self.zoom;
    }

    /// Top-left and size of the visible stage region for a viewport of the given CSS size.
    #[must_use]
    pub fn visible_world_rect(&self, viewport_w: f64, viewport_h: f64) -> (Point, f64, f64) {
        let origin = self.screen_to_world(Point::new(0.0, 0.0));
        (origin, viewport_w / self.zoom, viewport_h / self.zoom)
    }
}
