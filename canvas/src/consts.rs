//! Shared numeric constants for the canvas crate.

// ── Connector routing ───────────────────────────────────────────

/// Snap radius for free connector endpoints, in stage units at zoom 1.
pub const SNAP_THRESHOLD_PX: f64 = 8.0;

/// Cost added when an anchor pair leaves or enters a side against its facing.
///
/// Heuristic tie-breaker; tune it here rather than deriving it.
pub const DIRECTION_PENALTY: f64 = 200.0;

/// Connectors shorter than this (squared, stage units) are discarded on release.
pub const MIN_CONNECTOR_LEN_SQ: f64 = 4.0;

/// Default bend radius for orthogonal connectors.
pub const DEFAULT_CORNER_RADIUS: f64 = 12.0;

/// Default arrowhead length and width for orthogonal connectors.
pub const DEFAULT_ARROW_SIZE: f64 = 10.0;

/// Default stroke width for connectors and freehand strokes.
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

/// Fraction of the endpoint distance used to offset initial Bezier controls.
pub const BEZIER_CONTROL_RATIO: f64 = 0.3;

/// Upper bound on the initial Bezier control offset.
pub const BEZIER_CONTROL_MAX: f64 = 100.0;

/// Samples used when flattening a cubic curve for hit-testing.
pub const BEZIER_HIT_SAMPLES: usize = 16;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space radius of the per-side anchor handles shown by the line tool.
pub const ANCHOR_HANDLE_RADIUS_PX: f64 = 6.0;

/// Screen-space radius of a selected line's endpoint handles.
pub const ENDPOINT_HANDLE_RADIUS_PX: f64 = 6.0;

/// Screen-space radius of a curved line's control-point handles.
pub const CONTROL_HANDLE_RADIUS_PX: f64 = 5.0;

/// Screen-space hit slop in pixels for thin strokes.
pub const LINE_HIT_SLOP_PX: f64 = 6.0;

/// Screen-space half-width of the square resize handles on a selected box.
pub const RESIZE_HANDLE_HALF_PX: f64 = 4.0;

// ── Elements ────────────────────────────────────────────────────

/// Default rectangle size created by a rect-tool click.
pub const RECT_DEFAULT_SIZE: (f64, f64) = (120.0, 80.0);

/// Default text box size created by a text-tool click.
pub const TEXT_DEFAULT_SIZE: (f64, f64) = (150.0, 30.0);

/// Default image size for inserted images.
pub const IMAGE_DEFAULT_SIZE: (f64, f64) = (200.0, 200.0);

/// Smallest width or height a resize or size edit may leave.
pub const MIN_ELEMENT_SIZE: f64 = 5.0;

/// Elements narrower or shorter than this are skipped by marquee selection.
pub const MARQUEE_MIN_EXTENT: f64 = 1.0;

// ── Viewport / history ──────────────────────────────────────────

/// Multiplicative zoom step per wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.05;

/// Minimum zoom level.
pub const ZOOM_MIN: f64 = 0.1;

/// Maximum zoom level.
pub const ZOOM_MAX: f64 = 10.0;

/// Maximum snapshots kept by the undo history.
pub const HISTORY_LIMIT: usize = 50;
