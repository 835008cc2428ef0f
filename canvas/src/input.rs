//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the non-connector gesture tracked between
//! pointer-down and pointer-up; connector drags run through
//! [`crate::connector::ConnectorMachine`] instead.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::ElementId;
use crate::geom::{Bounds, Point};
use crate::hit::{ControlPoint, LineEnd, ResizeHandle};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Place a text box.
    Text,
    /// Place a rectangle.
    Rect,
    /// Insert an image.
    Image,
    /// Draw a connector.
    Line,
    /// Freehand stroke.
    Pen,
    /// Drag to pan the viewport.
    Pan,
    /// Place a comment.
    Comment,
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key name as reported by the host (e.g. `"Delete"`, `"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Transient UI state visible to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UiState {
    /// Box element under the pointer while the line tool is active.
    pub hovered_id: Option<ElementId>,
    /// Last pointer position in stage space.
    pub pointer: Option<Point>,
}

/// Non-connector gesture in progress.
///
/// Each active variant carries the context needed to compute deltas on move.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Panning the viewport by dragging.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Moving an element with the select tool.
    DraggingElement {
        id: ElementId,
        /// Stage-space pointer position at the previous event.
        last_world: Point,
    },
    /// Repositioning one end of the selected line.
    DraggingEndpoint { id: ElementId, end: LineEnd },
    /// Repositioning one control point of the selected curved line.
    DraggingControl { id: ElementId, control: ControlPoint },
    /// Appending points to a freehand stroke.
    DrawingStroke { id: ElementId },
    /// Moving every element of a multi-selection together.
    DraggingSelection {
        /// Stage-space pointer position at the previous event.
        last_world: Point,
    },
    /// Dragging a resize handle of the selected box.
    Resizing {
        id: ElementId,
        handle: ResizeHandle,
        /// Element bounds when the drag began.
        origin: Bounds,
        /// Stage-space pointer position at pointer-down.
        grab: Point,
    },
    /// Rubber-band selection rectangle on empty canvas.
    Marquee { start: Point, current: Point },
}

impl InputState {
    /// Single element mutated by the gesture, if any.
    #[must_use]
    pub fn target(&self) -> Option<ElementId> {
        match *self {
            Self::Idle | Self::Panning { .. } | Self::DraggingSelection { .. } | Self::Marquee { .. } => None,
            Self::DraggingElement { id, .. }
            | Self::DraggingEndpoint { id, .. }
            | Self::DraggingControl { id, .. }
            | Self::DrawingStroke { id }
            | Self::Resizing { id, .. } => Some(id),
        }
    }
}
