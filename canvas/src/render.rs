//! Render model: turns document, camera, and UI state into draw primitives.
//!
//! This module never touches a drawing surface. It produces a [`Scene`] of
//! stage-space primitives in z-order plus overlay handles, which the host
//! paints with whatever backend it owns. It does not mutate any state.
//!
//! Connector geometry comes from [`crate::path`], so a committed connector,
//! the live preview, and a connector after a manual handle drag all render
//! through the same path builder.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::anchor::{Side, side_anchors};
use crate::camera::Camera;
use crate::comment::CommentStore;
use crate::consts::{ANCHOR_HANDLE_RADIUS_PX, CONTROL_HANDLE_RADIUS_PX, ENDPOINT_HANDLE_RADIUS_PX, RESIZE_HANDLE_HALF_PX};
use crate::doc::{CanvasElement, ConnectorKind, ElementData, ElementId, ElementStore, LineCap, LineJoin};
use crate::geom::{Bounds, Point};
use crate::hit::{ControlPoint, LineEnd, ResizeHandle};
use crate::input::{Tool, UiState};
use crate::path::route_line;

/// Fill used for rectangles without a fill color.
const DEFAULT_FILL: &str = "transparent";
/// Text color used when the element has none.
const DEFAULT_TEXT_FILL: &str = "#000000";
/// Font size used when the element has none.
const DEFAULT_FONT_SIZE: f64 = 16.0;
const DEFAULT_FONT_FAMILY: &str = "Arial";

/// One drawable shape in stage coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        id: ElementId,
        origin: Point,
        width: f64,
        height: f64,
        corner_radius: f64,
        fill: String,
        stroke: Option<String>,
        stroke_width: f64,
    },
    Ellipse {
        id: ElementId,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        fill: String,
        stroke: Option<String>,
        stroke_width: f64,
    },
    Text {
        id: ElementId,
        origin: Point,
        max_width: f64,
        text: String,
        font_family: String,
        font_size: f64,
        fill: String,
    },
    Image {
        id: ElementId,
        origin: Point,
        width: f64,
        height: f64,
        src: String,
        opacity: f64,
    },
    /// Stroked path: connectors, freehand strokes, and `path` elements.
    Stroke {
        id: ElementId,
        command: String,
        color: String,
        width: f64,
        start_cap: LineCap,
        end_cap: LineCap,
        join: LineJoin,
    },
    /// Filled arrowhead triangle of a connector.
    Arrowhead { id: ElementId, command: String, color: String },
}

impl Primitive {
    /// Element this primitive belongs to.
    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Self::Rect { id, .. }
            | Self::Ellipse { id, .. }
            | Self::Text { id, .. }
            | Self::Image { id, .. }
            | Self::Stroke { id, .. }
            | Self::Arrowhead { id, .. } => *id,
        }
    }
}

/// Interactive decoration drawn above the elements. Radii are in stage units.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Per-side anchor circle shown while the line tool hovers an element.
    AnchorHandle { owner: ElementId, side: Side, center: Point, radius: f64 },
    /// Draggable end of the selected line.
    EndpointHandle { id: ElementId, end: LineEnd, center: Point, radius: f64 },
    /// Draggable Bezier control of the selected curved line.
    ControlHandle { id: ElementId, control: ControlPoint, center: Point, radius: f64 },
    /// Guide from a line end to its control point.
    ControlArm { id: ElementId, from: Point, to: Point },
    /// Dashed bounds around a selected element.
    SelectionBounds { id: ElementId, origin: Point, width: f64, height: f64 },
    /// Square resize handle of the single selected box.
    ResizeHandle { id: ElementId, handle: ResizeHandle, center: Point, half_size: f64 },
    /// Rubber-band rectangle of a marquee drag.
    Marquee { origin: Point, width: f64, height: f64 },
    /// Comment marker.
    CommentPin { position: Point, color: String, resolved: bool, selected: bool },
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub camera: Camera,
    pub primitives: Vec<Primitive>,
    pub overlays: Vec<Overlay>,
}

/// Read-only inputs to [`build_scene`].
pub struct SceneInput<'a, S: ElementStore> {
    pub store: &'a S,
    pub camera: Camera,
    pub ui: &'a UiState,
    pub tool: Tool,
    pub comments: &'a CommentStore,
    /// Marquee rectangle being dragged, if any.
    pub marquee: Option<Bounds>,
    /// Text element hidden under the host's editor.
    pub editing: Option<ElementId>,
}

/// Build the frame: elements bottom-first, then overlays.
#[must_use]
pub fn build_scene<S: ElementStore>(input: &SceneInput<'_, S>) -> Scene {
    let mut primitives = Vec::new();
    for el in input.store.elements().iter().filter(|el| Some(el.id) != input.editing) {
        element_primitives(el, &mut primitives);
    }

    let zoom = usable_zoom(input.camera.zoom);
    let mut overlays = Vec::new();

    if input.tool == Tool::Line {
        if let Some(el) = input.ui.hovered_id.and_then(|id| input.store.element(&id)) {
            overlays.extend(anchor_overlays(el, zoom));
        }
    }
    match input.store.selected_ids() {
        [] => {}
        [only] => {
            if let Some(el) = input.store.element(only) {
                overlays.extend(selection_overlays(el, zoom));
            }
        }
        many => overlays.extend(many.iter().filter_map(|id| input.store.element(id)).map(bounds_overlay)),
    }
    if let Some(m) = input.marquee {
        overlays.push(Overlay::Marquee { origin: m.min, width: m.width(), height: m.height() });
    }

    let selected_comment = input.comments.selected_comment();
    for c in input.comments.comments().iter().filter(|c| c.is_visible) {
        overlays.push(Overlay::CommentPin {
            position: c.position,
            color: c.color.clone(),
            resolved: c.is_resolved,
            selected: selected_comment == Some(c.id),
        });
    }

    Scene { camera: input.camera, primitives, overlays }
}

/// Primitives for one element, appended in paint order.
pub fn element_primitives(el: &CanvasElement, out: &mut Vec<Primitive>) {
    let style = &el.style;
    match &el.data {
        ElementData::Rect { rx, ry } => out.push(Primitive::Rect {
            id: el.id,
            origin: el.position,
            width: el.size.width,
            height: el.size.height,
            corner_radius: rx.max(*ry),
            fill: style.fill.clone().unwrap_or_else(|| DEFAULT_FILL.to_owned()),
            stroke: style.stroke.clone(),
            stroke_width: style.stroke_width.unwrap_or(1.0),
        }),
        ElementData::Circle { radius } => out.push(Primitive::Ellipse {
            id: el.id,
            center: el.center(),
            radius_x: if el.size.width > 0.0 { el.size.width * 0.5 } else { *radius },
            radius_y: if el.size.height > 0.0 { el.size.height * 0.5 } else { *radius },
            fill: style.fill.clone().unwrap_or_else(|| DEFAULT_FILL.to_owned()),
            stroke: style.stroke.clone(),
            stroke_width: style.stroke_width.unwrap_or(1.0),
        }),
        ElementData::Text { text, max_width } => out.push(Primitive::Text {
            id: el.id,
            origin: el.position,
            max_width: max_width.unwrap_or(el.size.width),
            text: text.clone(),
            font_family: style.font_family.clone().unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_owned()),
            font_size: style.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            fill: style.fill.clone().unwrap_or_else(|| DEFAULT_TEXT_FILL.to_owned()),
        }),
        ElementData::Image { src, .. } => out.push(Primitive::Image {
            id: el.id,
            origin: el.position,
            width: el.size.width,
            height: el.size.height,
            src: src.clone(),
            opacity: style.opacity.unwrap_or(1.0),
        }),
        ElementData::Line(line) => {
            let path = route_line(line, style);
            let color = style.stroke_or_default().to_owned();
            // Freehand and straight lines honor the element's own cap.
            let cap = style.line_cap.unwrap_or(LineCap::Round);
            let (start_cap, end_cap) = match line.connector {
                ConnectorKind::Orthogonal { .. } => (path.start_cap, path.end_cap),
                ConnectorKind::Straight | ConnectorKind::Curved { .. } => (cap, cap),
            };
            out.push(Primitive::Stroke {
                id: el.id,
                command: path.command,
                color: color.clone(),
                width: style.stroke_width_or_default(),
                start_cap,
                end_cap,
                join: style.line_join.unwrap_or(LineJoin::Round),
            });
            for arrow in &path.arrows {
                out.push(Primitive::Arrowhead { id: el.id, command: arrow.command(), color: color.clone() });
            }
        }
        ElementData::Path { path } => out.push(Primitive::Stroke {
            id: el.id,
            command: path.clone(),
            color: style.stroke_or_default().to_owned(),
            width: style.stroke_width_or_default(),
            start_cap: style.line_cap.unwrap_or(LineCap::Round),
            end_cap: style.line_cap.unwrap_or(LineCap::Round),
            join: style.line_join.unwrap_or(LineJoin::Round),
        }),
        // Groups draw through their children; connection points are invisible.
        ElementData::Group { .. } | ElementData::ConnectionPoint { .. } => {}
    }
}

/// Anchor handles of a box element, sized for the current zoom.
#[must_use]
pub fn anchor_overlays(el: &CanvasElement, zoom: f64) -> Vec<Overlay> {
    if !el.kind().is_box() {
        return Vec::new();
    }
    let radius = ANCHOR_HANDLE_RADIUS_PX / zoom;
    side_anchors(el)
        .into_iter()
        .map(|a| Overlay::AnchorHandle { owner: a.owner, side: a.side, center: a.point, radius })
        .collect()
}

/// Handles for the selected element: line ends and controls, or box bounds
/// with resize handles.
#[must_use]
pub fn selection_overlays(el: &CanvasElement, zoom: f64) -> Vec<Overlay> {
    let Some(line) = el.as_line() else {
        let half_size = RESIZE_HANDLE_HALF_PX / zoom;
        let mut out = vec![bounds_overlay(el)];
        out.extend(ResizeHandle::for_element(el).iter().map(|&handle| Overlay::ResizeHandle {
            id: el.id,
            handle,
            center: handle.center(el),
            half_size,
        }));
        return out;
    };

    let mut out = Vec::with_capacity(6);
    if let ConnectorKind::Curved { control1, control2 } = line.connector {
        let radius = CONTROL_HANDLE_RADIUS_PX / zoom;
        out.push(Overlay::ControlArm { id: el.id, from: line.start(), to: control1 });
        out.push(Overlay::ControlArm { id: el.id, from: line.end(), to: control2 });
        out.push(Overlay::ControlHandle { id: el.id, control: ControlPoint::First, center: control1, radius });
        out.push(Overlay::ControlHandle { id: el.id, control: ControlPoint::Second, center: control2, radius });
    }
    let radius = ENDPOINT_HANDLE_RADIUS_PX / zoom;
    out.push(Overlay::EndpointHandle { id: el.id, end: LineEnd::Start, center: line.start(), radius });
    out.push(Overlay::EndpointHandle { id: el.id, end: LineEnd::End, center: line.end(), radius });
    out
}

fn bounds_overlay(el: &CanvasElement) -> Overlay {
    let b = el.bounds();
    Overlay::SelectionBounds { id: el.id, origin: b.min, width: b.width(), height: b.height() }
}

fn usable_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 }
}
