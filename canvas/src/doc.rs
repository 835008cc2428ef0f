//! Document model: canvas elements, their payloads, and the in-memory store.
//!
//! This module defines the data types that describe what is on the canvas
//! (`CanvasElement`, `ElementData`, `LineData`, `ConnectorKind`), a
//! sparse-update type for incremental edits (`ElementPatch`), the store
//! contract consumed by the connector session and the engine (`ElementStore`),
//! and the runtime store that owns all live elements (`DocStore`).
//!
//! Per-kind payloads are a closed sum: every render or edit site matches
//! `ElementData` / `ConnectorKind` exhaustively instead of probing a loose bag.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::anchor::Side;
use crate::consts::{DEFAULT_ARROW_SIZE, DEFAULT_CORNER_RADIUS};
use crate::geom::{Bounds, Point};

/// Unique identifier for a canvas element.
pub type ElementId = Uuid;

/// The kind of a canvas element, derived from its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Text,
    Image,
    Rect,
    Circle,
    Line,
    Path,
    Group,
    ConnectionPoint,
}

impl ElementKind {
    /// Whether `position`/`size` describe a real bounding box for this kind.
    ///
    /// Only box-like kinds expose anchors and act as connector targets.
    #[must_use]
    pub fn is_box(self) -> bool {
        matches!(self, Self::Text | Self::Image | Self::Rect | Self::Circle | Self::Group)
    }
}

/// Width and height of a bounding box in stage units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Stroke end cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// Stroke corner join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

/// Visual attributes. Opaque to routing except `stroke` and `stroke_width`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_cap: Option<LineCap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_join: Option<LineJoin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
}

impl ElementStyle {
    /// Stroke color, defaulting to the connector blue used by line rendering.
    #[must_use]
    pub fn stroke_or_default(&self) -> &str {
        self.stroke.as_deref().unwrap_or("#007bff")
    }

    /// Stroke width in stage units. Defaults to `3.0` when absent, as line rendering does.
    #[must_use]
    pub fn stroke_width_or_default(&self) -> f64 {
        self.stroke_width.unwrap_or(3.0)
    }
}

/// Which ends of an orthogonal connector carry an arrowhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowEnds {
    None,
    Start,
    #[default]
    End,
    Both,
}

impl ArrowEnds {
    /// Whether the first point carries an arrowhead.
    #[must_use]
    pub fn at_start(self) -> bool {
        matches!(self, Self::Start | Self::Both)
    }

    /// Whether the last point carries an arrowhead.
    #[must_use]
    pub fn at_end(self) -> bool {
        matches!(self, Self::End | Self::Both)
    }
}

/// How a line element's points are turned into a drawn path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "connectionType", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ConnectorKind {
    /// Polyline through every point.
    Straight,
    /// Cubic Bezier from the first to the last point through two stored controls.
    Curved { control1: Point, control2: Point },
    /// Rounded orthogonal route between the first and last point.
    Orthogonal { corner_radius: f64, arrow_size: f64, arrow_ends: ArrowEnds },
}

impl ConnectorKind {
    /// Orthogonal kind with the default corner radius, arrow size, and an end arrow.
    #[must_use]
    pub fn orthogonal_default() -> Self {
        Self::Orthogonal {
            corner_radius: DEFAULT_CORNER_RADIUS,
            arrow_size: DEFAULT_ARROW_SIZE,
            arrow_ends: ArrowEnds::End,
        }
    }
}

/// Element and side a connector end is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub element_id: ElementId,
    pub side: Side,
}

/// Payload of a `line` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineData {
    /// Ordered points; always at least two. First and last are the logical ends.
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub connector: ConnectorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Attachment>,
}

impl LineData {
    /// First point (logical start).
    #[must_use]
    pub fn start(&self) -> Point {
        self.points.first().copied().unwrap_or_default()
    }

    /// Last point (logical end).
    #[must_use]
    pub fn end(&self) -> Point {
        self.points.last().copied().unwrap_or_default()
    }
}

/// Which side/center of a parent element a connection point sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSlot {
    Top,
    Right,
    Bottom,
    Left,
    Center,
}

/// Per-kind payload. The variant determines the element's [`ElementKind`].
///
/// Serialized adjacently tagged, so an element reads `"type": "line"` beside
/// `"data": { "points": [...], "connectionType": "orthogonal", ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ElementData {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_width: Option<f64>,
    },
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Rect {
        rx: f64,
        ry: f64,
    },
    Circle {
        radius: f64,
    },
    Line(LineData),
    Path {
        path: String,
    },
    Group {
        children: Vec<ElementId>,
    },
    ConnectionPoint {
        parent_element_id: ElementId,
        slot: AnchorSlot,
        connections: Vec<ElementId>,
    },
}

impl ElementData {
    /// The element kind this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text { .. } => ElementKind::Text,
            Self::Image { .. } => ElementKind::Image,
            Self::Rect { .. } => ElementKind::Rect,
            Self::Circle { .. } => ElementKind::Circle,
            Self::Line(_) => ElementKind::Line,
            Self::Path { .. } => ElementKind::Path,
            Self::Group { .. } => ElementKind::Group,
            Self::ConnectionPoint { .. } => ElementKind::ConnectionPoint,
        }
    }
}

/// An element as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    /// Stable identifier for the element's lifetime.
    pub id: ElementId,
    /// Top-left corner for box-like kinds; zero for lines.
    pub position: Point,
    /// Bounding box for box-like kinds; zero for lines.
    pub size: Size,
    pub style: ElementStyle,
    #[serde(flatten)]
    pub data: ElementData,
    /// Stacking order; lower values are drawn beneath higher values.
    pub z_index: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl CanvasElement {
    /// Build a new element with a fresh id and current timestamps.
    #[must_use]
    pub fn new(data: ElementData, position: Point, size: Size, style: ElementStyle) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            position,
            size,
            style,
            data,
            z_index: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a `line` element. Position and size are zeroed; geometry lives in `points`.
    #[must_use]
    pub fn line(points: Vec<Point>, connector: ConnectorKind, style: ElementStyle) -> Self {
        Self::new(
            ElementData::Line(LineData { points, connector, from: None, to: None }),
            Point::default(),
            Size::default(),
            style,
        )
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    /// Line payload, if this is a line element.
    #[must_use]
    pub fn as_line(&self) -> Option<&LineData> {
        match &self.data {
            ElementData::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.position.x + self.size.width * 0.5, self.position.y + self.size.height * 0.5)
    }

    /// Stage-space extent. Lines span their points; other kinds their box.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match &self.data {
            ElementData::Line(line) => Bounds::enclosing(line.points.iter().copied()).unwrap_or_default(),
            _ => Bounds::from_corners(self.position, self.position.offset(self.size.width, self.size.height)),
        }
    }

    /// Whether `p` lies inside the bounding box (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        let (x0, x1) = ordered(self.position.x, self.position.x + self.size.width);
        let (y0, y1) = ordered(self.position.y, self.position.y + self.size.height);
        p.x >= x0 && p.x <= x1 && p.y >= y0 && p.y <= y1
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub style: Option<ElementStyle>,
    /// Full payload replacement. Must keep the element's kind.
    pub data: Option<ElementData>,
    /// Replace only a line's points, leaving its connector kind intact.
    pub points: Option<Vec<Point>>,
    pub z_index: Option<i64>,
}

impl ElementPatch {
    /// Patch that rewrites a line's points.
    #[must_use]
    pub fn points(points: Vec<Point>) -> Self {
        Self { points: Some(points), ..Self::default() }
    }

    /// Patch that moves a box element.
    #[must_use]
    pub fn position(position: Point) -> Self {
        Self { position: Some(position), ..Self::default() }
    }

    /// Patch that replaces the payload.
    #[must_use]
    pub fn data(data: ElementData) -> Self {
        Self { data: Some(data), ..Self::default() }
    }

    /// Patch that replaces the style.
    #[must_use]
    pub fn style(style: ElementStyle) -> Self {
        Self { style: Some(style), ..Self::default() }
    }

    /// Whether the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Store contract consumed by the connector session and the engine.
///
/// The routing core never holds element references across events; it reads
/// through `element`/`elements` and writes through `add`/`update`/`remove`.
pub trait ElementStore {
    /// Insert a new element at the top of the stacking order.
    fn add_element(&mut self, element: CanvasElement);
    /// Apply a sparse update. Returns false if the element is missing or the patch is invalid.
    fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> bool;
    /// Remove an element, returning it if present. Drops it from the selection.
    fn remove_element(&mut self, id: &ElementId) -> Option<CanvasElement>;
    /// Look up an element by id.
    fn element(&self, id: &ElementId) -> Option<&CanvasElement>;
    /// All elements in draw order (bottom first). Called on every pointer move.
    fn elements(&self) -> &[CanvasElement];
    /// Replace the selection with the listed ids that exist, dropping duplicates.
    fn select_elements(&mut self, ids: &[ElementId]);
    /// Every selected id, in selection order.
    fn selected_ids(&self) -> &[ElementId];

    /// Set or clear a single selected element.
    fn select_element(&mut self, id: Option<ElementId>) {
        self.select_elements(id.as_slice());
    }

    /// The selected element when exactly one is selected.
    fn selected(&self) -> Option<ElementId> {
        match self.selected_ids() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

/// In-memory element list plus the current selection.
///
/// The list is kept in draw order: sorted by `z_index`, with insertion order
/// kept among equal values so they draw oldest first.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    elements: Vec<CanvasElement>,
    selection: Vec<ElementId>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all elements with a snapshot. Drops selected ids that no longer exist.
    pub fn load_snapshot(&mut self, mut elements: Vec<CanvasElement>) {
        elements.sort_by_key(|e| e.z_index);
        self.elements = elements;
        let elements = &self.elements;
        self.selection.retain(|id| elements.iter().any(|e| e.id == *id));
    }

    /// Clone of the current element list, for history snapshots.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CanvasElement> {
        self.elements.clone()
    }

    /// Number of elements currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == *id)
    }

    /// Insert after every element with a `z_index` at or below the new one.
    fn insert_ordered(&mut self, element: CanvasElement) {
        let idx = self.elements.partition_point(|e| e.z_index <= element.z_index);
        self.elements.insert(idx, element);
    }
}

impl ElementStore for DocStore {
    fn add_element(&mut self, element: CanvasElement) {
        if let Some(idx) = self.position_of(&element.id) {
            if self.elements[idx].z_index == element.z_index {
                self.elements[idx] = element;
                return;
            }
            self.elements.remove(idx);
        }
        self.insert_ordered(element);
    }

    fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        let Some(idx) = self.position_of(id) else {
            return false;
        };
        if !patch_is_valid(&self.elements[idx], patch) {
            return false;
        }
        let el = &mut self.elements[idx];
        if let Some(position) = patch.position {
            el.position = position;
        }
        if let Some(size) = patch.size {
            el.size = size;
        }
        if let Some(ref style) = patch.style {
            el.style = style.clone();
        }
        if let Some(ref data) = patch.data {
            el.data = data.clone();
        }
        if let Some(ref points) = patch.points {
            if let ElementData::Line(line) = &mut el.data {
                line.points.clone_from(points);
            }
        }
        el.updated_at = OffsetDateTime::now_utc();
        if let Some(z) = patch.z_index {
            if el.z_index != z {
                let mut moved = self.elements.remove(idx);
                moved.z_index = z;
                self.insert_ordered(moved);
            }
        }
        true
    }

    fn remove_element(&mut self, id: &ElementId) -> Option<CanvasElement> {
        let idx = self.position_of(id)?;
        self.selection.retain(|s| s != id);
        Some(self.elements.remove(idx))
    }

    fn element(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == *id)
    }

    fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    fn select_elements(&mut self, ids: &[ElementId]) {
        let mut selection = Vec::with_capacity(ids.len());
        for id in ids {
            if !selection.contains(id) && self.position_of(id).is_some() {
                selection.push(*id);
            }
        }
        self.selection = selection;
    }

    fn selected_ids(&self) -> &[ElementId] {
        &self.selection
    }
}

/// Reject patches that would break a line's two-point minimum or change an element's kind.
fn patch_is_valid(el: &CanvasElement, patch: &ElementPatch) -> bool {
    if let Some(ref data) = patch.data {
        if data.kind() != el.kind() {
            return false;
        }
        if let ElementData::Line(line) = data {
            if line.points.len() < 2 {
                return false;
            }
        }
    }
    if let Some(ref points) = patch.points {
        if el.kind() != ElementKind::Line || points.len() < 2 {
            return false;
        }
    }
    true
}
