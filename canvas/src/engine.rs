//! Engine facade: raw pointer, wheel, and key events in; store mutations and
//! host [`Action`]s out.
//!
//! `EngineCore` owns every piece of editor state (document, camera, tools,
//! gesture state, connector session, undo history, comments) and never talks
//! to a drawing surface. The host feeds it screen-space events, paints
//! [`EngineCore::scene`], and persists whatever the returned actions describe.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, info};

use crate::bezier;
use crate::camera::Camera;
use crate::comment::{CommentId, CommentStore, NewComment, PendingComment};
use crate::connector::{ConnectorEvent, ConnectorMachine, ConnectorOptions, ConnectorOutcome};
use crate::consts::{
    IMAGE_DEFAULT_SIZE, MARQUEE_MIN_EXTENT, MIN_ELEMENT_SIZE, RECT_DEFAULT_SIZE, SNAP_THRESHOLD_PX, TEXT_DEFAULT_SIZE,
    WHEEL_ZOOM_FACTOR, ZOOM_MAX, ZOOM_MIN,
};
use crate::doc::{
    CanvasElement, ConnectorKind, DocStore, ElementData, ElementId, ElementKind, ElementPatch, ElementStore,
    ElementStyle, LineData, Size,
};
use crate::geom::{Bounds, Point, sub};
use crate::history::UndoHistory;
use crate::hit::{self, ControlPoint, HitPart, LineEnd, ResizeHandle};
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::render::{Scene, SceneInput, build_scene};
use crate::tool::{ConnectionType, ToolOptions, ToolStore};

const TEXT_PLACEHOLDER: &str = "Double-click to edit";
const IMAGE_ALT: &str = "Uploaded image";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementCreated(CanvasElement),
    ElementUpdated { id: ElementId, patch: ElementPatch },
    ElementDeleted { id: ElementId },
    /// The whole element list was replaced (undo); re-read it from the engine.
    DocumentRestored,
    /// The comment tool was clicked; the host collects content and calls
    /// [`EngineCore::add_comment`].
    CommentRequested { position: Point, element_id: Option<ElementId> },
    /// The image tool was clicked; the host picks a source and calls
    /// [`EngineCore::insert_image`].
    ImageRequested,
    /// A text element was double-clicked; the host opens an editor seeded with
    /// `text` and answers with [`EngineCore::commit_text`] or
    /// [`EngineCore::cancel_text_edit`].
    TextEditRequested { id: ElementId, text: String },
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state.
pub struct EngineCore {
    pub doc: DocStore,
    pub camera: Camera,
    pub tools: ToolStore,
    pub ui: UiState,
    pub input: InputState,
    pub connector: ConnectorMachine,
    pub history: UndoHistory<Vec<CanvasElement>>,
    pub comments: CommentStore,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Document state before the current gesture, recorded on its first change.
    gesture_snapshot: Option<Vec<CanvasElement>>,
    /// Whether the current gesture has changed the document.
    gesture_dirty: bool,
    /// Text element whose content is open in the host's editor.
    editing_text: Option<ElementId>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: DocStore::new(),
            camera: Camera::default(),
            tools: ToolStore::new(),
            ui: UiState::default(),
            input: InputState::default(),
            connector: ConnectorMachine::new(),
            history: UndoHistory::new(),
            comments: CommentStore::new(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            gesture_snapshot: None,
            gesture_dirty: false,
            editing_text: None,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the document with a stored element list. Clears undo history.
    pub fn load_snapshot(&mut self, elements: Vec<CanvasElement>) {
        self.reset_gesture();
        self.doc.load_snapshot(elements);
        self.history.clear();
    }

    /// Insert an element supplied by the host, without recording history.
    pub fn apply_create(&mut self, element: CanvasElement) {
        self.doc.add_element(element);
    }

    // --- Tool / viewport ---

    /// Switch tools, abandoning any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.reset_gesture();
        self.ui.hovered_id = None;
        self.tools.set_active_tool(tool);
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if !self.camera.is_usable() {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);
        self.ui.pointer = Some(world);

        match button {
            Button::Middle => self.begin_pan(screen_pt),
            Button::Secondary => Vec::new(),
            Button::Primary => match self.tools.active_tool() {
                Tool::Pan => self.begin_pan(screen_pt),
                Tool::Select => self.select_down(world),
                Tool::Line => self.connector_down(world),
                Tool::Pen => self.pen_down(world),
                Tool::Rect => self.create_rect(world),
                Tool::Text => self.create_text(world),
                Tool::Image => vec![Action::ImageRequested],
                Tool::Comment => self.request_comment(world),
            },
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        if !self.camera.is_usable() {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);
        self.ui.pointer = Some(world);

        if self.connector.is_active() || (self.tools.active_tool() == Tool::Line && self.input == InputState::Idle) {
            return self.connector_move(world, modifiers);
        }

        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                self.camera.pan_by(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::RenderNeeded]
            }
            InputState::DraggingElement { id, last_world } => {
                let delta = sub(world, last_world);
                self.input = InputState::DraggingElement { id, last_world: world };
                if delta.x == 0.0 && delta.y == 0.0 {
                    return Vec::new();
                }
                self.edit_during_gesture(id, |el| translated(el, delta))
            }
            InputState::DraggingEndpoint { id, end } => self.edit_during_gesture(id, |el| with_endpoint(el, end, world)),
            InputState::DraggingControl { id, control } => {
                self.edit_during_gesture(id, |el| with_control(el, control, world))
            }
            InputState::DrawingStroke { id } => {
                let Some(mut points) = self.doc.element(&id).and_then(CanvasElement::as_line).map(|l| l.points.clone())
                else {
                    self.input = InputState::Idle;
                    return Vec::new();
                };
                points.push(world);
                self.doc.update_element(&id, &ElementPatch::points(points));
                vec![Action::RenderNeeded]
            }
            InputState::DraggingSelection { last_world } => {
                let delta = sub(world, last_world);
                self.input = InputState::DraggingSelection { last_world: world };
                if delta.x == 0.0 && delta.y == 0.0 {
                    return Vec::new();
                }
                self.move_selection(delta)
            }
            InputState::Resizing { id, handle, origin, grab } => {
                let delta = sub(world, grab);
                self.edit_during_gesture(id, |el| resized(el, handle, origin, delta))
            }
            InputState::Marquee { start, .. } => {
                self.input = InputState::Marquee { start, current: world };
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, modifiers: Modifiers) -> Vec<Action> {
        if !self.camera.is_usable() {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);
        self.ui.pointer = Some(world);

        if self.connector.is_active() {
            return self.connector_up(world, modifiers);
        }

        let input = std::mem::take(&mut self.input);
        let dirty = std::mem::take(&mut self.gesture_dirty);
        self.gesture_snapshot = None;

        match input {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } => vec![Action::SetCursor("default".into())],
            InputState::DraggingElement { id, .. }
            | InputState::DraggingEndpoint { id, .. }
            | InputState::DraggingControl { id, .. }
            | InputState::Resizing { id, .. } => {
                if dirty {
                    self.updated(id)
                } else {
                    Vec::new()
                }
            }
            InputState::DraggingSelection { .. } => {
                if dirty {
                    self.updated_selection()
                } else {
                    Vec::new()
                }
            }
            InputState::DrawingStroke { id } => match self.doc.element(&id) {
                Some(el) => vec![Action::ElementCreated(el.clone()), Action::RenderNeeded],
                None => Vec::new(),
            },
            InputState::Marquee { start, .. } => self.finish_marquee(Bounds::from_corners(start, world)),
        }
    }

    /// Double-click opens the editor on a text element under the pointer.
    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        if !self.camera.is_usable() || self.tools.active_tool() != Tool::Select {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);
        match hit::element_at(world, &self.doc, self.camera.zoom, None) {
            Some(id) => self.begin_text_edit(id),
            None => Vec::new(),
        }
    }

    /// Zoom about the pointer: scrolling up zooms in by one step.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if !self.camera.is_usable() || delta.dy == 0.0 {
            return Vec::new();
        }
        let step = if delta.dy < 0.0 { WHEEL_ZOOM_FACTOR } else { 1.0 / WHEEL_ZOOM_FACTOR };
        let target = (self.camera.zoom * step).clamp(ZOOM_MIN, ZOOM_MAX);
        if (target - self.camera.zoom).abs() < f64::EPSILON {
            return Vec::new();
        }
        self.camera.set_zoom_at(screen_pt, target);
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        // The host's text editor owns the keyboard until it commits or cancels.
        if self.editing_text.is_some() {
            return if key.as_str() == "Escape" { self.cancel_text_edit() } else { Vec::new() };
        }
        match key.as_str() {
            "Escape" => self.escape(),
            "Delete" | "Backspace" => self.delete_selected(),
            k if modifiers.command() => {
                if k.eq_ignore_ascii_case("z") {
                    self.undo()
                } else {
                    Vec::new()
                }
            }
            k if !modifiers.alt => match self.tools.tool_for_shortcut(k) {
                Some(tool) => {
                    self.set_tool(tool);
                    vec![Action::RenderNeeded]
                }
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    // --- Element creation ---

    /// Place a rectangle with its top-left corner at `at`, using the rect tool's options.
    pub fn create_rect(&mut self, at: Point) -> Vec<Action> {
        let opts = self.tools.options(Tool::Rect);
        let style = ElementStyle {
            fill: Some(opts.fill_color.unwrap_or_else(|| "transparent".into())),
            stroke: Some(opts.stroke_color.unwrap_or_else(|| "#000000".into())),
            stroke_width: Some(opts.stroke_width.unwrap_or(2.0)),
            ..ElementStyle::default()
        };
        let (w, h) = RECT_DEFAULT_SIZE;
        self.place(CanvasElement::new(ElementData::Rect { rx: 0.0, ry: 0.0 }, at, Size::new(w, h), style))
    }

    /// Place a placeholder text box at `at`, using the text tool's options.
    pub fn create_text(&mut self, at: Point) -> Vec<Action> {
        let opts = self.tools.options(Tool::Text);
        let style = ElementStyle {
            font_size: Some(opts.font_size.unwrap_or(24.0)),
            font_family: Some(opts.font_family.unwrap_or_else(|| "Arial".into())),
            fill: Some(opts.fill_color.unwrap_or_else(|| "#000000".into())),
            ..ElementStyle::default()
        };
        let (w, h) = TEXT_DEFAULT_SIZE;
        let data = ElementData::Text { text: TEXT_PLACEHOLDER.into(), max_width: None };
        self.place(CanvasElement::new(data, at, Size::new(w, h), style))
    }

    /// Insert an image centered in the visible viewport.
    pub fn insert_image(&mut self, src: impl Into<String>) -> Vec<Action> {
        let (w, h) = IMAGE_DEFAULT_SIZE;
        let (origin, vw, vh) = self.camera.visible_world_rect(self.viewport_width, self.viewport_height);
        let at = Point::new(origin.x + vw * 0.5 - w * 0.5, origin.y + vh * 0.5 - h * 0.5);
        let data = ElementData::Image { src: src.into(), alt: Some(IMAGE_ALT.into()) };
        let style = ElementStyle { opacity: Some(1.0), ..ElementStyle::default() };
        self.place(CanvasElement::new(data, at, Size::new(w, h), style))
    }

    // --- Line styling ---

    /// Switch the selected line's connector kind, or the line tool's default
    /// when no line is selected.
    pub fn set_connection_type(&mut self, connection_type: ConnectionType) -> Vec<Action> {
        self.update_line_options(&ToolOptions { connection_type: Some(connection_type), ..ToolOptions::default() })
    }

    /// Apply line toolbar edits to the selected line, or to the line tool's
    /// options when no line is selected.
    pub fn update_line_options(&mut self, patch: &ToolOptions) -> Vec<Action> {
        let Some(el) = self.selected_line() else {
            self.tools.update_tool_options(Tool::Line, patch);
            return Vec::new();
        };
        let Some(line) = el.as_line() else {
            return Vec::new();
        };

        let mut defaults = self.tools.options(Tool::Line);
        defaults.merge(patch);
        let restyled = LineData { connector: restyle_connector(line, patch, &defaults), ..line.clone() };

        let mut style = el.style.clone();
        if let Some(ref color) = patch.stroke_color {
            style.stroke = Some(color.clone());
        }
        if let Some(width) = patch.stroke_width {
            style.stroke_width = Some(width);
        }

        if restyled == *line && style == el.style {
            return Vec::new();
        }
        let id = el.id;
        let edit = ElementPatch { style: Some(style), data: Some(ElementData::Line(restyled)), ..ElementPatch::default() };
        self.commit_edit(id, edit)
    }

    /// Apply rect toolbar edits (fill, stroke, stroke width, opacity, corner
    /// radius) to every selected rectangle, or to the rect tool's options when
    /// no rectangle is selected.
    pub fn update_rect_options(&mut self, patch: &ToolOptions) -> Vec<Action> {
        self.restyle_selection(Tool::Rect, ElementKind::Rect, patch, restyled_rect)
    }

    /// Apply text toolbar edits (color, opacity, font family, size, weight,
    /// alignment) to every selected text, or to the text tool's options when no
    /// text is selected.
    pub fn update_text_options(&mut self, patch: &ToolOptions) -> Vec<Action> {
        self.restyle_selection(Tool::Text, ElementKind::Text, patch, restyled_text)
    }

    /// Set the width and/or height of every selected box. With `keep_ratio`
    /// and a single dimension given, the other follows the element's current
    /// aspect ratio. Text boxes only take a width.
    pub fn set_selection_size(&mut self, width: Option<f64>, height: Option<f64>, keep_ratio: bool) -> Vec<Action> {
        let edits = self
            .doc
            .selected_ids()
            .iter()
            .filter_map(|id| self.doc.element(id))
            .filter_map(|el| sized(el, width, height, keep_ratio).map(|patch| (el.id, patch)))
            .collect();
        self.commit_edits(edits)
    }

    // --- Text editing ---

    /// Open the host's editor on a text element.
    pub fn begin_text_edit(&mut self, id: ElementId) -> Vec<Action> {
        let Some(ElementData::Text { text, .. }) = self.doc.element(&id).map(|el| &el.data) else {
            return Vec::new();
        };
        let text = text.clone();
        self.reset_gesture();
        self.doc.select_element(Some(id));
        self.editing_text = Some(id);
        vec![Action::TextEditRequested { id, text }, Action::RenderNeeded]
    }

    /// Write the editor's content into the text being edited and close the
    /// editor. Unchanged content records no history.
    pub fn commit_text(&mut self, text: impl Into<String>) -> Vec<Action> {
        let Some(id) = self.editing_text.take() else {
            return Vec::new();
        };
        let text = text.into();
        let Some(ElementData::Text { text: current, max_width }) = self.doc.element(&id).map(|el| &el.data) else {
            return vec![Action::RenderNeeded];
        };
        if *current == text {
            return vec![Action::RenderNeeded];
        }
        let data = ElementData::Text { text, max_width: *max_width };
        debug!(%id, "text edited");
        self.commit_edit(id, ElementPatch::data(data))
    }

    /// Close the editor, keeping the element's text.
    pub fn cancel_text_edit(&mut self) -> Vec<Action> {
        if self.editing_text.take().is_none() {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }

    // --- History ---

    /// Restore the snapshot taken before the last committed change.
    pub fn undo(&mut self) -> Vec<Action> {
        self.reset_gesture();
        let Some(snapshot) = self.history.undo() else {
            return Vec::new();
        };
        self.doc.load_snapshot(snapshot);
        debug!(remaining = self.history.len(), "undo");
        vec![Action::DocumentRestored, Action::RenderNeeded]
    }

    // --- Comments ---

    /// Create a comment at the pending position set by the comment tool.
    /// Returns `None` when no comment placement is pending.
    pub fn add_comment(&mut self, content: impl Into<String>, author: impl Into<String>) -> Option<CommentId> {
        let pending = self.comments.pending()?;
        let id = self.comments.add_comment(NewComment {
            content: content.into(),
            position: pending.position,
            element_id: pending.element_id,
            author: author.into(),
            color: None,
        });
        self.tools.set_active_tool(Tool::Select);
        Some(id)
    }

    // --- Queries ---

    /// The selected element when exactly one is selected.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.doc.selected()
    }

    /// Every selected element.
    #[must_use]
    pub fn selection_ids(&self) -> &[ElementId] {
        self.doc.selected_ids()
    }

    /// Text element open in the host's editor, if any.
    #[must_use]
    pub fn editing_text(&self) -> Option<ElementId> {
        self.editing_text
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.doc.element(id)
    }

    /// Draw list for the current frame.
    #[must_use]
    pub fn scene(&self) -> Scene {
        build_scene(&SceneInput {
            store: &self.doc,
            camera: self.camera,
            ui: &self.ui,
            tool: self.tools.active_tool(),
            comments: &self.comments,
            marquee: match self.input {
                InputState::Marquee { start, current } => Some(Bounds::from_corners(start, current)),
                _ => None,
            },
            editing: self.editing_text,
        })
    }

    // =============================================================
    // Gesture starts
    // =============================================================

    fn begin_pan(&mut self, screen_pt: Point) -> Vec<Action> {
        self.input = InputState::Panning { last_screen: screen_pt };
        vec![Action::SetCursor("grabbing".into())]
    }

    fn select_down(&mut self, world: Point) -> Vec<Action> {
        let Some(hit) = hit::hit_test(world, &self.doc, self.camera.zoom, self.doc.selected()) else {
            self.input = InputState::Marquee { start: world, current: world };
            if self.doc.selected_ids().is_empty() {
                return Vec::new();
            }
            self.doc.select_element(None);
            return vec![Action::RenderNeeded];
        };

        let id = hit.element_id;
        let selected = self.doc.selected_ids();
        let in_group = selected.len() > 1 && selected.contains(&id);
        if !in_group {
            self.doc.select_element(Some(id));
        }
        self.gesture_snapshot = Some(self.doc.snapshot());
        self.gesture_dirty = false;
        self.input = match hit.part {
            HitPart::Body if in_group => InputState::DraggingSelection { last_world: world },
            HitPart::Body => InputState::DraggingElement { id, last_world: world },
            HitPart::LineEndpoint(end) => InputState::DraggingEndpoint { id, end },
            HitPart::ControlHandle(control) => InputState::DraggingControl { id, control },
            HitPart::ResizeHandle(handle) => match self.doc.element(&id) {
                Some(el) => InputState::Resizing { id, handle, origin: el.bounds(), grab: world },
                None => InputState::Idle,
            },
        };
        vec![Action::RenderNeeded]
    }

    fn pen_down(&mut self, world: Point) -> Vec<Action> {
        let opts = self.tools.options(Tool::Pen);
        let stroke = CanvasElement::line(vec![world, world], ConnectorKind::Straight, opts.to_style());
        let id = stroke.id;
        self.history.record(self.doc.snapshot());
        self.doc.add_element(stroke);
        self.input = InputState::DrawingStroke { id };
        vec![Action::RenderNeeded]
    }

    fn request_comment(&mut self, world: Point) -> Vec<Action> {
        let element_id = hit::element_at(world, &self.doc, self.camera.zoom, None);
        self.comments.set_pending(Some(PendingComment { position: world, element_id }));
        vec![Action::CommentRequested { position: world, element_id }]
    }

    fn place(&mut self, element: CanvasElement) -> Vec<Action> {
        self.history.record(self.doc.snapshot());
        let id = element.id;
        debug!(%id, kind = ?element.kind(), "element placed");
        self.doc.add_element(element.clone());
        self.doc.select_element(Some(id));
        self.tools.set_active_tool(Tool::Select);
        vec![Action::ElementCreated(element), Action::RenderNeeded]
    }

    // =============================================================
    // Connector tool
    // =============================================================

    fn connector_options(&self, start: Point) -> ConnectorOptions {
        let opts = self.tools.options(Tool::Line);
        ConnectorOptions {
            connector: opts.connector_kind(start, start),
            style: opts.to_style(),
            snap_threshold: self.camera.screen_dist_to_world(SNAP_THRESHOLD_PX),
        }
    }

    fn connector_down(&mut self, world: Point) -> Vec<Action> {
        let zoom = self.camera.zoom;
        let handle = self
            .ui
            .hovered_id
            .and_then(|id| self.doc.element(&id))
            .and_then(|el| hit::anchor_handle_at(world, el, zoom));
        let (point, target) = match handle {
            Some(anchor) => (anchor.point, Some(anchor.owner)),
            None => (world, hit::box_element_at(world, &self.doc, None)),
        };

        let snapshot = self.doc.snapshot();
        let options = self.connector_options(point);
        match self.connector.handle(ConnectorEvent::PointerDown { point, target }, &mut self.doc, &options) {
            ConnectorOutcome::Started(_) => {
                self.gesture_snapshot = Some(snapshot);
                vec![Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    fn connector_move(&mut self, world: Point, modifiers: Modifiers) -> Vec<Action> {
        let preview = self.connector.session().map(|s| s.preview_id);
        let hover = hit::box_element_at(world, &self.doc, preview);

        if !self.connector.is_active() {
            // Anchor handles overhang the box; keep the hover while over one.
            let zoom = self.camera.zoom;
            let on_handle = self.ui.hovered_id.filter(|id| {
                self.doc.element(id).and_then(|el| hit::anchor_handle_at(world, el, zoom)).is_some()
            });
            let hover = hover.or(on_handle);
            let hover_changed = hover != self.ui.hovered_id;
            self.ui.hovered_id = hover;
            return if hover_changed { vec![Action::RenderNeeded] } else { Vec::new() };
        }
        self.ui.hovered_id = hover;

        let options = self.connector_options(world);
        let event = ConnectorEvent::PointerMove { point: world, hover, constrain: modifiers.shift };
        match self.connector.handle(event, &mut self.doc, &options) {
            ConnectorOutcome::Previewed(_) => vec![Action::RenderNeeded],
            ConnectorOutcome::Discarded(_) => {
                self.gesture_snapshot = None;
                vec![Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    fn connector_up(&mut self, world: Point, modifiers: Modifiers) -> Vec<Action> {
        let preview = self.connector.session().map(|s| s.preview_id);
        let hover = hit::box_element_at(world, &self.doc, preview);
        let options = self.connector_options(world);
        let snapshot = self.gesture_snapshot.take();

        let event = ConnectorEvent::PointerUp { point: world, hover, constrain: modifiers.shift };
        match self.connector.handle(event, &mut self.doc, &options) {
            ConnectorOutcome::Committed(id) => {
                self.place_initial_controls(id);
                if let Some(snapshot) = snapshot {
                    self.history.record(snapshot);
                }
                info!(%id, "connector created");
                match self.doc.element(&id) {
                    Some(el) => vec![Action::ElementCreated(el.clone()), Action::RenderNeeded],
                    None => Vec::new(),
                }
            }
            ConnectorOutcome::Discarded(_) => vec![Action::RenderNeeded],
            _ => Vec::new(),
        }
    }

    /// Curved connectors start with controls on the start point; spread them
    /// once both ends are known.
    fn place_initial_controls(&mut self, id: ElementId) {
        let Some(line) = self.doc.element(&id).and_then(CanvasElement::as_line) else {
            return;
        };
        if !matches!(line.connector, ConnectorKind::Curved { .. }) {
            return;
        }
        let curved = LineData { connector: bezier::curved_kind(line.start(), line.end()), ..line.clone() };
        self.doc.update_element(&id, &ElementPatch::data(ElementData::Line(curved)));
    }

    // =============================================================
    // Keyboard
    // =============================================================

    fn escape(&mut self) -> Vec<Action> {
        if self.connector.is_active() {
            self.reset_gesture();
            return vec![Action::RenderNeeded];
        }
        if self.input != InputState::Idle {
            let input = self.input;
            let dirty = self.gesture_dirty;
            self.reset_gesture();
            return match input {
                InputState::DraggingSelection { .. } if dirty => self.updated_selection(),
                _ => match input.target() {
                    Some(id) if dirty => self.updated(id),
                    _ => vec![Action::RenderNeeded],
                },
            };
        }
        if self.comments.pending().is_some() {
            self.comments.set_pending(None);
            return vec![Action::RenderNeeded];
        }
        if !self.doc.selected_ids().is_empty() {
            self.doc.select_element(None);
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    /// Delete every selected element as one undo step.
    fn delete_selected(&mut self) -> Vec<Action> {
        if self.connector.is_active() || self.input != InputState::Idle {
            return Vec::new();
        }
        let ids = self.doc.selected_ids().to_vec();
        if ids.is_empty() {
            return Vec::new();
        }
        let snapshot = self.doc.snapshot();
        let mut actions = Vec::with_capacity(ids.len() + 1);
        for id in ids {
            if self.doc.remove_element(&id).is_some() {
                debug!(%id, "element deleted");
                actions.push(Action::ElementDeleted { id });
            }
        }
        if actions.is_empty() {
            return actions;
        }
        self.history.record(snapshot);
        actions.push(Action::RenderNeeded);
        actions
    }

    // =============================================================
    // Selection
    // =============================================================

    /// Select every element the marquee touches. A click-sized marquee or one
    /// that touches nothing leaves the selection as it is.
    fn finish_marquee(&mut self, area: Bounds) -> Vec<Action> {
        if area.width() < MARQUEE_MIN_EXTENT && area.height() < MARQUEE_MIN_EXTENT {
            return vec![Action::RenderNeeded];
        }
        let ids: Vec<ElementId> =
            self.doc.elements().iter().filter(|el| marquee_selects(el, &area)).map(|el| el.id).collect();
        if !ids.is_empty() {
            debug!(count = ids.len(), "marquee selection");
            self.doc.select_elements(&ids);
        }
        vec![Action::RenderNeeded]
    }

    /// Move every selected element by `delta`.
    fn move_selection(&mut self, delta: Point) -> Vec<Action> {
        let edits: Vec<(ElementId, ElementPatch)> = self
            .doc
            .selected_ids()
            .iter()
            .filter_map(|id| self.doc.element(id))
            .filter_map(|el| translated(el, delta).map(|patch| (el.id, patch)))
            .collect();
        if edits.is_empty() {
            return Vec::new();
        }
        self.mark_gesture_dirty();
        for (id, patch) in &edits {
            self.doc.update_element(id, patch);
        }
        vec![Action::RenderNeeded]
    }

    /// Apply a per-element restyle to the selected elements of `kind`, or
    /// merge `patch` into `tool`'s options when none is selected.
    fn restyle_selection(
        &mut self,
        tool: Tool,
        kind: ElementKind,
        patch: &ToolOptions,
        restyle: fn(&CanvasElement, &ToolOptions) -> ElementPatch,
    ) -> Vec<Action> {
        let targets: Vec<&CanvasElement> =
            self.doc.selected_ids().iter().filter_map(|id| self.doc.element(id)).filter(|el| el.kind() == kind).collect();
        if targets.is_empty() {
            self.tools.update_tool_options(tool, patch);
            return Vec::new();
        }
        let edits = targets
            .into_iter()
            .map(|el| (el.id, restyle(el, patch)))
            .filter(|(_, edit)| !edit.is_empty())
            .collect();
        self.commit_edits(edits)
    }

    // =============================================================
    // Helpers
    // =============================================================

    /// End any gesture or connector session, discarding a connector draft.
    fn reset_gesture(&mut self) {
        if self.connector.is_active() {
            let options = self.connector_options(Point::default());
            self.connector.handle(ConnectorEvent::Cancel, &mut self.doc, &options);
        }
        self.input = InputState::Idle;
        self.gesture_snapshot = None;
        self.gesture_dirty = false;
        self.editing_text = None;
    }

    /// Apply an edit computed from the target element during a drag, recording
    /// the pre-gesture snapshot on the first change.
    fn edit_during_gesture<F>(&mut self, id: ElementId, edit: F) -> Vec<Action>
    where
        F: FnOnce(&CanvasElement) -> Option<ElementPatch>,
    {
        let Some(patch) = self.doc.element(&id).and_then(edit) else {
            return Vec::new();
        };
        self.mark_gesture_dirty();
        self.doc.update_element(&id, &patch);
        vec![Action::RenderNeeded]
    }

    /// Record the pre-gesture snapshot the first time a gesture changes the document.
    fn mark_gesture_dirty(&mut self) {
        if self.gesture_dirty {
            return;
        }
        if let Some(snapshot) = self.gesture_snapshot.take() {
            self.history.record(snapshot);
        }
        self.gesture_dirty = true;
    }

    /// Record a snapshot, then apply a one-shot edit.
    fn commit_edit(&mut self, id: ElementId, patch: ElementPatch) -> Vec<Action> {
        self.commit_edits(vec![(id, patch)])
    }

    /// Record one snapshot, then apply every edit. Edits the store rejects are
    /// skipped; nothing is recorded when all of them are.
    fn commit_edits(&mut self, edits: Vec<(ElementId, ElementPatch)>) -> Vec<Action> {
        let snapshot = self.doc.snapshot();
        let mut actions = Vec::with_capacity(edits.len() + 1);
        for (id, patch) in edits {
            if self.doc.update_element(&id, &patch) {
                actions.push(Action::ElementUpdated { id, patch });
            }
        }
        if actions.is_empty() {
            return actions;
        }
        self.history.record(snapshot);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Host update carrying the element's current geometry.
    fn updated(&self, id: ElementId) -> Vec<Action> {
        match self.geometry_update(id) {
            Some(action) => vec![action, Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Geometry updates for every selected element.
    fn updated_selection(&self) -> Vec<Action> {
        let mut actions: Vec<Action> = self.doc.selected_ids().iter().filter_map(|&id| self.geometry_update(id)).collect();
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn geometry_update(&self, id: ElementId) -> Option<Action> {
        let el = self.doc.element(&id)?;
        let patch = ElementPatch {
            position: Some(el.position),
            size: Some(el.size),
            data: Some(el.data.clone()),
            ..ElementPatch::default()
        };
        Some(Action::ElementUpdated { id, patch })
    }

    fn selected_line(&self) -> Option<&CanvasElement> {
        self.doc.selected().and_then(|id| self.doc.element(&id)).filter(|el| el.as_line().is_some())
    }
}

// =============================================================
// Geometry edits
// =============================================================

/// Move an element by `delta`. Lines shift every point and control.
fn translated(el: &CanvasElement, delta: Point) -> Option<ElementPatch> {
    let Some(line) = el.as_line() else {
        return Some(ElementPatch::position(el.position.offset(delta.x, delta.y)));
    };
    let points = line.points.iter().map(|p| p.offset(delta.x, delta.y)).collect();
    let connector = match line.connector {
        ConnectorKind::Curved { control1, control2 } => ConnectorKind::Curved {
            control1: control1.offset(delta.x, delta.y),
            control2: control2.offset(delta.x, delta.y),
        },
        other => other,
    };
    // A moved line no longer sits on its anchors.
    let moved = LineData { points, connector, from: None, to: None };
    Some(ElementPatch::data(ElementData::Line(moved)))
}

/// Rewrite one end of a line, detaching that end.
fn with_endpoint(el: &CanvasElement, end: LineEnd, at: Point) -> Option<ElementPatch> {
    let mut line = el.as_line()?.clone();
    match end {
        LineEnd::Start => {
            *line.points.first_mut()? = at;
            line.from = None;
        }
        LineEnd::End => {
            *line.points.last_mut()? = at;
            line.to = None;
        }
    }
    Some(ElementPatch::data(ElementData::Line(line)))
}

/// Rewrite one Bezier control of a curved line.
fn with_control(el: &CanvasElement, control: ControlPoint, at: Point) -> Option<ElementPatch> {
    let line = el.as_line()?;
    let ConnectorKind::Curved { control1, control2 } = line.connector else {
        return None;
    };
    let connector = match control {
        ControlPoint::First => ConnectorKind::Curved { control1: at, control2 },
        ControlPoint::Second => ConnectorKind::Curved { control1, control2: at },
    };
    Some(ElementPatch::data(ElementData::Line(LineData { connector, ..line.clone() })))
}

/// Box after dragging `handle` by `delta` from its `origin` bounds. A moved
/// edge stops `MIN_ELEMENT_SIZE` short of the fixed one; text keeps its height.
fn resized(el: &CanvasElement, handle: ResizeHandle, origin: Bounds, delta: Point) -> Option<ElementPatch> {
    if !ResizeHandle::for_element(el).contains(&handle) {
        return None;
    }
    let (x0, x1) = drag_edges(origin.min.x, origin.max.x, handle.x_edge(), delta.x);
    let (y0, y1) = drag_edges(origin.min.y, origin.max.y, handle.y_edge(), delta.y);
    let position = Point::new(x0, y0);
    let size = Size::new(x1 - x0, y1 - y0);
    if position == el.position && size == el.size {
        return None;
    }
    Some(ElementPatch {
        position: Some(position),
        size: Some(size),
        data: wrapped_text(el, size),
        ..ElementPatch::default()
    })
}

/// Edges `(lo, hi)` after dragging the `edge` side by `d`.
fn drag_edges(lo: f64, hi: f64, edge: i8, d: f64) -> (f64, f64) {
    match edge {
        -1 => ((lo + d).min(hi - MIN_ELEMENT_SIZE), hi),
        1 => (lo, (hi + d).max(lo + MIN_ELEMENT_SIZE)),
        _ => (lo, hi),
    }
}

/// Size edit for a box element. Non-finite values are ignored.
fn sized(el: &CanvasElement, width: Option<f64>, height: Option<f64>, keep_ratio: bool) -> Option<ElementPatch> {
    if ResizeHandle::for_element(el).is_empty() {
        return None;
    }
    let width = width.filter(|v| v.is_finite());
    let height = height.filter(|v| v.is_finite());
    let Size { width: w0, height: h0 } = el.size;
    let ratio = (keep_ratio && w0 > 0.0 && h0 > 0.0).then(|| w0 / h0);
    let (w, h) = match (width, height, ratio) {
        (Some(w), None, Some(r)) => (w, w / r),
        (None, Some(h), Some(r)) => (h * r, h),
        (w, h, _) => (w.unwrap_or(w0), h.unwrap_or(h0)),
    };
    let size = if el.kind() == ElementKind::Text {
        Size::new(w.max(MIN_ELEMENT_SIZE), h0)
    } else {
        Size::new(w.max(MIN_ELEMENT_SIZE), h.max(MIN_ELEMENT_SIZE))
    };
    if size == el.size {
        return None;
    }
    Some(ElementPatch { size: Some(size), data: wrapped_text(el, size), ..ElementPatch::default() })
}

/// Text with an explicit wrap width follows its box's new width.
fn wrapped_text(el: &CanvasElement, size: Size) -> Option<ElementData> {
    match &el.data {
        ElementData::Text { text, max_width: Some(_) } => {
            Some(ElementData::Text { text: text.clone(), max_width: Some(size.width) })
        }
        _ => None,
    }
}

/// Whether a marquee over `area` picks up `el`. Boxes thinner than
/// `MARQUEE_MIN_EXTENT` on either axis are skipped.
fn marquee_selects(el: &CanvasElement, area: &Bounds) -> bool {
    let b = el.bounds();
    let measurable = el.as_line().is_some() || (b.width() >= MARQUEE_MIN_EXTENT && b.height() >= MARQUEE_MIN_EXTENT);
    measurable && b.intersects(area)
}

/// Rect after a toolbar edit.
fn restyled_rect(el: &CanvasElement, patch: &ToolOptions) -> ElementPatch {
    let mut style = el.style.clone();
    if let Some(ref fill) = patch.fill_color {
        style.fill = Some(fill.clone());
    }
    if let Some(ref stroke) = patch.stroke_color {
        style.stroke = Some(stroke.clone());
    }
    if let Some(width) = patch.stroke_width.filter(|w| w.is_finite()) {
        style.stroke_width = Some(width.max(0.0));
    }
    if let Some(opacity) = patch.opacity.filter(|o| o.is_finite()) {
        style.opacity = Some(opacity.clamp(0.0, 1.0));
    }
    let data = patch
        .corner_radius
        .filter(|r| r.is_finite())
        .map(|r| ElementData::Rect { rx: r.max(0.0), ry: r.max(0.0) })
        .filter(|data| *data != el.data);
    ElementPatch { style: Some(style).filter(|s| *s != el.style), data, ..ElementPatch::default() }
}

/// Text after a toolbar edit.
fn restyled_text(el: &CanvasElement, patch: &ToolOptions) -> ElementPatch {
    let mut style = el.style.clone();
    if let Some(ref color) = patch.fill_color {
        style.fill = Some(color.clone());
    }
    if let Some(opacity) = patch.opacity.filter(|o| o.is_finite()) {
        style.opacity = Some(opacity.clamp(0.0, 1.0));
    }
    if let Some(ref family) = patch.font_family {
        style.font_family = Some(family.clone());
    }
    if let Some(size) = patch.font_size.filter(|s| s.is_finite() && *s > 0.0) {
        style.font_size = Some(size);
    }
    if let Some(ref weight) = patch.font_weight {
        style.font_weight = Some(weight.clone());
    }
    if let Some(align) = patch.text_align {
        style.text_align = Some(align);
    }
    ElementPatch { style: Some(style).filter(|s| *s != el.style), ..ElementPatch::default() }
}

/// Connector kind after a toolbar edit. A type change rebuilds the kind from
/// `defaults`; orthogonal fields present in `patch` always apply.
fn restyle_connector(line: &LineData, patch: &ToolOptions, defaults: &ToolOptions) -> ConnectorKind {
    let current = ConnectionType::of(&line.connector);
    let base = match patch.connection_type {
        Some(wanted) if wanted != current => defaults.connector_kind(line.start(), line.end()),
        _ => line.connector,
    };
    match base {
        ConnectorKind::Orthogonal { corner_radius, arrow_size, arrow_ends } => ConnectorKind::Orthogonal {
            corner_radius: patch.corner_radius.unwrap_or(corner_radius),
            arrow_size: patch.arrow_size.unwrap_or(arrow_size),
            arrow_ends: patch.arrow_ends.unwrap_or(arrow_ends),
        },
        other => other,
    }
}
