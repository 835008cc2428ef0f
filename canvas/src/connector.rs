//! Connector drag session: the state machine behind the line tool.
//!
//! A session starts on pointer-down, inserts a draft `line` element into the
//! store, rewrites that element's endpoints on every pointer-move, and on
//! pointer-up either keeps it (selecting it) or removes it when it is too short.
//! `Cancel` discards the draft at any point.
//!
//! Endpoint resolution depends on what the pointer hovers:
//!
//! - hovering another box element with a known start element: best anchor pair;
//! - hovering a box element from a free start: the side of the hovered element
//!   the travel direction (start point toward its center) exits through;
//! - hovering empty canvas: axis lock, then free snapping. A known start element
//!   then leaves through the side facing the end point.
//!
//! Hovering the start element itself counts as empty canvas.

#[cfg(test)]
#[path = "connector_test.rs"]
mod connector_test;

use tracing::{debug, trace};

use crate::anchor::side_anchor_toward;
use crate::consts::MIN_CONNECTOR_LEN_SQ;
use crate::doc::{
    Attachment, CanvasElement, ConnectorKind, ElementData, ElementId, ElementPatch, ElementStore, ElementStyle,
    LineData,
};
use crate::geom::{Point, distance_sq, sub};
use crate::routing::{apply_axis_constraint, choose_best_anchor_pair, snap_point};

/// Fields of one active connector drag.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorDragSession {
    /// Snapped pointer-down position.
    pub start_point: Point,
    /// Box element the drag started on, if any.
    pub start_element_id: Option<ElementId>,
    /// Id of the draft line living in the store.
    pub preview_id: ElementId,
    /// Element hovered at the last move, after filtering.
    pub hover_element_id: Option<ElementId>,
}

/// Discrete input delivered to the session, in stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectorEvent {
    /// `target` is the element under the pointer (or whose anchor handle was pressed).
    PointerDown { point: Point, target: Option<ElementId> },
    /// `constrain` is the Shift axis lock.
    PointerMove { point: Point, hover: Option<ElementId>, constrain: bool },
    PointerUp { point: Point, hover: Option<ElementId>, constrain: bool },
    Cancel,
}

/// Style and kind given to new connectors, plus the snap radius in stage units.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorOptions {
    pub connector: ConnectorKind,
    pub style: ElementStyle,
    pub snap_threshold: f64,
}

/// What a handled event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorOutcome {
    /// The event does not apply in the current state.
    Ignored,
    /// A session began and its draft line was inserted.
    Started(ElementId),
    /// The draft line's endpoints were refreshed.
    Previewed(ElementId),
    /// The draft became a real connector and is selected.
    Committed(ElementId),
    /// The draft was removed.
    Discarded(ElementId),
}

/// Endpoints and attachments resolved for one pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEnds {
    pub start: Point,
    pub end: Point,
    pub from: Option<Attachment>,
    pub to: Option<Attachment>,
}

/// Connector tool state. `Anchoring` is passed through immediately on
/// pointer-down, so only idle and previewing are observable.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConnectorMachine {
    #[default]
    Idle,
    Previewing(ConnectorDragSession),
}

impl ConnectorMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag session is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Previewing(_))
    }

    /// The open session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&ConnectorDragSession> {
        match self {
            Self::Idle => None,
            Self::Previewing(session) => Some(session),
        }
    }

    /// Advance the machine by one event, mutating `store` through its contract.
    pub fn handle<S: ElementStore>(
        &mut self,
        event: ConnectorEvent,
        store: &mut S,
        options: &ConnectorOptions,
    ) -> ConnectorOutcome {
        match event {
            ConnectorEvent::PointerDown { point, target } => self.begin(point, target, store, options),
            ConnectorEvent::PointerMove { point, hover, constrain } => {
                self.preview(point, hover, constrain, store, options.snap_threshold)
            }
            ConnectorEvent::PointerUp { point, hover, constrain } => {
                self.finish(point, hover, constrain, store, options.snap_threshold)
            }
            ConnectorEvent::Cancel => self.cancel(store),
        }
    }

    fn begin<S: ElementStore>(
        &mut self,
        point: Point,
        target: Option<ElementId>,
        store: &mut S,
        options: &ConnectorOptions,
    ) -> ConnectorOutcome {
        if self.is_active() {
            return ConnectorOutcome::Ignored;
        }
        let start_point = snap_point(point, store.elements(), options.snap_threshold);
        let start_element_id = target.filter(|id| is_box_element(store, id));

        let draft = CanvasElement::line(vec![start_point, start_point], options.connector, options.style.clone());
        let preview_id = draft.id;
        store.add_element(draft);
        debug!(%preview_id, start_element = ?start_element_id, "connector session started");

        *self = Self::Previewing(ConnectorDragSession {
            start_point,
            start_element_id,
            preview_id,
            hover_element_id: None,
        });
        ConnectorOutcome::Started(preview_id)
    }

    fn preview<S: ElementStore>(
        &mut self,
        point: Point,
        hover: Option<ElementId>,
        constrain: bool,
        store: &mut S,
        snap_threshold: f64,
    ) -> ConnectorOutcome {
        let Self::Previewing(session) = self else {
            return ConnectorOutcome::Ignored;
        };
        let preview_id = session.preview_id;
        if store.element(&preview_id).is_none() {
            // Draft vanished underneath us (undo, external delete).
            *self = Self::Idle;
            return ConnectorOutcome::Discarded(preview_id);
        }

        session.hover_element_id = effective_hover(session, hover, store);
        let ends = resolve_ends(session, point, constrain, store, snap_threshold);
        trace!(%preview_id, start = ?ends.start, end = ?ends.end, "connector preview");
        store.update_element(&preview_id, &ElementPatch::points(vec![ends.start, ends.end]));
        ConnectorOutcome::Previewed(preview_id)
    }

    fn finish<S: ElementStore>(
        &mut self,
        point: Point,
        hover: Option<ElementId>,
        constrain: bool,
        store: &mut S,
        snap_threshold: f64,
    ) -> ConnectorOutcome {
        let Self::Previewing(mut session) = std::mem::take(self) else {
            return ConnectorOutcome::Ignored;
        };
        let preview_id = session.preview_id;
        let Some(line) = store.element(&preview_id).and_then(CanvasElement::as_line).cloned() else {
            return ConnectorOutcome::Discarded(preview_id);
        };

        session.hover_element_id = effective_hover(&session, hover, store);
        let ends = resolve_ends(&session, point, constrain, store, snap_threshold);

        if distance_sq(ends.start, ends.end) < MIN_CONNECTOR_LEN_SQ {
            store.remove_element(&preview_id);
            debug!(%preview_id, "connector discarded: too short");
            return ConnectorOutcome::Discarded(preview_id);
        }

        let committed = LineData {
            points: vec![ends.start, ends.end],
            connector: line.connector,
            from: ends.from,
            to: ends.to,
        };
        if committed != line {
            store.update_element(&preview_id, &ElementPatch::data(ElementData::Line(committed)));
        }
        store.select_element(Some(preview_id));
        debug!(%preview_id, from = ?ends.from, to = ?ends.to, "connector committed");
        ConnectorOutcome::Committed(preview_id)
    }

    fn cancel<S: ElementStore>(&mut self, store: &mut S) -> ConnectorOutcome {
        let Self::Previewing(session) = std::mem::take(self) else {
            return ConnectorOutcome::Ignored;
        };
        store.remove_element(&session.preview_id);
        debug!(preview_id = %session.preview_id, "connector cancelled");
        ConnectorOutcome::Discarded(session.preview_id)
    }
}

/// Resolve both connector ends for the pointer at `point`.
///
/// Uses `session.hover_element_id` as the hovered element; it must already be
/// filtered (see [`ConnectorMachine`]). Missing elements fall back to the free
/// point policy.
#[must_use]
pub fn resolve_ends<S: ElementStore>(
    session: &ConnectorDragSession,
    point: Point,
    constrain: bool,
    store: &S,
    snap_threshold: f64,
) -> ResolvedEnds {
    let start_el = session.start_element_id.and_then(|id| store.element(&id));
    let hover_el = session.hover_element_id.and_then(|id| store.element(&id));

    match (start_el, hover_el) {
        (Some(source), Some(target)) => {
            let pair = choose_best_anchor_pair(source, target);
            ResolvedEnds {
                start: pair.start.point,
                end: pair.end.point,
                from: Some(Attachment { element_id: source.id, side: pair.start.side }),
                to: Some(Attachment { element_id: target.id, side: pair.end.side }),
            }
        }
        (None, Some(target)) => {
            let anchor = side_anchor_toward(target, sub(target.center(), session.start_point));
            ResolvedEnds {
                start: session.start_point,
                end: anchor.point,
                from: None,
                to: Some(Attachment { element_id: target.id, side: anchor.side }),
            }
        }
        (start_el, None) => {
            let locked = apply_axis_constraint(session.start_point, point, constrain);
            let end = snap_point(locked, store.elements(), snap_threshold);
            match start_el {
                Some(source) => {
                    let anchor = side_anchor_toward(source, sub(end, source.center()));
                    ResolvedEnds {
                        start: anchor.point,
                        end,
                        from: Some(Attachment { element_id: source.id, side: anchor.side }),
                        to: None,
                    }
                }
                None => ResolvedEnds { start: session.start_point, end, from: None, to: None },
            }
        }
    }
}

/// Hover target that may receive the connector end: an existing box element
/// other than the start element and the draft itself.
fn effective_hover<S: ElementStore>(
    session: &ConnectorDragSession,
    hover: Option<ElementId>,
    store: &S,
) -> Option<ElementId> {
    hover
        .filter(|id| Some(*id) != session.start_element_id && *id != session.preview_id)
        .filter(|id| is_box_element(store, id))
}

fn is_box_element<S: ElementStore>(store: &S, id: &ElementId) -> bool {
    store.element(id).is_some_and(|el| el.kind().is_box())
}
