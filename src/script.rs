//! Scripted event replay.
//!
//! A script is a JSON array of steps, each tagged by `"step"`. Pointer
//! positions are screen pixels, exactly what a browser host would forward.
//!
//! ```json
//! [
//!   { "step": "rect", "at": { "x": 100, "y": 100 } },
//!   { "step": "tool", "tool": "line" },
//!   { "step": "pointerDown", "at": { "x": 150, "y": 150 } },
//!   { "step": "pointerUp", "at": { "x": 400, "y": 150 } }
//! ]
//! ```

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::path::Path;

use canvas::doc::CanvasElement;
use canvas::engine::{Action, EngineCore};
use canvas::geom::Point;
use canvas::input::{Button, Key, Modifiers, Tool, WheelDelta};
use canvas::tool::{ConnectionType, ToolOptions};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::HostError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    Viewport {
        width: f64,
        height: f64,
    },
    Tool {
        tool: Tool,
    },
    PointerDown {
        at: Point,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        at: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        at: Point,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        at: Point,
        delta: WheelDelta,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Place a rectangle at a stage point.
    Rect {
        at: Point,
    },
    /// Place a text box at a stage point.
    Text {
        at: Point,
    },
    Image {
        src: String,
    },
    LineOptions {
        options: ToolOptions,
    },
    ConnectionType {
        connection_type: ConnectionType,
    },
    RectOptions {
        options: ToolOptions,
    },
    TextOptions {
        options: ToolOptions,
    },
    /// Size every selected box.
    Size {
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
        #[serde(default)]
        keep_ratio: bool,
    },
    DoubleClick {
        at: Point,
    },
    /// Answer an open text editor. `None` cancels it.
    EditText {
        #[serde(default)]
        text: Option<String>,
    },
    /// Attach a comment at the pending comment-tool placement.
    Comment {
        content: String,
        author: String,
    },
    Undo,
}

/// Outcome counters of one replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub steps: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub comments: usize,
}

/// Read a script file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or is not a valid step list.
pub fn load_steps(path: &Path) -> Result<Vec<Step>, HostError> {
    let raw = std::fs::read_to_string(path).map_err(|e| HostError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Read a starting board: a JSON array of elements in z-order.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_board(path: &Path) -> Result<Vec<CanvasElement>, HostError> {
    let raw = std::fs::read_to_string(path).map_err(|e| HostError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Feed every step to the engine in order.
pub fn replay(core: &mut EngineCore, steps: &[Step]) -> ReplayReport {
    let mut report = ReplayReport { steps: steps.len(), ..ReplayReport::default() };
    for (index, step) in steps.iter().enumerate() {
        if let Step::Comment { content, author } = step {
            match core.add_comment(content.clone(), author.clone()) {
                Some(id) => {
                    report.comments += 1;
                    debug!(index, %id, "comment added");
                }
                None => warn!(index, "comment step without a pending placement"),
            }
            continue;
        }
        for action in apply(core, step) {
            tally(&mut report, index, &action);
        }
    }
    report
}

/// Apply one non-comment step and return the engine's actions.
pub fn apply(core: &mut EngineCore, step: &Step) -> Vec<Action> {
    match step {
        Step::Viewport { width, height } => {
            core.set_viewport(*width, *height);
            Vec::new()
        }
        Step::Tool { tool } => {
            core.set_tool(*tool);
            Vec::new()
        }
        Step::PointerDown { at, button, modifiers } => core.on_pointer_down(*at, *button, *modifiers),
        Step::PointerMove { at, modifiers } => core.on_pointer_move(*at, *modifiers),
        Step::PointerUp { at, button, modifiers } => core.on_pointer_up(*at, *button, *modifiers),
        Step::Wheel { at, delta, modifiers } => core.on_wheel(*at, *delta, *modifiers),
        Step::Key { key, modifiers } => core.on_key_down(key.clone(), *modifiers),
        Step::Rect { at } => core.create_rect(*at),
        Step::Text { at } => core.create_text(*at),
        Step::Image { src } => core.insert_image(src.clone()),
        Step::LineOptions { options } => core.update_line_options(options),
        Step::ConnectionType { connection_type } => core.set_connection_type(*connection_type),
        Step::RectOptions { options } => core.update_rect_options(options),
        Step::TextOptions { options } => core.update_text_options(options),
        Step::Size { width, height, keep_ratio } => core.set_selection_size(*width, *height, *keep_ratio),
        Step::DoubleClick { at } => core.on_double_click(*at),
        Step::EditText { text: Some(text) } => core.commit_text(text.clone()),
        Step::EditText { text: None } => core.cancel_text_edit(),
        Step::Undo => core.undo(),
        Step::Comment { .. } => Vec::new(),
    }
}

fn tally(report: &mut ReplayReport, index: usize, action: &Action) {
    match action {
        Action::ElementCreated(element) => {
            report.created += 1;
            debug!(index, id = %element.id, kind = ?element.kind(), "element created");
        }
        Action::ElementUpdated { id, .. } => {
            report.updated += 1;
            debug!(index, %id, "element updated");
        }
        Action::ElementDeleted { id } => {
            report.deleted += 1;
            debug!(index, %id, "element deleted");
        }
        Action::CommentRequested { position, element_id } => {
            info!(index, x = position.x, y = position.y, ?element_id, "comment placement pending");
        }
        Action::ImageRequested => info!(index, "image requested; add an image step to supply one"),
        Action::TextEditRequested { id, text } => {
            info!(index, %id, text = %text, "text editor opened; add an editText step to answer it");
        }
        Action::DocumentRestored => debug!(index, "document restored"),
        Action::SetCursor(_) | Action::RenderNeeded => {}
    }
}
