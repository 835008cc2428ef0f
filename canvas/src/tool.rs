//! Tool-mode store: active tool, per-tool style options, and keyboard shortcuts.
//!
//! Each tool has pristine defaults ([`ToolStore::default_options`]) and a live
//! copy ([`ToolStore::options`]) that toolbar edits update and new elements
//! read from.

#[cfg(test)]
#[path = "tool_test.rs"]
mod tool_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bezier;
use crate::consts::{DEFAULT_ARROW_SIZE, DEFAULT_CORNER_RADIUS, DEFAULT_LINE_WIDTH};
use crate::doc::{ArrowEnds, ConnectorKind, ElementStyle, LineCap, LineJoin, TextAlign};
use crate::geom::Point;
use crate::input::Tool;

/// Connector kind without its per-kind payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Straight,
    Curved,
    #[default]
    Orthogonal,
}

impl ConnectionType {
    /// The type of an existing connector.
    #[must_use]
    pub fn of(kind: &ConnectorKind) -> Self {
        match kind {
            ConnectorKind::Straight => Self::Straight,
            ConnectorKind::Curved { .. } => Self::Curved,
            ConnectorKind::Orthogonal { .. } => Self::Orthogonal,
        }
    }
}

/// Style and connector options for one tool. Absent fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
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
    pub line_cap: Option<LineCap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_join: Option<LineJoin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<ConnectionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_ends: Option<ArrowEnds>,
}

impl ToolOptions {
    /// Overlay every field present in `patch`.
    pub fn merge(&mut self, patch: &ToolOptions) {
        fn take<T: Clone>(dst: &mut Option<T>, src: Option<&T>) {
            if let Some(v) = src {
                *dst = Some(v.clone());
            }
        }
        take(&mut self.stroke_color, patch.stroke_color.as_ref());
        take(&mut self.fill_color, patch.fill_color.as_ref());
        take(&mut self.stroke_width, patch.stroke_width.as_ref());
        take(&mut self.opacity, patch.opacity.as_ref());
        take(&mut self.font_family, patch.font_family.as_ref());
        take(&mut self.font_size, patch.font_size.as_ref());
        take(&mut self.font_weight, patch.font_weight.as_ref());
        take(&mut self.text_align, patch.text_align.as_ref());
        take(&mut self.line_cap, patch.line_cap.as_ref());
        take(&mut self.line_join, patch.line_join.as_ref());
        take(&mut self.connection_type, patch.connection_type.as_ref());
        take(&mut self.corner_radius, patch.corner_radius.as_ref());
        take(&mut self.arrow_size, patch.arrow_size.as_ref());
        take(&mut self.arrow_ends, patch.arrow_ends.as_ref());
    }

    /// Element style carrying these options' stroke, fill, and font fields.
    #[must_use]
    pub fn to_style(&self) -> ElementStyle {
        ElementStyle {
            fill: self.fill_color.clone(),
            stroke: self.stroke_color.clone(),
            stroke_width: self.stroke_width,
            opacity: self.opacity,
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            font_weight: self.font_weight.clone(),
            text_align: self.text_align,
            line_cap: self.line_cap,
            line_join: self.line_join,
            ..ElementStyle::default()
        }
    }

    /// Connector kind for a new line from `start` to `end`.
    ///
    /// Curved connectors get initial controls; orthogonal ones the configured
    /// radius, arrow size, and arrow ends.
    #[must_use]
    pub fn connector_kind(&self, start: Point, end: Point) -> ConnectorKind {
        match self.connection_type.unwrap_or_default() {
            ConnectionType::Straight => ConnectorKind::Straight,
            ConnectionType::Curved => bezier::curved_kind(start, end),
            ConnectionType::Orthogonal => ConnectorKind::Orthogonal {
                corner_radius: self.corner_radius.unwrap_or(DEFAULT_CORNER_RADIUS),
                arrow_size: self.arrow_size.unwrap_or(DEFAULT_ARROW_SIZE),
                arrow_ends: self.arrow_ends.unwrap_or_default(),
            },
        }
    }
}

/// Default single-letter shortcuts.
const DEFAULT_SHORTCUTS: [(&str, Tool); 7] = [
    ("v", Tool::Select),
    ("t", Tool::Text),
    ("r", Tool::Rect),
    ("l", Tool::Line),
    ("p", Tool::Pen),
    ("i", Tool::Image),
    ("h", Tool::Pan),
];

/// Pristine options for `tool`.
#[must_use]
pub fn default_tool_options(tool: Tool) -> ToolOptions {
    let black = Some("#000000".to_owned());
    match tool {
        Tool::Select | Tool::Image | Tool::Pan | Tool::Comment => ToolOptions::default(),
        Tool::Text => ToolOptions {
            fill_color: black,
            font_family: Some("Arial".to_owned()),
            font_size: Some(16.0),
            font_weight: Some("normal".to_owned()),
            text_align: Some(TextAlign::Left),
            ..ToolOptions::default()
        },
        Tool::Rect => ToolOptions {
            stroke_color: black,
            fill_color: Some("transparent".to_owned()),
            stroke_width: Some(1.0),
            ..ToolOptions::default()
        },
        Tool::Line => ToolOptions {
            stroke_color: black,
            stroke_width: Some(DEFAULT_LINE_WIDTH),
            line_cap: Some(LineCap::Round),
            line_join: Some(LineJoin::Round),
            connection_type: Some(ConnectionType::Orthogonal),
            corner_radius: Some(DEFAULT_CORNER_RADIUS),
            arrow_size: Some(DEFAULT_ARROW_SIZE),
            arrow_ends: Some(ArrowEnds::End),
            ..ToolOptions::default()
        },
        Tool::Pen => ToolOptions {
            stroke_color: black,
            stroke_width: Some(DEFAULT_LINE_WIDTH),
            line_cap: Some(LineCap::Round),
            line_join: Some(LineJoin::Round),
            ..ToolOptions::default()
        },
    }
}

/// Active tool, live per-tool options, and the shortcut map.
#[derive(Debug, Clone)]
pub struct ToolStore {
    active: Tool,
    options: HashMap<Tool, ToolOptions>,
    shortcuts: HashMap<String, Tool>,
}

impl Default for ToolStore {
    fn default() -> Self {
        Self {
            active: Tool::Select,
            options: HashMap::new(),
            shortcuts: default_shortcuts(),
        }
    }
}

impl ToolStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active_tool(&self) -> Tool {
        self.active
    }

    pub fn set_active_tool(&mut self, tool: Tool) {
        self.active = tool;
    }

    /// Live options for `tool`: defaults with any updates applied.
    #[must_use]
    pub fn options(&self, tool: Tool) -> ToolOptions {
        self.options.get(&tool).cloned().unwrap_or_else(|| default_tool_options(tool))
    }

    /// Pristine defaults for `tool`, ignoring updates.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn default_options(&self, tool: Tool) -> ToolOptions {
        default_tool_options(tool)
    }

    /// Merge `patch` into the live options for `tool`.
    pub fn update_tool_options(&mut self, tool: Tool, patch: &ToolOptions) {
        self.options.entry(tool).or_insert_with(|| default_tool_options(tool)).merge(patch);
    }

    /// Restore the live options for `tool` to its defaults.
    pub fn reset_tool_options(&mut self, tool: Tool) {
        self.options.remove(&tool);
    }

    /// Tool bound to `key`, matched case-insensitively.
    #[must_use]
    pub fn tool_for_shortcut(&self, key: &str) -> Option<Tool> {
        self.shortcuts.get(&key.to_lowercase()).copied()
    }

    /// Add or rebind shortcuts.
    pub fn update_shortcuts<I, K>(&mut self, bindings: I)
    where
        I: IntoIterator<Item = (K, Tool)>,
        K: Into<String>,
    {
        for (key, tool) in bindings {
            self.shortcuts.insert(key.into().to_lowercase(), tool);
        }
    }

    pub fn reset_shortcuts(&mut self) {
        self.shortcuts = default_shortcuts();
    }
}

fn default_shortcuts() -> HashMap<String, Tool> {
    DEFAULT_SHORTCUTS.iter().map(|(k, t)| ((*k).to_owned(), *t)).collect()
}
