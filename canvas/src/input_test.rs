use super::*;
use uuid::Uuid;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn tool_serde_lowercase() {
    assert_eq!(serde_json::to_string(&Tool::Line).unwrap(), "\"line\"");
    let t: Tool = serde_json::from_str("\"pan\"").unwrap();
    assert_eq!(t, Tool::Pan);
}

// =============================================================
// Modifiers / Button / Key
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
    assert!(!m.command());
}

#[test]
fn modifiers_command_is_ctrl_or_meta() {
    assert!(Modifiers { ctrl: true, ..Modifiers::default() }.command());
    assert!(Modifiers { meta: true, ..Modifiers::default() }.command());
    assert!(!Modifiers { shift: true, alt: true, ..Modifiers::default() }.command());
}

#[test]
fn modifiers_deserialize_partial() {
    let m: Modifiers = serde_json::from_str(r#"{"shift":true}"#).unwrap();
    assert!(m.shift);
    assert!(!m.ctrl);
}

#[test]
fn button_default_is_primary() {
    assert_eq!(Button::default(), Button::Primary);
    let b: Button = serde_json::from_str("\"middle\"").unwrap();
    assert_eq!(b, Button::Middle);
}

#[test]
fn key_round_trips_as_plain_string() {
    let k = Key::new("Escape");
    assert_eq!(k.as_str(), "Escape");
    assert_eq!(serde_json::to_string(&k).unwrap(), "\"Escape\"");
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert_eq!(InputState::default(), InputState::Idle);
    assert_eq!(InputState::default().target(), None);
}

#[test]
fn input_state_target() {
    let id = Uuid::new_v4();
    assert_eq!(InputState::Panning { last_screen: Point::new(0.0, 0.0) }.target(), None);
    assert_eq!(InputState::DraggingElement { id, last_world: Point::new(1.0, 2.0) }.target(), Some(id));
    assert_eq!(InputState::DraggingEndpoint { id, end: LineEnd::Start }.target(), Some(id));
    assert_eq!(InputState::DraggingControl { id, control: ControlPoint::Second }.target(), Some(id));
    assert_eq!(InputState::DrawingStroke { id }.target(), Some(id));
    let resizing = InputState::Resizing {
        id,
        handle: ResizeHandle::Left,
        origin: Bounds::default(),
        grab: Point::new(0.0, 0.0),
    };
    assert_eq!(resizing.target(), Some(id));
}

#[test]
fn selection_gestures_have_no_single_target() {
    let p = Point::new(1.0, 1.0);
    assert_eq!(InputState::DraggingSelection { last_world: p }.target(), None);
    assert_eq!(InputState::Marquee { start: p, current: p }.target(), None);
}

#[test]
fn ui_state_default_empty() {
    let ui = UiState::default();
    assert_eq!(ui.hovered_id, None);
    assert_eq!(ui.pointer, None);
}
