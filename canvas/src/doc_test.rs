#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn make_rect(x: f64, y: f64, w: f64, h: f64) -> CanvasElement {
    CanvasElement::new(
        ElementData::Rect { rx: 0.0, ry: 0.0 },
        Point::new(x, y),
        Size::new(w, h),
        ElementStyle::default(),
    )
}

fn make_line(points: Vec<Point>) -> CanvasElement {
    CanvasElement::line(points, ConnectorKind::orthogonal_default(), ElementStyle::default())
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// ElementKind
// =============================================================

#[test]
fn kind_follows_payload() {
    assert_eq!(make_rect(0.0, 0.0, 1.0, 1.0).kind(), ElementKind::Rect);
    assert_eq!(make_line(vec![pt(0.0, 0.0), pt(1.0, 1.0)]).kind(), ElementKind::Line);
}

#[test]
fn box_kinds() {
    assert!(ElementKind::Rect.is_box());
    assert!(ElementKind::Text.is_box());
    assert!(ElementKind::Image.is_box());
    assert!(!ElementKind::Line.is_box());
    assert!(!ElementKind::Path.is_box());
    assert!(!ElementKind::ConnectionPoint.is_box());
}

#[test]
fn kind_serde_names() {
    assert_eq!(serde_json::to_string(&ElementKind::ConnectionPoint).unwrap(), "\"connectionPoint\"");
    assert_eq!(serde_json::to_string(&ElementKind::Line).unwrap(), "\"line\"");
}

// =============================================================
// Line payload serde
// =============================================================

#[test]
fn orthogonal_line_serializes_flat() {
    let line = LineData {
        points: vec![pt(0.0, 0.0), pt(10.0, 5.0)],
        connector: ConnectorKind::orthogonal_default(),
        from: None,
        to: None,
    };
    let value = serde_json::to_value(&line).unwrap();
    assert_eq!(value["connectionType"], "orthogonal");
    assert_eq!(value["cornerRadius"], 12.0);
    assert_eq!(value["arrowSize"], 10.0);
    assert_eq!(value["arrowEnds"], "end");
    assert_eq!(value["points"][1]["x"], 10.0);
    assert!(value.get("from").is_none());
}

#[test]
fn curved_line_deserializes_controls() {
    let value = json!({
        "points": [{ "x": 0.0, "y": 0.0 }, { "x": 100.0, "y": 0.0 }],
        "connectionType": "curved",
        "control1": { "x": 30.0, "y": 0.0 },
        "control2": { "x": 70.0, "y": 0.0 },
    });
    let line: LineData = serde_json::from_value(value).unwrap();
    assert_eq!(
        line.connector,
        ConnectorKind::Curved { control1: pt(30.0, 0.0), control2: pt(70.0, 0.0) }
    );
}

#[test]
fn unknown_connection_type_rejects() {
    let value = json!({
        "points": [{ "x": 0.0, "y": 0.0 }, { "x": 1.0, "y": 0.0 }],
        "connectionType": "zigzag",
    });
    assert!(serde_json::from_value::<LineData>(value).is_err());
}

#[test]
fn element_roundtrip_preserves_payload() {
    let el = make_line(vec![pt(1.0, 2.0), pt(3.0, 4.0)]);
    let raw = serde_json::to_string(&el).unwrap();
    let back: CanvasElement = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, el);
}

#[test]
fn element_json_has_type_beside_flat_data() {
    let el = make_line(vec![pt(1.0, 2.0), pt(3.0, 4.0)]);
    let value = serde_json::to_value(&el).unwrap();
    assert_eq!(value["type"], "line");
    assert_eq!(value["data"]["points"][1]["x"], 3.0);
    assert!(value["data"].get("connectionType").is_some());
    assert!(value["data"].get("line").is_none());

    let rect = make_rect(0.0, 0.0, 10.0, 10.0);
    let value = serde_json::to_value(&rect).unwrap();
    assert_eq!(value["type"], "rect");
    assert_eq!(value["data"]["rx"], 0.0);
}

#[test]
fn element_deserializes_from_typed_json() {
    let value = json!({
        "id": uuid::Uuid::new_v4(),
        "type": "text",
        "data": { "text": "hello" },
        "position": { "x": 5.0, "y": 6.0 },
        "size": { "width": 100.0, "height": 20.0 },
        "style": {},
        "zIndex": 0,
        "createdAt": serde_json::to_value(time::OffsetDateTime::UNIX_EPOCH).unwrap(),
        "updatedAt": serde_json::to_value(time::OffsetDateTime::UNIX_EPOCH).unwrap(),
    });
    let el: CanvasElement = serde_json::from_value(value).unwrap();
    assert_eq!(el.kind(), ElementKind::Text);
    assert_eq!(el.data, ElementData::Text { text: "hello".into(), max_width: None });
}

#[test]
fn arrow_ends_flags() {
    assert!(!ArrowEnds::None.at_start() && !ArrowEnds::None.at_end());
    assert!(ArrowEnds::Start.at_start() && !ArrowEnds::Start.at_end());
    assert!(!ArrowEnds::End.at_start() && ArrowEnds::End.at_end());
    assert!(ArrowEnds::Both.at_start() && ArrowEnds::Both.at_end());
}

#[test]
fn style_defaults_for_lines() {
    let style = ElementStyle::default();
    assert_eq!(style.stroke_or_default(), "#007bff");
    assert_eq!(style.stroke_width_or_default(), 3.0);
}

// =============================================================
// CanvasElement geometry
// =============================================================

#[test]
fn center_and_contains() {
    let el = make_rect(10.0, 20.0, 100.0, 50.0);
    assert_eq!(el.center(), pt(60.0, 45.0));
    assert!(el.contains(pt(10.0, 20.0)));
    assert!(el.contains(pt(110.0, 70.0)));
    assert!(!el.contains(pt(110.1, 70.0)));
}

#[test]
fn line_elements_have_zero_box() {
    let el = make_line(vec![pt(5.0, 5.0), pt(50.0, 50.0)]);
    assert_eq!(el.position, Point::default());
    assert_eq!(el.size, Size::default());
    let line = el.as_line().unwrap();
    assert_eq!(line.start(), pt(5.0, 5.0));
    assert_eq!(line.end(), pt(50.0, 50.0));
}

// =============================================================
// DocStore
// =============================================================

#[test]
fn add_and_get() {
    let mut store = DocStore::new();
    let el = make_rect(0.0, 0.0, 10.0, 10.0);
    let id = el.id;
    store.add_element(el);
    assert_eq!(store.len(), 1);
    assert_eq!(store.element(&id).unwrap().id, id);
}

#[test]
fn add_same_id_replaces() {
    let mut store = DocStore::new();
    let mut el = make_rect(0.0, 0.0, 10.0, 10.0);
    store.add_element(el.clone());
    el.position = pt(5.0, 5.0);
    store.add_element(el.clone());
    assert_eq!(store.len(), 1);
    assert_eq!(store.element(&el.id).unwrap().position, pt(5.0, 5.0));
}

#[test]
fn elements_keep_insertion_order_within_z() {
    let mut store = DocStore::new();
    let a = make_rect(0.0, 0.0, 1.0, 1.0);
    let mut b = make_rect(0.0, 0.0, 1.0, 1.0);
    let c = make_rect(0.0, 0.0, 1.0, 1.0);
    b.z_index = 5;
    let (ia, ib, ic) = (a.id, b.id, c.id);
    store.add_element(a);
    store.add_element(b);
    store.add_element(c);
    let order: Vec<ElementId> = store.elements().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![ia, ic, ib]);
}

#[test]
fn z_index_update_reorders_in_place() {
    let mut store = DocStore::new();
    let a = make_rect(0.0, 0.0, 1.0, 1.0);
    let b = make_rect(0.0, 0.0, 1.0, 1.0);
    let (ia, ib) = (a.id, b.id);
    store.add_element(a);
    store.add_element(b);
    let patch = ElementPatch { z_index: Some(3), ..ElementPatch::default() };
    assert!(store.update_element(&ia, &patch));
    let order: Vec<ElementId> = store.elements().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![ib, ia]);
    assert_eq!(store.element(&ia).unwrap().z_index, 3);
}

#[test]
fn load_snapshot_sorts_by_z() {
    let mut store = DocStore::new();
    let mut a = make_rect(0.0, 0.0, 1.0, 1.0);
    let b = make_rect(0.0, 0.0, 1.0, 1.0);
    a.z_index = 2;
    let (ia, ib) = (a.id, b.id);
    store.load_snapshot(vec![a, b]);
    let order: Vec<ElementId> = store.elements().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![ib, ia]);
}

#[test]
fn re_adding_with_new_z_moves_element() {
    let mut store = DocStore::new();
    let mut a = make_rect(0.0, 0.0, 1.0, 1.0);
    let b = make_rect(0.0, 0.0, 1.0, 1.0);
    let (ia, ib) = (a.id, b.id);
    store.add_element(a.clone());
    store.add_element(b);
    a.z_index = 5;
    store.add_element(a);
    assert_eq!(store.len(), 2);
    assert_eq!(store.elements()[0].id, ib);
    assert_eq!(store.elements()[1].id, ia);
}

#[test]
fn update_points_in_place() {
    let mut store = DocStore::new();
    let el = make_line(vec![pt(0.0, 0.0), pt(0.0, 0.0)]);
    let id = el.id;
    let created = el.created_at;
    store.add_element(el);

    assert!(store.update_element(&id, &ElementPatch::points(vec![pt(0.0, 0.0), pt(40.0, 10.0)])));
    let updated = store.element(&id).unwrap();
    assert_eq!(updated.as_line().unwrap().end(), pt(40.0, 10.0));
    assert_eq!(updated.as_line().unwrap().connector, ConnectorKind::orthogonal_default());
    assert_eq!(updated.created_at, created);
    assert!(updated.updated_at >= created);
}

#[test]
fn update_rejects_short_point_list() {
    let mut store = DocStore::new();
    let el = make_line(vec![pt(0.0, 0.0), pt(5.0, 0.0)]);
    let id = el.id;
    store.add_element(el);
    assert!(!store.update_element(&id, &ElementPatch::points(vec![pt(1.0, 1.0)])));
    assert_eq!(store.element(&id).unwrap().as_line().unwrap().points.len(), 2);
}

#[test]
fn update_rejects_points_on_box() {
    let mut store = DocStore::new();
    let el = make_rect(0.0, 0.0, 10.0, 10.0);
    let id = el.id;
    store.add_element(el);
    assert!(!store.update_element(&id, &ElementPatch::points(vec![pt(0.0, 0.0), pt(1.0, 1.0)])));
}

#[test]
fn update_rejects_kind_change() {
    let mut store = DocStore::new();
    let el = make_rect(0.0, 0.0, 10.0, 10.0);
    let id = el.id;
    store.add_element(el);
    let patch = ElementPatch::data(ElementData::Text { text: "x".into(), max_width: None });
    assert!(!store.update_element(&id, &patch));
    assert_eq!(store.element(&id).unwrap().kind(), ElementKind::Rect);
}

#[test]
fn update_missing_is_false() {
    let mut store = DocStore::new();
    assert!(!store.update_element(&Uuid::new_v4(), &ElementPatch::position(pt(1.0, 1.0))));
}

#[test]
fn remove_clears_selection() {
    let mut store = DocStore::new();
    let el = make_rect(0.0, 0.0, 10.0, 10.0);
    let id = el.id;
    store.add_element(el);
    store.select_element(Some(id));
    assert_eq!(store.selected(), Some(id));
    assert!(store.remove_element(&id).is_some());
    assert!(store.selected().is_none());
    assert!(store.is_empty());
}

#[test]
fn remove_missing_is_none() {
    let mut store = DocStore::new();
    assert!(store.remove_element(&Uuid::new_v4()).is_none());
}

#[test]
fn select_unknown_id_clears() {
    let mut store = DocStore::new();
    store.select_element(Some(Uuid::new_v4()));
    assert!(store.selected().is_none());
}

#[test]
fn load_snapshot_drops_stale_selection() {
    let mut store = DocStore::new();
    let a = make_rect(0.0, 0.0, 10.0, 10.0);
    let a_id = a.id;
    store.add_element(a);
    store.select_element(Some(a_id));
    store.load_snapshot(vec![make_rect(1.0, 1.0, 2.0, 2.0)]);
    assert_eq!(store.len(), 1);
    assert!(store.selected().is_none());
}

#[test]
fn select_elements_keeps_known_ids_once() {
    let mut store = DocStore::new();
    let a = make_rect(0.0, 0.0, 10.0, 10.0);
    let b = make_rect(20.0, 0.0, 10.0, 10.0);
    let (a_id, b_id) = (a.id, b.id);
    store.add_element(a);
    store.add_element(b);

    store.select_elements(&[b_id, Uuid::new_v4(), a_id, b_id]);
    assert_eq!(store.selected_ids(), &[b_id, a_id]);
    // More than one selected: no single selection.
    assert!(store.selected().is_none());

    store.select_elements(&[a_id]);
    assert_eq!(store.selected(), Some(a_id));
}

#[test]
fn remove_drops_id_from_multi_selection() {
    let mut store = DocStore::new();
    let a = make_rect(0.0, 0.0, 10.0, 10.0);
    let b = make_rect(20.0, 0.0, 10.0, 10.0);
    let (a_id, b_id) = (a.id, b.id);
    store.add_element(a);
    store.add_element(b);
    store.select_elements(&[a_id, b_id]);

    store.remove_element(&a_id);
    assert_eq!(store.selected_ids(), &[b_id]);
    assert_eq!(store.selected(), Some(b_id));
}

#[test]
fn load_snapshot_keeps_surviving_selection() {
    let mut store = DocStore::new();
    let a = make_rect(0.0, 0.0, 10.0, 10.0);
    let b = make_rect(20.0, 0.0, 10.0, 10.0);
    let (a_id, b_id) = (a.id, b.id);
    store.add_element(a.clone());
    store.add_element(b);
    store.select_elements(&[a_id, b_id]);

    store.load_snapshot(vec![a]);
    assert_eq!(store.selected_ids(), &[a_id]);
}

#[test]
fn bounds_of_box_and_line() {
    let r = make_rect(10.0, 20.0, 30.0, 40.0);
    assert_eq!(r.bounds(), Bounds { min: pt(10.0, 20.0), max: pt(40.0, 60.0) });

    let l = make_line(vec![pt(5.0, 50.0), pt(-5.0, 10.0), pt(20.0, 30.0)]);
    assert_eq!(l.bounds(), Bounds { min: pt(-5.0, 10.0), max: pt(20.0, 50.0) });
}

#[test]
fn patch_is_empty() {
    assert!(ElementPatch::default().is_empty());
    assert!(!ElementPatch::position(pt(0.0, 0.0)).is_empty());
}
