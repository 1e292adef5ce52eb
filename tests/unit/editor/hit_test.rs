use super::*;
use crate::foundation::core::PageFormat;
use crate::model::template::{Layer, OVERLAY_LAYER};

fn rect_el(id: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "kind": "shape",
        "position": {"x": x, "y": y},
        "box": {"width": w, "height": h}
    }))
    .unwrap()
}

fn page_with(elements: Vec<Element>) -> Page {
    let mut page = Page::new("p", PageFormat::Story, "l1");
    page.layers[0].elements = elements;
    page
}

#[test]
fn topmost_element_wins() {
    let page = page_with(vec![
        rect_el("bottom", 0.0, 0.0, 200.0, 200.0),
        rect_el("top", 50.0, 50.0, 100.0, 100.0),
    ]);
    assert_eq!(hit_test(&page, Point::new(75.0, 75.0)).map(|e| e.id()), Some("top"));
    assert_eq!(hit_test(&page, Point::new(10.0, 10.0)).map(|e| e.id()), Some("bottom"));
    assert!(hit_test(&page, Point::new(500.0, 500.0)).is_none());
}

#[test]
fn overlay_layer_sits_under_later_layers() {
    let mut page = page_with(vec![rect_el("content", 0.0, 0.0, 200.0, 200.0)]);
    let mut overlay = Layer::new("ov", OVERLAY_LAYER);
    overlay.elements.push(rect_el("veil", 0.0, 0.0, 400.0, 400.0));
    page.layers.push(overlay);

    // painted first despite being last in the list
    assert_eq!(hit_test(&page, Point::new(50.0, 50.0)).map(|e| e.id()), Some("content"));
    assert_eq!(hit_test(&page, Point::new(300.0, 300.0)).map(|e| e.id()), Some("veil"));
}

#[test]
fn box_edges_are_inclusive() {
    let page = page_with(vec![rect_el("a", 10.0, 10.0, 20.0, 20.0)]);
    assert!(hit_test(&page, Point::new(10.0, 10.0)).is_some());
    assert!(hit_test(&page, Point::new(30.0, 30.0)).is_some());
    assert!(hit_test(&page, Point::new(30.1, 30.0)).is_none());
}

#[test]
fn upper_layers_are_tested_first_and_hidden_ones_skipped() {
    let mut page = page_with(vec![rect_el("low", 0.0, 0.0, 100.0, 100.0)]);
    let mut upper = Layer::new("l2", "Layer 2");
    upper.elements.push(rect_el("high", 0.0, 0.0, 100.0, 100.0));
    page.layers.push(upper);
    assert_eq!(hit_test(&page, Point::new(5.0, 5.0)).map(|e| e.id()), Some("high"));

    page.layers[1].visible = false;
    assert_eq!(hit_test(&page, Point::new(5.0, 5.0)).map(|e| e.id()), Some("low"));

    page.layers[0].elements[0].base.visible = false;
    assert!(hit_test(&page, Point::new(5.0, 5.0)).is_none());
}

#[test]
fn group_hit_returns_group() {
    let group: Element = serde_json::from_value(serde_json::json!({
        "id": "g",
        "kind": "group",
        "position": {"x": 100, "y": 100},
        "children": [
            {"id": "c1", "kind": "shape", "position": {"x": 0, "y": 0}, "box": {"width": 10, "height": 10}},
            {"id": "c2", "kind": "shape", "position": {"x": 50, "y": 50}, "box": {"width": 10, "height": 10}}
        ]
    }))
    .unwrap();
    let page = page_with(vec![group]);
    let tester = HitTester::default();
    assert_eq!(tester.hit_id(&page, Point::new(105.0, 105.0)).as_deref(), Some("g"));
    // inside the union box, between the children
    assert_eq!(tester.hit_id(&page, Point::new(130.0, 130.0)).as_deref(), Some("g"));
    assert!(tester.hit_id(&page, Point::new(95.0, 95.0)).is_none());

    let oriented = HitTester::new(HitMode::Oriented);
    assert_eq!(oriented.hit_id(&page, Point::new(155.0, 155.0)).as_deref(), Some("g"));
    assert!(oriented.hit_id(&page, Point::new(130.0, 130.0)).is_none());
}

#[test]
fn rotation_only_matters_in_oriented_mode() {
    let mut el = rect_el("bar", 100.0, 100.0, 100.0, 20.0);
    el.base.rotation = 90.0;
    let page = page_with(vec![el]);

    let aabb = HitTester::default();
    assert_eq!(aabb.mode(), HitMode::Aabb);
    assert!(aabb.hit(&page, Point::new(150.0, 110.0)).is_some());
    assert!(aabb.hit(&page, Point::new(90.0, 150.0)).is_none());

    let oriented = HitTester::new(HitMode::Oriented);
    assert!(oriented.hit(&page, Point::new(90.0, 150.0)).is_some());
    assert!(oriented.hit(&page, Point::new(150.0, 110.0)).is_none());
}

#[test]
fn zero_scale_is_never_hit_when_oriented() {
    let mut el = rect_el("flat", 0.0, 0.0, 100.0, 100.0);
    el.base.scale.x = 0.0;
    let page = page_with(vec![el]);
    assert!(HitTester::new(HitMode::Oriented).hit(&page, Point::new(0.0, 0.0)).is_none());
}
