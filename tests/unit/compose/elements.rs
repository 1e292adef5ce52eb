use super::*;
use kurbo::Shape as _;
use crate::foundation::core::PageFormat;
use crate::model::template::Layer;

fn shape(json: serde_json::Value) -> ShapeElement {
    serde_json::from_value(json).unwrap()
}

fn element(json: serde_json::Value) -> Element {
    serde_json::from_value(json).unwrap()
}

#[test]
fn rectangle_and_ellipse_stay_in_box() {
    let rect = shape(serde_json::json!({"box": {"width": 100, "height": 40}}));
    let bb = shape_path(&rect).bounding_box();
    assert_eq!(bb, Rect::new(0.0, 0.0, 100.0, 40.0));

    let ellipse = shape(serde_json::json!({"box": {"width": 60, "height": 30}, "shape": "ellipse"}));
    let bb = shape_path(&ellipse).bounding_box();
    assert!((bb.width() - 60.0).abs() < 1e-6);
    assert!((bb.height() - 30.0).abs() < 1e-6);
}

#[test]
fn oversized_corner_radius_is_clamped() {
    let rounded = shape(serde_json::json!({
        "box": {"width": 20, "height": 10},
        "cornerRadius": 50
    }));
    let bb = shape_path(&rounded).bounding_box();
    assert!((bb.width() - 20.0).abs() < 1e-6);
    assert!((bb.height() - 10.0).abs() < 1e-6);
}

#[test]
fn custom_shape_is_open_and_polygon_closed() {
    let points = serde_json::json!([{"x": 0, "y": 0}, {"x": 10, "y": 5}, {"x": 20, "y": 0}]);
    let custom = shape(serde_json::json!({"box": {"width": 20, "height": 5}, "shape": "custom", "points": points}));
    let path = shape_path(&custom);
    assert_eq!(path.elements().len(), 3);
    assert!(!matches!(path.elements().last(), Some(kurbo::PathEl::ClosePath)));

    let polygon = shape(serde_json::json!({"box": {"width": 20, "height": 5}, "shape": "polygon", "points": points}));
    assert!(matches!(
        shape_path(&polygon).elements().last(),
        Some(kurbo::PathEl::ClosePath)
    ));
}

#[test]
fn line_without_points_uses_box_diagonal() {
    let line = shape(serde_json::json!({"box": {"width": 30, "height": 10}, "shape": "line"}));
    assert_eq!(shape_path(&line).bounding_box(), Rect::new(0.0, 0.0, 30.0, 10.0));
}

#[test]
fn points_bounds_fall_back_to_box() {
    let custom = shape(serde_json::json!({
        "box": {"width": 100, "height": 100},
        "shape": "custom",
        "points": [[5, 10], [25, 40]]
    }));
    assert_eq!(points_bounds(&custom), Rect::new(5.0, 10.0, 25.0, 40.0));
    let rect = shape(serde_json::json!({"box": {"width": 7, "height": 9}}));
    assert_eq!(points_bounds(&rect), Rect::new(0.0, 0.0, 7.0, 9.0));
}

#[test]
fn gradient_stroke_spans_point_bounds() {
    let stroke: StrokeStyle = serde_json::from_value(serde_json::json!({
        "color": "#000000",
        "width": 4,
        "gradient": {"type": "linear", "stops": [
            {"offset": 0, "color": "#ff0000"},
            {"offset": 1, "color": "#0000ff"}
        ]}
    }))
    .unwrap();
    let bounds = Rect::new(10.0, 10.0, 110.0, 60.0);
    match stroke_paint(&stroke, bounds) {
        Paint::Gradient { area, .. } => assert_eq!(area, bounds),
        other => panic!("expected gradient, got {other:?}"),
    }

    let flat = StrokeStyle::solid(Color::WHITE, 2.0);
    assert!(matches!(stroke_paint(&flat, bounds), Paint::Solid(c) if c == Color::WHITE));
}

#[test]
fn page_transform_is_identity_at_contract_size() {
    let page = Page::new("p", PageFormat::Story, "l");
    assert_eq!(page_transform(PageFormat::Story.canvas(), &page), Affine::IDENTITY);
    let half = Canvas {
        width: 540,
        height: 960,
    };
    let tf = page_transform(half, &page);
    assert_eq!(tf * Point::new(1080.0, 1920.0), Point::new(540.0, 960.0));
}

#[test]
fn selection_box_includes_group_offset() {
    let mut page = Page::new("p", PageFormat::Story, "l");
    let mut layer = Layer::new("l2", "Top");
    layer.elements.push(element(serde_json::json!({
        "id": "g",
        "kind": "group",
        "position": {"x": 100, "y": 200},
        "children": [{
            "id": "child",
            "kind": "shape",
            "position": {"x": 10, "y": 20},
            "box": {"width": 30, "height": 40}
        }]
    })));
    page.layers.push(layer);

    assert_eq!(
        selection_box(&page, "child"),
        Some(Rect::new(110.0, 220.0, 140.0, 260.0))
    );
    assert_eq!(
        selection_box(&page, "g"),
        Some(Rect::new(110.0, 220.0, 140.0, 260.0))
    );
    assert_eq!(selection_box(&page, "missing"), None);
}
