use super::*;

fn shape(id: &str, x: f64, y: f64) -> Element {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": "Box",
        "kind": "shape",
        "position": {"x": x, "y": y},
        "box": {"width": 100, "height": 100}
    }))
    .unwrap()
}

fn layer_id(s: &EditorSession) -> String {
    s.page().unwrap().layers[0].id.clone()
}

fn session_with(elements: Vec<Element>) -> EditorSession {
    let mut s = EditorSession::draft("Test");
    let layer = layer_id(&s);
    for el in elements {
        assert!(s.apply(EditorCommand::AddElement {
            layer_id: layer.clone(),
            element: el,
        }));
    }
    s.apply(EditorCommand::SelectElements(Vec::new()));
    s.take_dirty();
    s
}

#[test]
fn draft_session_starts_dirty_on_first_page() {
    let s = EditorSession::draft("Test");
    assert!(s.is_dirty());
    assert_eq!(s.page_id(), s.template().pages[0].id);
    assert!(s.selection().is_empty());
}

#[test]
fn add_element_selects_it_and_fixes_taken_ids() {
    let mut s = session_with(vec![shape("a", 0.0, 0.0)]);
    let layer = layer_id(&s);
    assert!(s.apply(EditorCommand::AddElement {
        layer_id: layer,
        element: shape("a", 10.0, 10.0),
    }));
    assert_eq!(s.selection().len(), 1);
    assert_ne!(s.selection()[0], "a");
    assert!(s.template().contains_id(&s.selection()[0]));
    assert!(s.take_dirty());

    assert!(!s.apply(EditorCommand::AddElement {
        layer_id: "nope".to_owned(),
        element: shape("b", 0.0, 0.0),
    }));
    assert!(!s.is_dirty());
}

#[test]
fn unchanged_commands_leave_dirty_flag_alone() {
    let mut s = session_with(vec![shape("a", 5.0, 5.0)]);
    assert!(!s.apply(EditorCommand::MoveElement {
        id: "a".to_owned(),
        position: Coord::new(5.0, 5.0),
    }));
    assert!(!s.apply(EditorCommand::update("a", |_| {})));
    assert!(!s.apply(EditorCommand::SelectElements(Vec::new())));
    assert!(!s.apply(EditorCommand::SetViewport(Viewport::default())));
    assert!(!s.is_dirty());

    assert!(s.apply(EditorCommand::update("a", |el| el.base.opacity = 0.5)));
    assert!(s.take_dirty());
    assert_eq!(s.template().element("a").unwrap().base.opacity, 0.5);
}

#[test]
fn duplicate_offsets_renames_and_selects_copies() {
    let mut s = session_with(vec![shape("a", 10.0, 20.0)]);
    s.apply(EditorCommand::SelectElements(vec!["a".to_owned()]));
    assert!(s.apply(EditorCommand::DuplicateSelection));

    let copy_id = s.selection()[0].clone();
    assert_ne!(copy_id, "a");
    let copy = s.template().element(&copy_id).unwrap();
    assert_eq!(copy.base.position, Coord::new(26.0, 36.0));
    assert_eq!(copy.base.name, "Box Copy");
    assert_eq!(s.page().unwrap().layers[0].elements.len(), 2);
    assert!(s.template().validate().is_ok());
}

#[test]
fn duplicating_a_group_gives_children_fresh_ids() {
    let group: Element = serde_json::from_value(serde_json::json!({
        "id": "g",
        "kind": "group",
        "children": [
            {"id": "c", "kind": "shape", "box": {"width": 10, "height": 10}}
        ]
    }))
    .unwrap();
    let mut s = session_with(vec![group]);
    s.apply(EditorCommand::SelectElements(vec!["g".to_owned()]));
    assert!(s.apply(EditorCommand::DuplicateSelection));
    assert!(s.template().validate().is_ok());
}

#[test]
fn delete_removes_nested_and_top_level_ids() {
    let group: Element = serde_json::from_value(serde_json::json!({
        "id": "g",
        "kind": "group",
        "children": [
            {"id": "c1", "kind": "shape", "box": {"width": 10, "height": 10}},
            {"id": "c2", "kind": "shape", "box": {"width": 10, "height": 10}}
        ]
    }))
    .unwrap();
    let mut s = session_with(vec![shape("a", 0.0, 0.0), group]);
    s.apply(EditorCommand::SelectElements(vec!["a".to_owned(), "c1".to_owned()]));
    assert!(s.apply(EditorCommand::DeleteSelection));
    assert!(!s.template().contains_id("a"));
    assert!(!s.template().contains_id("c1"));
    assert!(s.template().contains_id("c2"));
    assert!(s.selection().is_empty());
    assert!(!s.apply(EditorCommand::DeleteSelection));
}

#[test]
fn drag_moves_by_delta_over_zoom() {
    let mut s = session_with(vec![shape("a", 100.0, 100.0)]);
    s.apply(EditorCommand::SetViewport(Viewport::new().with_zoom(0.5)));
    s.take_dirty();

    // element spans screen 50..100 at zoom 0.5
    assert_eq!(s.pointer_down(Point::new(60.0, 60.0)).as_deref(), Some("a"));
    assert_eq!(s.selection(), ["a".to_owned()]);
    assert!(s.pointer_move(Point::new(70.0, 65.0)));
    assert_eq!(
        s.template().element("a").unwrap().base.position,
        Coord::new(120.0, 110.0)
    );
    assert!(s.pointer_up());
    assert!(!s.pointer_move(Point::new(90.0, 90.0)));
    assert!(s.take_dirty());
}

#[test]
fn locked_elements_select_but_do_not_move() {
    let mut el = shape("a", 0.0, 0.0);
    el.base.locked = true;
    let mut s = session_with(vec![el]);
    assert_eq!(s.pointer_down(Point::new(10.0, 10.0)).as_deref(), Some("a"));
    assert!(!s.pointer_move(Point::new(50.0, 50.0)));
    assert_eq!(s.template().element("a").unwrap().base.position, Coord::new(0.0, 0.0));
}

#[test]
fn empty_click_clears_selection_and_pans() {
    let mut s = session_with(vec![shape("a", 0.0, 0.0)]);
    s.pointer_down(Point::new(10.0, 10.0));
    s.pointer_up();
    assert_eq!(s.selection().len(), 1);

    assert!(s.pointer_down(Point::new(500.0, 500.0)).is_none());
    assert!(s.selection().is_empty());
    assert!(s.pointer_move(Point::new(510.0, 490.0)));
    assert_eq!(s.viewport().pan, Vec2::new(10.0, -10.0));
    assert!(matches!(s.gesture(), Gesture::Panning { .. }));
}

#[test]
fn hidden_layer_is_not_hit() {
    let mut s = session_with(vec![shape("a", 0.0, 0.0)]);
    let layer = layer_id(&s);
    assert!(s.apply(EditorCommand::SetLayerVisibility {
        layer_id: layer.clone(),
        visible: false,
    }));
    assert!(!s.apply(EditorCommand::SetLayerVisibility {
        layer_id: layer,
        visible: false,
    }));
    assert!(s.pointer_down(Point::new(10.0, 10.0)).is_none());
}

#[test]
fn wheel_and_resize_update_viewport() {
    let mut s = session_with(Vec::new());
    assert!(s.wheel(Point::new(100.0, 100.0), -1.0));
    assert!((s.viewport().zoom - 1.1).abs() < 1e-12);
    assert!(s.take_dirty());

    assert!(s.resize(Size::new(800.0, 1024.0)));
    assert!((s.viewport().zoom - (1024.0 - 64.0) / 1920.0).abs() < 1e-12);
}

#[test]
fn select_page_ignores_unknown_ids_and_set_template_resets() {
    let mut s = session_with(vec![shape("a", 0.0, 0.0)]);
    assert!(!s.apply(EditorCommand::SelectPage("missing".to_owned())));
    s.apply(EditorCommand::SelectElements(vec!["a".to_owned()]));

    let mut ids = IdGen::new();
    let other = Template::draft(&mut ids, "Other", None);
    let page = other.pages[0].id.clone();
    assert!(s.apply(EditorCommand::SetTemplate(other)));
    assert_eq!(s.page_id(), page);
    assert!(s.selection().is_empty());
}

#[test]
fn cache_loads_mark_session_dirty() {
    use crate::assets::cache::ImageCacheOpts;
    use crate::assets::decode::{CachedImage, DecodedImage};
    use crate::assets::loader::MemoryLoader;

    let s = session_with(Vec::new());
    let mut cache = ImageCache::new(MemoryLoader::new(), ImageCacheOpts::default());
    s.watch_cache(&mut cache);
    assert!(!s.is_dirty());
    let img = DecodedImage::from_rgba8(1, 1, vec![0, 0, 0, 255]).unwrap();
    cache.insert("/x.png", CachedImage::Raster(img));
    assert!(s.is_dirty());
}

#[test]
fn render_draws_page_background_and_selection() {
    use crate::assets::cache::ImageCacheOpts;
    use crate::assets::loader::MemoryLoader;
    use crate::config::CompositorOpts;
    use crate::text::engine::FontBook;

    let mut s = session_with(vec![shape("a", 100.0, 100.0)]).with_guides(false);
    let mut comp = Compositor::with_fonts(CompositorOpts::default(), FontBook::default());
    let mut cache = ImageCache::new(MemoryLoader::new(), ImageCacheOpts::default());

    let frame = s.render(&mut comp, &mut cache, &[]).unwrap();
    assert_eq!((frame.width, frame.height), (1080, 1920));
    assert_eq!(frame.pixel(50, 50), Some([255, 255, 255, 255]));

    s.apply(EditorCommand::SelectElements(vec!["a".to_owned()]));
    let frame = s.render(&mut comp, &mut cache, &[]).unwrap();
    let [r, _, b, _] = frame.pixel(98, 150).unwrap();
    assert!(b > 200 && r < 80);
}
