use super::*;

fn close(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-9
}

#[test]
fn screen_and_canvas_are_inverse() {
    let vp = Viewport::new()
        .with_zoom(2.0)
        .with_pan(Vec2::new(30.0, -10.0))
        .with_padding(64.0);
    let s = Point::new(200.0, 150.0);
    let c = vp.screen_to_canvas(s);
    assert!(close(c, Point::new((200.0 - 30.0 - 64.0) / 2.0, (150.0 + 10.0 - 64.0) / 2.0)));
    assert!(close(vp.canvas_to_screen(c), s));
    assert!(close(vp.to_affine() * c, s));
}

#[test]
fn zoom_is_clamped_and_ignores_nan() {
    let mut vp = Viewport::new();
    assert!(vp.set_zoom(100.0));
    assert_eq!(vp.zoom, ZOOM_MAX);
    assert!(vp.set_zoom(0.0));
    assert_eq!(vp.zoom, ZOOM_MIN);
    assert!(!vp.set_zoom(f64::NAN));
    assert_eq!(vp.zoom, ZOOM_MIN);
}

#[test]
fn wheel_zoom_keeps_point_under_cursor() {
    let mut vp = Viewport::new()
        .with_zoom(0.5)
        .with_pan(Vec2::new(12.0, 40.0))
        .with_padding(64.0);
    let cursor = Point::new(321.0, 487.0);
    let before = vp.screen_to_canvas(cursor);

    assert!(vp.wheel(cursor, -120.0));
    assert!((vp.zoom - 0.6).abs() < 1e-12);
    assert!((vp.screen_to_canvas(cursor) - before).hypot() < 1.0);

    assert!(vp.wheel(cursor, 120.0));
    assert!(vp.wheel(cursor, 120.0));
    assert!((vp.zoom - 0.4).abs() < 1e-12);
    assert!((vp.screen_to_canvas(cursor) - before).hypot() < 1.0);

    assert!(!vp.wheel(cursor, 0.0));
}

#[test]
fn wheel_at_limit_is_a_no_op() {
    let mut vp = Viewport::new().with_zoom(ZOOM_MAX);
    let before = vp;
    assert!(!vp.wheel(Point::new(10.0, 10.0), -1.0));
    assert_eq!(vp, before);
}

#[test]
fn drag_delta_is_divided_by_zoom() {
    let vp = Viewport::new().with_zoom(0.5);
    assert_eq!(vp.drag_delta(Vec2::new(10.0, -4.0)), Vec2::new(20.0, -8.0));
}

#[test]
fn fit_centers_page_and_never_enlarges() {
    let page = Size::new(1080.0, 1920.0);
    let vp = Viewport::fit(Size::new(800.0, 1024.0), page, 0.0);
    assert!((vp.zoom - (1024.0 - 64.0) / 1920.0).abs() < 1e-12);
    let tl = vp.canvas_to_screen(Point::ORIGIN);
    let br = vp.canvas_to_screen(Point::new(1080.0, 1920.0));
    assert!(((tl.x + br.x) / 2.0 - 400.0).abs() < 1e-9);
    assert!(((tl.y + br.y) / 2.0 - 512.0).abs() < 1e-9);

    let big = Viewport::fit(Size::new(4000.0, 4000.0), page, 64.0);
    assert_eq!(big.zoom, 1.0);
    let tl = big.canvas_to_screen(Point::ORIGIN);
    assert!((tl.x - (4000.0 - 1080.0) / 2.0).abs() < 1e-9);
}

#[test]
fn fit_into_tiny_container_clamps_zoom() {
    let vp = Viewport::fit(Size::new(10.0, 10.0), Size::new(1080.0, 1920.0), 0.0);
    assert_eq!(vp.zoom, ZOOM_MIN);
}
