use super::*;
use crate::foundation::core::PageFormat;

#[test]
fn club_picks_route_style() {
    assert_eq!(
        RouteStyle::for_club("hedonism"),
        RouteStyle::Solid(HEDONISM_ROUTE_COLOR)
    );
    assert_eq!(
        RouteStyle::for_club("not-in-paris"),
        RouteStyle::VerticalGradient
    );
    assert_eq!(RouteStyle::for_club(""), RouteStyle::VerticalGradient);
}

#[test]
fn story_slot_matches_layout() {
    let slot = route_slot(PageFormat::Story.canvas(), Insets::SAFE_AREA);
    assert_eq!(slot, Rect::new(80.0, 400.0, 1000.0, 1540.0));
    let slot = route_slot(PageFormat::Portrait.canvas(), Insets::SAFE_AREA);
    assert_eq!(slot.y1, 1350.0 - 380.0);
}

#[test]
fn gradient_paint_spans_the_area() {
    let area = Rect::new(0.0, 100.0, 50.0, 300.0);
    match RouteStyle::VerticalGradient.paint(area) {
        Paint::Gradient {
            gradient,
            geometry,
            area: a,
        } => {
            assert_eq!(a, area);
            assert_eq!(gradient.stops.len(), 3);
            assert_eq!(gradient.stops[1].offset, 0.495192);
            assert!(geometry.t_at((25.0, 100.0).into()).abs() < 1e-9);
            assert!((geometry.t_at((25.0, 300.0).into()) - 1.0).abs() < 1e-9);
        }
        other => panic!("unexpected paint {other:?}"),
    }
}
