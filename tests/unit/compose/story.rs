use super::*;
use crate::foundation::core::PageFormat;

#[test]
fn logo_sits_top_right() {
    let r = logo_rect(PageFormat::Story.canvas(), Insets::SAFE_AREA);
    assert_eq!(r, Rect::new(820.0, 166.0, 1000.0, 346.0));
}

#[test]
fn title_stops_short_of_logo() {
    let (x, y, w) = title_anchor(PageFormat::Story.canvas(), Insets::SAFE_AREA);
    assert_eq!((x, y), (80.0, 250.0));
    assert_eq!(w, 820.0 - 80.0 - 20.0);
}

#[test]
fn metrics_grid_rows_and_columns() {
    let g = MetricsGrid::new(PageFormat::Story.canvas(), Insets::SAFE_AREA);
    assert_eq!(g.label_size, 32.0);
    assert_eq!(g.value_size, 52.0);
    assert_eq!(g.lower_row_y, 1820.0);
    assert_eq!(g.upper_row_y, 1820.0 - (52.0 + 32.0 + 20.0) - 44.0);
    assert!((g.cell_width - 920.0 / 3.0).abs() < 1e-9);
    assert_eq!(g.column(0), (80.0, TextAlign::Left));
    assert_eq!(g.column(1).1, TextAlign::Center);
    assert!((g.column(1).0 - 540.0).abs() < 1e-9);
    assert!((g.column(2).0 - 1000.0).abs() < 1e-9);
    assert_eq!(g.column(2).1, TextAlign::Right);
    assert_eq!(g.label_y(1820.0), 1820.0 - 52.0 - 10.0);
}

#[test]
fn portrait_grid_tracks_height() {
    let g = MetricsGrid::new(PageFormat::Portrait.canvas(), Insets::SAFE_AREA);
    assert_eq!(g.lower_row_y, 1250.0);
}
