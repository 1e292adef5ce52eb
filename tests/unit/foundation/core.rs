use super::*;

#[test]
fn page_formats_have_contract_sizes() {
    assert_eq!(
        PageFormat::Story.canvas(),
        Canvas {
            width: 1080,
            height: 1920
        }
    );
    assert_eq!(
        PageFormat::Portrait.canvas(),
        Canvas {
            width: 1080,
            height: 1350
        }
    );
}

#[test]
fn page_format_recognition() {
    assert_eq!(PageFormat::from_size(1080.0, 1920.0), Some(PageFormat::Story));
    assert_eq!(
        PageFormat::from_size(1080.0, 1350.0),
        Some(PageFormat::Portrait)
    );
    assert_eq!(PageFormat::from_size(1080.0, 1080.0), None);
    assert_eq!(PageFormat::from_ratio("4:5").unwrap(), PageFormat::Portrait);
    assert!(PageFormat::from_ratio("1:1").is_err());
}

#[test]
fn canvas_layout_scale_and_u16() {
    let c = Canvas {
        width: 540,
        height: 960,
    };
    assert!((c.layout_scale() - 0.5).abs() < 1e-12);
    assert_eq!(c.to_u16().unwrap(), (540, 960));
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .to_u16()
        .is_err()
    );
}

#[test]
fn insets_shrink_rect() {
    let r = Insets::SAFE_AREA.inset_rect(Rect::new(0.0, 0.0, 1080.0, 1920.0));
    assert_eq!(r, Rect::new(80.0, 250.0, 1000.0, 1820.0));
    let half = Insets::SAFE_AREA.scaled(0.5);
    assert_eq!(half.top, 125.0);
}

#[test]
fn premul_from_straight() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.a, 128);
    assert_eq!(c.r, 128);
    assert_eq!(c.g, 64);
    assert_eq!(c.b, 0);
}
