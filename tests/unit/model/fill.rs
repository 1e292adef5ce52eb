use super::*;

#[test]
fn sample_interpolates_and_clamps() {
    let g = Gradient::linear([(0.0, Color::BLACK), (1.0, Color::WHITE)]);
    assert_eq!(g.sample(-1.0), Color::BLACK);
    assert_eq!(g.sample(2.0), Color::WHITE);
    let mid = g.sample(0.5);
    assert!((mid.r - 0.5).abs() < 1e-9);
    assert!((mid.a - 1.0).abs() < 1e-9);
}

#[test]
fn sample_three_stops() {
    let g = Gradient::linear([
        (0.0, Color::rgb8(0x2A, 0x35, 0x87)),
        (0.495192, Color::WHITE),
        (1.0, Color::rgb8(0xCF, 0x22, 0x28)),
    ]);
    assert_eq!(g.sample(0.495192).to_straight_rgba8(), [255, 255, 255, 255]);
    assert_eq!(g.sample(1.0).to_straight_rgba8(), [0xCF, 0x22, 0x28, 255]);
}

#[test]
fn validate_rejects_bad_stops() {
    assert!(Gradient::linear([]).validate().is_err());
    assert!(Gradient::linear([(1.5, Color::BLACK)]).validate().is_err());
    Gradient::linear([(0.0, Color::BLACK)]).validate().unwrap();
}

#[test]
fn fill_json_forms() {
    let f: Fill = serde_json::from_str(r##"{"color":"#ffffff"}"##).unwrap();
    assert_eq!(f, Fill::Solid(Color::WHITE));

    let f: Fill = serde_json::from_value(serde_json::json!({
        "gradient": {"type": "linear", "stops": [{"offset": 0, "color": "#000"}, {"offset": 1, "color": "#fff"}]}
    }))
    .unwrap();
    let Fill::Gradient(g) = &f else {
        panic!("expected gradient");
    };
    assert_eq!(g.stops.len(), 2);
    assert_eq!(g.kind, GradientKind::Linear);

    let f: Fill = serde_json::from_value(serde_json::json!({
        "pattern": {"imageId": "dots.png", "repeat": "repeat-x"}
    }))
    .unwrap();
    assert_eq!(
        f,
        Fill::Pattern(Pattern {
            image_id: "dots.png".into(),
            repeat: PatternRepeat::RepeatX,
            scale: 1.0,
            rotation: 0.0,
        })
    );

    assert!(serde_json::from_str::<Fill>("{}").is_err());
}

#[test]
fn fill_serializes_back_to_object() {
    let v = serde_json::to_value(Fill::Solid(Color::BLACK)).unwrap();
    assert_eq!(v, serde_json::json!({"color": "#000000"}));
}

#[test]
fn flat_color_of_each_variant() {
    assert_eq!(Fill::Solid(Color::WHITE).flat_color(), Some(Color::WHITE));
    let g = Gradient::linear([(0.0, Color::BLACK), (1.0, Color::WHITE)]);
    assert_eq!(Fill::Gradient(g).flat_color(), Some(Color::BLACK));
}
