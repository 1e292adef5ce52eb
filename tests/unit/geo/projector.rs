use super::*;

fn pts(v: &[(f64, f64)]) -> Vec<LatLng> {
    v.iter().map(|&(a, b)| LatLng::new(a, b)).collect()
}

#[test]
fn reference_route_scale_and_center() {
    let route = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
    let dest = Rect::new(0.0, 0.0, 100.0, 100.0);
    let proj = RouteProjection::fit(&route, dest, DEFAULT_SHRINK).unwrap();
    assert!((proj.scale - 45.0).abs() < 1e-9);
    assert_eq!(proj.center, LatLng::new(1.0, 0.5));

    let out = proj.project_all(&route);
    let xs: Vec<f64> = out.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = out.iter().map(|p| p.y).collect();
    let bx = (xs.iter().cloned().fold(f64::MAX, f64::min) + xs.iter().cloned().fold(f64::MIN, f64::max)) / 2.0;
    let by = (ys.iter().cloned().fold(f64::MAX, f64::min) + ys.iter().cloned().fold(f64::MIN, f64::max)) / 2.0;
    assert!((bx - 50.0).abs() < 1e-9);
    assert!((by - 50.0).abs() < 1e-9);
    // north is up
    assert!(out[1].y < out[0].y);
    assert!((out[0].y - 95.0).abs() < 1e-9);
    assert!((out[1].y - 50.0).abs() < 1e-9);
}

#[test]
fn projected_bbox_fits_shrunk_destination() {
    let route = pts(&[
        (48.85, 2.29),
        (48.86, 2.35),
        (48.87, 2.31),
        (48.84, 2.33),
        (48.853, 2.41),
    ]);
    for dest in [
        Rect::new(80.0, 400.0, 1000.0, 1540.0),
        Rect::new(0.0, 0.0, 300.0, 50.0),
        Rect::new(10.0, 10.0, 20.0, 900.0),
    ] {
        let out = project(&route, dest, 0.9).unwrap();
        let bbox = out
            .iter()
            .fold(Rect::from_points(out[0], out[0]), |r, p| r.union_pt(*p));
        assert!(bbox.width() <= dest.width() * 0.9 + 1e-6);
        assert!(bbox.height() <= dest.height() * 0.9 + 1e-6);
        assert!((bbox.center().x - dest.center().x).abs() < 0.5);
        assert!((bbox.center().y - dest.center().y).abs() < 0.5);
    }
}

#[test]
fn degenerate_routes_are_empty_route_errors() {
    let dest = Rect::new(0.0, 0.0, 100.0, 100.0);
    for route in [
        vec![],
        pts(&[(1.0, 1.0)]),
        pts(&[(1.0, 1.0), (1.0, 2.0)]),
        pts(&[(1.0, 1.0), (2.0, 1.0)]),
        pts(&[(1.0, 1.0), (1.0, 1.0)]),
    ] {
        let err = project(&route, dest, 0.9).unwrap_err();
        assert!(matches!(err, StoryplateError::EmptyRoute(_)), "{route:?}");
    }
    let ok = pts(&[(0.0, 0.0), (1.0, 1.0)]);
    assert!(project(&ok, Rect::new(0.0, 0.0, 0.0, 10.0), 0.9).is_err());
}

#[test]
fn to_path_is_open_polyline() {
    let path = to_path(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)]);
    assert_eq!(path.elements().len(), 3);
    assert!(to_path(&[]).elements().is_empty());
}

#[test]
fn latlng_serde_forms() {
    let p: LatLng = serde_json::from_str("[48.8, 2.3]").unwrap();
    assert_eq!(p, LatLng::new(48.8, 2.3));
    let p: LatLng = serde_json::from_str(r#"{"lat": 1, "lon": 2}"#).unwrap();
    assert_eq!(p, LatLng::new(1.0, 2.0));
    assert_eq!(serde_json::to_string(&p).unwrap(), "[1.0,2.0]");
}
