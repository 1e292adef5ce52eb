use serde_json::json;

use super::*;

#[test]
fn defaults_are_sensible() {
    let s = StoryState::default();
    assert_eq!(s.club_id(), DEFAULT_CLUB);
    assert_eq!(s.background_mode, BackgroundMode::Image);
    assert!(s.is_light_text());
    assert!(s.title_visible.visible);
    let slots = s.metric_slots();
    assert!(slots.distance.is_some());
    assert!(slots.speed.is_some());
}

#[test]
fn parses_exporter_state_shape() {
    let s: StoryState = serde_json::from_value(json!({
        "image": "/uploads/ride.jpg",
        "club": "hedonism",
        "backgroundMode": "french",
        "fontColor": "black",
        "isMono": true,
        "RideData": [
            {"dataName": "Distance", "data": "42.1 km", "visible": true},
            {"dataName": "Elevation", "data": "0", "visible": true},
            {"dataName": "Moving Time", "data": "1:32", "visible": false}
        ],
        "speedData": [{"dataName": "Avg Speed", "data": "27 km/h", "visible": true}],
        "title": "Morning ride",
        "date": "12 May 2025",
        "titleVisible": {"visible": false}
    }))
    .unwrap();
    assert_eq!(s.background_mode, BackgroundMode::Flag);
    assert!(!s.is_light_text());
    assert!(!s.title_visible.visible);
    let slots = s.metric_slots();
    assert_eq!(slots.distance.unwrap().display_value(), "42.1 km");
    assert_eq!(slots.elevation.unwrap().display_value(), "\u{2014}");
    assert!(slots.time.is_none());
    assert_eq!(slots.speed.unwrap().data, "27 km/h");
}

#[test]
fn title_visible_accepts_bool() {
    let s: StoryState = serde_json::from_value(json!({"titleVisible": false})).unwrap();
    assert!(!s.title_visible.visible);
}

#[test]
fn blank_club_falls_back() {
    let s = StoryState {
        club: "  ".into(),
        ..StoryState::default()
    };
    assert_eq!(s.club_id(), DEFAULT_CLUB);
}

#[test]
fn empty_slots() {
    let s = StoryState {
        ride_data: vec![],
        speed_data: vec![],
        ..StoryState::default()
    };
    assert!(s.metric_slots().is_empty());
}
