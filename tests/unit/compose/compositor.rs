use super::*;
use crate::assets::cache::ImageCacheOpts;
use crate::assets::decode::{CachedImage, DecodedImage};
use crate::assets::loader::MemoryLoader;
use crate::model::story::BackgroundMode;
use crate::model::template::Page;

fn compositor() -> Compositor {
    Compositor::with_fonts(CompositorOpts::default(), FontBook::default())
}

fn cache() -> ImageCache {
    ImageCache::new(MemoryLoader::new(), ImageCacheOpts::default())
}

fn story(mode: BackgroundMode) -> StoryState {
    StoryState {
        background_mode: mode,
        ..StoryState::default()
    }
}

fn unscrimmed(state: &StoryState) -> Scene<'_> {
    Scene::story(state, &[], PageFormat::Story).with_scrim(false)
}

fn peak_route() -> Vec<LatLng> {
    vec![
        LatLng::new(0.0, 0.0),
        LatLng::new(1.0, 1.0),
        LatLng::new(0.0, 2.0),
    ]
}

#[test]
fn solid_mode_with_light_text_is_black() {
    let state = story(BackgroundMode::Solid);
    let frame = compositor()
        .render(&Scene::story(&state, &[], PageFormat::Story), &mut cache())
        .unwrap();
    assert_eq!((frame.width, frame.height), (1080, 1920));
    assert_eq!(frame.pixel(10, 10), Some([0, 0, 0, 255]));
}

#[test]
fn flag_mode_paints_three_stripes() {
    let state = story(BackgroundMode::Flag);
    let scene = Scene::story(&state, &[], PageFormat::Story).with_scrim(false);
    let frame = compositor().render(&scene, &mut cache()).unwrap();
    assert_eq!(frame.pixel(100, 960), Some([0x00, 0x55, 0xA4, 255]));
    assert_eq!(frame.pixel(540, 960), Some([0xFF, 0xFF, 0xFF, 255]));
    assert_eq!(frame.pixel(980, 960), Some([0xEF, 0x41, 0x35, 255]));
}

#[test]
fn scrim_lightens_under_dark_text() {
    let mut state = story(BackgroundMode::Solid);
    state.font_color = Color::BLACK;
    let frame = compositor()
        .render(&Scene::story(&state, &[], PageFormat::Story), &mut cache())
        .unwrap();
    // white background under a white scrim stays white
    assert_eq!(frame.pixel(10, 10), Some([255, 255, 255, 255]));

    let mut state = story(BackgroundMode::Flag);
    state.font_color = Color::BLACK;
    let frame = compositor()
        .render(&Scene::story(&state, &[], PageFormat::Story), &mut cache())
        .unwrap();
    let [r, g, b, a] = frame.pixel(100, 960).unwrap();
    assert_eq!(a, 255);
    assert!((i32::from(r) - 102).abs() <= 2, "r={r}");
    assert!(g > 0x55 && b > 0xA4);
}

#[test]
fn pending_background_is_left_out_and_queued() {
    let state = story(BackgroundMode::Image);
    let scene = Scene::story(&state, &[], PageFormat::Story).with_scrim(false);
    let mut cache = cache();
    let frame = compositor().render(&scene, &mut cache).unwrap();
    assert_eq!(frame.pixel(10, 10), Some([0, 0, 0, 0]));
    assert!(cache.pending_len() >= 1);
}

#[test]
fn cached_background_covers_the_canvas() {
    let state = story(BackgroundMode::Image);
    let scene = Scene::story(&state, &[], PageFormat::Story).with_scrim(false);
    let mut cache = cache();
    let red = DecodedImage::from_rgba8(2, 2, [255, 0, 0, 255].repeat(4)).unwrap();
    cache.insert("/bg.jpeg", CachedImage::Raster(red));
    let frame = compositor().render(&scene, &mut cache).unwrap();
    assert_eq!(frame.pixel(10, 10), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(1070, 1910), Some([255, 0, 0, 255]));
}

#[test]
fn mono_toggle_leaves_cached_background_untouched() {
    let bytes: Vec<u8> = [
        [200, 40, 40, 255],
        [30, 160, 90, 255],
        [20, 60, 220, 255],
        [250, 250, 10, 255],
    ]
    .concat();
    let mut cache = cache();
    cache.insert(
        "/bg.jpeg",
        CachedImage::Raster(DecodedImage::from_rgba8(2, 2, bytes.clone()).unwrap()),
    );

    let color = story(BackgroundMode::Image);
    let mono = StoryState {
        is_mono: true,
        ..color.clone()
    };
    let reference = compositor().render(&unscrimmed(&color), &mut cache).unwrap();

    let mut comp = compositor();
    let gray = comp.render(&unscrimmed(&mono), &mut cache).unwrap();
    let [r, g, b, _] = gray.pixel(10, 10).unwrap();
    assert!(r == g && g == b);
    assert_ne!(gray.data, reference.data);

    let restored = comp.render(&unscrimmed(&color), &mut cache).unwrap();
    assert_eq!(restored.data, reference.data);

    let Some(CachedImage::Raster(cached)) = cache.get("/bg.jpeg") else {
        panic!("background left the cache");
    };
    assert_eq!(cached.rgba8.as_slice(), bytes.as_slice());
}

#[test]
fn hedonism_route_is_pink_in_the_slot() {
    let mut state = story(BackgroundMode::Solid);
    state.club = "hedonism".to_owned();
    let route = peak_route();
    let frame = compositor()
        .render(&Scene::story(&state, &route, PageFormat::Story), &mut cache())
        .unwrap();
    let [r, g, b, a] = frame.pixel(540, 765).unwrap();
    assert_eq!(a, 255);
    assert!(r > 240 && (100..=116).contains(&g) && b > 190, "{r} {g} {b}");
    assert_eq!(frame.pixel(540, 1500), Some([0, 0, 0, 255]));
}

#[test]
fn map_element_suppresses_the_route_slot() {
    let mut state = story(BackgroundMode::Solid);
    state.club = "hedonism".to_owned();
    let route = peak_route();
    let mut page = Page::new("p1", PageFormat::Story, "l1");
    page.background = Some(crate::model::fill::Fill::Solid(Color::BLACK));
    page.layers[0].elements.push(
        serde_json::from_value(serde_json::json!({
            "id": "map",
            "kind": "map",
            "position": {"x": 0, "y": 0},
            "box": {"width": 200, "height": 200}
        }))
        .unwrap(),
    );
    let scene = Scene::story(&state, &route, PageFormat::Story)
        .with_page(&page)
        .with_scrim(false);
    let frame = compositor().render(&scene, &mut cache()).unwrap();
    assert_eq!(frame.pixel(540, 765), Some([0, 0, 0, 255]));
}

#[test]
fn unloaded_image_element_draws_placeholder() {
    let state = story(BackgroundMode::Solid);
    let mut page = Page::new("p1", PageFormat::Story, "l1");
    page.layers[0].elements.push(
        serde_json::from_value(serde_json::json!({
            "id": "img",
            "kind": "image",
            "position": {"x": 100, "y": 100},
            "box": {"width": 300, "height": 200},
            "assetId": "photo.png"
        }))
        .unwrap(),
    );
    let scene = Scene::story(&state, &[], PageFormat::Story)
        .with_page(&page)
        .with_scrim(false)
        .with_story_text(false);
    let mut cache = cache();
    let frame = compositor().render(&scene, &mut cache).unwrap();
    assert_eq!(frame.pixel(250, 200), Some([0x33, 0x33, 0x33, 255]));
    assert!(cache.pending_len() >= 1);
}

#[test]
fn selection_outline_is_drawn_only_with_decorations() {
    let state = story(BackgroundMode::Solid);
    let mut page = Page::new("p1", PageFormat::Story, "l1");
    page.background = Some(crate::model::fill::Fill::Solid(Color::BLACK));
    page.layers[0].elements.push(
        serde_json::from_value(serde_json::json!({
            "id": "box",
            "kind": "shape",
            "position": {"x": 100, "y": 100},
            "box": {"width": 200, "height": 200}
        }))
        .unwrap(),
    );
    let deco = Decorations {
        selected: vec!["box".to_owned()],
        safe_zone: false,
    };
    let plain = Scene::story(&state, &[], PageFormat::Story)
        .with_page(&page)
        .with_scrim(false);
    let decorated = plain.with_decorations(&deco);

    let mut comp = compositor();
    let frame = comp.render(&plain, &mut cache()).unwrap();
    assert_eq!(frame.pixel(98, 200), Some([0, 0, 0, 255]));
    let frame = comp.render(&decorated, &mut cache()).unwrap();
    let [r, g, b, _] = frame.pixel(98, 200).unwrap();
    assert!(b > 200 && r < 80 && g < 140, "{r} {g} {b}");
}

#[test]
fn missing_page_is_dark_grey() {
    let frame = compositor().render_missing_page(PageFormat::Portrait).unwrap();
    assert_eq!((frame.width, frame.height), (1080, 1350));
    assert_eq!(frame.pixel(5, 5), Some([0x1a, 0x1a, 0x1a, 255]));
}
