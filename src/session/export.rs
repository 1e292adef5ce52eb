use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use crate::assets::cache::{ImageCache, ListenerId};
use crate::compose::{Compositor, Scene};
use crate::foundation::core::PageFormat;
use crate::foundation::error::{StoryplateError, StoryplateResult};
use crate::geo::polyline;
use crate::geo::projector::LatLng;
use crate::model::store::{StoryStore, SubscriptionId};
use crate::model::story::StoryState;
use crate::model::template::Page;
use crate::render::FrameRGBA;

/// Options for an [`ExportSession`].
#[derive(Clone, Debug)]
pub struct ExportSessionOpts {
    /// Output aspect.
    pub format: PageFormat,
    /// Decimal precision of encoded polylines.
    pub polyline_precision: u32,
    /// Draw the translucent scrim over the background.
    pub scrim: bool,
}

impl Default for ExportSessionOpts {
    fn default() -> Self {
        Self {
            format: PageFormat::Story,
            polyline_precision: 5,
            scrim: true,
        }
    }
}

impl ExportSessionOpts {
    /// Set the output aspect.
    pub fn with_format(mut self, format: PageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the polyline precision.
    pub fn with_polyline_precision(mut self, precision: u32) -> Self {
        self.polyline_precision = precision;
        self
    }

    /// Toggle the scrim.
    pub fn with_scrim(mut self, on: bool) -> Self {
        self.scrim = on;
        self
    }
}

/// Render counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames drawn.
    pub renders: u64,
    /// [`ExportSession::frame`] calls that found nothing to do.
    pub idle_frames: u64,
}

/// The exporter: a story store, an image cache and a compositor tied together by one dirty flag.
///
/// Store updates and finished image loads only set the flag; [`ExportSession::frame`] consumes
/// it, so any number of triggers between two frames cost one render.
pub struct ExportSession {
    store: StoryStore,
    cache: ImageCache,
    compositor: Compositor,
    opts: ExportSessionOpts,
    route: Vec<LatLng>,
    page: Option<Page>,
    dirty: Rc<Cell<bool>>,
    last: Option<FrameRGBA>,
    stats: ExportStats,
    store_sub: SubscriptionId,
    cache_sub: ListenerId,
}

impl std::fmt::Debug for ExportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportSession")
            .field("opts", &self.opts)
            .field("route_points", &self.route.len())
            .field("page", &self.page.as_ref().map(|p| &p.id))
            .field("dirty", &self.dirty.get())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl ExportSession {
    /// Wire `store` and `cache` to `compositor`. The session starts dirty.
    pub fn new(
        mut store: StoryStore,
        mut cache: ImageCache,
        compositor: Compositor,
        opts: ExportSessionOpts,
    ) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        let store_sub = store.subscribe(move |_| flag.set(true));
        let flag = Rc::clone(&dirty);
        let cache_sub = cache.subscribe(move |_| flag.set(true));
        Self {
            store,
            cache,
            compositor,
            opts,
            route: Vec::new(),
            page: None,
            dirty,
            last: None,
            stats: ExportStats::default(),
            store_sub,
            cache_sub,
        }
    }

    /// Current story state.
    pub fn state(&self) -> &StoryState {
        self.store.state()
    }

    /// Mutate the story state through the store.
    pub fn update(&mut self, mutator: impl FnOnce(&mut StoryState)) {
        self.store.update(mutator);
    }

    /// Subscribe to story updates alongside the session.
    pub fn subscribe(&mut self, callback: impl FnMut(&StoryState) + 'static) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    /// Remove a subscription added through [`ExportSession::subscribe`].
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        id != self.store_sub && self.store.unsubscribe(id)
    }

    /// Asset cache.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Mutable asset cache, e.g. to seed decoded images.
    pub fn cache_mut(&mut self) -> &mut ImageCache {
        &mut self.cache
    }

    /// Active options.
    pub fn opts(&self) -> &ExportSessionOpts {
        &self.opts
    }

    /// Render counters.
    pub fn stats(&self) -> ExportStats {
        self.stats
    }

    /// Whether the next [`ExportSession::frame`] will draw.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Shared handle to the dirty flag.
    pub fn dirty_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.dirty)
    }

    /// Decoded route.
    pub fn route(&self) -> &[LatLng] {
        &self.route
    }

    /// Replace the route.
    pub fn set_route(&mut self, route: Vec<LatLng>) {
        self.route = route;
        self.dirty.set(true);
    }

    /// Decode and use an encoded polyline. A decode failure is logged and clears the route;
    /// the session keeps rendering without it.
    pub fn set_polyline(&mut self, encoded: &str) -> StoryplateResult<usize> {
        match polyline::decode(encoded, self.opts.polyline_precision) {
            Ok(points) => {
                let n = points.len();
                self.set_route(points);
                Ok(n)
            }
            Err(e) => {
                tracing::warn!(error = %e, "polyline decode failed; route cleared");
                self.set_route(Vec::new());
                Err(e)
            }
        }
    }

    /// Draw a template page under the story blocks.
    pub fn set_page(&mut self, page: Option<Page>) {
        self.page = page;
        self.dirty.set(true);
    }

    /// Change the output aspect.
    pub fn set_format(&mut self, format: PageFormat) {
        if self.opts.format != format {
            self.opts.format = format;
            self.dirty.set(true);
        }
    }

    /// One tick of the host loop: load queued images, then render once if anything changed.
    /// Returns `true` when a frame was drawn.
    pub fn frame(&mut self) -> StoryplateResult<bool> {
        let report = self.cache.pump();
        if !report.loaded.is_empty() || !report.failed.is_empty() {
            tracing::debug!(
                loaded = report.loaded.len(),
                failed = report.failed.len(),
                "pumped image loads"
            );
        }
        if !self.dirty.get() {
            self.stats.idle_frames += 1;
            return Ok(false);
        }
        self.render_now()?;
        Ok(true)
    }

    /// Tick until no image load is pending (at most `max_rounds` ticks), then return the last
    /// frame.
    pub fn settle(&mut self, max_rounds: usize) -> StoryplateResult<&FrameRGBA> {
        for _ in 0..max_rounds.max(1) {
            self.frame()?;
            if self.cache.pending_len() == 0 && !self.dirty.get() {
                break;
            }
        }
        if self.last.is_none() || self.dirty.get() {
            self.render_now()?;
        }
        self.last
            .as_ref()
            .ok_or_else(|| StoryplateError::render("no frame rendered"))
    }

    /// Render immediately, regardless of the dirty flag.
    #[tracing::instrument(skip_all, fields(format = ?self.opts.format))]
    pub fn render_now(&mut self) -> StoryplateResult<&FrameRGBA> {
        self.dirty.set(false);
        let state = self.store.state();
        let mut scene =
            Scene::story(state, &self.route, self.opts.format).with_scrim(self.opts.scrim);
        if let Some(page) = &self.page {
            scene = scene.with_page(page);
        }
        let frame = self.compositor.render(&scene, &mut self.cache)?;
        self.stats.renders += 1;
        Ok(self.last.insert(frame))
    }

    /// Last drawn frame.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.last.as_ref()
    }

    /// PNG bytes of the current state, rendering first when needed.
    pub fn to_png_bytes(&mut self) -> StoryplateResult<Vec<u8>> {
        self.current()?.to_png_bytes()
    }

    /// `data:image/png;base64,…` URL of the current state.
    pub fn to_data_url(&mut self) -> StoryplateResult<String> {
        self.current()?.to_data_url()
    }

    /// Write the current state as a PNG file.
    pub fn write_png(&mut self, path: &Path) -> StoryplateResult<()> {
        self.current()?.write_png(path)
    }

    fn current(&mut self) -> StoryplateResult<&FrameRGBA> {
        if self.dirty.get() || self.last.is_none() {
            return self.render_now();
        }
        self.last
            .as_ref()
            .ok_or_else(|| StoryplateError::render("no frame rendered"))
    }

    /// Detach from the store and cache, returning them.
    pub fn into_parts(mut self) -> (StoryStore, ImageCache) {
        self.store.unsubscribe(self.store_sub);
        self.cache.unsubscribe(self.cache_sub);
        (self.store, self.cache)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
