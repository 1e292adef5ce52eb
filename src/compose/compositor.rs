use crate::assets::cache::ImageCache;
use crate::assets::color::Color;
use crate::compose::{background, elements, route, story};
use crate::config::CompositorOpts;
use crate::foundation::core::{Affine, Canvas, PageFormat};
use crate::foundation::error::StoryplateResult;
use crate::geo::projector::LatLng;
use crate::model::story::StoryState;
use crate::model::template::Page;
use crate::render::{CpuPainter, FrameRGBA, Paint};
use crate::text::engine::{FontBook, TextLayoutEngine};

/// Scrim opacity over the background.
pub const SCRIM_ALPHA: f64 = 0.4;

/// Editor-only overlays. Never part of an export.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decorations {
    /// Ids of elements to outline.
    pub selected: Vec<String>,
    /// Draw the safe-area guide.
    pub safe_zone: bool,
}

/// Everything one frame is drawn from.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    /// Output size.
    pub canvas: Canvas,
    /// Story snapshot.
    pub story: &'a StoryState,
    /// Decoded route, possibly empty.
    pub route: &'a [LatLng],
    /// Template page drawn as content.
    pub page: Option<&'a Page>,
    /// Draw the title, date and metrics blocks.
    pub story_text: bool,
    /// Draw the translucent scrim over the background.
    pub scrim: bool,
    /// Editor overlays.
    pub decorations: Option<&'a Decorations>,
}

impl<'a> Scene<'a> {
    /// An exported story at `format` with no template page.
    pub fn story(story: &'a StoryState, route: &'a [LatLng], format: PageFormat) -> Self {
        Self {
            canvas: format.canvas(),
            story,
            route,
            page: None,
            story_text: true,
            scrim: true,
            decorations: None,
        }
    }

    /// Draw `page`'s layers as content; the canvas follows the page size.
    pub fn with_page(mut self, page: &'a Page) -> Self {
        self.canvas = Canvas {
            width: page.size.width.round().max(1.0) as u32,
            height: page.size.height.round().max(1.0) as u32,
        };
        self.page = Some(page);
        self
    }

    /// Toggle the story text blocks.
    pub fn with_story_text(mut self, on: bool) -> Self {
        self.story_text = on;
        self
    }

    /// Toggle the scrim.
    pub fn with_scrim(mut self, on: bool) -> Self {
        self.scrim = on;
        self
    }

    /// Add editor overlays.
    pub fn with_decorations(mut self, decorations: &'a Decorations) -> Self {
        self.decorations = Some(decorations);
        self
    }
}

/// Shared state handed to every draw function for one frame.
pub(crate) struct DrawCtx<'a> {
    pub(crate) painter: &'a mut CpuPainter,
    pub(crate) text: &'a mut TextLayoutEngine,
    pub(crate) fonts: &'a FontBook,
    pub(crate) cache: &'a mut ImageCache,
    pub(crate) opts: &'a CompositorOpts,
    pub(crate) story: &'a StoryState,
    pub(crate) route: &'a [LatLng],
    pub(crate) canvas: Canvas,
}

impl DrawCtx<'_> {
    /// Canvas width over the 1080 design width.
    pub(crate) fn scale(&self) -> f64 {
        self.canvas.layout_scale()
    }
}

/// Stateless frame pipeline. Every [`Compositor::render`] call redraws the whole canvas; the
/// painter, text shaper and gradient rasters are only reused as caches.
pub struct Compositor {
    opts: CompositorOpts,
    fonts: FontBook,
    text: TextLayoutEngine,
    painter: Option<CpuPainter>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("opts", &self.opts)
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Build a compositor, loading the configured fonts. Missing fonts are logged and text is
    /// then laid out but not drawn.
    pub fn new(opts: CompositorOpts) -> Self {
        let fonts = FontBook::load(opts.font_regular.as_deref(), opts.font_bold.as_deref());
        Self::with_fonts(opts, fonts)
    }

    /// Build a compositor with already loaded fonts.
    pub fn with_fonts(opts: CompositorOpts, fonts: FontBook) -> Self {
        Self {
            opts,
            fonts,
            text: TextLayoutEngine::new(),
            painter: None,
        }
    }

    /// Active options.
    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    /// Loaded fonts.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Draw one frame.
    ///
    /// Order: clear, background, scrim, template content, story text, route, logo, editor
    /// decorations. Images that are not cached yet are queued on `cache` and drawn as
    /// placeholders (or left out, for the background); route and asset failures never fail the
    /// frame.
    #[tracing::instrument(skip_all, fields(w = scene.canvas.width, h = scene.canvas.height))]
    pub fn render(
        &mut self,
        scene: &Scene<'_>,
        cache: &mut ImageCache,
    ) -> StoryplateResult<FrameRGBA> {
        let painter = match self.painter.as_mut() {
            Some(p) => {
                p.begin(scene.canvas)?;
                p
            }
            None => self.painter.insert(CpuPainter::new(scene.canvas)?),
        };
        let mut ctx = DrawCtx {
            painter,
            text: &mut self.text,
            fonts: &self.fonts,
            cache,
            opts: &self.opts,
            story: scene.story,
            route: scene.route,
            canvas: scene.canvas,
        };

        background::draw_background(&mut ctx, scene.page)?;
        if scene.scrim {
            draw_scrim(&mut ctx)?;
        }
        if let Some(page) = scene.page {
            elements::draw_page(&mut ctx, page)?;
        }
        if scene.story_text {
            if scene.story.title_visible.visible {
                story::draw_title_block(&mut ctx)?;
            }
            story::draw_metrics(&mut ctx)?;
        }
        let map_placed = scene.page.is_some_and(Page::has_visible_map);
        if !map_placed {
            route::draw_route_slot(&mut ctx)?;
        } else {
            tracing::debug!("route slot suppressed by map element");
        }
        story::draw_logo(&mut ctx)?;
        if let (Some(deco), Some(page)) = (scene.decorations, scene.page) {
            elements::draw_decorations(&mut ctx, page, deco)?;
        }

        ctx.painter.finish()
    }

    /// The editor's stand-in for a template with no pages.
    pub fn render_missing_page(&mut self, format: PageFormat) -> StoryplateResult<FrameRGBA> {
        let canvas = format.canvas();
        let painter = match self.painter.as_mut() {
            Some(p) => {
                p.begin(canvas)?;
                p
            }
            None => self.painter.insert(CpuPainter::new(canvas)?),
        };
        painter.fill_rect(
            canvas.rect(),
            Affine::IDENTITY,
            &Paint::Solid(Color::rgb8(0x1a, 0x1a, 0x1a)),
        )?;
        let size = 48.0 * canvas.layout_scale();
        if let Some(face) = self.fonts.face(false) {
            let c = canvas.rect().center();
            let brush = Color::rgb8(0x66, 0x66, 0x66).into();
            match self.text.layout_line("No page", face, size as f32, 0.0, brush) {
                Ok(layout) => {
                    let w = f64::from(layout.width());
                    painter.draw_text_layout(
                        &layout,
                        face,
                        Affine::translate((c.x - w / 2.0, c.y - size / 2.0)),
                    );
                }
                Err(e) => tracing::warn!(error = %e, "placeholder label layout failed"),
            }
        }
        painter.finish()
    }
}

fn draw_scrim(ctx: &mut DrawCtx<'_>) -> StoryplateResult<()> {
    let color = if ctx.story.is_light_text() {
        Color::BLACK
    } else {
        Color::WHITE
    };
    ctx.painter.push_opacity(SCRIM_ALPHA);
    let out = ctx
        .painter
        .fill_rect(ctx.canvas.rect(), Affine::IDENTITY, &Paint::Solid(color));
    ctx.painter.pop_layer();
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
