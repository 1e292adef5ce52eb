use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::assets::cache::{ImageCache, ListenerId};
use crate::compose::{Compositor, Decorations, Scene};
use crate::editor::hit_test::{HitMode, HitTester};
use crate::editor::viewport::Viewport;
use crate::foundation::core::{PageFormat, Point, Size, Vec2};
use crate::foundation::error::StoryplateResult;
use crate::geo::projector::LatLng;
use crate::model::element::{Coord, Element, ElementKind};
use crate::model::story::{BackgroundMode, StoryState};
use crate::model::template::{IdGen, Page, Template};
use crate::render::FrameRGBA;

/// Offset applied to duplicated elements, in design units.
pub const DUPLICATE_OFFSET: f64 = 16.0;

/// In-place element edit carried by [`EditorCommand::UpdateElement`].
pub type ElementUpdate = Box<dyn FnOnce(&mut Element)>;

/// Every mutation of the editor's working copy.
pub enum EditorCommand {
    /// Replace the working copy and select its first page.
    SetTemplate(Template),
    /// Show another page; clears the selection.
    SelectPage(String),
    /// Replace the selection.
    SelectElements(Vec<String>),
    /// Move an element (locked or not) to a new position.
    MoveElement {
        /// Element id.
        id: String,
        /// New position in page units.
        position: Coord,
    },
    /// Run a closure over an element.
    UpdateElement {
        /// Element id.
        id: String,
        /// The edit.
        update: ElementUpdate,
    },
    /// Append an element to a layer and select it.
    AddElement {
        /// Target layer id (any page).
        layer_id: String,
        /// Element to add; a missing or taken id is replaced.
        element: Element,
    },
    /// Copy every selected top-level element next to itself and select the copies.
    DuplicateSelection,
    /// Remove every selected element.
    DeleteSelection,
    /// Show or hide a layer.
    SetLayerVisibility {
        /// Layer id (any page).
        layer_id: String,
        /// New flag.
        visible: bool,
    },
    /// Replace the viewport.
    SetViewport(Viewport),
}

impl EditorCommand {
    /// Build an [`EditorCommand::UpdateElement`].
    pub fn update(id: impl Into<String>, update: impl FnOnce(&mut Element) + 'static) -> Self {
        Self::UpdateElement {
            id: id.into(),
            update: Box::new(update),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetTemplate(_) => "set_template",
            Self::SelectPage(_) => "select_page",
            Self::SelectElements(_) => "select_elements",
            Self::MoveElement { .. } => "move_element",
            Self::UpdateElement { .. } => "update_element",
            Self::AddElement { .. } => "add_element",
            Self::DuplicateSelection => "duplicate_selection",
            Self::DeleteSelection => "delete_selection",
            Self::SetLayerVisibility { .. } => "set_layer_visibility",
            Self::SetViewport(_) => "set_viewport",
        }
    }
}

impl std::fmt::Debug for EditorCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SetTemplate(t) => f.debug_tuple("SetTemplate").field(&t.id).finish(),
            Self::SelectPage(id) => f.debug_tuple("SelectPage").field(id).finish(),
            Self::SelectElements(ids) => f.debug_tuple("SelectElements").field(ids).finish(),
            Self::MoveElement { id, position } => f
                .debug_struct("MoveElement")
                .field("id", id)
                .field("position", position)
                .finish(),
            Self::UpdateElement { id, .. } => f
                .debug_struct("UpdateElement")
                .field("id", id)
                .finish_non_exhaustive(),
            Self::AddElement { layer_id, element } => f
                .debug_struct("AddElement")
                .field("layer_id", layer_id)
                .field("element", &element.base.id)
                .finish(),
            Self::DuplicateSelection => f.write_str("DuplicateSelection"),
            Self::DeleteSelection => f.write_str("DeleteSelection"),
            Self::SetLayerVisibility { layer_id, visible } => f
                .debug_struct("SetLayerVisibility")
                .field("layer_id", layer_id)
                .field("visible", visible)
                .finish(),
            Self::SetViewport(vp) => f.debug_tuple("SetViewport").field(vp).finish(),
        }
    }
}

/// Pointer gesture in progress.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
    /// No button held.
    #[default]
    Idle,
    /// Dragging an element.
    Dragging {
        /// Element being dragged.
        id: String,
        /// Screen position of the pointer-down.
        origin: Point,
        /// Element position at pointer-down.
        start: Coord,
        /// Locked elements stay put.
        locked: bool,
    },
    /// Dragging the empty canvas.
    Panning {
        /// Last screen position seen.
        last: Point,
    },
}

/// The editor's single writer: owns the working copy of a template, the selection, the
/// viewport and the pointer gesture, and marks a shared dirty flag whenever anything visible
/// changes. Renderers only ever see `&Template`.
pub struct EditorSession {
    template: Template,
    page_id: String,
    selection: Vec<String>,
    viewport: Viewport,
    hit: HitTester,
    gesture: Gesture,
    ids: IdGen,
    preview: StoryState,
    show_guides: bool,
    dirty: Rc<Cell<bool>>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("template", &self.template.id)
            .field("page_id", &self.page_id)
            .field("selection", &self.selection)
            .field("viewport", &self.viewport)
            .field("gesture", &self.gesture)
            .field("dirty", &self.dirty.get())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Session over `template`, showing its first page. Starts dirty.
    pub fn new(template: Template) -> Self {
        let page_id = first_page_id(&template);
        Self {
            template,
            page_id,
            selection: Vec::new(),
            viewport: Viewport::default(),
            hit: HitTester::default(),
            gesture: Gesture::Idle,
            ids: IdGen::new(),
            preview: StoryState {
                background_mode: BackgroundMode::Template,
                ..StoryState::default()
            },
            show_guides: true,
            dirty: Rc::new(Cell::new(true)),
        }
    }

    /// Session over a fresh draft template.
    pub fn draft(name: impl Into<String>) -> Self {
        let mut ids = IdGen::new();
        let template = Template::draft(&mut ids, name, None);
        let mut session = Self::new(template);
        session.ids = ids;
        session
    }

    /// Use a different hit-test mode.
    pub fn with_hit_mode(mut self, mode: HitMode) -> Self {
        self.hit = HitTester::new(mode);
        self
    }

    /// Story state used for live previews (club, route color, logo).
    pub fn with_preview(mut self, preview: StoryState) -> Self {
        self.preview = preview;
        self
    }

    /// Toggle the safe-area guide.
    pub fn with_guides(mut self, on: bool) -> Self {
        self.show_guides = on;
        self
    }

    /// Working copy.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Id of the page being edited.
    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Page being edited; the first page when the id is stale.
    pub fn page(&self) -> Option<&Page> {
        self.template
            .page(&self.page_id)
            .or_else(|| self.template.pages.first())
    }

    /// Selected element ids.
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Current pointer gesture.
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Whether a render is due.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    /// Shared handle to the dirty flag, for callbacks that should schedule a render.
    pub fn dirty_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.dirty)
    }

    /// Re-render whenever `cache` finishes loading an image.
    pub fn watch_cache(&self, cache: &mut ImageCache) -> ListenerId {
        let dirty = self.dirty_flag();
        cache.subscribe(move |_| dirty.set(true))
    }

    /// Editor overlays for the current selection.
    pub fn decorations(&self) -> Decorations {
        Decorations {
            selected: self.selection.clone(),
            safe_zone: self.show_guides,
        }
    }

    /// Apply one command. Returns `true` (and marks dirty) when anything changed.
    pub fn apply(&mut self, command: EditorCommand) -> bool {
        let name = command.name();
        let changed = match command {
            EditorCommand::SetTemplate(template) => {
                self.page_id = first_page_id(&template);
                self.template = template;
                self.selection.clear();
                self.gesture = Gesture::Idle;
                true
            }
            EditorCommand::SelectPage(id) => {
                if id == self.page_id || self.template.page(&id).is_none() {
                    false
                } else {
                    self.page_id = id;
                    self.selection.clear();
                    self.gesture = Gesture::Idle;
                    true
                }
            }
            EditorCommand::SelectElements(ids) => {
                if ids == self.selection {
                    false
                } else {
                    self.selection = ids;
                    true
                }
            }
            EditorCommand::MoveElement { id, position } => {
                match self.template.element_mut(&id) {
                    Some(el) if el.base.position != position => {
                        el.base.position = position;
                        true
                    }
                    _ => false,
                }
            }
            EditorCommand::UpdateElement { id, update } => match self.template.element_mut(&id) {
                Some(el) => {
                    let before = el.clone();
                    update(el);
                    *el != before
                }
                None => false,
            },
            EditorCommand::AddElement { layer_id, element } => self.add_element(&layer_id, element),
            EditorCommand::DuplicateSelection => self.duplicate_selection(),
            EditorCommand::DeleteSelection => self.delete_selection(),
            EditorCommand::SetLayerVisibility { layer_id, visible } => {
                match self
                    .template
                    .pages
                    .iter_mut()
                    .flat_map(|p| p.layers.iter_mut())
                    .find(|l| l.id == layer_id)
                {
                    Some(layer) if layer.visible != visible => {
                        layer.visible = visible;
                        true
                    }
                    _ => false,
                }
            }
            EditorCommand::SetViewport(vp) => {
                if vp == self.viewport {
                    false
                } else {
                    self.viewport = vp;
                    true
                }
            }
        };
        if changed {
            tracing::debug!(command = name, "editor state changed");
            self.dirty.set(true);
        }
        changed
    }

    fn add_element(&mut self, layer_id: &str, mut element: Element) -> bool {
        let exists = self
            .template
            .pages
            .iter()
            .flat_map(|p| &p.layers)
            .any(|l| l.id == layer_id);
        if !exists {
            return false;
        }
        let mut fresh = HashSet::new();
        if element.base.id.is_empty() || self.template.contains_id(&element.base.id) {
            reassign_ids(&mut element, &mut self.ids, &self.template, &mut fresh);
        }
        let id = element.base.id.clone();
        if let Some(layer) = self
            .template
            .pages
            .iter_mut()
            .flat_map(|p| p.layers.iter_mut())
            .find(|l| l.id == layer_id)
        {
            layer.elements.push(element);
        }
        self.selection = vec![id];
        true
    }

    fn duplicate_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let mut copies = Vec::new();
        let mut fresh = HashSet::new();
        for id in &self.selection {
            let Some(path) = self.template.locate(id) else {
                continue;
            };
            let layer = &self.template.pages[path.page].layers[path.layer];
            let source = &layer.elements[path.element];
            if source.base.id != *id {
                tracing::debug!(id = %id, "nested selection is not duplicated");
                continue;
            }
            let mut clone = source.clone();
            reassign_ids(&mut clone, &mut self.ids, &self.template, &mut fresh);
            clone.base.position = Coord::new(
                clone.base.position.x + DUPLICATE_OFFSET,
                clone.base.position.y + DUPLICATE_OFFSET,
            );
            clone.base.name = format!("{} Copy", clone.base.name);
            copies.push((path, clone));
        }
        if copies.is_empty() {
            return false;
        }
        self.selection = copies.iter().map(|(_, el)| el.base.id.clone()).collect();
        for (path, clone) in copies {
            self.template.pages[path.page].layers[path.layer]
                .elements
                .push(clone);
        }
        true
    }

    fn delete_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let doomed: HashSet<&str> = self.selection.iter().map(String::as_str).collect();
        let mut removed = 0;
        for layer in self.template.pages.iter_mut().flat_map(|p| p.layers.iter_mut()) {
            removed += remove_ids(&mut layer.elements, &doomed);
        }
        tracing::debug!(removed, "deleted selection");
        self.selection.clear();
        self.gesture = Gesture::Idle;
        true
    }

    /// Pointer pressed at a screen position: select and start dragging the topmost element, or
    /// clear the selection and start panning. Returns the hit element id.
    pub fn pointer_down(&mut self, screen: Point) -> Option<String> {
        let canvas = self.viewport.screen_to_canvas(screen);
        let hit = self.page().and_then(|page| {
            self.hit
                .hit(page, canvas)
                .map(|el| (el.base.id.clone(), el.base.position, el.base.locked))
        });
        match hit {
            Some((id, start, locked)) => {
                if !self.selection.contains(&id) {
                    self.apply(EditorCommand::SelectElements(vec![id.clone()]));
                }
                self.gesture = Gesture::Dragging {
                    id: id.clone(),
                    origin: screen,
                    start,
                    locked,
                };
                Some(id)
            }
            None => {
                self.apply(EditorCommand::SelectElements(Vec::new()));
                self.gesture = Gesture::Panning { last: screen };
                None
            }
        }
    }

    /// Pointer moved. Drags move the element by the cursor delta divided by the zoom.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let command = match &mut self.gesture {
            Gesture::Idle => return false,
            Gesture::Dragging { locked: true, .. } => return false,
            Gesture::Dragging {
                id, origin, start, ..
            } => {
                let delta = self.viewport.drag_delta(screen - *origin);
                EditorCommand::MoveElement {
                    id: id.clone(),
                    position: Coord::new(start.x + delta.x, start.y + delta.y),
                }
            }
            Gesture::Panning { last } => {
                let delta: Vec2 = screen - *last;
                *last = screen;
                let mut vp = self.viewport;
                vp.pan_by(delta);
                EditorCommand::SetViewport(vp)
            }
        };
        self.apply(command)
    }

    /// Pointer released. Returns `true` when a gesture ended.
    pub fn pointer_up(&mut self) -> bool {
        std::mem::take(&mut self.gesture) != Gesture::Idle
    }

    /// Wheel notch at a screen position.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> bool {
        let mut vp = self.viewport;
        if !vp.wheel(screen, delta_y) {
            return false;
        }
        self.apply(EditorCommand::SetViewport(vp))
    }

    /// Container resized: fit the current page.
    pub fn resize(&mut self, container: Size) -> bool {
        let page = match self.page() {
            Some(p) => Size::new(p.size.width, p.size.height),
            None => {
                let c = PageFormat::Story.canvas();
                Size::new(f64::from(c.width), f64::from(c.height))
            }
        };
        let vp = Viewport::fit(container, page, self.viewport.padding);
        self.apply(EditorCommand::SetViewport(vp))
    }

    /// Draw the current page with editor overlays, or the missing-page placeholder.
    pub fn render(
        &self,
        compositor: &mut Compositor,
        cache: &mut ImageCache,
        route: &[LatLng],
    ) -> StoryplateResult<FrameRGBA> {
        let Some(page) = self.page() else {
            return compositor.render_missing_page(PageFormat::Story);
        };
        let deco = self.decorations();
        let scene = Scene::story(&self.preview, route, PageFormat::Story)
            .with_page(page)
            .with_story_text(false)
            .with_scrim(false)
            .with_decorations(&deco);
        compositor.render(&scene, cache)
    }
}

fn first_page_id(template: &Template) -> String {
    template
        .pages
        .first()
        .map(|p| p.id.clone())
        .unwrap_or_default()
}

fn reassign_ids(
    el: &mut Element,
    ids: &mut IdGen,
    template: &Template,
    fresh: &mut HashSet<String>,
) {
    let id = ids.next_free(el.kind_name(), |c| template.contains_id(c) || fresh.contains(c));
    fresh.insert(id.clone());
    el.base.id = id;
    if let ElementKind::Group(g) = &mut el.kind {
        for c in &mut g.children {
            reassign_ids(c, ids, template, fresh);
        }
    }
}

fn remove_ids(elements: &mut Vec<Element>, doomed: &HashSet<&str>) -> usize {
    let before = elements.len();
    elements.retain(|el| !doomed.contains(el.base.id.as_str()));
    let mut removed = before - elements.len();
    for el in elements.iter_mut() {
        if let ElementKind::Group(g) = &mut el.kind {
            removed += remove_ids(&mut g.children, doomed);
        }
    }
    removed
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
