use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::core::PageFormat;
use crate::foundation::error::{StoryplateError, StoryplateResult};
use crate::model::element::{BoxSize, Element, ElementKind};
use crate::model::fill::{Fill, deserialize_optional_fill};

fn yes() -> bool {
    true
}

/// Name of the layer painted directly over the page background, ahead of every other layer.
pub const OVERLAY_LAYER: &str = "Overlay";

/// Ordered element list with a visibility flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Elements, bottom to top.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Hidden layers are neither drawn nor hit.
    #[serde(default = "yes")]
    pub visible: bool,
    /// Persisted lock flag.
    #[serde(default)]
    pub locked: bool,
}

impl Layer {
    /// Empty visible layer.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elements: Vec::new(),
            visible: true,
            locked: false,
        }
    }
}

/// One raster-sized page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Page size; must be one of the [`PageFormat`] sizes.
    pub size: BoxSize,
    /// Background paint; black when absent.
    #[serde(default, deserialize_with = "deserialize_optional_fill")]
    pub background: Option<Fill>,
    /// Print bleed, persisted only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bleed: Option<f64>,
    /// Layers, bottom to top.
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Page {
    /// Page in `format` with a white background and one empty layer.
    pub fn new(id: impl Into<String>, format: PageFormat, layer_id: impl Into<String>) -> Self {
        let c = format.canvas();
        Self {
            id: id.into(),
            name: "Page 1".to_owned(),
            size: BoxSize::new(f64::from(c.width), f64::from(c.height)),
            background: Some(Fill::Solid(Color::WHITE)),
            bleed: None,
            layers: vec![Layer::new(layer_id, "Layer 1")],
        }
    }

    /// Format matching `size`.
    pub fn format(&self) -> Option<PageFormat> {
        PageFormat::from_size(self.size.width, self.size.height)
    }

    /// Visit every element of every layer, including group descendants.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Element)) {
        for layer in &self.layers {
            for el in &layer.elements {
                el.walk(f);
            }
        }
    }

    /// Visible layers, bottom to top.
    ///
    /// The first layer named [`OVERLAY_LAYER`] goes first regardless of its index; other
    /// layers with that name are not painted.
    pub fn paint_layers(&self) -> Vec<&Layer> {
        let overlay = self.layers.iter().find(|l| l.name == OVERLAY_LAYER);
        overlay
            .into_iter()
            .chain(self.layers.iter().filter(|l| l.name != OVERLAY_LAYER))
            .filter(|l| l.visible)
            .collect()
    }

    /// `true` when a visible layer holds a visible map element.
    pub fn has_visible_map(&self) -> bool {
        fn visible_map(el: &Element) -> bool {
            el.base.visible
                && match &el.kind {
                    ElementKind::Map(_) => true,
                    ElementKind::Group(g) => g.children.iter().any(visible_map),
                    _ => false,
                }
        }
        self.paint_layers()
            .into_iter()
            .any(|l| l.elements.iter().any(visible_map))
    }
}

/// Publication state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    /// Work in progress.
    #[default]
    Draft,
    /// Visible to users.
    Published,
    /// Retired.
    Archived,
}

/// A story template: metadata plus ordered pages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Search tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning club.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    /// Schema version.
    #[serde(default = "first_version")]
    pub version: u32,
    /// Publication state.
    #[serde(default)]
    pub status: TemplateStatus,
    /// ISO-8601 creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// ISO-8601 modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Pages.
    #[serde(default)]
    pub pages: Vec<Page>,
}

fn first_version() -> u32 {
    1
}

/// Location of an element inside a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementPath {
    /// Page index.
    pub page: usize,
    /// Layer index within the page.
    pub layer: usize,
    /// Index of the top-level element within the layer (the enclosing group for nested ids).
    pub element: usize,
}

impl Template {
    /// New draft with one white 9:16 page holding an empty "Layer 1".
    pub fn draft(ids: &mut IdGen, name: impl Into<String>, club_id: Option<String>) -> Self {
        let page = Page::new(ids.next("page"), PageFormat::Story, ids.next("layer"));
        Self {
            id: ids.next("template"),
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            club_id,
            version: 1,
            status: TemplateStatus::Draft,
            created_at: None,
            updated_at: None,
            pages: vec![page],
        }
    }

    /// Parse template JSON.
    pub fn from_json_str(s: &str) -> StoryplateResult<Self> {
        let t: Self = serde_json::from_str(s)?;
        Ok(t)
    }

    /// Read and parse a template file.
    pub fn from_path(path: &std::path::Path) -> StoryplateResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read template {}", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Pretty JSON.
    pub fn to_json_string(&self) -> StoryplateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check page sizes, id uniqueness and element fields.
    pub fn validate(&self) -> StoryplateResult<()> {
        if self.pages.is_empty() {
            return Err(StoryplateError::validation("template has no pages"));
        }
        let mut seen = std::collections::HashSet::new();
        for page in &self.pages {
            if page.format().is_none() {
                return Err(StoryplateError::validation(format!(
                    "page \"{}\" is {}x{}; expected 1080x1920 or 1080x1350",
                    page.id, page.size.width, page.size.height
                )));
            }
            if let Some(Fill::Gradient(g)) = &page.background {
                g.validate()?;
            }
            let mut dup = None;
            page.walk(&mut |el| {
                if dup.is_none() && !seen.insert(el.base.id.clone()) {
                    dup = Some(el.base.id.clone());
                }
            });
            if let Some(id) = dup {
                return Err(StoryplateError::validation(format!(
                    "duplicate element id \"{id}\""
                )));
            }
            for layer in &page.layers {
                for el in &layer.elements {
                    el.validate()?;
                }
            }
        }
        Ok(())
    }

    /// Page by id.
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Mutable page by id.
    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    /// Locate an element (searching group children too).
    pub fn locate(&self, id: &str) -> Option<ElementPath> {
        for (pi, page) in self.pages.iter().enumerate() {
            for (li, layer) in page.layers.iter().enumerate() {
                for (ei, el) in layer.elements.iter().enumerate() {
                    let mut found = false;
                    el.walk(&mut |e| found |= e.base.id == id);
                    if found {
                        return Some(ElementPath {
                            page: pi,
                            layer: li,
                            element: ei,
                        });
                    }
                }
            }
        }
        None
    }

    /// Element by id.
    pub fn element(&self, id: &str) -> Option<&Element> {
        let path = self.locate(id)?;
        let mut out = None;
        self.pages[path.page].layers[path.layer].elements[path.element].walk(&mut |e| {
            if out.is_none() && e.base.id == id {
                out = Some(e);
            }
        });
        out
    }

    /// Mutable element by id.
    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        let path = self.locate(id)?;
        self.pages[path.page].layers[path.layer].elements[path.element].find_mut(id)
    }

    /// `true` when any element (at any depth) uses `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }
}

/// Deterministic id source (`{prefix}-{n}`).
#[derive(Clone, Debug, Default)]
pub struct IdGen {
    next: u64,
}

impl IdGen {
    /// Counter starting at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id with `prefix`.
    pub fn next(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}-{}", self.next)
    }

    /// Next id with `prefix` for which `taken` is false.
    pub fn next_free(&mut self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.next(prefix);
            if !taken(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/template.rs"]
mod tests;
