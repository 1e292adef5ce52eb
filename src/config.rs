use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::cache::ImageCacheOpts;
use crate::foundation::core::Insets;
use crate::foundation::error::{StoryplateError, StoryplateResult};
use crate::geo::projector::DEFAULT_SHRINK;
use crate::model::story::{DEFAULT_CLUB, HEDONISM_CLUB};

/// Compositor configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositorOpts {
    /// Safe area in design units.
    pub safe_area: Insets,
    /// Margin factor applied by the route projector.
    pub route_shrink: f64,
    /// Regular-weight font file.
    pub font_regular: Option<PathBuf>,
    /// Bold font file; falls back to the regular face.
    pub font_bold: Option<PathBuf>,
    /// Background used in image mode when the story has no photo.
    pub default_background: String,
    /// Logo URL per club id.
    pub logos: BTreeMap<String, String>,
    /// Prefixes tried, in order, when resolving an image element's asset id.
    pub asset_prefixes: Vec<String>,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        let mut logos = BTreeMap::new();
        logos.insert(HEDONISM_CLUB.to_owned(), "/logo_HEDONISM.svg".to_owned());
        logos.insert(DEFAULT_CLUB.to_owned(), "/logo_NIP.svg".to_owned());
        Self {
            safe_area: Insets::SAFE_AREA,
            route_shrink: DEFAULT_SHRINK,
            font_regular: None,
            font_bold: None,
            default_background: "/bg.jpeg".to_owned(),
            logos,
            asset_prefixes: vec![
                "/assets/".to_owned(),
                "/route/assets/".to_owned(),
                "/".to_owned(),
            ],
        }
    }
}

impl CompositorOpts {
    /// Return options with a different safe area.
    pub fn with_safe_area(mut self, safe_area: Insets) -> Self {
        self.safe_area = safe_area;
        self
    }

    /// Return options with a different route shrink factor.
    pub fn with_route_shrink(mut self, shrink: f64) -> Self {
        self.route_shrink = shrink;
        self
    }

    /// Return options with font files.
    pub fn with_fonts(mut self, regular: Option<PathBuf>, bold: Option<PathBuf>) -> Self {
        self.font_regular = regular;
        self.font_bold = bold;
        self
    }

    /// Return options with a different default background URL.
    pub fn with_default_background(mut self, url: impl Into<String>) -> Self {
        self.default_background = url.into();
        self
    }

    /// Return options with the logo for `club` replaced.
    pub fn with_logo(mut self, club: impl Into<String>, url: impl Into<String>) -> Self {
        self.logos.insert(club.into(), url.into());
        self
    }

    /// Return options with different asset prefixes.
    pub fn with_asset_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.asset_prefixes = prefixes;
        self
    }

    /// Logo URL for `club`, falling back to the default club's logo.
    pub fn logo_for(&self, club: &str) -> Option<&str> {
        self.logos
            .get(club)
            .or_else(|| self.logos.get(DEFAULT_CLUB))
            .map(String::as_str)
    }

    /// URLs to try for `asset_id`, in order. Ids that already look like URLs are used as-is.
    pub fn asset_candidates(&self, asset_id: &str) -> Vec<String> {
        if asset_id.starts_with("data:") || asset_id.contains("://") {
            return vec![asset_id.to_owned()];
        }
        let id = asset_id.trim_start_matches('/');
        let mut out = Vec::with_capacity(self.asset_prefixes.len());
        for prefix in &self.asset_prefixes {
            let url = format!("{prefix}{id}");
            if !out.contains(&url) {
                out.push(url);
            }
        }
        out
    }

    /// Reject values the compositor cannot work with.
    pub fn validate(&self) -> StoryplateResult<()> {
        if !self.route_shrink.is_finite() || self.route_shrink <= 0.0 || self.route_shrink > 1.0 {
            return Err(StoryplateError::validation(
                "routeShrink must be in (0, 1]",
            ));
        }
        let s = self.safe_area;
        if [s.top, s.right, s.bottom, s.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(StoryplateError::validation(
                "safe area insets must be finite and >= 0",
            ));
        }
        if self.asset_prefixes.is_empty() {
            return Err(StoryplateError::validation(
                "at least one asset prefix is required",
            ));
        }
        Ok(())
    }
}

/// On-disk configuration file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoryplateConfig {
    /// Compositor settings.
    pub compositor: CompositorOpts,
    /// Image cache settings.
    pub image_cache: ImageCacheOpts,
    /// Directory relative asset URLs resolve against. Relative paths are taken from the config
    /// file's directory.
    pub assets_root: Option<PathBuf>,
}

impl StoryplateConfig {
    /// Parse a JSON config.
    pub fn from_json_str(s: &str) -> StoryplateResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.compositor.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file, resolving relative paths against its directory.
    pub fn from_path(path: &Path) -> StoryplateResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config \"{}\"", path.display()))?;
        let mut cfg = Self::from_json_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let resolve = |p: &mut Option<PathBuf>| {
            if let Some(inner) = p.as_mut()
                && inner.is_relative()
            {
                *inner = base.join(&*inner);
            }
        };
        resolve(&mut cfg.assets_root);
        resolve(&mut cfg.compositor.font_regular);
        resolve(&mut cfg.compositor.font_bold);
        Ok(cfg)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
