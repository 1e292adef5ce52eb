use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::Engine as _;

use crate::foundation::error::{StoryplateError, StoryplateResult};

/// Source of raw asset bytes, addressed by URL.
///
/// Loaders are driven by [`crate::assets::cache::ImageCache::pump`], never from inside a draw call.
pub trait AssetLoader {
    /// Fetch the bytes behind `url`.
    fn fetch(&mut self, url: &str) -> StoryplateResult<Vec<u8>>;
}

/// Resolves URLs against a local directory.
///
/// `/assets/bg.jpg` and `assets/bg.jpg` both map to `<root>/assets/bg.jpg`. `data:` URLs are
/// decoded inline. Remote schemes are rejected.
#[derive(Clone, Debug)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    /// Loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for FsLoader {
    fn fetch(&mut self, url: &str) -> StoryplateResult<Vec<u8>> {
        if url.starts_with("data:") {
            return decode_data_url(url);
        }
        if url.contains("://") && !url.starts_with("file://") {
            return Err(StoryplateError::asset(format!(
                "filesystem loader cannot fetch remote url '{url}'"
            )));
        }
        let rel = url.strip_prefix("file://").unwrap_or(url);
        let rel = rel.split(['?', '#']).next().unwrap_or(rel);
        let norm = normalize_rel_path(rel.trim_start_matches('/'))?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p)
            .map_err(|e| StoryplateError::asset(format!("failed to read '{}': {e}", p.display())))
    }
}

/// In-memory loader, mostly for tests and embedding hosts that already hold the bytes.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
    fetches: usize,
}

impl MemoryLoader {
    /// Empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under `url`.
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(url.into(), bytes);
    }

    /// Builder form of [`MemoryLoader::insert`].
    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }

    /// Number of fetch attempts served so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}

impl AssetLoader for MemoryLoader {
    fn fetch(&mut self, url: &str) -> StoryplateResult<Vec<u8>> {
        self.fetches += 1;
        if url.starts_with("data:") {
            return decode_data_url(url);
        }
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| StoryplateError::asset(format!("no asset registered for '{url}'")))
    }
}

/// Decode a `data:<mime>[;base64],<payload>` URL.
pub fn decode_data_url(url: &str) -> StoryplateResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| StoryplateError::asset("not a data url"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| StoryplateError::asset("data url is missing ','"))?;
    if meta.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| StoryplateError::asset(format!("invalid base64 in data url: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Normalize and validate a root-relative asset path.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> StoryplateResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StoryplateError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(StoryplateError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StoryplateError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StoryplateError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
