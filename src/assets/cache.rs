use std::collections::{HashMap, HashSet, VecDeque};

use crate::assets::decode::{CachedImage, decode_asset};
use crate::assets::loader::AssetLoader;

/// Environment override for [`ImageCacheOpts::capacity`].
pub const CACHE_CAPACITY_ENV: &str = "STORYPLATE_IMAGE_CACHE_CAPACITY";

/// Image cache configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageCacheOpts {
    /// Maximum number of decoded images retained; least recently used entries are evicted.
    pub capacity: usize,
}

impl Default for ImageCacheOpts {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl ImageCacheOpts {
    /// Defaults, with the capacity taken from `STORYPLATE_IMAGE_CACHE_CAPACITY` when set.
    pub fn from_env() -> Self {
        let capacity = std::env::var(CACHE_CAPACITY_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(Self::default().capacity);
        Self { capacity }
    }

    /// Return options with a different capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }
}

/// Result of a non-blocking cache lookup.
#[derive(Clone, Debug)]
pub enum Lookup {
    /// The image is decoded and ready to draw.
    Ready(CachedImage),
    /// The image is queued (or was just queued); draw a placeholder.
    Pending,
}

/// Handle returned by [`ImageCache::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of one [`ImageCache::pump`] pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// URLs that loaded and are now cached.
    pub loaded: Vec<String>,
    /// URLs whose fetch or decode failed. They are forgotten and re-queued by the next request.
    pub failed: Vec<String>,
}

type Listener = Box<dyn FnMut(&str)>;

/// URL-keyed image cache scoped to one editing or export session.
///
/// Draw code only calls [`ImageCache::request`], which never blocks: a miss queues the URL and
/// returns [`Lookup::Pending`]. The host drives [`ImageCache::pump`] from its event loop; every
/// successful load notifies all registered listeners so they can schedule a re-render. Failed
/// loads are logged and dropped, so the placeholder stays until a later render asks again.
pub struct ImageCache {
    opts: ImageCacheOpts,
    loader: Box<dyn AssetLoader>,
    entries: HashMap<String, CachedImage>,
    lru: VecDeque<String>,
    pending: VecDeque<String>,
    pending_set: HashSet<String>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl ImageCache {
    /// Cache backed by `loader`.
    pub fn new(loader: impl AssetLoader + 'static, opts: ImageCacheOpts) -> Self {
        Self {
            opts,
            loader: Box::new(loader),
            entries: HashMap::new(),
            lru: VecDeque::new(),
            pending: VecDeque::new(),
            pending_set: HashSet::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Cached image for `url`, without queueing anything.
    pub fn get(&mut self, url: &str) -> Option<CachedImage> {
        let img = self.entries.get(url).cloned()?;
        self.touch(url);
        Some(img)
    }

    /// `true` when `url` is decoded and cached.
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Non-blocking lookup; a miss queues the URL for the next [`ImageCache::pump`].
    pub fn request(&mut self, url: &str) -> Lookup {
        if let Some(img) = self.get(url) {
            return Lookup::Ready(img);
        }
        if self.pending_set.insert(url.to_owned()) {
            tracing::debug!(url, "queued image load");
            self.pending.push_back(url.to_owned());
        }
        Lookup::Pending
    }

    /// First cached candidate, in order. When none is cached, every candidate is queued.
    pub fn first_ready<'a>(
        &mut self,
        candidates: impl IntoIterator<Item = &'a str> + Clone,
    ) -> Option<(String, CachedImage)> {
        for url in candidates.clone() {
            if let Some(img) = self.get(url) {
                return Some((url.to_owned(), img));
            }
        }
        for url in candidates {
            self.request(url);
        }
        None
    }

    /// Number of URLs waiting for [`ImageCache::pump`].
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a callback invoked with the URL of every successful load.
    pub fn subscribe(&mut self, listener: impl FnMut(&str) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a callback. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Insert an already-decoded image and notify listeners.
    pub fn insert(&mut self, url: &str, img: CachedImage) {
        self.store(url, img);
        self.notify(url);
    }

    /// Fetch and decode every queued URL.
    pub fn pump(&mut self) -> PumpReport {
        let mut report = PumpReport::default();
        while let Some(url) = self.pending.pop_front() {
            self.pending_set.remove(&url);
            let decoded = self
                .loader
                .fetch(&url)
                .and_then(|bytes| decode_asset(&url, &bytes));
            match decoded {
                Ok(img) => {
                    tracing::debug!(url = %url, "image loaded");
                    self.store(&url, img);
                    self.notify(&url);
                    report.loaded.push(url);
                }
                Err(e) => {
                    tracing::warn!(
                        url = %url,
                        error = %e,
                        "image load failed; keeping placeholder"
                    );
                    report.failed.push(url);
                }
            }
        }
        report
    }

    fn store(&mut self, url: &str, img: CachedImage) {
        self.entries.insert(url.to_owned(), img);
        self.touch(url);
        while self.lru.len() > self.opts.capacity.max(1) {
            if let Some(old) = self.lru.pop_front() {
                self.entries.remove(&old);
            }
        }
    }

    fn notify(&mut self, url: &str) {
        for (_, listener) in &mut self.listeners {
            listener(url);
        }
    }

    fn touch(&mut self, url: &str) {
        if let Some(pos) = self.lru.iter().position(|x| x == url) {
            self.lru.remove(pos);
        }
        self.lru.push_back(url.to_owned());
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("opts", &self.opts)
            .field("cached", &self.entries.len())
            .field("pending", &self.pending.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
