//! Bounded LRU cache of opened slide handles.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::backend::{DeepZoomOptions, SlideBackend};
use crate::color::ColorMode;
use crate::config::Config;
use crate::error::{BackendError, ConfigError};

use super::handle::SlideHandle;

/// Bounded, thread-safe cache of opened slides.
///
/// Opening a slide is expensive (I/O plus metadata analysis plus color
/// transform construction), so handles are cached with LRU eviction. A single
/// mutex guards only the mapping structure; the open itself always runs
/// outside the lock so a slow open never stalls lookups for other slides.
///
/// # Race policy
///
/// Two tasks may race to open the same slide on a cold path. That is
/// accepted: the first insert wins, and a losing candidate is dropped,
/// releasing its slide. What is never permitted is two live cache entries for
/// one path. There is deliberately no per-path open lock — serializing opens
/// would stall every cold lookup behind the slowest one.
pub struct SlideCache<B: SlideBackend> {
    backend: B,

    /// Tile-generation options forwarded to every open.
    opts: DeepZoomOptions,

    /// Color profile handling mode, fixed at construction.
    color_mode: ColorMode,

    /// Path -> handle mapping in recency order. The mutex guards only this.
    cache: Mutex<LruCache<PathBuf, Arc<SlideHandle<B::Slide>>>>,

    /// Shared secondary pixel cache, attached to every opened slide.
    /// Absent when the budget is zero or the backend lacks support.
    pixel_cache: Option<Arc<B::PixelCache>>,
}

impl<B: SlideBackend> SlideCache<B> {
    /// Build a cache from the validated configuration.
    ///
    /// Fails fast on a bad color mode or zero capacity so a misconfigured
    /// cache never serves a request.
    pub fn new(backend: B, config: &Config) -> Result<Self, ConfigError> {
        let color_mode = config.parsed_color_mode()?;
        Self::with_options(
            backend,
            config.cache_size,
            config.tile_cache_mb,
            config.deepzoom_options(),
            color_mode,
        )
    }

    /// Build a cache from explicit settings.
    pub fn with_options(
        backend: B,
        cache_size: usize,
        tile_cache_mb: usize,
        opts: DeepZoomOptions,
        color_mode: ColorMode,
    ) -> Result<Self, ConfigError> {
        let capacity = NonZeroUsize::new(cache_size).ok_or(ConfigError::InvalidCacheSize)?;
        let pixel_cache = create_pixel_cache(&backend, tile_cache_mb);

        Ok(Self {
            backend,
            opts,
            color_mode,
            cache: Mutex::new(LruCache::new(capacity)),
            pixel_cache,
        })
    }

    /// Get the handle for a slide, opening and caching it on a miss.
    ///
    /// The fast path promotes a cached entry to most-recently-used and
    /// returns it without any I/O. On a miss the open runs with the lock
    /// released; on re-acquisition the mapping is re-checked and a duplicate
    /// candidate from a lost race is discarded in favor of the cached one.
    /// Inserting at capacity evicts the least-recently-used entry, whose
    /// slide is released once the last caller's reference drops.
    pub async fn get(&self, path: &Path) -> Result<Arc<SlideHandle<B::Slide>>, BackendError> {
        {
            let mut cache = self.cache.lock().await;
            if let Some(handle) = cache.get(path) {
                return Ok(Arc::clone(handle));
            }
        }

        debug!("opening slide: {}", path.display());
        let slide = self.backend.open(path, &self.opts).await?;
        if let Some(ref pixel_cache) = self.pixel_cache {
            self.backend.attach_pixel_cache(&slide, pixel_cache);
        }
        let candidate = Arc::new(SlideHandle::new(path, slide, self.color_mode));

        let mut cache = self.cache.lock().await;
        if let Some(existing) = cache.get(path) {
            // Lost the open race; the candidate (and its slide) drops here.
            debug!("discarding duplicate open: {}", path.display());
            return Ok(Arc::clone(existing));
        }
        if let Some((evicted, _)) = cache.push(path.to_path_buf(), Arc::clone(&candidate)) {
            debug!("evicting slide: {}", evicted.display());
        }
        Ok(candidate)
    }

    /// Number of slides currently cached.
    pub async fn cached_count(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Whether a path is currently cached (does not affect recency).
    pub async fn contains(&self, path: &Path) -> bool {
        self.cache.lock().await.contains(path)
    }

    /// The color mode this cache was built with.
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Whether a shared secondary pixel cache is in use.
    pub fn has_shared_pixel_cache(&self) -> bool {
        self.pixel_cache.is_some()
    }
}

/// Create the shared pixel cache once, if the budget and backend allow it.
///
/// A backend that reports [`BackendError::VersionUnsupported`] simply runs
/// without the shared cache; each slide then caches independently inside the
/// backend.
fn create_pixel_cache<B: SlideBackend>(
    backend: &B,
    tile_cache_mb: usize,
) -> Option<Arc<B::PixelCache>> {
    if tile_cache_mb == 0 {
        return None;
    }
    match backend.create_pixel_cache(tile_cache_mb * 1024 * 1024) {
        Ok(cache) => Some(Arc::new(cache)),
        Err(BackendError::VersionUnsupported) => {
            debug!("backend lacks shared pixel cache support, slides will cache independently");
            None
        }
        Err(e) => {
            warn!("failed to create shared pixel cache, continuing without: {e}");
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
