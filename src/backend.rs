//! Traits modeling the external image-decode collaborator.
//!
//! The crate never decodes slide files itself. An implementation of
//! [`SlideBackend`] (typically a binding to a native whole-slide-image
//! library) is responsible for format detection, opening slides, exposing
//! metadata properties, and producing decoded Deep Zoom tiles. The cache and
//! catalog are generic over this trait, which also keeps them testable with
//! in-memory mock backends.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{BackendError, TileError};
use crate::tile::Tile;

/// Property key for horizontal physical resolution (microns per pixel).
pub const PROPERTY_MPP_X: &str = "openslide.mpp-x";

/// Property key for vertical physical resolution (microns per pixel).
pub const PROPERTY_MPP_Y: &str = "openslide.mpp-y";

/// Tile-generation options passed through to the backend when opening a slide.
///
/// The cache treats this bundle as opaque; it only forwards it. Defaults match
/// the standard Deep Zoom tiling parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepZoomOptions {
    /// Tile edge length in pixels, excluding overlap.
    pub tile_size: u32,

    /// Pixel overlap shared between adjacent tiles.
    pub overlap: u32,

    /// Whether tiles are clipped to the non-empty slide region.
    pub limit_bounds: bool,
}

impl Default for DeepZoomOptions {
    fn default() -> Self {
        Self {
            tile_size: 254,
            overlap: 1,
            limit_bounds: true,
        }
    }
}

/// An opened slide, as exposed by the decode backend.
///
/// Implementations must be safe for concurrent tile reads: the cache shares a
/// single handle across all request tasks and adds no per-slide lock of its
/// own.
#[async_trait]
pub trait DeepZoomSlide: Send + Sync {
    /// Look up a metadata property by key. Returns `None` when absent.
    fn property(&self, name: &str) -> Option<String>;

    /// The slide's embedded ICC color profile, if it carries one.
    fn color_profile(&self) -> Option<Vec<u8>>;

    /// Produce the decoded tile at the given pyramid level and grid position.
    ///
    /// Coordinates outside the pyramid fail with
    /// [`TileError::InvalidCoordinates`]; a tile is either returned complete
    /// or not at all.
    async fn read_tile(&self, level: u32, col: u32, row: u32) -> Result<Tile, TileError>;
}

/// The image-decode collaborator: opens slides and manages pixel caching.
#[async_trait]
pub trait SlideBackend: Send + Sync {
    /// The opened-slide type this backend produces.
    type Slide: DeepZoomSlide + 'static;

    /// The backend-managed secondary pixel cache, shared across slides.
    type PixelCache: Send + Sync + 'static;

    /// Open the file at `path` as a Deep Zoom slide.
    ///
    /// # Errors
    /// * [`BackendError::UnsupportedFormat`] - file exists but is not a slide
    /// * [`BackendError::NotFound`] - path does not resolve to a slide file
    async fn open(&self, path: &Path, opts: &DeepZoomOptions)
        -> Result<Self::Slide, BackendError>;

    /// Whether the file at `path` is a recognized slide format.
    ///
    /// Used by the catalog walk; must not open the slide.
    fn detect_format(&self, path: &Path) -> bool;

    /// Create a secondary pixel cache with the given byte budget.
    ///
    /// Backends whose underlying library predates shared caching fail with
    /// [`BackendError::VersionUnsupported`]; the caller disables the feature
    /// and each slide falls back to its own internal caching.
    fn create_pixel_cache(&self, capacity_bytes: usize) -> Result<Self::PixelCache, BackendError>;

    /// Attach a shared pixel cache to a freshly opened slide.
    fn attach_pixel_cache(&self, slide: &Self::Slide, cache: &Arc<Self::PixelCache>);
}
