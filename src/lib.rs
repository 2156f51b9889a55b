//! # WSI DeepZoom
//!
//! The embeddable core of a Deep Zoom tile server for Whole Slide Images
//! (WSI) on the local filesystem.
//!
//! This library provides everything a tile server binary embeds around an
//! image-decode collaborator: a bounded slide cache, a per-slide color
//! pipeline, tile encoding, and catalog discovery. The HTTP layer, viewer,
//! and the decoder itself stay outside; the decoder plugs in through the
//! [`backend::SlideBackend`] trait.
//!
//! ## Features
//!
//! - **Bounded slide caching**: LRU cache of opened slides with a shared
//!   secondary pixel cache, safe under concurrent access
//! - **Color management**: per-slide ICC-profile handling with seven
//!   configurable modes, from profile stripping to sRGB conversion with a
//!   chosen rendering intent
//! - **Tile encoding**: JPEG/PNG serialization with quality control and
//!   optional profile embedding
//! - **Catalog discovery**: sorted, filtered snapshots of the slide tree,
//!   multi-file-slide aware
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`backend`] - Traits modeling the image-decode collaborator
//! - [`slide`] - Slide handle and the bounded slide cache
//! - [`color`] - Color modes and the per-slide tile transform
//! - [`tile`] - Decoded tiles and JPEG/PNG encoding
//! - [`catalog`] - Filesystem catalog of viewable slides
//! - [`annotations`] - In-memory slide annotation table
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,ignore
//! use wsi_deepzoom::{Config, SlideCache};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Configuration is typically loaded from CLI arguments
//!     let config = Config::try_parse_from(["server", "--slide-dir", "/data/slides"])?;
//!     config.validate()?;
//!
//!     let cache = SlideCache::new(my_backend(), &config)?;
//!     let handle = cache.get("/data/slides/sample.svs".as_ref()).await?;
//!     let tile = handle.read_tile(12, 0, 0).await?;
//!     let bytes = config.tile_encoder()?.encode(&tile)?;
//!     Ok(())
//! }
//! ```

pub mod annotations;
pub mod backend;
pub mod catalog;
pub mod color;
pub mod config;
pub mod error;
pub mod slide;
pub mod tile;

// Re-export commonly used types
pub use annotations::{AnnotationRow, AnnotationTable};
pub use backend::{
    DeepZoomOptions, DeepZoomSlide, SlideBackend, PROPERTY_MPP_X, PROPERTY_MPP_Y,
};
pub use catalog::{CatalogEntry, Directory, SlideFile};
pub use color::{ColorMode, TileTransform};
pub use config::{Config, DEFAULT_SLIDE_CACHE_SIZE};
pub use error::{AnnotationError, BackendError, CatalogError, ConfigError, TileError};
pub use slide::{SlideCache, SlideHandle, DEFAULT_MPP};
pub use tile::{
    clamp_quality, Tile, TileEncoder, TileFormat, DEFAULT_TILE_QUALITY,
};
