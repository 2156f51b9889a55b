//! Configuration surface for the slide cache and catalog.
//!
//! Settings are parsed from command-line arguments with `DEEPZOOM_*`
//! environment variable fallbacks, and validated once before any component is
//! constructed. Defaults match the conventional Deep Zoom multiserver setup.
//!
//! # Environment Variables
//!
//! - `DEEPZOOM_SLIDE_DIR` - Root directory of the slide tree (default: `.`)
//! - `DEEPZOOM_CACHE_SIZE` - Max opened slides to cache (default: 32)
//! - `DEEPZOOM_TILE_CACHE_MB` - Shared pixel cache budget in MB (default: 512,
//!   `0` disables the shared cache)
//! - `DEEPZOOM_TILE_SIZE` - Tile edge length in pixels (default: 254)
//! - `DEEPZOOM_OVERLAP` - Tile overlap in pixels (default: 1)
//! - `DEEPZOOM_LIMIT_BOUNDS` - Clip tiles to the non-empty region (default: true)
//! - `DEEPZOOM_FORMAT` - Tile serialization format, jpeg or png (default: jpeg)
//! - `DEEPZOOM_TILE_QUALITY` - JPEG quality 1-100 (default: 75)
//! - `DEEPZOOM_COLOR_MODE` - Color profile handling mode (default: `default`)

use std::path::PathBuf;

use clap::Parser;

use crate::backend::DeepZoomOptions;
use crate::color::ColorMode;
use crate::error::ConfigError;
use crate::tile::{TileEncoder, TileFormat, DEFAULT_TILE_QUALITY};

// =============================================================================
// Default Values
// =============================================================================

/// Default number of opened slides to cache.
pub const DEFAULT_SLIDE_CACHE_SIZE: usize = 32;

/// Default shared pixel cache budget in megabytes.
pub const DEFAULT_TILE_CACHE_MB: usize = 512;

/// Default Deep Zoom tile edge length.
pub const DEFAULT_TILE_SIZE: u32 = 254;

/// Default Deep Zoom tile overlap.
pub const DEFAULT_OVERLAP: u32 = 1;

// =============================================================================
// Configuration
// =============================================================================

/// Deep Zoom slide server configuration.
///
/// Consumed once at startup; every component treats its slice of this as
/// immutable for the process lifetime.
#[derive(Parser, Debug, Clone)]
#[command(name = "wsi-deepzoom")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Root directory of the slide tree to serve.
    #[arg(long, default_value = ".", env = "DEEPZOOM_SLIDE_DIR")]
    pub slide_dir: PathBuf,

    /// Maximum number of opened slides to keep cached.
    #[arg(long, default_value_t = DEFAULT_SLIDE_CACHE_SIZE, env = "DEEPZOOM_CACHE_SIZE")]
    pub cache_size: usize,

    /// Shared pixel cache budget in megabytes (0 disables the shared cache).
    #[arg(long, default_value_t = DEFAULT_TILE_CACHE_MB, env = "DEEPZOOM_TILE_CACHE_MB")]
    pub tile_cache_mb: usize,

    /// Deep Zoom tile edge length in pixels, excluding overlap.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "DEEPZOOM_TILE_SIZE")]
    pub tile_size: u32,

    /// Pixel overlap shared between adjacent tiles.
    #[arg(long, default_value_t = DEFAULT_OVERLAP, env = "DEEPZOOM_OVERLAP")]
    pub overlap: u32,

    /// Clip tiles to the non-empty slide region.
    #[arg(long, default_value_t = true, env = "DEEPZOOM_LIMIT_BOUNDS")]
    pub limit_bounds: bool,

    /// Tile serialization format (jpeg or png).
    #[arg(long, default_value = "jpeg", env = "DEEPZOOM_FORMAT")]
    pub format: String,

    /// JPEG quality for serialized tiles (1-100).
    #[arg(long, default_value_t = DEFAULT_TILE_QUALITY, env = "DEEPZOOM_TILE_QUALITY")]
    pub tile_quality: u8,

    /// How embedded slide color profiles are handled (ignore, embed, default,
    /// absolute-colorimetric, relative-colorimetric, perceptual, saturation).
    #[arg(long, default_value = "default", env = "DEEPZOOM_COLOR_MODE")]
    pub color_mode: String,
}

impl Config {
    /// Validate the configuration.
    ///
    /// Called once at startup; any error here must abort before a cache is
    /// constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_size == 0 {
            return Err(ConfigError::InvalidCacheSize);
        }
        if self.tile_size == 0 {
            return Err(ConfigError::InvalidTileSize);
        }
        if self.tile_quality == 0 || self.tile_quality > 100 {
            return Err(ConfigError::InvalidQuality(self.tile_quality));
        }
        self.tile_format()?;
        self.parsed_color_mode()?;
        Ok(())
    }

    /// The tile-generation option bundle passed through to the decode backend.
    pub fn deepzoom_options(&self) -> DeepZoomOptions {
        DeepZoomOptions {
            tile_size: self.tile_size,
            overlap: self.overlap,
            limit_bounds: self.limit_bounds,
        }
    }

    /// Parse the configured color mode string.
    pub fn parsed_color_mode(&self) -> Result<ColorMode, ConfigError> {
        self.color_mode.parse()
    }

    /// Parse the configured tile format string.
    pub fn tile_format(&self) -> Result<TileFormat, ConfigError> {
        self.format.parse()
    }

    /// Build the tile encoder for the configured format and quality.
    pub fn tile_encoder(&self) -> Result<TileEncoder, ConfigError> {
        Ok(TileEncoder::new(self.tile_format()?, self.tile_quality))
    }
}

// =============================================================================
// Tests
// =============================================================================
