//! Tile serialization.
//!
//! Encodes a decoded [`Tile`] as JPEG or PNG for the boundary layer. The
//! encoder either produces a complete encoded tile or fails before any output
//! is emitted; partial tiles are never returned.

use std::str::FromStr;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::error::{ConfigError, TileError};

use super::Tile;

/// Default JPEG quality for tile serialization.
pub const DEFAULT_TILE_QUALITY: u8 = 75;

/// Minimum allowed JPEG quality.
const MIN_TILE_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
const MAX_TILE_QUALITY: u8 = 100;

/// Clamp quality to the valid JPEG range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_TILE_QUALITY, MAX_TILE_QUALITY)
}

// =============================================================================
// Tile Format
// =============================================================================

/// Output format for serialized tiles.
///
/// Deep Zoom supports only these two; anything else in the configuration is
/// rejected up front with [`ConfigError::UnknownTileFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFormat {
    Jpeg,
    Png,
}

impl TileFormat {
    /// MIME type for HTTP responses.
    pub const fn mime_type(&self) -> &'static str {
        match self {
            TileFormat::Jpeg => "image/jpeg",
            TileFormat::Png => "image/png",
        }
    }

    /// File extension used in Deep Zoom tile URLs.
    pub const fn extension(&self) -> &'static str {
        match self {
            TileFormat::Jpeg => "jpeg",
            TileFormat::Png => "png",
        }
    }
}

impl FromStr for TileFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("jpeg") {
            Ok(TileFormat::Jpeg)
        } else if s.eq_ignore_ascii_case("png") {
            Ok(TileFormat::Png)
        } else {
            Err(ConfigError::UnknownTileFormat(s.to_string()))
        }
    }
}

// =============================================================================
// Tile Encoder
// =============================================================================

/// Serializes decoded tiles at a fixed format and quality.
///
/// When the tile still carries an ICC profile (color mode `embed`), the
/// profile is embedded in the output. Encoders that cannot embed a profile
/// serialize the pixels untagged.
#[derive(Debug, Clone)]
pub struct TileEncoder {
    format: TileFormat,
    quality: u8,
}

impl TileEncoder {
    /// Create an encoder. Quality is clamped to the valid JPEG range and
    /// ignored for PNG output.
    pub fn new(format: TileFormat, quality: u8) -> Self {
        Self {
            format,
            quality: clamp_quality(quality),
        }
    }

    /// The configured output format.
    pub fn format(&self) -> TileFormat {
        self.format
    }

    /// Serialize a tile to encoded bytes.
    pub fn encode(&self, tile: &Tile) -> Result<Bytes, TileError> {
        let mut buf = Vec::new();

        match self.format {
            TileFormat::Jpeg => {
                let mut encoder = JpegEncoder::new_with_quality(&mut buf, self.quality);
                self.embed_profile(&mut encoder, tile);
                encoder
                    .write_image(
                        tile.image.as_raw(),
                        tile.width(),
                        tile.height(),
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| TileError::Encode {
                        message: e.to_string(),
                    })?;
            }
            TileFormat::Png => {
                let mut encoder = PngEncoder::new(&mut buf);
                self.embed_profile(&mut encoder, tile);
                encoder
                    .write_image(
                        tile.image.as_raw(),
                        tile.width(),
                        tile.height(),
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| TileError::Encode {
                        message: e.to_string(),
                    })?;
            }
        }

        Ok(Bytes::from(buf))
    }

    fn embed_profile<E: ImageEncoder>(&self, encoder: &mut E, tile: &Tile) {
        if let Some(profile) = &tile.icc_profile {
            if let Err(e) = encoder.set_icc_profile(profile.clone()) {
                debug!("encoder does not support ICC profiles, output untagged: {e}");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
