//! Decoded tiles and their serialization.
//!
//! A [`Tile`] is the unit handed back by the decode backend: a fixed-size RGB
//! pixel block at one pyramid level and grid position, optionally tagged with
//! the slide's embedded ICC profile. The color pipeline mutates tiles in
//! place; [`TileEncoder`] serializes them for the boundary layer.

mod encoder;

pub use encoder::{clamp_quality, TileEncoder, TileFormat, DEFAULT_TILE_QUALITY};

use image::RgbImage;

/// A decoded tile: pixel data plus optional embedded color profile metadata.
#[derive(Debug, Clone)]
pub struct Tile {
    /// Decoded RGB pixel data.
    pub image: RgbImage,

    /// ICC profile attached by the decode backend, if any.
    ///
    /// The color pipeline may clear this before serialization; when still
    /// present at encode time it is embedded in the output.
    pub icc_profile: Option<Vec<u8>>,
}

impl Tile {
    /// Create an untagged tile from decoded pixel data.
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            icc_profile: None,
        }
    }

    /// Create a tile carrying an embedded ICC profile.
    pub fn with_profile(image: RgbImage, icc_profile: Vec<u8>) -> Self {
        Self {
            image,
            icc_profile: Some(icc_profile),
        }
    }

    /// Tile width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Tile height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
