//! A cached, opened slide and its derived display metadata.

use std::path::{Path, PathBuf};

use crate::backend::{DeepZoomSlide, PROPERTY_MPP_X, PROPERTY_MPP_Y};
use crate::color::{ColorMode, TileTransform};
use crate::error::TileError;
use crate::tile::Tile;

/// Microns-per-pixel value used when the slide carries no usable resolution
/// properties. Viewers treat zero as "scale bar unavailable".
pub const DEFAULT_MPP: f64 = 0.0;

/// An opened slide plus everything derived from it at open time.
///
/// The handle owns the backend slide exclusively. Its metadata and color
/// transform are computed once here and never change; the only mutation a
/// cached handle ever sees is its recency position in the cache.
#[derive(Debug)]
pub struct SlideHandle<S> {
    path: PathBuf,
    display_name: String,
    mpp: f64,
    transform: TileTransform,
    slide: S,
}

impl<S: DeepZoomSlide> SlideHandle<S> {
    /// Wrap a freshly opened slide, deriving its display metadata.
    pub fn new(path: &Path, slide: S, color_mode: ColorMode) -> Self {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mpp = derive_mpp(&slide);
        let transform = TileTransform::for_slide(slide.color_profile().as_deref(), color_mode);

        Self {
            path: path.to_path_buf(),
            display_name,
            mpp,
            transform,
            slide,
        }
    }

    /// Absolute path this handle was opened from (the cache key).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File basename, used as the display name in listings.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Physical resolution in microns per pixel ([`DEFAULT_MPP`] when the
    /// slide carries no usable resolution metadata).
    pub fn microns_per_pixel(&self) -> f64 {
        self.mpp
    }

    /// The color transform selected for this slide.
    pub fn transform(&self) -> &TileTransform {
        &self.transform
    }

    /// The underlying backend slide.
    pub fn slide(&self) -> &S {
        &self.slide
    }

    /// Read a tile and apply this slide's color transform to it.
    ///
    /// Out-of-bounds coordinates fail with [`TileError::InvalidCoordinates`];
    /// the boundary layer presents that as an absent resource.
    pub async fn read_tile(&self, level: u32, col: u32, row: u32) -> Result<Tile, TileError> {
        let mut tile = self.slide.read_tile(level, col, row).await?;
        self.transform.apply(&mut tile);
        Ok(tile)
    }
}

/// Average of the horizontal and vertical microns-per-pixel properties, or
/// [`DEFAULT_MPP`] when either is absent or unparseable.
fn derive_mpp<S: DeepZoomSlide>(slide: &S) -> f64 {
    let mpp_x = slide
        .property(PROPERTY_MPP_X)
        .and_then(|v| v.parse::<f64>().ok());
    let mpp_y = slide
        .property(PROPERTY_MPP_Y)
        .and_then(|v| v.parse::<f64>().ok());

    match (mpp_x, mpp_y) {
        (Some(x), Some(y)) => (x + y) / 2.0,
        _ => DEFAULT_MPP,
    }
}

// =============================================================================
// Tests
// =============================================================================
