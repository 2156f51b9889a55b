//! Color-transform pipeline for decoded tiles.
//!
//! Each cached slide handle carries one [`TileTransform`], selected once at
//! handle creation from the slide's embedded ICC profile and the configured
//! [`ColorMode`]. Intent-based modes build a single lcms2 transform from the
//! slide's profile to the built-in sRGB working space; applying it mutates a
//! tile's pixels in place and leaves the output untagged (browsers treat
//! untagged output as the display's native space, and omitting the profile
//! keeps tile payloads small).

use std::fmt;
use std::str::FromStr;

use lcms2::{DisallowCache, Flags, GlobalContext, Intent, PixelFormat, Profile, Transform};
use rgb::{FromSlice, RGB8};
use tracing::warn;

use crate::error::ConfigError;
use crate::tile::Tile;

/// A prebuilt profile-to-sRGB pixel transform, shareable across request tasks.
pub type SrgbTransform = Transform<RGB8, RGB8, GlobalContext, DisallowCache>;

// =============================================================================
// Color Mode
// =============================================================================

/// How embedded slide color profiles are handled when serving tiles.
///
/// Parsed from the configuration once; an unrecognized mode string is a
/// [`ConfigError::UnknownColorMode`] before the cache serves anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Strip the profile from tile metadata; serve pixels unmodified.
    Ignore,

    /// Pass the tile's embedded profile through unmodified.
    Embed,

    /// Transform to sRGB using the profile's preferred rendering intent.
    Default,

    /// Transform to sRGB with the absolute colorimetric intent.
    AbsoluteColorimetric,

    /// Transform to sRGB with the relative colorimetric intent.
    RelativeColorimetric,

    /// Transform to sRGB with the perceptual intent.
    Perceptual,

    /// Transform to sRGB with the saturation intent.
    Saturation,
}

impl ColorMode {
    /// The configuration string for this mode.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Ignore => "ignore",
            ColorMode::Embed => "embed",
            ColorMode::Default => "default",
            ColorMode::AbsoluteColorimetric => "absolute-colorimetric",
            ColorMode::RelativeColorimetric => "relative-colorimetric",
            ColorMode::Perceptual => "perceptual",
            ColorMode::Saturation => "saturation",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(ColorMode::Ignore),
            "embed" => Ok(ColorMode::Embed),
            "default" => Ok(ColorMode::Default),
            "absolute-colorimetric" => Ok(ColorMode::AbsoluteColorimetric),
            "relative-colorimetric" => Ok(ColorMode::RelativeColorimetric),
            "perceptual" => Ok(ColorMode::Perceptual),
            "saturation" => Ok(ColorMode::Saturation),
            other => Err(ConfigError::UnknownColorMode(other.to_string())),
        }
    }
}

// =============================================================================
// Tile Transform
// =============================================================================

/// The per-handle tile post-processing function.
///
/// Selected once per slide by [`TileTransform::for_slide`] and cached on the
/// handle; applying it is pure pixel work with no allocation.
pub enum TileTransform {
    /// Leave the tile untouched.
    PassThrough,

    /// Remove profile metadata before serialization; pixels untouched.
    StripProfile,

    /// Convert pixels to sRGB in place and drop the (now stale) profile tag.
    Convert(SrgbTransform),
}

impl TileTransform {
    /// Select the transform for a slide's embedded profile and the configured
    /// mode.
    ///
    /// A slide with no embedded profile always gets [`TileTransform::PassThrough`],
    /// regardless of mode. A profile that lcms2 cannot parse also falls back
    /// to pass-through with a warning rather than making the slide
    /// unviewable.
    pub fn for_slide(profile: Option<&[u8]>, mode: ColorMode) -> TileTransform {
        let Some(bytes) = profile else {
            return TileTransform::PassThrough;
        };

        match mode {
            ColorMode::Ignore => TileTransform::StripProfile,
            ColorMode::Embed => TileTransform::PassThrough,
            ColorMode::Default => Self::convert_or_passthrough(bytes, None),
            ColorMode::AbsoluteColorimetric => {
                Self::convert_or_passthrough(bytes, Some(Intent::AbsoluteColorimetric))
            }
            ColorMode::RelativeColorimetric => {
                Self::convert_or_passthrough(bytes, Some(Intent::RelativeColorimetric))
            }
            ColorMode::Perceptual => Self::convert_or_passthrough(bytes, Some(Intent::Perceptual)),
            ColorMode::Saturation => Self::convert_or_passthrough(bytes, Some(Intent::Saturation)),
        }
    }

    fn convert_or_passthrough(profile: &[u8], intent: Option<Intent>) -> TileTransform {
        match Self::build_convert(profile, intent) {
            Ok(transform) => TileTransform::Convert(transform),
            Err(e) => {
                warn!("unusable embedded color profile, serving tiles untransformed: {e}");
                TileTransform::PassThrough
            }
        }
    }

    /// Build the profile-to-sRGB transform. `None` intent means the profile's
    /// header rendering intent. `Flags::NO_CACHE` keeps the transform safe to
    /// share across concurrent tile requests.
    fn build_convert(
        profile: &[u8],
        intent: Option<Intent>,
    ) -> Result<SrgbTransform, lcms2::Error> {
        let slide_profile = Profile::new_icc(profile)?;
        let intent = intent.unwrap_or_else(|| slide_profile.header_rendering_intent());
        let srgb = Profile::new_srgb();
        Transform::new_flags_context(
            GlobalContext::new(),
            &slide_profile,
            PixelFormat::RGB_8,
            &srgb,
            PixelFormat::RGB_8,
            intent,
            Flags::NO_CACHE,
        )
    }

    /// Apply the transform to a decoded tile, mutating it in place.
    pub fn apply(&self, tile: &mut Tile) {
        match self {
            TileTransform::PassThrough => {}
            TileTransform::StripProfile => {
                tile.icc_profile = None;
            }
            TileTransform::Convert(transform) => {
                let raw: &mut [u8] = &mut tile.image;
                transform.transform_in_place(raw.as_rgb_mut());
                // Pixels are in the working space now; the source tag no
                // longer describes them and the output ships untagged.
                tile.icc_profile = None;
            }
        }
    }

    /// Whether this transform leaves tiles completely untouched.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, TileTransform::PassThrough)
    }
}

impl fmt::Debug for TileTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TileTransform::PassThrough => "PassThrough",
            TileTransform::StripProfile => "StripProfile",
            TileTransform::Convert(_) => "Convert",
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
