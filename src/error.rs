use thiserror::Error;

/// Errors reported by the image-decode backend when opening or reading slides.
///
/// `UnsupportedFormat` and `NotFound` are expected, frequent outcomes; the
/// boundary layer translates both into an absent resource rather than a
/// server error. `VersionUnsupported` is only ever produced by
/// [`create_pixel_cache`](crate::backend::SlideBackend::create_pixel_cache)
/// and is recovered silently at cache construction.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// File exists but is not a recognized slide format
    #[error("unsupported slide format: {reason}")]
    UnsupportedFormat { reason: String },

    /// Path does not resolve to an openable slide
    #[error("slide not found: {reason}")]
    NotFound { reason: String },

    /// I/O error while opening or reading the slide
    #[error("I/O error: {0}")]
    Io(String),

    /// Backend version lacks shared pixel cache support
    #[error("backend version does not support a shared pixel cache")]
    VersionUnsupported,
}

impl BackendError {
    /// Whether this error should present as an absent resource to callers.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::NotFound { .. } | BackendError::UnsupportedFormat { .. }
        )
    }
}

/// Errors that can occur when reading or serializing a tile.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Tile request references a pyramid level or grid position outside bounds
    /// (should present as an absent resource, not a server error)
    #[error("invalid tile coordinates: level {level}, col {col}, row {row}")]
    InvalidCoordinates { level: u32, col: u32, row: u32 },

    /// Backend failed to produce a decoded tile
    #[error("tile decode error: {message}")]
    Decode { message: String },

    /// Tile serialization failed before any output was emitted
    #[error("tile encode error: {message}")]
    Encode { message: String },
}

/// Configuration errors, fatal at construction time.
///
/// None of these are recoverable: a cache built from an invalid configuration
/// must never serve a request, so startup aborts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Color mode string is not one of the seven recognized modes
    #[error("unknown color mode: {0:?}")]
    UnknownColorMode(String),

    /// Tile format string is not a supported Deep Zoom format
    #[error("unknown tile format: {0:?} (expected jpeg or png)")]
    UnknownTileFormat(String),

    /// Slide cache capacity must hold at least one entry
    #[error("cache_size must be greater than 0")]
    InvalidCacheSize,

    /// Tile quality outside the JPEG quality range
    #[error("tile_quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    /// Tile edge length must be non-zero
    #[error("tile_size must be greater than 0")]
    InvalidTileSize,
}

/// Errors from building the slide catalog.
///
/// Only the directory walk itself can fail; unreadable or unrecognized files
/// inside a readable directory are skipped silently.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error reading catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the annotation table lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    /// No annotation row exists for the given slide base name
    #[error("no annotation row for slide {0:?}")]
    NotFound(String),
}
