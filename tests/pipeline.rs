//! End-to-end tests through the public API.
//!
//! These tests verify the full serving pipeline a boundary layer would drive:
//! - Configuration parsing and validation
//! - Catalog discovery over a real directory tree
//! - Slide cache behavior (hits, eviction, shared pixel cache)
//! - Tile reads with color transforms applied
//! - Tile encoding to JPEG/PNG
//! - Annotation decoration of catalog entries

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use image::{Rgb, RgbImage};
use tempfile::TempDir;

use wsi_deepzoom::{
    AnnotationRow, AnnotationTable, BackendError, CatalogEntry, Config, DeepZoomOptions,
    DeepZoomSlide, Directory, SlideBackend, SlideCache, Tile, TileError, PROPERTY_MPP_X,
    PROPERTY_MPP_Y,
};

// =============================================================================
// Test Backend
// =============================================================================

/// Synthetic decode backend recognizing `.svs` files and producing gradient
/// tiles. Slides whose file name contains `profiled` carry a wide-gamut ICC
/// profile.
struct TestBackend {
    open_count: AtomicUsize,
}

impl TestBackend {
    fn new() -> Self {
        Self {
            open_count: AtomicUsize::new(0),
        }
    }
}

#[derive(Debug)]
struct TestSlide {
    tile_size: u32,
    profile: Option<Vec<u8>>,
}

#[async_trait]
impl DeepZoomSlide for TestSlide {
    fn property(&self, name: &str) -> Option<String> {
        match name {
            PROPERTY_MPP_X => Some("0.23".to_string()),
            PROPERTY_MPP_Y => Some("0.25".to_string()),
            _ => None,
        }
    }

    fn color_profile(&self) -> Option<Vec<u8>> {
        self.profile.clone()
    }

    async fn read_tile(&self, level: u32, col: u32, row: u32) -> Result<Tile, TileError> {
        if level > 12 || col > 64 || row > 64 {
            return Err(TileError::InvalidCoordinates { level, col, row });
        }
        let image = RgbImage::from_fn(self.tile_size, self.tile_size, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 80])
        });
        let mut tile = Tile::new(image);
        tile.icc_profile = self.profile.clone();
        Ok(tile)
    }
}

#[async_trait]
impl SlideBackend for TestBackend {
    type Slide = TestSlide;
    type PixelCache = ();

    async fn open(&self, path: &Path, opts: &DeepZoomOptions) -> Result<Self::Slide, BackendError> {
        if !self.detect_format(path) {
            return Err(BackendError::UnsupportedFormat {
                reason: format!("{} is not a slide", path.display()),
            });
        }
        self.open_count.fetch_add(1, Ordering::SeqCst);
        let profiled = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().contains("profiled"));
        Ok(TestSlide {
            tile_size: opts.tile_size + 2 * opts.overlap,
            profile: profiled.then(wide_gamut_profile),
        })
    }

    fn detect_format(&self, path: &Path) -> bool {
        path.extension().is_some_and(|e| e == "svs")
    }

    fn create_pixel_cache(&self, _capacity_bytes: usize) -> Result<(), BackendError> {
        Ok(())
    }

    fn attach_pixel_cache(&self, _slide: &Self::Slide, _cache: &Arc<()>) {}
}

/// Wide-gamut RGB profile whose conversion to sRGB changes saturated pixels.
fn wide_gamut_profile() -> Vec<u8> {
    use lcms2::{CIExyY, CIExyYTRIPLE, Profile, ToneCurve};

    let white_point = CIExyY {
        x: 0.3127,
        y: 0.3290,
        Y: 1.0,
    };
    let primaries = CIExyYTRIPLE {
        Red: CIExyY {
            x: 0.6400,
            y: 0.3300,
            Y: 1.0,
        },
        Green: CIExyY {
            x: 0.2100,
            y: 0.7100,
            Y: 1.0,
        },
        Blue: CIExyY {
            x: 0.1500,
            y: 0.0600,
            Y: 1.0,
        },
    };
    let gamma = ToneCurve::new(2.2);
    let curve: &lcms2::ToneCurve = &gamma;
    let profile = Profile::new_rgb(&white_point, &primaries, &[curve, curve, curve]).unwrap();
    profile.icc().unwrap()
}

// =============================================================================
// Fixtures
// =============================================================================

fn slide_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("CMU-1.svs"), b"").unwrap();
    std::fs::write(tmp.path().join("profiled.svs"), b"").unwrap();
    std::fs::create_dir(tmp.path().join("batch2")).unwrap();
    std::fs::write(tmp.path().join("batch2").join("CMU-2.svs"), b"").unwrap();
    std::fs::write(tmp.path().join("thumbs.db"), b"").unwrap();
    tmp
}

fn config_for(dir: &Path, color_mode: &str) -> Config {
    let config = Config::try_parse_from([
        "wsi-deepzoom",
        "--slide-dir",
        &dir.display().to_string(),
        "--color-mode",
        color_mode,
        "--cache-size",
        "4",
        "--tile-cache-mb",
        "16",
    ])
    .unwrap();
    config.validate().unwrap();
    config
}

fn catalog_slides(dir: &Directory) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for child in &dir.children {
        match child {
            CatalogEntry::Directory(d) => out.extend(catalog_slides(d)),
            CatalogEntry::Slide(s) => out.push(s.relpath.clone()),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_catalog_to_encoded_tile() {
    let tmp = slide_tree();
    let config = config_for(tmp.path(), "default");
    let cache = SlideCache::new(TestBackend::new(), &config).unwrap();

    let catalog = Directory::build(&TestBackend::new(), &config.slide_dir, None).unwrap();
    let slides = catalog_slides(&catalog);
    assert_eq!(
        slides,
        vec![
            PathBuf::from("CMU-1.svs"),
            PathBuf::from("profiled.svs"),
            PathBuf::from("batch2/CMU-2.svs"),
        ]
    );

    // Serve a tile for every discovered slide
    let encoder = config.tile_encoder().unwrap();
    for relpath in &slides {
        let handle = cache.get(&config.slide_dir.join(relpath)).await.unwrap();
        let tile = handle.read_tile(10, 3, 4).await.unwrap();
        assert_eq!(tile.width(), config.tile_size + 2 * config.overlap);

        let bytes = encoder.encode(&tile).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]); // JPEG SOI
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), tile.width());
    }

    assert_eq!(cache.cached_count().await, 3);
}

#[tokio::test]
async fn test_cache_serves_repeat_requests_without_reopening() {
    let tmp = slide_tree();
    let config = config_for(tmp.path(), "default");
    let cache = SlideCache::new(TestBackend::new(), &config).unwrap();
    let path = config.slide_dir.join("CMU-1.svs");

    let first = cache.get(&path).await.unwrap();
    for _ in 0..10 {
        let again = cache.get(&path).await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
    assert!((first.microns_per_pixel() - 0.24).abs() < 1e-9);
    assert_eq!(first.display_name(), "CMU-1.svs");
}

#[tokio::test]
async fn test_default_mode_converts_profiled_slide() {
    let tmp = slide_tree();
    let config = config_for(tmp.path(), "default");
    let cache = SlideCache::new(TestBackend::new(), &config).unwrap();

    let plain = cache.get(&config.slide_dir.join("CMU-1.svs")).await.unwrap();
    assert!(plain.transform().is_passthrough());

    let profiled = cache
        .get(&config.slide_dir.join("profiled.svs"))
        .await
        .unwrap();
    assert!(!profiled.transform().is_passthrough());

    // Converted output ships untagged
    let tile = profiled.read_tile(10, 0, 0).await.unwrap();
    assert!(tile.icc_profile.is_none());
}

#[tokio::test]
async fn test_embed_mode_keeps_profile_through_encoding() {
    let tmp = slide_tree();
    let config = config_for(tmp.path(), "embed");
    let cache = SlideCache::new(TestBackend::new(), &config).unwrap();

    let profiled = cache
        .get(&config.slide_dir.join("profiled.svs"))
        .await
        .unwrap();
    let tile = profiled.read_tile(10, 0, 0).await.unwrap();
    assert!(tile.icc_profile.is_some());

    let bytes = config.tile_encoder().unwrap().encode(&tile).unwrap();
    assert!(!bytes.is_empty());
}

#[tokio::test]
async fn test_ignore_mode_strips_profile() {
    let tmp = slide_tree();
    let config = config_for(tmp.path(), "ignore");
    let cache = SlideCache::new(TestBackend::new(), &config).unwrap();

    let profiled = cache
        .get(&config.slide_dir.join("profiled.svs"))
        .await
        .unwrap();
    let tile = profiled.read_tile(10, 0, 0).await.unwrap();
    assert!(tile.icc_profile.is_none());
}

#[tokio::test]
async fn test_unknown_slide_is_absent_not_fatal() {
    let tmp = slide_tree();
    let config = config_for(tmp.path(), "default");
    let cache = SlideCache::new(TestBackend::new(), &config).unwrap();

    let err = cache
        .get(&config.slide_dir.join("thumbs.db"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(cache.cached_count().await, 0);
}

#[tokio::test]
async fn test_out_of_bounds_tile_reports_coordinates() {
    let tmp = slide_tree();
    let config = config_for(tmp.path(), "default");
    let cache = SlideCache::new(TestBackend::new(), &config).unwrap();

    let handle = cache.get(&config.slide_dir.join("CMU-1.svs")).await.unwrap();
    let err = handle.read_tile(13, 0, 0).await.unwrap_err();
    assert!(matches!(err, TileError::InvalidCoordinates { level: 13, .. }));
}

#[tokio::test]
async fn test_png_format_end_to_end() {
    let tmp = slide_tree();
    let mut config = config_for(tmp.path(), "default");
    config.format = "png".to_string();
    config.validate().unwrap();

    let cache = SlideCache::new(TestBackend::new(), &config).unwrap();
    let handle = cache.get(&config.slide_dir.join("CMU-1.svs")).await.unwrap();
    let tile = handle.read_tile(10, 0, 0).await.unwrap();

    let bytes = config.tile_encoder().unwrap().encode(&tile).unwrap();
    assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
}

#[test]
fn test_annotations_decorate_catalog_entries() {
    let tmp = slide_tree();
    let catalog = Directory::build(&TestBackend::new(), tmp.path(), None).unwrap();

    let annotations: AnnotationTable = [AnnotationRow {
        name: "CMU-1".to_string(),
        label: "adenocarcinoma".to_string(),
        fulltext_diagnosis: Some("moderately differentiated".to_string()),
    }]
    .into_iter()
    .collect();

    let mut labeled = 0;
    let mut unlabeled = 0;
    for relpath in catalog_slides(&catalog) {
        let stem = relpath.file_stem().unwrap().to_string_lossy();
        match annotations.lookup(&stem) {
            Ok(row) => {
                assert_eq!(row.label, "adenocarcinoma");
                labeled += 1;
            }
            Err(_) => unlabeled += 1,
        }
    }
    assert_eq!(labeled, 1);
    assert_eq!(unlabeled, 2);
}

#[test]
fn test_catalog_filter_narrows_to_study_set() {
    let tmp = slide_tree();
    let filter: std::collections::HashSet<String> =
        ["CMU-1".to_string(), "CMU-2".to_string()].into_iter().collect();

    let catalog = Directory::build(&TestBackend::new(), tmp.path(), Some(&filter)).unwrap();
    assert_eq!(
        catalog_slides(&catalog),
        vec![PathBuf::from("CMU-1.svs"), PathBuf::from("batch2/CMU-2.svs")]
    );
}

#[tokio::test]
async fn test_unknown_color_mode_never_constructs_a_cache() {
    let tmp = slide_tree();
    let result = Config::try_parse_from([
        "wsi-deepzoom",
        "--slide-dir",
        &tmp.path().display().to_string(),
        "--color-mode",
        "vivid",
    ])
    .unwrap()
    .validate();
    assert!(result.is_err());
}
