//! Filesystem catalog of viewable slides.
//!
//! A [`Directory`] is a point-in-time snapshot of the slide tree under a base
//! directory: sorted, filtered to files the backend recognizes, with empty
//! directories pruned. It is rebuilt on every listing and returned as a plain
//! value for the boundary layer to render.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::backend::SlideBackend;
use crate::error::CatalogError;

// =============================================================================
// Catalog Types
// =============================================================================

/// A viewable slide file within the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideFile {
    /// Base name of the file, extension included.
    pub name: String,

    /// Path relative to the catalog root, usable as a slide identifier.
    pub relpath: PathBuf,
}

impl SlideFile {
    fn new(relpath: PathBuf) -> Self {
        let name = relpath
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, relpath }
    }
}

/// One child of a catalog directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogEntry {
    Directory(Directory),
    Slide(SlideFile),
}

/// A directory node in the slide catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directory {
    /// Base name of the directory; empty for the catalog root.
    pub name: String,

    /// Children in sorted-name order. Never empty below the root.
    pub children: Vec<CatalogEntry>,
}

// =============================================================================
// Catalog Construction
// =============================================================================

impl Directory {
    /// Build a catalog of the tree rooted at `basedir`.
    ///
    /// Entries are visited in sorted-name order. A subdirectory is skipped
    /// when a sibling file with the same name plus `.mrxs` exists, since it
    /// holds the auxiliary data of that multi-file slide rather than slides
    /// of its own. Files are included when the backend recognizes them and,
    /// if a filter set is given, their stem is in the set. Subdirectories
    /// that end up with no children are dropped.
    ///
    /// Only a failure to read `basedir` itself is an error; unreadable
    /// entries deeper in the tree are skipped.
    pub fn build<B: SlideBackend>(
        backend: &B,
        basedir: &Path,
        filter: Option<&HashSet<String>>,
    ) -> Result<Directory, CatalogError> {
        Self::walk(backend, basedir, Path::new(""), filter)
    }

    fn walk<B: SlideBackend>(
        backend: &B,
        basedir: &Path,
        relpath: &Path,
        filter: Option<&HashSet<String>>,
    ) -> Result<Directory, CatalogError> {
        let dir_path = basedir.join(relpath);

        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(&dir_path)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        let mut children = Vec::new();
        for name in names {
            let cur_relpath = relpath.join(&name);
            let cur_path = basedir.join(&cur_relpath);

            if cur_path.is_dir() {
                // Companion data directory of a multi-file slide
                if dir_path.join(format!("{name}.mrxs")).is_file() {
                    continue;
                }
                match Self::walk(backend, basedir, &cur_relpath, filter) {
                    Ok(dir) if !dir.children.is_empty() => {
                        children.push(CatalogEntry::Directory(dir));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!("skipping unreadable directory {}: {e}", cur_path.display());
                    }
                }
            } else if backend.detect_format(&cur_path) && stem_matches(&cur_path, filter) {
                children.push(CatalogEntry::Slide(SlideFile::new(cur_relpath)));
            }
        }

        Ok(Directory {
            name: relpath
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            children,
        })
    }
}

fn stem_matches(path: &Path, filter: Option<&HashSet<String>>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    path.file_stem()
        .map(|s| s.to_string_lossy())
        .is_some_and(|stem| filter.contains(stem.as_ref()))
}

// =============================================================================
// Tests
// =============================================================================
