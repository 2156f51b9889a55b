//! In-memory slide annotation table.
//!
//! Annotations arrive from an external source (spreadsheet export, study
//! database) as rows keyed by slide base name. The table is loaded once at
//! startup and consulted when decorating a slide listing or viewer page.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;

/// One annotation record for a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRow {
    /// Slide base name the row is keyed by (file name without extension).
    pub name: String,

    /// Short human-readable label shown next to the slide.
    pub label: String,

    /// Optional free-text diagnosis.
    pub fulltext_diagnosis: Option<String>,
}

/// Lookup table of annotation rows by slide base name.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    rows: HashMap<String, AnnotationRow>,
}

impl AnnotationTable {
    /// An empty table. Every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row, replacing any previous row with the same name.
    pub fn insert(&mut self, row: AnnotationRow) {
        self.rows.insert(row.name.clone(), row);
    }

    /// Look up the row for a slide base name.
    pub fn lookup(&self, base_name: &str) -> Result<&AnnotationRow, AnnotationError> {
        self.rows
            .get(base_name)
            .ok_or_else(|| AnnotationError::NotFound(base_name.to_string()))
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<AnnotationRow> for AnnotationTable {
    fn from_iter<I: IntoIterator<Item = AnnotationRow>>(iter: I) -> Self {
        let mut table = Self::new();
        for row in iter {
            table.insert(row);
        }
        table
    }
}
