//! # Error Module
//!
//! Batch-level validation errors.
//!
//! Only structural problems with the dataset are fatal. Per-row anomalies
//! (missing metrics, zero active days, empty group category) never surface
//! here; they resolve to NaN and a [`crate::Diagnostic`].

use serde::Serialize;
use thiserror::Error;

/// A data row whose field count does not match the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaggedRow {
    /// Zero-based data row index.
    pub row: usize,
    /// Number of header columns.
    pub expected: usize,
    /// Number of fields found in the row.
    pub found: usize,
}

/// A variant id that appears on more than one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateVariant {
    pub variant_id: String,
    /// Zero-based data row indexes carrying this id, ascending.
    pub rows: Vec<usize>,
}

/// Fatal error for a whole batch. No partial result accompanies it.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "details", rename_all = "snake_case")]
pub enum EngineError {
    /// One or more required columns are absent from the header.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Input columns whose names are taken by the appended score columns.
    #[error("input already has output columns: {}", .0.join(", "))]
    ReservedColumns(Vec<String>),

    /// The dataset has a header but no data rows.
    #[error("dataset has no rows")]
    EmptyDataset,

    /// Rows whose width differs from the header.
    #[error("{} row(s) do not match the header width (first at row {})", .0.len(), first_ragged(.0))]
    RaggedRows(Vec<RaggedRow>),

    /// Variant ids that collide within the batch.
    #[error("duplicate variant ids: {}", describe_duplicates(.0))]
    DuplicateVariantIds(Vec<DuplicateVariant>),

    /// Scoring configuration outside its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn first_ragged(rows: &[RaggedRow]) -> usize {
    rows.first().map(|r| r.row).unwrap_or(0)
}

fn describe_duplicates(duplicates: &[DuplicateVariant]) -> String {
    duplicates
        .iter()
        .map(|d| {
            let rows = d
                .rows
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} (rows {})", d.variant_id, rows)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// TESTS
// =============================================================================
