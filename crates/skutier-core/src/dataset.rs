//! # Dataset Module
//!
//! The rectangular input table and its batch-level validation.
//!
//! The engine never parses files: the caller hands over a header row and
//! string cells. Identity and category columns are opaque and pass through
//! unchanged; metric columns are interpreted by [`crate::metrics`].

use crate::engine::APPENDED_COLUMNS;
use crate::error::{DuplicateVariant, EngineError, RaggedRow};
use crate::metrics::{Metric, Window};
use std::collections::BTreeMap;

// =============================================================================
// COLUMN NAMES
// =============================================================================

/// Documented input column names.
pub mod columns {
    pub const VARIANT_ID: &str = "variant_id";
    pub const PRODUCT_ID: &str = "product_id";
    pub const PRODUCT_NAME: &str = "product_name";
    pub const BRAND_ID: &str = "brand_id";
    pub const BRAND_NAME: &str = "brand_name";
    pub const STORE_ID: &str = "store_id";
    pub const STORE_NAME: &str = "store_name";
    pub const SUPER_CATEGORY: &str = "super_category";
    pub const MAIN_CATEGORY: &str = "main_category";
    pub const GROUP_CATEGORY: &str = "group_category";
    pub const SUB_CATEGORY: &str = "sub_category";

    pub const LIFETIME_LOTS_SOLD: &str = "lifetime_lots_sold";
    pub const LIFETIME_ACTIVE_DAYS: &str = "lifetime_active_days";
    pub const LIFETIME_SALES_VELOCITY: &str = "lifetime_sales_velocity";
    pub const LIFETIME_LOTS_SOLD_DAYS: &str = "lifetime_lots_sold_days";
    pub const LIFETIME_CONVERSION_DAYS: &str = "lifetime_conversion_days";
    pub const LIFETIME_NET_DELIVERED_BUYERS: &str = "lifetime_net_delivered_buyers";
    pub const LAST3_MONTHS_LOTS_SOLD: &str = "last3_months_lots_sold";
    pub const LAST3_MONTHS_ACTIVE_DAYS: &str = "last3_months_active_days";
    pub const LAST3_MONTHS_SALES_VELOCITY: &str = "last3_months_sales_velocity";
    pub const LAST3_MONTHS_LOTS_SOLD_DAYS: &str = "last3_months_lots_sold_days";
    pub const LAST3_MONTHS_CONVERSION_DAYS: &str = "last3_months_conversion_days";
    pub const LAST3_MONTHS_NET_DELIVERED_BUYERS: &str = "last3_months_net_delivered_buyers";
}

/// Columns without which a batch is rejected.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    columns::LIFETIME_LOTS_SOLD,
    columns::LIFETIME_ACTIVE_DAYS,
    columns::LAST3_MONTHS_LOTS_SOLD,
    columns::LAST3_MONTHS_ACTIVE_DAYS,
    columns::LAST3_MONTHS_NET_DELIVERED_BUYERS,
    columns::LIFETIME_NET_DELIVERED_BUYERS,
];

/// Legacy headers accepted in place of a documented name.
const ALIASES: [(&str, &str); 2] = [
    (columns::VARIANT_ID, "variantid"),
    (columns::GROUP_CATEGORY, "groupcategory"),
];

// =============================================================================
// DATASET
// =============================================================================

/// A header row plus string cells, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build from borrowed cells. Handy for tests and small fixtures.
    #[must_use]
    pub fn from_cells(headers: &[&str], rows: &[Vec<&str>]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by its documented name or one of its legacy aliases.
    /// Header cells are compared after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.position(name).or_else(|| {
            ALIASES
                .iter()
                .filter(|(canonical, _)| *canonical == name)
                .find_map(|(_, alias)| self.position(alias))
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cell at `(row, column)`, if both exist.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

// =============================================================================
// COLUMN MAP
// =============================================================================

/// Column indexes the engine reads, resolved once per batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub variant_id: Option<usize>,
    pub group_category: Option<usize>,
    metrics: [[Option<usize>; 7]; 2],
}

impl ColumnMap {
    /// Resolve every known column. Absent columns map to `None`.
    pub fn resolve(dataset: &Dataset) -> Self {
        let mut metrics = [[None; 7]; 2];
        for (w, window) in Window::ALL.into_iter().enumerate() {
            for (m, metric) in Metric::ALL.into_iter().enumerate() {
                metrics[w][m] = dataset.column_index(&metric.column(window));
            }
        }
        Self {
            variant_id: dataset.column_index(columns::VARIANT_ID),
            group_category: dataset.column_index(columns::GROUP_CATEGORY),
            metrics,
        }
    }

    /// Column of a metric, ordered like [`Metric::ALL`].
    pub fn window_columns(&self, window: Window) -> [Option<usize>; 7] {
        match window {
            Window::Lifetime => self.metrics[0],
            Window::Recent => self.metrics[1],
        }
    }

    /// Trimmed, non-empty group category of a row.
    pub fn group_category<'a>(&self, dataset: &'a Dataset, row: usize) -> Option<&'a str> {
        let column = self.group_category?;
        let value = dataset.cell(row, column)?.trim();
        (!value.is_empty()).then_some(value)
    }

    /// Trimmed, non-empty variant id of a row.
    pub fn variant_id<'a>(&self, dataset: &'a Dataset, row: usize) -> Option<&'a str> {
        let column = self.variant_id?;
        let value = dataset.cell(row, column)?.trim();
        (!value.is_empty()).then_some(value)
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Validate a batch and resolve its columns.
///
/// Checks, in order: required columns, no clash with the appended output
/// columns, at least one row, row widths, unique variant ids. Each error lists every offending column or row of its kind.
pub fn validate(dataset: &Dataset) -> Result<ColumnMap, EngineError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| dataset.column_index(name).is_none())
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::MissingColumns(missing));
    }

    let reserved: Vec<String> = dataset
        .headers()
        .iter()
        .filter(|name| APPENDED_COLUMNS.contains(&name.trim()))
        .cloned()
        .collect();
    if !reserved.is_empty() {
        return Err(EngineError::ReservedColumns(reserved));
    }

    if dataset.is_empty() {
        return Err(EngineError::EmptyDataset);
    }

    let expected = dataset.headers().len();
    let ragged: Vec<RaggedRow> = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.len() != expected)
        .map(|(index, row)| RaggedRow {
            row: index,
            expected,
            found: row.len(),
        })
        .collect();
    if !ragged.is_empty() {
        return Err(EngineError::RaggedRows(ragged));
    }

    let columns = ColumnMap::resolve(dataset);

    let mut seen: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for row in 0..dataset.len() {
        if let Some(id) = columns.variant_id(dataset, row) {
            seen.entry(id).or_default().push(row);
        }
    }
    let duplicates: Vec<DuplicateVariant> = seen
        .into_iter()
        .filter(|(_, rows)| rows.len() > 1)
        .map(|(id, rows)| DuplicateVariant {
            variant_id: id.to_string(),
            rows,
        })
        .collect();
    if !duplicates.is_empty() {
        return Err(EngineError::DuplicateVariantIds(duplicates));
    }

    Ok(columns)
}

// =============================================================================
// TESTS
// =============================================================================
