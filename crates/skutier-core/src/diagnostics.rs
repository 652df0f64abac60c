//! # Diagnostics
//!
//! Non-fatal, per-row data-quality findings collected while scoring.
//!
//! A diagnostic never changes control flow: the affected field is already
//! NaN (or clamped) by the time it is recorded. The list exists for auditing
//! and for tests that pin down exactly where a value was corrected.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// What happened to a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The cell could not be parsed as a number. Treated as missing.
    NonNumeric { raw: String },
    /// The cell parsed to a negative or infinite number. Treated as missing.
    OutOfDomain { value: f64 },
    /// Active days of the window are zero, so its ratios are NaN.
    ZeroActiveDays,
    /// A computed score left [0, 100] and was clamped.
    Clamped { raw: f64, clamped: f64 },
    /// No group category, so the SKU is left out of the category track.
    EmptyGroupCategory,
}

impl DiagnosticKind {
    /// Stable snake_case label, used for counting.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NonNumeric { .. } => "non_numeric",
            Self::OutOfDomain { .. } => "out_of_domain",
            Self::ZeroActiveDays => "zero_active_days",
            Self::Clamped { .. } => "clamped",
            Self::EmptyGroupCategory => "empty_group_category",
        }
    }
}

/// One finding, anchored to a data row and a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Zero-based data row index.
    pub row: usize,
    /// Input column or output score column the finding is about.
    pub field: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::NonNumeric { raw } => {
                write!(f, "row {}: {} is not numeric ({:?})", self.row, self.field, raw)
            }
            DiagnosticKind::OutOfDomain { value } => {
                write!(f, "row {}: {} is out of domain ({})", self.row, self.field, value)
            }
            DiagnosticKind::ZeroActiveDays => {
                write!(f, "row {}: {} is zero, ratios set to NaN", self.row, self.field)
            }
            DiagnosticKind::Clamped { raw, clamped } => write!(
                f,
                "row {}: {} clamped from {} to {}",
                self.row, self.field, raw, clamped
            ),
            DiagnosticKind::EmptyGroupCategory => {
                write!(f, "row {}: {} is empty, category track skipped", self.row, self.field)
            }
        }
    }
}

/// Ordered collection of diagnostics for one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: usize, field: impl Into<String>, kind: DiagnosticKind) {
        self.entries.push(Diagnostic {
            row,
            field: field.into(),
            kind,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Count findings per kind label.
    #[must_use]
    pub fn count_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.kind.label()).or_insert(0) += 1;
        }
        counts
    }

    /// Consume into a list ordered by row; insertion order is kept within a row.
    #[must_use]
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.entries.sort_by_key(|d| d.row);
        self.entries
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(0, "lifetime_lots_sold", DiagnosticKind::NonNumeric { raw: "n/a".into() });
        diagnostics.push(1, "last3_months_active_days", DiagnosticKind::ZeroActiveDays);
        diagnostics.push(2, "last3_months_active_days", DiagnosticKind::ZeroActiveDays);

        let counts = diagnostics.count_by_kind();
        assert_eq!(counts.get("non_numeric"), Some(&1));
        assert_eq!(counts.get("zero_active_days"), Some(&2));
        assert_eq!(counts.get("clamped"), None);
    }

    #[test]
    fn sorted_by_row_keeps_insertion_order_within_row() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(3, "b", DiagnosticKind::ZeroActiveDays);
        diagnostics.push(1, "a", DiagnosticKind::ZeroActiveDays);
        diagnostics.push(3, "a", DiagnosticKind::ZeroActiveDays);

        let sorted = diagnostics.into_sorted();
        let order: Vec<_> = sorted.iter().map(|d| (d.row, d.field.as_str())).collect();
        assert_eq!(order, vec![(1, "a"), (3, "b"), (3, "a")]);
    }

    #[test]
    fn display_is_readable() {
        let diagnostic = Diagnostic {
            row: 4,
            field: "conversion_score".to_string(),
            kind: DiagnosticKind::Clamped {
                raw: 120.0,
                clamped: 100.0,
            },
        };
        assert_eq!(
            diagnostic.to_string(),
            "row 4: conversion_score clamped from 120 to 100"
        );
    }

    #[test]
    fn serializes_flat() {
        let diagnostic = Diagnostic {
            row: 0,
            field: "lifetime_active_days".to_string(),
            kind: DiagnosticKind::OutOfDomain { value: -3.0 },
        };
        let json = serde_json::to_value(&diagnostic).unwrap_or_default();
        assert_eq!(json["kind"], "out_of_domain");
        assert_eq!(json["row"], 0);
        assert_eq!(json["value"], -3.0);
    }
}
