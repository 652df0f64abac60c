//! # Scoring Configuration
//!
//! Tunables of the component scorer and composite aggregator.
//!
//! Weights and tier thresholds are deliberately NOT configurable: they are
//! part of the published definitions tables and must match them exactly.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

// =============================================================================
// DEFAULTS
// =============================================================================

/// Length of the recent ("last 3 months") window in days.
pub const DEFAULT_RECENT_WINDOW_DAYS: f64 = 90.0;

/// Recent active days below this count mark the recent window as sparse.
pub const DEFAULT_SPARSE_RECENT_DAYS: f64 = 14.0;

/// Smallest group category that is scored on the category track. Every
/// non-empty group is scored by default.
pub const DEFAULT_MIN_CATEGORY_SIZE: usize = 1;

/// Minimum share of component weight that must be non-NaN for a composite.
pub const DEFAULT_MIN_WEIGHT_COVERAGE: f64 = 0.5;

// =============================================================================
// SCORING CONFIG
// =============================================================================

/// Engine configuration.
///
/// Every field has a default, so a partial JSON document is valid:
///
/// ```json
/// { "min_category_size": 5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Denominator of the recent availability coverage ratio.
    pub recent_window_days: f64,

    /// Threshold under which the recent window is treated as sparse and the
    /// lifetime window dominates the blend.
    pub sparse_recent_days: f64,

    /// Group categories with fewer members get no category score.
    /// `1` scores every non-empty group; `5` drops small groups.
    pub min_category_size: usize,

    /// Minimum available component weight (0, 1] for a composite score.
    pub min_weight_coverage: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            recent_window_days: DEFAULT_RECENT_WINDOW_DAYS,
            sparse_recent_days: DEFAULT_SPARSE_RECENT_DAYS,
            min_category_size: DEFAULT_MIN_CATEGORY_SIZE,
            min_weight_coverage: DEFAULT_MIN_WEIGHT_COVERAGE,
        }
    }
}

impl ScoringConfig {
    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.recent_window_days.is_finite() && self.recent_window_days > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "recent_window_days must be a positive number, got {}",
                self.recent_window_days
            )));
        }
        if !(self.sparse_recent_days.is_finite() && self.sparse_recent_days >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "sparse_recent_days must be a non-negative number, got {}",
                self.sparse_recent_days
            )));
        }
        if self.min_category_size == 0 {
            return Err(EngineError::InvalidConfig(
                "min_category_size must be at least 1".to_string(),
            ));
        }
        if !(self.min_weight_coverage > 0.0 && self.min_weight_coverage <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "min_weight_coverage must be in (0, 1], got {}",
                self.min_weight_coverage
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
