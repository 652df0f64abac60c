//! # Engine
//!
//! One batch in, one scored batch out.
//!
//! ```text
//! Dataset ──validate──▶ ColumnMap
//!    │
//!    ├─normalize──▶ SkuMetrics per row ──▶ Diagnostics
//!    │
//!    ├─score_population(all rows)──────────▶ absolute components ─▶ composite
//!    ├─score_population(each group ≥ min)──▶ category components ─▶ composite
//!    │
//!    ├─percentile_ranks / grouped_percentile_ranks
//!    └─classify ──▶ ScoredDataset
//! ```
//!
//! The engine holds nothing but its configuration. Every run is a pure
//! function of the dataset, so one engine can serve any number of threads.

use crate::components::{ComponentScores, score_population};
use crate::composite::composite_score;
use crate::config::ScoringConfig;
use crate::dataset::{ColumnMap, Dataset, columns, validate};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::EngineError;
use crate::metrics::{SkuMetrics, Window, normalize_window};
use crate::rank::{grouped_percentile_ranks, partition, percentile_ranks};
use crate::strategy::InventoryStrategy;
use crate::summary::{SummaryReport, summarize};
use crate::tier::{Tier, TierInput, Track, classify, classify_track};
use serde::Serialize;

/// Columns appended to every output row, in order.
pub const APPENDED_COLUMNS: [&str; 17] = [
    "velocity_score",
    "conversion_score",
    "availability_score",
    "penetration_score",
    "momentum_score",
    "absolute_core_score",
    "category_core_score",
    "final_classification",
    "absolute_percentile",
    "category_percentile",
    "absolute_classification",
    "category_classification",
    "strategy_safety_stock_days",
    "strategy_reorder_point_days",
    "strategy_max_stockout_hours",
    "strategy_priority",
    "strategy_investment_allocation",
];

// =============================================================================
// ENGINE
// =============================================================================

/// Scoring and classification engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: ScoringConfig,
}

impl Engine {
    /// Create an engine after checking the configuration.
    pub fn new(config: ScoringConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score and classify every row of `dataset`.
    ///
    /// Validation errors abort the run with no partial result. Data-quality
    /// problems inside rows never do; they end up in the diagnostics.
    pub fn run<'a>(&self, dataset: &'a Dataset) -> Result<ScoredDataset<'a>, EngineError> {
        let column_map = validate(dataset)?;
        let mut diagnostics = Diagnostics::new();
        let n = dataset.len();

        // --- Normalize ---
        let metrics: Vec<SkuMetrics> = (0..n)
            .map(|row| normalize_row(dataset, &column_map, row, &mut diagnostics))
            .collect();

        // --- Absolute track ---
        let everyone: Vec<usize> = (0..n).collect();
        let absolute_components = score_population(&metrics, &everyone, &self.config, &mut diagnostics);
        let absolute_scores: Vec<f64> = absolute_components
            .iter()
            .map(|c| composite_score(c, self.config.min_weight_coverage))
            .collect();

        // --- Category track ---
        let groups = partition((0..n).map(|row| column_map.group_category(dataset, row)));
        for row in 0..n {
            if column_map.group_category(dataset, row).is_none() {
                diagnostics.push(row, columns::GROUP_CATEGORY, DiagnosticKind::EmptyGroupCategory);
            }
        }

        let mut category_components = vec![ComponentScores::MISSING; n];
        for members in groups.values() {
            if members.len() < self.config.min_category_size {
                continue;
            }
            // Anything a category population could clamp was already
            // recorded on the absolute track.
            let mut scratch = Diagnostics::new();
            let scores = score_population(&metrics, members, &self.config, &mut scratch);
            for (&row, scores) in members.iter().zip(scores) {
                category_components[row] = scores;
            }
        }
        let category_scores: Vec<f64> = category_components
            .iter()
            .map(|c| composite_score(c, self.config.min_weight_coverage))
            .collect();

        // --- Rank ---
        let absolute_percentiles = percentile_ranks(&absolute_scores);
        let category_percentiles = grouped_percentile_ranks(&category_scores, &groups);

        // --- Classify ---
        let results = (0..n)
            .map(|row| {
                let input = TierInput {
                    absolute_score: absolute_scores[row],
                    category_score: category_scores[row],
                    recent_velocity: metrics[row].recent.sales_velocity,
                };
                let final_classification = classify(&input);
                SkuResult {
                    row,
                    variant_id: column_map.variant_id(dataset, row).map(str::to_string),
                    group_category: column_map.group_category(dataset, row).map(str::to_string),
                    metrics: metrics[row],
                    components: absolute_components[row],
                    category_components: category_components[row],
                    absolute_core_score: absolute_scores[row],
                    category_core_score: category_scores[row],
                    absolute_percentile: absolute_percentiles[row],
                    category_percentile: category_percentiles[row],
                    absolute_classification: classify_track(&input, Track::Absolute),
                    category_classification: classify_track(&input, Track::Category),
                    final_classification,
                    recent_velocity: input.recent_velocity,
                    strategy: InventoryStrategy::for_tier(final_classification),
                }
            })
            .collect();

        Ok(ScoredDataset {
            source: dataset,
            results,
            diagnostics: diagnostics.into_sorted(),
        })
    }
}

fn normalize_row(
    dataset: &Dataset,
    column_map: &ColumnMap,
    row: usize,
    diagnostics: &mut Diagnostics,
) -> SkuMetrics {
    let mut normalize = |window: Window| {
        let raw = column_map
            .window_columns(window)
            .map(|column| column.and_then(|c| dataset.cell(row, c)));
        normalize_window(window, raw, row, diagnostics)
    };
    SkuMetrics {
        lifetime: normalize(Window::Lifetime),
        recent: normalize(Window::Recent),
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Everything derived for one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuResult {
    /// Zero-based data row index.
    pub row: usize,
    pub variant_id: Option<String>,
    pub group_category: Option<String>,
    #[serde(skip)]
    pub metrics: SkuMetrics,
    /// Absolute-track components.
    pub components: ComponentScores,
    /// Category-track components; all NaN when the SKU is off that track.
    pub category_components: ComponentScores,
    pub absolute_core_score: f64,
    pub category_core_score: f64,
    pub absolute_percentile: f64,
    pub category_percentile: f64,
    pub absolute_classification: Tier,
    pub category_classification: Tier,
    pub final_classification: Tier,
    /// Normalized recent sales velocity the tier gates looked at.
    pub recent_velocity: f64,
    pub strategy: InventoryStrategy,
}

/// Output of one engine run.
#[derive(Debug, Clone)]
pub struct ScoredDataset<'a> {
    source: &'a Dataset,
    results: Vec<SkuResult>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ScoredDataset<'a> {
    pub fn source(&self) -> &'a Dataset {
        self.source
    }

    /// Per-row results, in input order.
    pub fn results(&self) -> &[SkuResult] {
        &self.results
    }

    /// Diagnostics ordered by row.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Original headers followed by [`APPENDED_COLUMNS`].
    pub fn headers(&self) -> Vec<String> {
        self.source
            .headers()
            .iter()
            .cloned()
            .chain(APPENDED_COLUMNS.iter().map(|c| (*c).to_string()))
            .collect()
    }

    /// Output rows as text cells: original cells untouched, scores with four
    /// decimals, NaN as an empty cell.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.source
            .rows()
            .iter()
            .zip(&self.results)
            .map(|(cells, result)| {
                let mut row = cells.clone();
                row.extend(appended_cells(result));
                row
            })
            .collect()
    }

    /// Aggregate report over this run.
    pub fn summary(&self) -> SummaryReport {
        summarize(&self.results)
    }
}

fn appended_cells(result: &SkuResult) -> [String; 17] {
    let c = &result.components;
    let s = &result.strategy;
    [
        format_score(c.velocity),
        format_score(c.conversion),
        format_score(c.availability),
        format_score(c.penetration),
        format_score(c.momentum),
        format_score(result.absolute_core_score),
        format_score(result.category_core_score),
        result.final_classification.to_string(),
        format_score(result.absolute_percentile),
        format_score(result.category_percentile),
        result.absolute_classification.to_string(),
        result.category_classification.to_string(),
        s.safety_stock_days.to_string(),
        s.reorder_point_days.to_string(),
        s.max_stockout_hours.to_string(),
        s.priority.to_string(),
        s.investment_allocation.to_string(),
    ]
}

/// Four decimals; NaN renders as an empty cell.
pub fn format_score(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:.4}", value)
    }
}

// =============================================================================
// TESTS
// =============================================================================
