//! # Summary Report
//!
//! Batch-level aggregates over a scored dataset: tier counts per track,
//! where the core SKUs sit, how they perform, and how the ranked population
//! spreads over the top bands.
//!
//! Means and sums skip NaN. A mean over nothing is `None`.

use crate::engine::SkuResult;
use crate::tier::{Tier, Track};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Top-band cut-offs, as percentile floors (top 5%, 15%, 30%).
pub const TOP_BANDS: [f64; 3] = [95.0, 85.0, 70.0];

/// Tier counts on one track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackCounts {
    pub platinum: usize,
    pub gold: usize,
    pub silver: usize,
    pub standard: usize,
}

impl TrackCounts {
    fn record(&mut self, tier: Tier) {
        match tier {
            Tier::PlatinumAbsolute | Tier::PlatinumCategory => self.platinum += 1,
            Tier::GoldAbsolute | Tier::GoldCategory => self.gold += 1,
            Tier::SilverAbsolute | Tier::SilverCategory => self.silver += 1,
            Tier::Standard => self.standard += 1,
        }
    }
}

/// How the core (non-STANDARD) SKUs perform in the recent window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CorePerformance {
    pub total_core_skus: usize,
    pub core_velocity_sum: f64,
    pub avg_core_conversion: Option<f64>,
    pub avg_core_buyers: Option<f64>,
}

/// Share of a track's ranked SKUs inside each top band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TopBands {
    /// SKUs with a percentile on this track.
    pub ranked: usize,
    pub top_5_percent: usize,
    pub top_15_percent: usize,
    pub top_30_percent: usize,
}

impl TopBands {
    fn from_percentiles(percentiles: impl Iterator<Item = f64>) -> Self {
        let mut bands = Self::default();
        for p in percentiles.filter(|p| !p.is_nan()) {
            bands.ranked += 1;
            let [top_5, top_15, top_30] = TOP_BANDS;
            if p >= top_5 {
                bands.top_5_percent += 1;
            }
            if p >= top_15 {
                bands.top_15_percent += 1;
            }
            if p >= top_30 {
                bands.top_30_percent += 1;
            }
        }
        bands
    }
}

/// Aggregate view of one scored batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub total_skus: usize,
    /// Distinct non-empty group categories.
    pub categories: usize,
    pub absolute_track: TrackCounts,
    pub category_track: TrackCounts,
    /// Every tier, zero counts included.
    pub final_classification: BTreeMap<Tier, usize>,
    /// Core SKUs per group category.
    pub category_representation: BTreeMap<String, usize>,
    pub performance: CorePerformance,
    pub mean_absolute_score: Option<f64>,
    pub mean_category_score: Option<f64>,
    pub absolute_top_bands: TopBands,
    pub category_top_bands: TopBands,
}

/// Build the report for a set of results.
pub fn summarize(results: &[SkuResult]) -> SummaryReport {
    let mut absolute_track = TrackCounts::default();
    let mut category_track = TrackCounts::default();
    let mut final_classification: BTreeMap<Tier, usize> = Tier::ALL.into_iter().map(|t| (t, 0)).collect();
    let mut category_representation: BTreeMap<String, usize> = BTreeMap::new();
    let mut categories: BTreeSet<&str> = BTreeSet::new();

    for result in results {
        absolute_track.record(result.absolute_classification);
        category_track.record(result.category_classification);
        *final_classification.entry(result.final_classification).or_insert(0) += 1;
        if let Some(category) = &result.group_category {
            categories.insert(category.as_str());
            if result.final_classification.is_core() {
                *category_representation.entry(category.clone()).or_insert(0) += 1;
            }
        }
    }

    let core: Vec<&SkuResult> = results
        .iter()
        .filter(|r| r.final_classification.is_core())
        .collect();
    let performance = CorePerformance {
        total_core_skus: core.len(),
        core_velocity_sum: core
            .iter()
            .map(|r| r.metrics.recent.sales_velocity)
            .filter(|v| !v.is_nan())
            .sum(),
        avg_core_conversion: nan_mean(core.iter().map(|r| r.metrics.recent.conversion_days)),
        avg_core_buyers: nan_mean(core.iter().map(|r| r.metrics.recent.net_delivered_buyers)),
    };

    SummaryReport {
        total_skus: results.len(),
        categories: categories.len(),
        absolute_track,
        category_track,
        final_classification,
        category_representation,
        performance,
        mean_absolute_score: nan_mean(results.iter().map(|r| r.absolute_core_score)),
        mean_category_score: nan_mean(results.iter().map(|r| r.category_core_score)),
        absolute_top_bands: TopBands::from_percentiles(results.iter().map(|r| r.absolute_percentile)),
        category_top_bands: TopBands::from_percentiles(results.iter().map(|r| r.category_percentile)),
    }
}

fn nan_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

impl SummaryReport {
    /// Core SKUs as a percentage of the batch.
    pub fn core_share(&self) -> f64 {
        if self.total_skus == 0 {
            return 0.0;
        }
        100.0 * self.performance.total_core_skus as f64 / self.total_skus as f64
    }

    /// Format as plain text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        let optional = |value: Option<f64>| value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}", v));

        output.push_str("┌─────────────────────────────────────┐\n");
        output.push_str("│ BATCH                               │\n");
        output.push_str(&format!("│ - SKUs: {}\n", self.total_skus));
        output.push_str(&format!("│ - Group categories: {}\n", self.categories));
        output.push_str(&format!(
            "│ - Core SKUs: {} ({:.1}%)\n",
            self.performance.total_core_skus,
            self.core_share()
        ));
        output.push_str(&format!("│ - Mean absolute score: {}\n", optional(self.mean_absolute_score)));
        output.push_str(&format!("│ - Mean category score: {}\n", optional(self.mean_category_score)));

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ TRACKS                              │\n");
        for (track, counts, bands) in [
            (Track::Absolute, &self.absolute_track, &self.absolute_top_bands),
            (Track::Category, &self.category_track, &self.category_top_bands),
        ] {
            output.push_str(&format!(
                "│ - {}: platinum {}, gold {}, silver {}, standard {}\n",
                track.as_str(),
                counts.platinum,
                counts.gold,
                counts.silver,
                counts.standard
            ));
            output.push_str(&format!(
                "│     ranked {}: top 5% {}, top 15% {}, top 30% {}\n",
                bands.ranked, bands.top_5_percent, bands.top_15_percent, bands.top_30_percent
            ));
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ FINAL CLASSIFICATION                │\n");
        for (tier, count) in &self.final_classification {
            output.push_str(&format!("│ - {}: {}\n", tier, count));
        }

        if !self.category_representation.is_empty() {
            output.push_str("├─────────────────────────────────────┤\n");
            output.push_str("│ CORE SKUS PER CATEGORY              │\n");
            for (category, count) in &self.category_representation {
                output.push_str(&format!("│ - {}: {}\n", category, count));
            }
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ CORE PERFORMANCE (recent window)    │\n");
        output.push_str(&format!(
            "│ - Velocity sum: {:.2}\n",
            self.performance.core_velocity_sum
        ));
        output.push_str(&format!(
            "│ - Mean conversion: {}\n",
            self.performance
                .avg_core_conversion
                .map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v))
        ));
        output.push_str(&format!(
            "│ - Mean buyers: {}\n",
            optional(self.performance.avg_core_buyers)
        ));

        output.push_str("└─────────────────────────────────────┘\n");

        output
    }
}

// =============================================================================
// TESTS
// =============================================================================
