//! # Component Scorer
//!
//! Five sub-scores per SKU, each in [0, 100] or NaN.
//!
//! | Component    | Weight | Population relative |
//! |--------------|--------|---------------------|
//! | Velocity     | 30%    | yes (percentile)    |
//! | Conversion   | 25%    | no                  |
//! | Availability | 20%    | lifetime part       |
//! | Penetration  | 15%    | yes (percentile)    |
//! | Momentum     | 10%    | no                  |
//!
//! A **population** is the set of SKUs a score is relative to: the whole
//! batch for the absolute track, one group category for the category track.
//!
//! NaN is never turned into 0. A component with no usable input stays NaN so
//! it can be told apart from a genuine zero downstream.
//!
//! ## Recent/lifetime blend
//!
//! Velocity, Conversion, Availability and Penetration each combine a recent
//! and a lifetime signal:
//!
//! - recent active days `>= sparse_recent_days`: `0.7 · recent + 0.3 · lifetime`
//! - otherwise (sparse recent data): `0.3 · recent + 0.7 · lifetime`
//! - one side NaN: the other side alone
//! - both NaN: NaN

use crate::config::ScoringConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::metrics::SkuMetrics;
use crate::rank::percentile_ranks;
use serde::Serialize;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Recent-window weight of the blend when recent data is dense.
pub const RECENT_WEIGHT: f64 = 0.7;

/// Recent-window weight of the blend when recent data is sparse.
pub const SPARSE_RECENT_WEIGHT: f64 = 0.3;

/// Share of the velocity score taken from the population percentile; the rest
/// comes from the absolute saturation curve.
pub const VELOCITY_PERCENTILE_SHARE: f64 = 0.7;

/// Velocity (lots/day) at which the saturation curve reaches 50.
pub const VELOCITY_HALF_SATURATION: f64 = 0.5;

/// Score range bounds.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

// =============================================================================
// COMPONENT
// =============================================================================

/// One of the five scored components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Velocity,
    Conversion,
    Availability,
    Penetration,
    Momentum,
}

impl Component {
    /// All components in weight order.
    pub const ALL: [Component; 5] = [
        Component::Velocity,
        Component::Conversion,
        Component::Availability,
        Component::Penetration,
        Component::Momentum,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Component::Velocity => "velocity",
            Component::Conversion => "conversion",
            Component::Availability => "availability",
            Component::Penetration => "penetration",
            Component::Momentum => "momentum",
        }
    }

    /// Weight in the composite score. The five weights sum to 1.
    pub const fn weight(self) -> f64 {
        match self {
            Component::Velocity => 0.30,
            Component::Conversion => 0.25,
            Component::Availability => 0.20,
            Component::Penetration => 0.15,
            Component::Momentum => 0.10,
        }
    }

    /// Output column carrying the absolute-track value of this component.
    pub const fn output_column(self) -> &'static str {
        match self {
            Component::Velocity => "velocity_score",
            Component::Conversion => "conversion_score",
            Component::Availability => "availability_score",
            Component::Penetration => "penetration_score",
            Component::Momentum => "momentum_score",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Component::Velocity => "Velocity Score",
            Component::Conversion => "Conversion Score",
            Component::Availability => "Availability Score",
            Component::Penetration => "Penetration Score",
            Component::Momentum => "Momentum Score",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Component::Velocity => "How fast the SKU sells while it is available",
            Component::Conversion => "How consistently the SKU sells on the days it is available",
            Component::Availability => "How much of each window the SKU was actually available",
            Component::Penetration => "How many distinct buyers the SKU reaches, relative to its peers",
            Component::Momentum => "Whether the SKU is selling faster or slower than its lifetime pace",
        }
    }

    pub const fn formula(self) -> &'static str {
        match self {
            Component::Velocity => {
                "Velocity Score = 0.7 × Percentile(blended velocity) + 0.3 × 100·v/(v + 0.5); \
                 blended velocity = 0.7 × recent + 0.3 × lifetime (0.3/0.7 when recent active days < 14)"
            }
            Component::Conversion => {
                "Conversion Score = 100 × blended conversion rate; \
                 conversion rate = lots sold days / active days"
            }
            Component::Availability => {
                "Availability Score = 100 × blend(recent active days / 90, \
                 lifetime active days / population max lifetime active days)"
            }
            Component::Penetration => {
                "Penetration Score = blend(Percentile(recent buyers), Percentile(lifetime buyers))"
            }
            Component::Momentum => {
                "Momentum Score = 100 × r / (1 + r); r = recent velocity / lifetime velocity"
            }
        }
    }

    pub const fn columns_used(self) -> &'static [&'static str] {
        match self {
            Component::Velocity => &[
                "last3_months_sales_velocity",
                "lifetime_sales_velocity",
                "last3_months_lots_sold",
                "lifetime_lots_sold",
                "last3_months_active_days",
                "lifetime_active_days",
            ],
            Component::Conversion => &[
                "last3_months_conversion_days",
                "lifetime_conversion_days",
                "last3_months_lots_sold_days",
                "lifetime_lots_sold_days",
                "last3_months_active_days",
                "lifetime_active_days",
            ],
            Component::Availability => &["last3_months_active_days", "lifetime_active_days"],
            Component::Penetration => &[
                "last3_months_net_delivered_buyers",
                "lifetime_net_delivered_buyers",
                "last3_months_active_days",
            ],
            Component::Momentum => &[
                "last3_months_sales_velocity",
                "lifetime_sales_velocity",
                "last3_months_lots_sold",
                "lifetime_lots_sold",
                "last3_months_active_days",
                "lifetime_active_days",
            ],
        }
    }

    pub const fn interpretation(self) -> &'static str {
        match self {
            Component::Velocity => "Higher score = faster-moving product",
            Component::Conversion => "Higher score = sells on more of its available days",
            Component::Availability => "Higher score = rarely out of stock or delisted",
            Component::Penetration => "Higher score = wider customer reach than its peers",
            Component::Momentum => {
                "50 = steady pace; above 50 = accelerating; below 50 = declining"
            }
        }
    }
}

// =============================================================================
// COMPONENT SCORES
// =============================================================================

/// The five component scores of one SKU on one track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentScores {
    pub velocity: f64,
    pub conversion: f64,
    pub availability: f64,
    pub penetration: f64,
    pub momentum: f64,
}

impl ComponentScores {
    /// Every component NaN (SKU not scored on this track).
    pub const MISSING: Self = Self {
        velocity: f64::NAN,
        conversion: f64::NAN,
        availability: f64::NAN,
        penetration: f64::NAN,
        momentum: f64::NAN,
    };

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Velocity => self.velocity,
            Component::Conversion => self.conversion,
            Component::Availability => self.availability,
            Component::Penetration => self.penetration,
            Component::Momentum => self.momentum,
        }
    }

    /// `(component, score)` pairs in weight order.
    pub fn iter(&self) -> impl Iterator<Item = (Component, f64)> + '_ {
        Component::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

impl Default for ComponentScores {
    fn default() -> Self {
        Self::MISSING
    }
}

// =============================================================================
// BUILDING BLOCKS
// =============================================================================

/// Recent/lifetime blend with NaN fallback. See the module docs.
pub fn blend(recent: f64, lifetime: f64, recent_active_days: f64, config: &ScoringConfig) -> f64 {
    match (recent.is_nan(), lifetime.is_nan()) {
        (true, true) => f64::NAN,
        (false, true) => recent,
        (true, false) => lifetime,
        (false, false) => {
            // NaN active days count as sparse
            let weight = if recent_active_days >= config.sparse_recent_days {
                RECENT_WEIGHT
            } else {
                SPARSE_RECENT_WEIGHT
            };
            weight * recent + (1.0 - weight) * lifetime
        }
    }
}

/// Saturating map of a velocity onto [0, 100).
pub fn velocity_saturation(velocity: f64) -> f64 {
    if velocity.is_nan() {
        return f64::NAN;
    }
    MAX_SCORE * (velocity / (velocity + VELOCITY_HALF_SATURATION))
}

/// Momentum of recent versus lifetime pace, 50 at parity.
pub fn momentum(recent_velocity: f64, lifetime_velocity: f64) -> f64 {
    if recent_velocity.is_nan() || lifetime_velocity.is_nan() {
        return f64::NAN;
    }
    if lifetime_velocity == 0.0 {
        return if recent_velocity == 0.0 { 50.0 } else { MAX_SCORE };
    }
    let ratio = recent_velocity / lifetime_velocity;
    if ratio.is_infinite() {
        return MAX_SCORE;
    }
    MAX_SCORE * (ratio / (1.0 + ratio))
}

/// Clamp a raw score into [0, 100], recording a diagnostic when it moved.
pub fn clamp_score(raw: f64, row: usize, field: &str, diagnostics: &mut Diagnostics) -> f64 {
    if raw.is_nan() {
        return raw;
    }
    let clamped = raw.clamp(MIN_SCORE, MAX_SCORE);
    if clamped != raw {
        diagnostics.push(row, field, DiagnosticKind::Clamped { raw, clamped });
    }
    clamped
}

/// Coverage ratio clamped into [0, 1]; an overflow is recorded against `field`.
fn coverage(active_days: f64, window_days: f64, row: usize, field: &str, diagnostics: &mut Diagnostics) -> f64 {
    let ratio = crate::metrics::safe_ratio(active_days, window_days);
    if ratio.is_nan() {
        return ratio;
    }
    clamp_score(ratio * MAX_SCORE, row, field, diagnostics) / MAX_SCORE
}

// =============================================================================
// POPULATION SCORING
// =============================================================================

/// Score every member of a population.
///
/// `members` are row indexes into `metrics`; the result is aligned with
/// `members`. Percentiles and the lifetime availability denominator are taken
/// over the members only. Clamping findings are recorded against the member's
/// row index.
pub fn score_population(
    metrics: &[SkuMetrics],
    members: &[usize],
    config: &ScoringConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<ComponentScores> {
    let sku = |i: usize| &metrics[members[i]];
    let recent_days = |i: usize| sku(i).recent.active_days;

    // --- Velocity ---
    let velocities: Vec<f64> = (0..members.len())
        .map(|i| {
            blend(
                sku(i).recent.sales_velocity,
                sku(i).lifetime.sales_velocity,
                recent_days(i),
                config,
            )
        })
        .collect();
    let velocity_percentiles = percentile_ranks(&velocities);

    // --- Penetration ---
    let recent_buyers: Vec<f64> = (0..members.len())
        .map(|i| sku(i).recent.net_delivered_buyers)
        .collect();
    let lifetime_buyers: Vec<f64> = (0..members.len())
        .map(|i| sku(i).lifetime.net_delivered_buyers)
        .collect();
    let recent_buyer_percentiles = percentile_ranks(&recent_buyers);
    let lifetime_buyer_percentiles = percentile_ranks(&lifetime_buyers);

    // --- Availability denominator ---
    let max_lifetime_days = (0..members.len())
        .map(|i| sku(i).lifetime.active_days)
        .filter(|d| !d.is_nan())
        .fold(f64::NAN, f64::max);

    (0..members.len())
        .map(|i| {
            let row = members[i];
            let m = sku(i);

            let velocity = if velocities[i].is_nan() {
                f64::NAN
            } else {
                VELOCITY_PERCENTILE_SHARE * velocity_percentiles[i]
                    + (1.0 - VELOCITY_PERCENTILE_SHARE) * velocity_saturation(velocities[i])
            };

            let conversion = blend(
                m.recent.conversion_days,
                m.lifetime.conversion_days,
                recent_days(i),
                config,
            ) * MAX_SCORE;

            let availability_field = Component::Availability.output_column();
            let recent_coverage = coverage(
                m.recent.active_days,
                config.recent_window_days,
                row,
                availability_field,
                diagnostics,
            );
            let lifetime_coverage = coverage(
                m.lifetime.active_days,
                max_lifetime_days,
                row,
                availability_field,
                diagnostics,
            );
            let availability =
                blend(recent_coverage, lifetime_coverage, recent_days(i), config) * MAX_SCORE;

            let penetration = blend(
                recent_buyer_percentiles[i],
                lifetime_buyer_percentiles[i],
                recent_days(i),
                config,
            );

            let momentum = momentum(m.recent.sales_velocity, m.lifetime.sales_velocity);

            let mut clamp = |raw: f64, component: Component| {
                clamp_score(raw, row, component.output_column(), diagnostics)
            };
            ComponentScores {
                velocity: clamp(velocity, Component::Velocity),
                conversion: clamp(conversion, Component::Conversion),
                availability: clamp(availability, Component::Availability),
                penetration: clamp(penetration, Component::Penetration),
                momentum: clamp(momentum, Component::Momentum),
            }
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
