//! # Tier Classifier
//!
//! Ordered decision table over both tracks. Rules are evaluated top-down and
//! the first one whose every condition holds assigns the tier; no match means
//! [`Tier::Standard`].
//!
//! Percentile ranks play no part here. The "top N%" wording in tier
//! descriptions frames the score floors for readers; it is not recomputed.
//!
//! NaN fails every comparison, so a NaN score or velocity never satisfies a
//! rule.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// TRACK
// =============================================================================

/// The population a composite score is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// Whole batch (platform-wide).
    Absolute,
    /// SKUs sharing the same group category.
    Category,
}

impl Track {
    pub const fn as_str(self) -> &'static str {
        match self {
            Track::Absolute => "absolute",
            Track::Category => "category",
        }
    }
}

// =============================================================================
// TIER
// =============================================================================

/// Classification tier. Declaration order is rank order, best first, so
/// `a < b` means `a` outranks `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    PlatinumAbsolute,
    GoldAbsolute,
    PlatinumCategory,
    SilverAbsolute,
    GoldCategory,
    SilverCategory,
    Standard,
}

impl Tier {
    /// All tiers, best first.
    pub const ALL: [Tier; 7] = [
        Tier::PlatinumAbsolute,
        Tier::GoldAbsolute,
        Tier::PlatinumCategory,
        Tier::SilverAbsolute,
        Tier::GoldCategory,
        Tier::SilverCategory,
        Tier::Standard,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::PlatinumAbsolute => "PLATINUM_ABSOLUTE",
            Tier::GoldAbsolute => "GOLD_ABSOLUTE",
            Tier::PlatinumCategory => "PLATINUM_CATEGORY",
            Tier::SilverAbsolute => "SILVER_ABSOLUTE",
            Tier::GoldCategory => "GOLD_CATEGORY",
            Tier::SilverCategory => "SILVER_CATEGORY",
            Tier::Standard => "STANDARD",
        }
    }

    /// 1-based rank, 1 = best.
    pub const fn rank(self) -> u8 {
        self as u8 + 1
    }

    /// Track the tier belongs to; `None` for the fallback tier.
    pub const fn track(self) -> Option<Track> {
        match self {
            Tier::PlatinumAbsolute | Tier::GoldAbsolute | Tier::SilverAbsolute => {
                Some(Track::Absolute)
            }
            Tier::PlatinumCategory | Tier::GoldCategory | Tier::SilverCategory => {
                Some(Track::Category)
            }
            Tier::Standard => None,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Tier::PlatinumAbsolute => "Top 5% performers across the entire platform",
            Tier::GoldAbsolute => "Top 15% performers across the entire platform",
            Tier::PlatinumCategory => "Top 5% performers within their category",
            Tier::SilverAbsolute => "Top 30% performers across the entire platform",
            Tier::GoldCategory => "Top 15% performers within their category",
            Tier::SilverCategory => "Top 30% performers within their category",
            Tier::Standard => "Below every core threshold on both tracks",
        }
    }

    pub const fn is_core(self) -> bool {
        !matches!(self, Tier::Standard)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RULES
// =============================================================================

/// What the classifier looks at for one SKU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierInput {
    pub absolute_score: f64,
    pub category_score: f64,
    /// Normalized `last3_months_sales_velocity`.
    pub recent_velocity: f64,
}

impl TierInput {
    pub fn score(&self, track: Track) -> f64 {
        match track {
            Track::Absolute => self.absolute_score,
            Track::Category => self.category_score,
        }
    }
}

/// One row of the decision table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierRule {
    pub tier: Tier,
    pub track: Track,
    /// Inclusive floor on the track's composite score.
    pub score_floor: f64,
    /// Inclusive floor on recent sales velocity, if the rule has one.
    pub min_recent_velocity: Option<f64>,
}

impl TierRule {
    pub fn is_satisfied(&self, input: &TierInput) -> bool {
        let score = input.score(self.track);
        if score.is_nan() || score < self.score_floor {
            return false;
        }
        match self.min_recent_velocity {
            Some(floor) => !input.recent_velocity.is_nan() && input.recent_velocity >= floor,
            None => true,
        }
    }

    /// Human-readable extra condition, e.g. `last3_months_sales_velocity ≥ 1.0`.
    pub fn condition_text(&self) -> Option<String> {
        self.min_recent_velocity
            .map(|floor| format!("last3_months_sales_velocity ≥ {:.1}", floor))
    }
}

/// The decision table, highest tier first.
pub const TIER_RULES: [TierRule; 6] = [
    TierRule {
        tier: Tier::PlatinumAbsolute,
        track: Track::Absolute,
        score_floor: 75.0,
        min_recent_velocity: Some(1.0),
    },
    TierRule {
        tier: Tier::GoldAbsolute,
        track: Track::Absolute,
        score_floor: 60.0,
        min_recent_velocity: Some(0.5),
    },
    TierRule {
        tier: Tier::PlatinumCategory,
        track: Track::Category,
        score_floor: 80.0,
        min_recent_velocity: None,
    },
    TierRule {
        tier: Tier::SilverAbsolute,
        track: Track::Absolute,
        score_floor: 45.0,
        min_recent_velocity: Some(0.2),
    },
    TierRule {
        tier: Tier::GoldCategory,
        track: Track::Category,
        score_floor: 65.0,
        min_recent_velocity: None,
    },
    TierRule {
        tier: Tier::SilverCategory,
        track: Track::Category,
        score_floor: 50.0,
        min_recent_velocity: None,
    },
];

/// The rule that assigns `tier`, if any.
pub fn rule_for(tier: Tier) -> Option<&'static TierRule> {
    TIER_RULES.iter().find(|rule| rule.tier == tier)
}

/// Final tier: first satisfied rule across both tracks.
pub fn classify(input: &TierInput) -> Tier {
    TIER_RULES
        .iter()
        .find(|rule| rule.is_satisfied(input))
        .map_or(Tier::Standard, |rule| rule.tier)
}

/// Best tier reachable on one track alone.
pub fn classify_track(input: &TierInput, track: Track) -> Tier {
    TIER_RULES
        .iter()
        .filter(|rule| rule.track == track)
        .find(|rule| rule.is_satisfied(input))
        .map_or(Tier::Standard, |rule| rule.tier)
}

// =============================================================================
// TESTS
// =============================================================================
