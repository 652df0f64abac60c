//! # Definitions Module
//!
//! Static reflection of the scoring model: what each component measures and
//! what each tier requires.
//!
//! Everything here is derived from the same constants the engine computes
//! with ([`Component`] and [`crate::tier::TIER_RULES`]), so the published tables cannot
//! drift from the numbers. No dataset is needed.

use crate::components::Component;
use crate::composite::composite_formula;
use crate::strategy::InventoryStrategy;
use crate::tier::{Tier, Track, rule_for};
use serde::Serialize;

/// Published definition of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub weight: f64,
    pub description: &'static str,
    pub formula: &'static str,
    pub columns_used: Vec<&'static str>,
    pub interpretation: &'static str,
}

impl From<Component> for ComponentDefinition {
    fn from(component: Component) -> Self {
        Self {
            key: component.key(),
            name: component.name(),
            weight: component.weight(),
            description: component.description(),
            formula: component.formula(),
            columns_used: component.columns_used().to_vec(),
            interpretation: component.interpretation(),
        }
    }
}

/// Published definition of one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierDefinition {
    pub tier: Tier,
    /// 1 = best.
    pub rank: u8,
    pub track: Option<Track>,
    /// `None` for the fallback tier.
    pub score_floor: Option<f64>,
    pub extra_condition: Option<String>,
    pub description: &'static str,
    pub strategy: InventoryStrategy,
}

impl From<Tier> for TierDefinition {
    fn from(tier: Tier) -> Self {
        let rule = rule_for(tier);
        Self {
            tier,
            rank: tier.rank(),
            track: tier.track(),
            score_floor: rule.map(|r| r.score_floor),
            extra_condition: rule.and_then(|r| r.condition_text()),
            description: tier.description(),
            strategy: InventoryStrategy::for_tier(tier),
        }
    }
}

/// Both definitions tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definitions {
    pub components: Vec<ComponentDefinition>,
    pub composite_formula: String,
    pub tiers: Vec<TierDefinition>,
}

/// Component table, in weight order.
pub fn component_definitions() -> Vec<ComponentDefinition> {
    Component::ALL.into_iter().map(ComponentDefinition::from).collect()
}

/// Tier table, best first.
pub fn tier_definitions() -> Vec<TierDefinition> {
    Tier::ALL.into_iter().map(TierDefinition::from).collect()
}

/// Both tables.
pub fn definitions() -> Definitions {
    Definitions {
        components: component_definitions(),
        composite_formula: composite_formula(),
        tiers: tier_definitions(),
    }
}

impl Definitions {
    /// Format as plain text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("┌─────────────────────────────────────┐\n");
        output.push_str("│ SCORING COMPONENTS                  │\n");
        for c in &self.components {
            output.push_str(&format!(
                "│ - {} ({:.0}%): {}\n",
                c.name,
                c.weight * 100.0,
                c.description
            ));
            output.push_str(&format!("│     formula: {}\n", c.formula));
            output.push_str(&format!("│     columns: {}\n", c.columns_used.join(", ")));
            output.push_str(&format!("│     reading: {}\n", c.interpretation));
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ CORE SCORE                          │\n");
        output.push_str(&format!("│ - {}\n", self.composite_formula));

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ TIERS (highest first)               │\n");
        for t in &self.tiers {
            let criteria = match (t.track, t.score_floor) {
                (Some(track), Some(floor)) => {
                    let mut text = format!("{} score ≥ {:.0}", track.as_str(), floor);
                    if let Some(extra) = &t.extra_condition {
                        text.push_str(&format!(", {}", extra));
                    }
                    text
                }
                _ => String::from("none of the above"),
            };
            output.push_str(&format!(
                "│ {}. {} [{}] {}\n",
                t.rank, t.tier, criteria, t.description
            ));
        }

        output.push_str("└─────────────────────────────────────┘\n");

        output
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_table_matches_weights() {
        let table = component_definitions();
        assert_eq!(table.len(), 5);
        assert_eq!(table[0].key, "velocity");
        assert_eq!(table[0].weight, 0.30);
        assert_eq!(table[4].key, "momentum");
        assert!(table.iter().all(|c| !c.columns_used.is_empty()));
    }

    #[test]
    fn tier_table_mirrors_rules() {
        let table = tier_definitions();
        assert_eq!(table.len(), 7);

        let platinum = &table[0];
        assert_eq!(platinum.tier, Tier::PlatinumAbsolute);
        assert_eq!(platinum.score_floor, Some(75.0));
        assert_eq!(
            platinum.extra_condition.as_deref(),
            Some("last3_months_sales_velocity ≥ 1.0")
        );

        let category = &table[2];
        assert_eq!(category.tier, Tier::PlatinumCategory);
        assert_eq!(category.track, Some(Track::Category));
        assert_eq!(category.extra_condition, None);

        let standard = &table[6];
        assert_eq!(standard.tier, Tier::Standard);
        assert_eq!(standard.score_floor, None);
        assert_eq!(standard.track, None);
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(definitions()).unwrap_or_default();
        assert_eq!(json["components"][1]["key"], "conversion");
        assert_eq!(json["tiers"][0]["tier"], "PLATINUM_ABSOLUTE");
        assert_eq!(json["tiers"][0]["strategy"]["safety_stock_days"], 20);
        assert!(json["tiers"][6]["score_floor"].is_null());
    }

    #[test]
    fn text_lists_everything() {
        let text = definitions().to_text();
        assert!(text.contains("SCORING COMPONENTS"));
        assert!(text.contains("Velocity Score (30%)"));
        assert!(text.contains("1. PLATINUM_ABSOLUTE [absolute score ≥ 75, last3_months_sales_velocity ≥ 1.0]"));
        assert!(text.contains("7. STANDARD [none of the above]"));
    }
}
