//! # Inventory Strategy
//!
//! Stocking policy attached to each tier.

use crate::tier::Tier;
use serde::Serialize;

/// Replenishment policy for SKUs of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventoryStrategy {
    pub safety_stock_days: u32,
    pub reorder_point_days: u32,
    /// Longest tolerated stockout. 0 means never out of stock.
    pub max_stockout_hours: u32,
    pub priority: &'static str,
    pub investment_allocation: &'static str,
}

impl InventoryStrategy {
    pub const fn for_tier(tier: Tier) -> Self {
        let (safety_stock_days, reorder_point_days, max_stockout_hours, priority, investment_allocation) =
            match tier {
                Tier::PlatinumAbsolute => (20, 10, 0, "CRITICAL", "MAXIMUM"),
                Tier::GoldAbsolute => (15, 7, 24, "HIGH", "HIGH"),
                Tier::PlatinumCategory => (12, 6, 48, "HIGH", "MODERATE-HIGH"),
                Tier::SilverAbsolute => (10, 5, 72, "MEDIUM", "MODERATE"),
                Tier::GoldCategory => (8, 4, 96, "MEDIUM", "MODERATE"),
                Tier::SilverCategory => (5, 3, 120, "LOW-MEDIUM", "LOW-MODERATE"),
                Tier::Standard => (3, 2, 168, "LOW", "MINIMAL"),
            };
        Self {
            safety_stock_days,
            reorder_point_days,
            max_stockout_hours,
            priority,
            investment_allocation,
        }
    }
}
