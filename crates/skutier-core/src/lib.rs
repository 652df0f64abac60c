//! # Skutier Core
//!
//! Deterministic scoring and tier classification for SKU batches.
//!
//! Every SKU is scored twice from the same five components: once against the
//! whole batch (the **absolute** track) and once against the SKUs sharing its
//! group category (the **category** track). An ordered rule table over both
//! scores assigns one of seven tiers.
//!
//! ```
//! use skutier_core::{Dataset, Engine, Tier};
//!
//! let dataset = Dataset::from_cells(
//!     &[
//!         "variant_id",
//!         "lifetime_lots_sold",
//!         "lifetime_active_days",
//!         "last3_months_lots_sold",
//!         "last3_months_active_days",
//!         "last3_months_net_delivered_buyers",
//!         "lifetime_net_delivered_buyers",
//!     ],
//!     &[vec!["V-1", "900", "300", "180", "90", "120", "400"]],
//! );
//!
//! let scored = Engine::default().run(&dataset)?;
//! let result = &scored.results()[0];
//! assert!(result.absolute_core_score <= 100.0);
//! assert_eq!(result.final_classification, Tier::PlatinumAbsolute);
//! # Ok::<(), skutier_core::EngineError>(())
//! ```
//!
//! The crate does no I/O: datasets are values passed in and returned.

pub mod components;
pub mod composite;
pub mod config;
pub mod dataset;
pub mod definitions;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod rank;
pub mod strategy;
pub mod summary;
pub mod tier;

pub use components::{Component, ComponentScores};
pub use config::ScoringConfig;
pub use dataset::{Dataset, REQUIRED_COLUMNS};
pub use definitions::{ComponentDefinition, Definitions, TierDefinition, definitions};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use engine::{APPENDED_COLUMNS, Engine, ScoredDataset, SkuResult};
pub use error::{DuplicateVariant, EngineError, RaggedRow};
pub use metrics::{SkuMetrics, Window, WindowMetrics};
pub use strategy::InventoryStrategy;
pub use summary::SummaryReport;
pub use tier::{TIER_RULES, Tier, TierRule, Track};
