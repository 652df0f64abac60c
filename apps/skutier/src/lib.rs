//! # Skutier Library
//!
//! This library exposes the Skutier modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod error;

pub use error::{Error, Result};

// Re-export skutier_core for convenience
pub use skutier_core;
