//! Slidereel Common Utilities
//!
//! Shared infrastructure for all Slidereel crates:
//! - Configuration loading (tool paths, engine defaults, logging settings)
//! - Tracing/logging initialization

pub mod config;
pub mod logging;

pub use config::*;
