//! Configuration loading and management for the contribution engine.
//!
//! This module provides functionality to load contribution catalogs from
//! YAML files. Rates, ceilings and brackets live in configuration, one
//! catalog per effective date.
//!
//! # Example
//!
//! ```no_run
//! use contribution_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/urssaf").unwrap();
//! println!("Loaded schedule: {}", config.metadata().name);
//! ```

mod catalog;
mod loader;
mod types;

pub use catalog::ContributionCatalog;
pub use loader::ConfigLoader;
pub use types::{AssessmentConfig, CatalogConfig, ContributionConfig, ScheduleMetadata};
