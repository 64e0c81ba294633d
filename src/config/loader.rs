//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading contribution
//! catalogs from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

use super::catalog::ContributionCatalog;
use super::types::{CatalogConfig, ScheduleMetadata};

/// Loads and provides access to contribution catalogs.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// selects the catalog effective on a given date.
///
/// # Directory Structure
///
/// ```text
/// config/urssaf/
/// ├── schedule.yaml        # Schedule metadata
/// └── catalogs/
///     ├── 2025-01-01.yaml  # Catalog effective from this date
///     └── 2026-01-01.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use contribution_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/urssaf").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// let catalog = loader.get_catalog(date).unwrap();
/// println!("Catalog {} has {} rules", catalog.version(), catalog.rules().len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    metadata: ScheduleMetadata,
    /// Sorted oldest first.
    catalogs: Vec<ContributionCatalog>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/urssaf")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any rule or catalog is inconsistent
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let schedule_path = path.join("schedule.yaml");
        let metadata = Self::load_yaml::<ScheduleMetadata>(&schedule_path)?;

        let catalogs_dir = path.join("catalogs");
        let catalogs = Self::load_catalogs(&catalogs_dir)?;

        let loader = Self::from_parts(metadata, catalogs)?;

        info!(
            schedule = %loader.metadata.code,
            catalogs = loader.catalogs.len(),
            "Loaded contribution configuration"
        );

        Ok(loader)
    }

    /// Builds a loader from already validated catalogs.
    ///
    /// Returns [`EngineError::InvalidCatalog`] if no catalog is given or two
    /// catalogs share an effective date.
    pub fn from_parts(
        metadata: ScheduleMetadata,
        catalogs: Vec<ContributionCatalog>,
    ) -> EngineResult<Self> {
        let mut catalogs = catalogs;
        catalogs.sort_by_key(|catalog| catalog.effective_date());

        if catalogs.is_empty() {
            return Err(EngineError::InvalidCatalog {
                version: metadata.code.clone(),
                message: "no contribution catalog configured".to_string(),
            });
        }

        if let Some(pair) = catalogs
            .windows(2)
            .find(|pair| pair[0].effective_date() == pair[1].effective_date())
        {
            return Err(EngineError::InvalidCatalog {
                version: pair[1].version().to_string(),
                message: format!(
                    "effective date {} is already used by catalog '{}'",
                    pair[1].effective_date(),
                    pair[0].version()
                ),
            });
        }

        Ok(Self { metadata, catalogs })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all catalog files from the catalogs directory.
    fn load_catalogs(catalogs_dir: &Path) -> EngineResult<Vec<ContributionCatalog>> {
        let catalogs_dir_str = catalogs_dir.display().to_string();

        if !catalogs_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: catalogs_dir_str,
            });
        }

        let entries = fs::read_dir(catalogs_dir).map_err(|_| EngineError::ConfigNotFound {
            path: catalogs_dir_str.clone(),
        })?;

        let mut catalogs = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: catalogs_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let config = Self::load_yaml::<CatalogConfig>(&path)?;
                let catalog = ContributionCatalog::from_config(config)?;
                debug!(
                    version = catalog.version(),
                    effective_date = %catalog.effective_date(),
                    rules = catalog.rules().len(),
                    "Loaded contribution catalog"
                );
                catalogs.push(catalog);
            }
        }

        if catalogs.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no catalog files found)", catalogs_dir_str),
            });
        }

        Ok(catalogs)
    }

    /// Returns the schedule metadata.
    pub fn metadata(&self) -> &ScheduleMetadata {
        &self.metadata
    }

    /// Returns every catalog, oldest first.
    pub fn catalogs(&self) -> &[ContributionCatalog] {
        &self.catalogs
    }

    /// Gets the catalog effective on a given date.
    ///
    /// The most recent catalog whose effective date is on or before `date`
    /// is returned.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use contribution_engine::config::ConfigLoader;
    /// use chrono::NaiveDate;
    ///
    /// let loader = ConfigLoader::load("./config/urssaf")?;
    /// let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    /// let catalog = loader.get_catalog(date)?;
    /// println!("PMSS: {}", catalog.social_security_ceiling());
    /// # Ok::<(), contribution_engine::error::EngineError>(())
    /// ```
    pub fn get_catalog(&self, date: NaiveDate) -> EngineResult<&ContributionCatalog> {
        self.catalogs
            .iter()
            .rev()
            .find(|catalog| catalog.effective_date() <= date)
            .ok_or(EngineError::CatalogNotFound { date })
    }
}
