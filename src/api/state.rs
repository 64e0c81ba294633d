//! Application state for the contribution engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::ledger::{InMemoryLedger, PayrollLedger};

/// Shared application state.
///
/// Holds the loaded contribution catalogs and the payroll ledger every
/// handler reads from and writes to.
#[derive(Clone)]
pub struct AppState {
    /// The loaded contribution catalogs.
    config: Arc<ConfigLoader>,
    /// Storage for payroll records and line items.
    ledger: Arc<dyn PayrollLedger>,
}

impl AppState {
    /// Creates application state backed by an empty in-memory ledger.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_ledger(config, Arc::new(InMemoryLedger::new()))
    }

    /// Creates application state over an existing ledger.
    pub fn with_ledger(config: ConfigLoader, ledger: Arc<dyn PayrollLedger>) -> Self {
        Self {
            config: Arc::new(config),
            ledger,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a reference to the payroll ledger.
    pub fn ledger(&self) -> &dyn PayrollLedger {
        self.ledger.as_ref()
    }

    pub(crate) fn shared_config(&self) -> Arc<ConfigLoader> {
        Arc::clone(&self.config)
    }

    pub(crate) fn shared_ledger(&self) -> Arc<dyn PayrollLedger> {
        Arc::clone(&self.ledger)
    }
}
