//! Statutory payroll contribution engine
//!
//! This crate computes French social-security contributions (URSSAF, Agirc-Arrco,
//! France Travail) for monthly payroll records. Contribution rates, ceilings and
//! brackets come from dated YAML catalogs; each recompute rewrites a record's
//! line items and totals as one atomic ledger commit, with a full audit trace.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
