//! Request types for the contribution engine API.
//!
//! This module defines the JSON request bodies accepted by the payroll and
//! simulation endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::PayPeriod;

/// Request body for `POST /simulate`.
///
/// Computes a breakdown without persisting anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// The monthly gross salary.
    pub gross_salary: Decimal,
    /// Date used to select the catalog. Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Request body for `POST /payrolls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayrollRequest {
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The pay period, formatted `YYYY-MM`.
    pub period: PayPeriod,
    /// The monthly gross salary.
    pub gross_salary: Decimal,
}

/// Request body for `POST /payrolls/:id/recompute`.
///
/// An empty body recomputes from the stored gross salary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecomputeRequest {
    /// Replacement gross salary.
    #[serde(default)]
    pub gross_salary: Option<Decimal>,
}
