//! Payroll record models.
//!
//! A [`PayrollRecord`] holds one employee's gross salary for one pay period
//! together with the totals derived from its line items. Records move
//! through the [`PayrollStatus`] workflow; validated and paid records are
//! locked against recomputation.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayPeriod;
use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a payroll record.
///
/// ```text
/// draft -> calculated -> validated -> paid
///            ^     |
///            +-----+  (recompute)
/// ```
///
/// # Example
///
/// ```
/// use contribution_engine::models::PayrollStatus;
///
/// assert!(PayrollStatus::Calculated.can_transition_to(PayrollStatus::Validated));
/// assert!(!PayrollStatus::Draft.can_transition_to(PayrollStatus::Paid));
/// assert!(PayrollStatus::Validated.is_locked());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Created, never calculated.
    #[default]
    Draft,
    /// Line items and totals are current.
    Calculated,
    /// Approved; contributions are frozen.
    Validated,
    /// Salary has been paid out.
    Paid,
}

impl PayrollStatus {
    /// Returns `true` when the record can no longer be recomputed.
    pub fn is_locked(self) -> bool {
        matches!(self, PayrollStatus::Validated | PayrollStatus::Paid)
    }

    /// Returns `true` if the workflow allows moving from `self` to `next`.
    ///
    /// Recomputing moves a draft or calculated record to calculated.
    /// Validation requires a calculated record, payment a validated one.
    pub fn can_transition_to(self, next: PayrollStatus) -> bool {
        matches!(
            (self, next),
            (PayrollStatus::Draft, PayrollStatus::Calculated)
                | (PayrollStatus::Calculated, PayrollStatus::Calculated)
                | (PayrollStatus::Calculated, PayrollStatus::Validated)
                | (PayrollStatus::Validated, PayrollStatus::Paid)
        )
    }

    /// Returns the snake_case label.
    pub fn as_str(self) -> &'static str {
        match self {
            PayrollStatus::Draft => "draft",
            PayrollStatus::Calculated => "calculated",
            PayrollStatus::Validated => "validated",
            PayrollStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One employee's payroll for one period.
///
/// The totals are derived from the record's line items and are only ever
/// written together with them:
///
/// * `employee_deductions_total` is the sum of employee-side line amounts
/// * `employer_cost_total` is the sum of employer-side line amounts
/// * `net_salary = gross_salary - employee_deductions_total`
///
/// # Example
///
/// ```
/// use contribution_engine::models::{PayPeriod, PayrollRecord, PayrollStatus};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let record = PayrollRecord::new(
///     "emp_001",
///     PayPeriod::new(2026, 1).unwrap(),
///     Decimal::from_str("3000.00").unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(record.status, PayrollStatus::Draft);
/// assert_eq!(record.net_salary, record.gross_salary);
/// assert_eq!(record.revision, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The employee this record belongs to.
    pub employee_id: String,
    /// The month covered.
    pub period: PayPeriod,
    /// Gross salary for the period.
    pub gross_salary: Decimal,
    /// Sum of employee-side line items.
    pub employee_deductions_total: Decimal,
    /// Sum of employer-side line items.
    pub employer_cost_total: Decimal,
    /// Gross salary minus employee deductions. May be negative.
    pub net_salary: Decimal,
    /// Workflow status.
    pub status: PayrollStatus,
    /// Incremented on every committed recompute.
    pub revision: u64,
    /// Version of the catalog used by the last recompute.
    pub catalog_version: Option<String>,
    /// When the last recompute was committed.
    pub calculated_at: Option<DateTime<Utc>>,
    /// When the record was validated.
    pub validated_at: Option<DateTime<Utc>>,
    /// When the record was marked paid.
    pub paid_at: Option<DateTime<Utc>>,
}

impl PayrollRecord {
    /// Creates a draft record with no line items.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidGrossSalary`] for a negative gross and
    /// [`EngineError::InvalidEmployee`] for an empty employee identifier.
    pub fn new(employee_id: &str, period: PayPeriod, gross_salary: Decimal) -> EngineResult<Self> {
        if employee_id.trim().is_empty() {
            return Err(EngineError::InvalidEmployee {
                employee_id: employee_id.to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if gross_salary < Decimal::ZERO {
            return Err(EngineError::InvalidGrossSalary {
                value: gross_salary,
                message: "must not be negative".to_string(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.to_string(),
            period,
            gross_salary,
            employee_deductions_total: Decimal::ZERO,
            employer_cost_total: Decimal::ZERO,
            net_salary: gross_salary,
            status: PayrollStatus::Draft,
            revision: 0,
            catalog_version: None,
            calculated_at: None,
            validated_at: None,
            paid_at: None,
        })
    }

    /// Total cost to the employer (gross plus employer contributions).
    pub fn total_employer_cost(&self) -> Decimal {
        self.gross_salary + self.employer_cost_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn period() -> PayPeriod {
        PayPeriod::new(2026, 1).unwrap()
    }

    #[test]
    fn test_new_record_is_draft() {
        let record = PayrollRecord::new("emp_001", period(), dec("3000.00")).unwrap();
        assert_eq!(record.status, PayrollStatus::Draft);
        assert_eq!(record.employee_deductions_total, Decimal::ZERO);
        assert_eq!(record.employer_cost_total, Decimal::ZERO);
        assert_eq!(record.net_salary, dec("3000.00"));
        assert!(record.calculated_at.is_none());
    }

    #[test]
    fn test_new_record_rejects_negative_gross() {
        let result = PayrollRecord::new("emp_001", period(), dec("-0.01"));
        assert!(matches!(
            result,
            Err(EngineError::InvalidGrossSalary { .. })
        ));
    }

    #[test]
    fn test_new_record_rejects_blank_employee() {
        assert!(matches!(
            PayrollRecord::new(" ", period(), dec("100")),
            Err(EngineError::InvalidEmployee { .. })
        ));
    }

    #[test]
    fn test_zero_gross_is_allowed() {
        let record = PayrollRecord::new("emp_001", period(), Decimal::ZERO).unwrap();
        assert_eq!(record.net_salary, Decimal::ZERO);
    }

    #[test]
    fn test_status_transitions() {
        use PayrollStatus::*;

        assert!(Draft.can_transition_to(Calculated));
        assert!(Calculated.can_transition_to(Calculated));
        assert!(Calculated.can_transition_to(Validated));
        assert!(Validated.can_transition_to(Paid));

        assert!(!Draft.can_transition_to(Validated));
        assert!(!Draft.can_transition_to(Paid));
        assert!(!Validated.can_transition_to(Calculated));
        assert!(!Paid.can_transition_to(Calculated));
        assert!(!Paid.can_transition_to(Validated));
        assert!(!Calculated.can_transition_to(Draft));
    }

    #[test]
    fn test_locked_statuses() {
        assert!(!PayrollStatus::Draft.is_locked());
        assert!(!PayrollStatus::Calculated.is_locked());
        assert!(PayrollStatus::Validated.is_locked());
        assert!(PayrollStatus::Paid.is_locked());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&PayrollStatus::Calculated).unwrap();
        assert_eq!(json, "\"calculated\"");

        let status: PayrollStatus = serde_json::from_str("\"validated\"").unwrap();
        assert_eq!(status, PayrollStatus::Validated);
    }

    #[test]
    fn test_total_employer_cost() {
        let mut record = PayrollRecord::new("emp_001", period(), dec("3000.00")).unwrap();
        record.employer_cost_total = dec("1234.56");
        assert_eq!(record.total_employer_cost(), dec("4234.56"));
    }

    #[test]
    fn test_record_serialization() {
        let record = PayrollRecord::new("emp_001", period(), dec("3000.00")).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["period"], "2026-01");
        assert_eq!(json["gross_salary"], "3000.00");
        assert_eq!(json["status"], "draft");
    }
}
