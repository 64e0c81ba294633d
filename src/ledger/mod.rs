//! Payroll ledger: storage of payroll records and their line items.
//!
//! The ledger is the only place records and line items change. Totals and
//! line items are written together by [`PayrollLedger::clear_and_rewrite`],
//! which replaces all of a record's items in one atomic unit; there is no
//! API for partial updates.

mod memory;

pub use memory::InMemoryLedger;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{ContributionTotals, LineItem, PayPeriod, PayrollRecord, PayrollStatus};

/// A record together with its current line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// The payroll record.
    pub record: PayrollRecord,
    /// Its line items, in sequence order.
    pub line_items: Vec<LineItem>,
}

impl LedgerEntry {
    /// Sum of employee-side line amounts.
    pub fn employee_lines_total(&self) -> Decimal {
        self.side_total(false)
    }

    /// Sum of employer-side line amounts.
    pub fn employer_lines_total(&self) -> Decimal {
        self.side_total(true)
    }

    fn side_total(&self, employer_side: bool) -> Decimal {
        self.line_items
            .iter()
            .filter(|item| item.is_employer_side() == employer_side)
            .map(|item| item.amount)
            .sum()
    }
}

/// A full replacement of a record's line items and totals.
#[derive(Debug, Clone)]
pub struct RecomputeCommit {
    /// The record being rewritten.
    pub record_id: Uuid,
    /// The revision observed when the recompute started.
    pub expected_revision: u64,
    /// Totals derived from `line_items`, including the gross they were computed from.
    pub totals: ContributionTotals,
    /// Version of the catalog that produced the items.
    pub catalog_version: String,
    /// When the calculation ran.
    pub calculated_at: DateTime<Utc>,
    /// The complete new set of line items.
    pub line_items: Vec<LineItem>,
}

impl RecomputeCommit {
    /// Checks that the items belong to the record and sum exactly to the totals.
    pub fn check_consistency(&self) -> EngineResult<()> {
        let inconsistent = |message: String| EngineError::CalculationError { message };

        if let Some(item) = self
            .line_items
            .iter()
            .find(|item| item.record_id != self.record_id)
        {
            return Err(inconsistent(format!(
                "line item '{}' belongs to record {}, not {}",
                item.rule_id, item.record_id, self.record_id
            )));
        }

        let employee: Decimal = self
            .line_items
            .iter()
            .filter(|item| !item.is_employer_side())
            .map(|item| item.amount)
            .sum();
        let employer: Decimal = self
            .line_items
            .iter()
            .filter(|item| item.is_employer_side())
            .map(|item| item.amount)
            .sum();

        let totals = &self.totals;
        if employee != totals.employee_deductions_total {
            return Err(inconsistent(format!(
                "employee line items sum to {} but the deduction total is {}",
                employee, totals.employee_deductions_total
            )));
        }
        if employer != totals.employer_cost_total {
            return Err(inconsistent(format!(
                "employer line items sum to {} but the employer cost total is {}",
                employer, totals.employer_cost_total
            )));
        }
        if totals.gross_salary - totals.employee_deductions_total != totals.net_salary {
            return Err(inconsistent(format!(
                "net salary {} does not equal gross {} minus deductions {}",
                totals.net_salary, totals.gross_salary, totals.employee_deductions_total
            )));
        }

        Ok(())
    }
}

/// Storage abstraction for payroll records and their line items.
pub trait PayrollLedger: Send + Sync {
    /// Stores a new record. At most one record exists per employee and period.
    fn open_record(&self, record: PayrollRecord) -> EngineResult<PayrollRecord>;

    /// Returns a record and its line items.
    fn fetch(&self, record_id: Uuid) -> EngineResult<LedgerEntry>;

    /// Returns every record of a period, ordered by employee id.
    fn records_for_period(&self, period: PayPeriod) -> EngineResult<Vec<PayrollRecord>>;

    /// Atomically replaces a record's line items, totals and gross salary.
    ///
    /// The commit is rejected with [`EngineError::ConcurrentRecompute`] if the
    /// record's revision moved since `expected_revision`, and with
    /// [`EngineError::RecordLocked`] once the record is validated or paid.
    /// On success the record is `calculated` and its revision is bumped.
    fn clear_and_rewrite(&self, commit: RecomputeCommit) -> EngineResult<LedgerEntry>;

    /// Moves a record to `validated` or `paid`.
    fn transition(&self, record_id: Uuid, to: PayrollStatus) -> EngineResult<PayrollRecord>;
}
