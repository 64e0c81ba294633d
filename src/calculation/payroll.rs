//! Payroll recomputation.
//!
//! [`PayrollCalculator`] ties the pure breakdown to the ledger: it selects
//! the catalog effective for a record's period, computes the breakdown and
//! commits the new line items and totals as one unit.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::breakdown::{calculate_breakdown, validate_gross_salary};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{PayrollLedger, RecomputeCommit};
use crate::models::{
    ContributionBreakdown, LineItem, PayPeriod, PayrollRecord, PayrollStatus,
    PeriodRecomputeReport, RecomputeOutcome,
};

/// How many times a recompute is attempted when its commit races another.
pub const MAX_RECOMPUTE_ATTEMPTS: u32 = 3;

/// Recomputes payroll records against the configured catalogs.
///
/// # Example
///
/// ```no_run
/// use contribution_engine::calculation::PayrollCalculator;
/// use contribution_engine::config::ConfigLoader;
/// use contribution_engine::ledger::InMemoryLedger;
/// use contribution_engine::models::PayPeriod;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = ConfigLoader::load("./config/urssaf")?;
/// let ledger = InMemoryLedger::new();
/// let calculator = PayrollCalculator::new(&config, &ledger);
///
/// let record = calculator.open_record(
///     "emp_001",
///     PayPeriod::new(2026, 1)?,
///     Decimal::from_str("3000.00").unwrap(),
/// )?;
/// let outcome = calculator.recompute(record.id)?;
/// println!("Net salary: {}", outcome.record.net_salary);
/// # Ok::<(), contribution_engine::error::EngineError>(())
/// ```
pub struct PayrollCalculator<'a, L: PayrollLedger + ?Sized> {
    config: &'a ConfigLoader,
    ledger: &'a L,
}

impl<'a, L: PayrollLedger + ?Sized> PayrollCalculator<'a, L> {
    /// Creates a calculator over a configuration and a ledger.
    pub fn new(config: &'a ConfigLoader, ledger: &'a L) -> Self {
        Self { config, ledger }
    }

    /// Opens a draft record for an employee and period.
    pub fn open_record(
        &self,
        employee_id: &str,
        period: PayPeriod,
        gross_salary: Decimal,
    ) -> EngineResult<PayrollRecord> {
        validate_gross_salary(gross_salary)?;
        let record = PayrollRecord::new(employee_id, period, gross_salary)?;
        self.ledger.open_record(record)
    }

    /// Computes the breakdown of a gross salary without touching the ledger.
    ///
    /// The catalog is the one in force on the first day of the pay period
    /// containing `date`, as for a record opened on that period.
    pub fn simulate(&self, gross_salary: Decimal, date: NaiveDate) -> EngineResult<ContributionBreakdown> {
        let period = PayPeriod::containing(date)?;
        let catalog = self.config.get_catalog(period.first_day())?;
        calculate_breakdown(gross_salary, catalog)
    }

    /// Recomputes a record from its stored gross salary.
    pub fn recompute(&self, record_id: Uuid) -> EngineResult<RecomputeOutcome> {
        self.recompute_inner(record_id, None)
    }

    /// Recomputes a record with a new gross salary.
    ///
    /// The new gross is committed together with the rewritten line items; if
    /// the recompute fails the record keeps its previous gross.
    pub fn recompute_with_gross(
        &self,
        record_id: Uuid,
        gross_salary: Decimal,
    ) -> EngineResult<RecomputeOutcome> {
        self.recompute_inner(record_id, Some(gross_salary))
    }

    fn recompute_inner(
        &self,
        record_id: Uuid,
        gross_override: Option<Decimal>,
    ) -> EngineResult<RecomputeOutcome> {
        if let Some(gross) = gross_override {
            if let Err(err) = validate_gross_salary(gross) {
                warn!(record_id = %record_id, gross_salary = %gross, "Rejected gross salary");
                return Err(err);
            }
        }

        let start = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;

            let record = self.ledger.fetch(record_id)?.record;
            if record.status.is_locked() {
                warn!(record_id = %record_id, status = %record.status, "Recompute rejected on locked record");
                return Err(EngineError::RecordLocked {
                    record_id,
                    status: record.status,
                });
            }

            let gross_salary = gross_override.unwrap_or(record.gross_salary);
            let catalog = self.config.get_catalog(record.period.first_day())?;
            let breakdown = calculate_breakdown(gross_salary, catalog)?;

            let commit = RecomputeCommit {
                record_id,
                expected_revision: record.revision,
                totals: breakdown.totals.clone(),
                catalog_version: breakdown.catalog_version.clone(),
                calculated_at: Utc::now(),
                line_items: breakdown
                    .lines
                    .iter()
                    .cloned()
                    .map(|line| LineItem::bind(record_id, line))
                    .collect(),
            };

            match self.ledger.clear_and_rewrite(commit) {
                Ok(entry) => {
                    let mut audit_trace = breakdown.audit_trace;
                    audit_trace.duration_us = start.elapsed().as_micros() as u64;

                    info!(
                        record_id = %record_id,
                        employee_id = %entry.record.employee_id,
                        period = %entry.record.period,
                        gross_salary = %entry.record.gross_salary,
                        employee_deductions_total = %entry.record.employee_deductions_total,
                        employer_cost_total = %entry.record.employer_cost_total,
                        net_salary = %entry.record.net_salary,
                        catalog = %breakdown.catalog_version,
                        revision = entry.record.revision,
                        attempts,
                        duration_us = audit_trace.duration_us,
                        "Payroll record recomputed"
                    );

                    return Ok(RecomputeOutcome {
                        calculation_id: Uuid::new_v4(),
                        timestamp: Utc::now(),
                        engine_version: env!("CARGO_PKG_VERSION").to_string(),
                        record: entry.record,
                        line_items: entry.line_items,
                        audit_trace,
                        attempts,
                    });
                }
                Err(EngineError::ConcurrentRecompute { .. }) if attempts < MAX_RECOMPUTE_ATTEMPTS => {
                    warn!(record_id = %record_id, attempts, "Stale recompute commit, retrying");
                }
                Err(err) => {
                    warn!(record_id = %record_id, attempts, error = %err, "Recompute commit failed");
                    return Err(err);
                }
            }
        }
    }

    /// Starts a period batch: lists the period's records and files the
    /// locked ones as skipped.
    ///
    /// The caller recomputes each [`PeriodBatch::take_pending`] record, files
    /// the result with [`PeriodBatch::file`] and closes the batch with
    /// [`PeriodBatch::finish`]. [`Self::recompute_period`] does this inline.
    pub fn begin_period(&self, period: PayPeriod) -> EngineResult<PeriodBatch> {
        let records = self.ledger.records_for_period(period)?;
        let mut report = PeriodRecomputeReport::new(period);

        let pending = records
            .into_iter()
            .filter(|record| {
                if record.status.is_locked() {
                    report.skipped_locked.push(record.id);
                    false
                } else {
                    true
                }
            })
            .collect();

        Ok(PeriodBatch { report, pending })
    }

    /// Recomputes every record of a period.
    ///
    /// Locked records are skipped. A failing record is reported and never
    /// stops the others.
    pub fn recompute_period(&self, period: PayPeriod) -> EngineResult<PeriodRecomputeReport> {
        let mut batch = self.begin_period(period)?;
        for record in batch.take_pending() {
            let result = self.recompute(record.id);
            batch.file(&record, result);
        }
        Ok(batch.finish())
    }

    /// Validates a calculated record, locking its contributions.
    pub fn validate(&self, record_id: Uuid) -> EngineResult<PayrollRecord> {
        self.ledger.transition(record_id, PayrollStatus::Validated)
    }

    /// Marks a validated record as paid.
    pub fn mark_paid(&self, record_id: Uuid) -> EngineResult<PayrollRecord> {
        self.ledger.transition(record_id, PayrollStatus::Paid)
    }
}

/// A period recompute in progress.
#[derive(Debug)]
pub struct PeriodBatch {
    report: PeriodRecomputeReport,
    pending: Vec<PayrollRecord>,
}

impl PeriodBatch {
    /// The period being recomputed.
    pub fn period(&self) -> PayPeriod {
        self.report.period
    }

    /// Takes the unlocked records still to recompute, in employee order.
    pub fn take_pending(&mut self) -> Vec<PayrollRecord> {
        std::mem::take(&mut self.pending)
    }

    /// Files the result of recomputing one record.
    pub fn file(&mut self, record: &PayrollRecord, result: EngineResult<RecomputeOutcome>) {
        self.report.record_result(record, result);
    }

    /// Closes the batch and returns its report.
    pub fn finish(self) -> PeriodRecomputeReport {
        let report = self.report;
        info!(
            period = %report.period,
            recomputed = report.recomputed.len(),
            skipped_locked = report.skipped_locked.len(),
            failed = report.failed.len(),
            "Period recomputed"
        );
        report
    }
}
