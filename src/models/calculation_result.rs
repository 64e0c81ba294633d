//! Calculation result models for the contribution engine.
//!
//! This module contains the outputs of a contribution calculation: the
//! [`ContributionBreakdown`] of a gross salary, the [`RecomputeOutcome`] of a
//! committed recompute, and the audit trace shared by both.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContributionLine, LineItem, PayPeriod, PayrollRecord, RuleId};
use crate::error::{EngineError, EngineResult, ErrorKind};

/// Warning code raised when employee deductions exceed gross salary.
pub const WARNING_NEGATIVE_NET_SALARY: &str = "NEGATIVE_NET_SALARY";

/// Warning code raised when a resolved base lies above its rule's ceiling.
pub const WARNING_BASE_EXCEEDS_CEILING: &str = "BASE_EXCEEDS_CEILING";

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the rule (or engine stage) that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag results that are arithmetically correct but suspicious.
/// They never block a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
    /// The rule concerned, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,
}

impl AuditWarning {
    /// Employee deductions exceed the gross salary.
    pub fn negative_net_salary(gross: Decimal, deductions: Decimal, net: Decimal) -> Self {
        Self {
            code: WARNING_NEGATIVE_NET_SALARY.to_string(),
            message: format!(
                "Employee deductions {} exceed gross salary {}; net salary is {}",
                deductions, gross, net
            ),
            severity: "high".to_string(),
            rule_id: None,
        }
    }

    /// A resolved base is above the rule's ceiling.
    pub fn base_exceeds_ceiling(rule_id: &RuleId, base: Decimal, ceiling: Decimal) -> Self {
        Self {
            code: WARNING_BASE_EXCEEDS_CEILING.to_string(),
            message: format!(
                "Assessment base {} for '{}' exceeds its ceiling {}",
                base, rule_id, ceiling
            ),
            severity: "medium".to_string(),
            rule_id: Some(rule_id.clone()),
        }
    }
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use contribution_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// assert!(!trace.has_warning("NEGATIVE_NET_SALARY"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns `true` if a warning with `code` was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// Aggregated totals of a contribution calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionTotals {
    /// The gross salary evaluated.
    pub gross_salary: Decimal,
    /// Sum of employee-side line amounts.
    pub employee_deductions_total: Decimal,
    /// Sum of employer-side line amounts.
    pub employer_cost_total: Decimal,
    /// Gross salary minus employee deductions.
    pub net_salary: Decimal,
}

/// The full breakdown of a gross salary against one catalog.
///
/// This is the pure result of a calculation; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionBreakdown {
    /// Version label of the catalog used.
    pub catalog_version: String,
    /// Effective date of the catalog used.
    pub catalog_effective_date: NaiveDate,
    /// Aggregated totals.
    pub totals: ContributionTotals,
    /// One line per active rule, employee side first.
    pub lines: Vec<ContributionLine>,
    /// Audit trace of the calculation.
    pub audit_trace: AuditTrace,
}

impl ContributionBreakdown {
    /// Sum of line amounts on the employer or employee side.
    pub fn side_total(&self, employer_side: bool) -> Decimal {
        self.lines
            .iter()
            .filter(|line| line.side.is_employer() == employer_side)
            .map(|line| line.amount)
            .sum()
    }
}

/// The result of a committed recompute.
///
/// # Example
///
/// ```
/// use contribution_engine::models::{AuditTrace, PayPeriod, PayrollRecord, RecomputeOutcome};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let record = PayrollRecord::new("emp_001", PayPeriod::new(2026, 1).unwrap(), Decimal::ZERO).unwrap();
/// let outcome = RecomputeOutcome {
///     calculation_id: Uuid::new_v4(),
///     timestamp: Utc::now(),
///     engine_version: "0.1.0".to_string(),
///     record,
///     line_items: vec![],
///     audit_trace: AuditTrace::default(),
///     attempts: 1,
/// };
/// assert_eq!(outcome.attempts, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecomputeOutcome {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The record as committed.
    pub record: PayrollRecord,
    /// The record's line items as committed.
    pub line_items: Vec<LineItem>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
    /// How many attempts the commit took.
    pub attempts: u32,
}

/// A record that could not be recomputed during a period batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecomputeFailure {
    /// The record that failed.
    pub record_id: Uuid,
    /// The employee it belongs to.
    pub employee_id: String,
    /// Broad error classification.
    pub kind: ErrorKind,
    /// The error message.
    pub error: String,
}

/// Outcome of recomputing every record of a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRecomputeReport {
    /// The period recomputed.
    pub period: PayPeriod,
    /// Records recomputed successfully.
    pub recomputed: Vec<RecomputeOutcome>,
    /// Records skipped because they are validated or paid.
    pub skipped_locked: Vec<Uuid>,
    /// Records that failed for any other reason.
    pub failed: Vec<RecomputeFailure>,
}

impl PeriodRecomputeReport {
    /// Creates an empty report for a period.
    pub fn new(period: PayPeriod) -> Self {
        Self {
            period,
            recomputed: Vec::new(),
            skipped_locked: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Files the result of recomputing one record.
    ///
    /// A record locked between listing and commit counts as skipped.
    pub fn record_result(&mut self, record: &PayrollRecord, result: EngineResult<RecomputeOutcome>) {
        match result {
            Ok(outcome) => self.recomputed.push(outcome),
            Err(EngineError::RecordLocked { record_id, .. }) => self.skipped_locked.push(record_id),
            Err(err) => self.failed.push(RecomputeFailure {
                record_id: record.id,
                employee_id: record.employee_id.clone(),
                kind: err.kind(),
                error: err.to_string(),
            }),
        }
    }
}
