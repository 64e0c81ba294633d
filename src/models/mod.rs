//! Core data models for the contribution engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod contribution_rule;
mod line_item;
mod pay_period;
mod payroll_record;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, ContributionBreakdown, ContributionTotals,
    PeriodRecomputeReport, RecomputeFailure, RecomputeOutcome, WARNING_BASE_EXCEEDS_CEILING,
    WARNING_NEGATIVE_NET_SALARY,
};
pub use contribution_rule::{
    ABATEMENT_FACTOR_9825, AssessmentKind, BaseLimit, Collector, ContributionRule,
    ContributionSide, MAX_RATE_PERCENT, RuleId,
};
pub use line_item::{ContributionLine, LineItem};
pub use pay_period::{MAX_PERIOD_YEAR, MIN_PERIOD_YEAR, PayPeriod};
pub use payroll_record::{PayrollRecord, PayrollStatus};
