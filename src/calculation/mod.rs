//! Calculation logic for the contribution engine.
//!
//! This module contains assessment base resolution, contribution
//! evaluation, cent rounding, the breakdown of a gross salary against a
//! catalog, and the [`PayrollCalculator`] that commits breakdowns to the
//! ledger.

mod assessment_base;
mod breakdown;
mod contribution;
mod payroll;
mod rounding;

pub use assessment_base::{ResolvedBase, check_base_within_ceiling, resolve_assessment_base};
pub use breakdown::{MAX_GROSS_SALARY, calculate_breakdown, validate_gross_salary};
pub use contribution::{ContributionEvaluation, evaluate_contribution};
pub use payroll::{MAX_RECOMPUTE_ATTEMPTS, PayrollCalculator, PeriodBatch};
pub use rounding::{CENT_SCALE, round_to_cents};
