//! Contribution breakdown of a gross salary.
//!
//! Evaluates every active rule of a catalog, employee side first, and
//! aggregates the rounded line amounts into totals. Nothing is persisted;
//! [`crate::calculation::PayrollCalculator`] commits the result.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::assessment_base::check_base_within_ceiling;
use super::contribution::evaluate_contribution;
use super::rounding::round_to_cents;
use crate::config::ContributionCatalog;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, ContributionBreakdown, ContributionLine,
    ContributionSide, ContributionTotals,
};

/// Largest gross salary accepted for a single period.
pub const MAX_GROSS_SALARY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Rejects gross salaries that cannot be evaluated.
///
/// # Errors
///
/// Returns [`EngineError::InvalidGrossSalary`] for a negative gross or one
/// above [`MAX_GROSS_SALARY`].
pub fn validate_gross_salary(gross_salary: Decimal) -> EngineResult<()> {
    if gross_salary < Decimal::ZERO {
        return Err(EngineError::InvalidGrossSalary {
            value: gross_salary,
            message: "must not be negative".to_string(),
        });
    }
    if gross_salary > MAX_GROSS_SALARY {
        return Err(EngineError::InvalidGrossSalary {
            value: gross_salary,
            message: format!("exceeds the supported maximum of {}", MAX_GROSS_SALARY),
        });
    }
    Ok(())
}

/// Computes the full contribution breakdown of a gross salary.
///
/// Lines are numbered from 1 in evaluation order: active employee-side
/// rules in catalog order, then active employer-side rules. Each amount is
/// rounded to cents when its line is produced, and the totals are sums of
/// the rounded amounts, so:
///
/// * `employee_deductions_total == Σ employee line amounts`
/// * `net_salary == gross_salary - employee_deductions_total`
///
/// A negative net salary is not clamped; it is reported as a
/// `NEGATIVE_NET_SALARY` warning.
///
/// # Examples
///
/// ```
/// use contribution_engine::calculation::calculate_breakdown;
/// use contribution_engine::config::ContributionCatalog;
/// use contribution_engine::models::ContributionRule;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let catalog = ContributionCatalog::new(
///     "example",
///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     dec("4005.00"),
///     vec![
///         ContributionRule::employee("vieillesse_plafonnee", "Vieillesse plafonnée", "6.90")
///             .unwrap()
///             .with_ceiling(dec("4005.00"))
///             .unwrap(),
///         ContributionRule::employer("maladie", "Assurance maladie", "13.00").unwrap(),
///     ],
/// )
/// .unwrap();
///
/// let breakdown = calculate_breakdown(dec("9755.00"), &catalog).unwrap();
/// assert_eq!(breakdown.totals.employee_deductions_total, dec("276.35"));
/// assert_eq!(breakdown.totals.net_salary, dec("9478.65"));
/// assert_eq!(breakdown.totals.employer_cost_total, dec("1268.15"));
/// ```
pub fn calculate_breakdown(
    gross_salary: Decimal,
    catalog: &ContributionCatalog,
) -> EngineResult<ContributionBreakdown> {
    validate_gross_salary(gross_salary)?;

    let start = Instant::now();
    let mut steps = Vec::new();
    let mut warnings = Vec::new();
    let mut lines = Vec::new();

    steps.push(catalog_step(catalog, gross_salary));

    let employee_deductions_total = evaluate_side(
        gross_salary,
        catalog,
        ContributionSide::Employee,
        &mut steps,
        &mut warnings,
        &mut lines,
    );
    let net_salary = gross_salary - employee_deductions_total;

    if net_salary < Decimal::ZERO {
        warn!(
            gross_salary = %gross_salary,
            employee_deductions_total = %employee_deductions_total,
            net_salary = %net_salary,
            catalog = catalog.version(),
            "Employee deductions exceed gross salary"
        );
        warnings.push(AuditWarning::negative_net_salary(
            gross_salary,
            employee_deductions_total,
            net_salary,
        ));
    }

    let employer_cost_total = evaluate_side(
        gross_salary,
        catalog,
        ContributionSide::Employer,
        &mut steps,
        &mut warnings,
        &mut lines,
    );

    let step_number = next_step(&steps);
    steps.push(AuditStep {
        step_number,
        rule_id: "totals".to_string(),
        rule_name: "Totals".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "line_count": lines.len(),
        }),
        output: serde_json::json!({
            "employee_deductions_total": employee_deductions_total.to_string(),
            "employer_cost_total": employer_cost_total.to_string(),
            "net_salary": net_salary.to_string(),
        }),
        reasoning: format!(
            "{} - {} = {} net; employer contributions {}",
            gross_salary, employee_deductions_total, net_salary, employer_cost_total
        ),
    });

    let duration_us = start.elapsed().as_micros() as u64;

    Ok(ContributionBreakdown {
        catalog_version: catalog.version().to_string(),
        catalog_effective_date: catalog.effective_date(),
        totals: ContributionTotals {
            gross_salary,
            employee_deductions_total,
            employer_cost_total,
            net_salary,
        },
        lines,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    })
}

/// Evaluates the active rules of one side and returns their rounded total.
fn evaluate_side(
    gross_salary: Decimal,
    catalog: &ContributionCatalog,
    side: ContributionSide,
    steps: &mut Vec<AuditStep>,
    warnings: &mut Vec<AuditWarning>,
    lines: &mut Vec<ContributionLine>,
) -> Decimal {
    let mut total = Decimal::ZERO;

    for rule in catalog.active_rules(side) {
        let evaluation = evaluate_contribution(gross_salary, rule, next_step(steps));

        if let Some(warning) = check_base_within_ceiling(rule, &evaluation.resolved) {
            warn!(rule_id = %rule.id, base = %evaluation.resolved.base, "Assessment base exceeds ceiling");
            warnings.push(warning);
        }

        let amount = round_to_cents(evaluation.amount);
        let sequence = lines.len() as u32 + 1;
        debug!(
            rule_id = %rule.id,
            side = side.label(),
            base = %evaluation.resolved.base,
            amount = %amount,
            "Evaluated contribution"
        );

        total += amount;
        lines.push(ContributionLine::for_rule(
            sequence,
            rule,
            evaluation.resolved.base,
            amount,
        ));
        steps.push(evaluation.audit_step);
    }

    total
}

fn next_step(steps: &[AuditStep]) -> u32 {
    steps.len() as u32 + 1
}

fn catalog_step(catalog: &ContributionCatalog, gross_salary: Decimal) -> AuditStep {
    let employee_rules = catalog.active_rules(ContributionSide::Employee).count();
    let employer_rules = catalog.active_rules(ContributionSide::Employer).count();
    let inactive_rules = catalog.rules().len() - employee_rules - employer_rules;

    AuditStep {
        step_number: 1,
        rule_id: "catalog_selection".to_string(),
        rule_name: "Catalog Selection".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
        }),
        output: serde_json::json!({
            "version": catalog.version(),
            "effective_date": catalog.effective_date().to_string(),
            "social_security_ceiling": catalog.social_security_ceiling().to_string(),
            "employee_rules": employee_rules,
            "employer_rules": employer_rules,
            "inactive_rules": inactive_rules,
        }),
        reasoning: format!(
            "Catalog {} effective {}: {} employee and {} employer rules active, {} inactive",
            catalog.version(),
            catalog.effective_date(),
            employee_rules,
            employer_rules,
            inactive_rules
        ),
    }
}
