//! Contribution evaluation.
//!
//! Evaluates one [`ContributionRule`] against a gross salary: resolves the
//! assessment base and applies the rate. The amount is returned at full
//! precision; rounding happens when the line is produced.

use rust_decimal::Decimal;

use super::assessment_base::{ResolvedBase, resolve_assessment_base};
use super::rounding::round_to_cents;
use crate::models::{AssessmentKind, AuditStep, ContributionRule};

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// The result of evaluating a contribution, including the audit step.
#[derive(Debug, Clone)]
pub struct ContributionEvaluation {
    /// The resolved assessment base.
    pub resolved: ResolvedBase,
    /// `base × rate / 100`, unrounded.
    pub amount: Decimal,
    /// The audit step recording this evaluation.
    pub audit_step: AuditStep,
}

/// Evaluates a contribution rule for a gross salary.
///
/// Evaluation is pure and does not look at `is_active`; callers decide
/// which rules to evaluate.
///
/// # Arguments
///
/// * `gross_salary` - The gross salary for the period
/// * `rule` - The rule to evaluate
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use contribution_engine::calculation::evaluate_contribution;
/// use contribution_engine::models::ContributionRule;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rule = ContributionRule::employee("vieillesse_plafonnee", "Vieillesse plafonnée (T1)", "6.90")
///     .unwrap()
///     .with_ceiling(Decimal::from_str("4005.00").unwrap())
///     .unwrap();
///
/// let evaluation = evaluate_contribution(Decimal::from_str("5000.00").unwrap(), &rule, 1);
/// assert_eq!(evaluation.resolved.base, Decimal::from_str("4005.00").unwrap());
/// assert_eq!(evaluation.amount, Decimal::from_str("276.345").unwrap());
/// ```
pub fn evaluate_contribution(
    gross_salary: Decimal,
    rule: &ContributionRule,
    step_number: u32,
) -> ContributionEvaluation {
    let resolved = resolve_assessment_base(gross_salary, rule);
    let amount = resolved.base * rule.rate_percent / ONE_HUNDRED;
    let rounded = round_to_cents(amount);

    let mut input = serde_json::json!({
        "gross_salary": gross_salary.normalize().to_string(),
        "rate_percent": rule.rate_percent.normalize().to_string(),
        "side": rule.side.label(),
        "assessment": rule.kind.label(),
        "limit": rule.limit.label(),
    });
    if let AssessmentKind::Abated { factor } = rule.kind {
        input["abatement_factor"] = serde_json::json!(factor.normalize().to_string());
    }
    if let Some(floor) = rule.limit.floor() {
        input["floor"] = serde_json::json!(floor.normalize().to_string());
    }
    if let Some(ceiling) = rule.limit.ceiling() {
        input["ceiling"] = serde_json::json!(ceiling.normalize().to_string());
    }

    let reasoning = describe(rule, &resolved, amount, rounded);

    let audit_step = AuditStep {
        step_number,
        rule_id: rule.id.to_string(),
        rule_name: rule.name.clone(),
        input,
        output: serde_json::json!({
            "reduced_gross": resolved.reduced_gross.normalize().to_string(),
            "base": resolved.base.normalize().to_string(),
            "ceiling_applied": resolved.ceiling_applied,
            "floor_applied": resolved.floor_applied,
            "amount": amount.normalize().to_string(),
            "amount_rounded": rounded.to_string(),
        }),
        reasoning,
    };

    ContributionEvaluation {
        resolved,
        amount,
        audit_step,
    }
}

fn describe(
    rule: &ContributionRule,
    resolved: &ResolvedBase,
    amount: Decimal,
    rounded: Decimal,
) -> String {
    let mut base_description = format!("base {}", resolved.base.normalize());
    if let Some(ceiling) = rule.limit.ceiling() {
        if resolved.ceiling_applied {
            base_description.push_str(&format!(" (capped at {})", ceiling.normalize()));
        }
    }
    if let Some(floor) = rule.limit.floor() {
        base_description.push_str(&format!(" (above floor {})", floor.normalize()));
    }

    format!(
        "{} x {}% = {} -> {}",
        base_description,
        rule.rate_percent.normalize(),
        amount.normalize(),
        rounded
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_capped_rule_above_ceiling() {
        let rule = ContributionRule::employee("vieillesse_plafonnee", "Vieillesse plafonnée", "6.90")
            .unwrap()
            .with_ceiling(dec("4005.00"))
            .unwrap();

        let evaluation = evaluate_contribution(dec("5000.00"), &rule, 1);

        assert_eq!(evaluation.resolved.base, dec("4005.00"));
        assert_eq!(evaluation.amount, dec("276.345"));
        assert_eq!(evaluation.audit_step.output["amount_rounded"], "276.35");
        assert_eq!(evaluation.audit_step.output["ceiling_applied"], true);
    }

    #[test]
    fn test_abated_rule() {
        let rule = ContributionRule::employee("csg_deductible", "CSG déductible", "6.80")
            .unwrap()
            .abated_9825();

        let evaluation = evaluate_contribution(dec("5000.00"), &rule, 1);

        assert_eq!(evaluation.resolved.base, dec("4912.50"));
        assert_eq!(evaluation.amount, dec("334.05"));
        assert_eq!(evaluation.audit_step.input["abatement_factor"], "0.9825");
    }

    #[test]
    fn test_bracketed_rule() {
        let rule = ContributionRule::employee("retraite_t2", "Retraite T2", "8.64")
            .unwrap()
            .with_bracket(dec("4005.00"), dec("32040.00"))
            .unwrap();

        let evaluation = evaluate_contribution(dec("5000.00"), &rule, 1);

        assert_eq!(evaluation.resolved.base, dec("995.00"));
        assert_eq!(evaluation.amount, dec("85.968"));
        assert_eq!(evaluation.audit_step.output["amount_rounded"], "85.97");
    }

    #[test]
    fn test_uncapped_rule() {
        let rule = ContributionRule::employee("vieillesse", "Vieillesse", "6.90").unwrap();
        let evaluation = evaluate_contribution(dec("3000.00"), &rule, 1);
        assert_eq!(evaluation.amount, dec("207.00"));
    }

    #[test]
    fn test_zero_rate_gives_zero_amount() {
        let rule = ContributionRule::employee("zero", "Zero", "0").unwrap();
        let evaluation = evaluate_contribution(dec("3000.00"), &rule, 1);
        assert_eq!(evaluation.amount, Decimal::ZERO);
    }

    #[test]
    fn test_zero_gross_gives_zero_amount() {
        let rule = ContributionRule::employee("vieillesse", "Vieillesse", "6.90").unwrap();
        let evaluation = evaluate_contribution(Decimal::ZERO, &rule, 1);
        assert_eq!(evaluation.amount, Decimal::ZERO);
    }

    #[test]
    fn test_evaluation_ignores_active_flag() {
        let rule = ContributionRule::employee("mutuelle", "Mutuelle", "2.50")
            .unwrap()
            .inactive();
        let evaluation = evaluate_contribution(dec("1000.00"), &rule, 1);
        assert_eq!(evaluation.amount, dec("25.00"));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let rule = ContributionRule::employee("crds", "CRDS", "0.50")
            .unwrap()
            .abated_9825();
        let first = evaluate_contribution(dec("2718.28"), &rule, 4);
        let second = evaluate_contribution(dec("2718.28"), &rule, 4);
        assert_eq!(first.amount, second.amount);
        assert_eq!(first.audit_step, second.audit_step);
    }

    #[test]
    fn test_audit_step_records_rule() {
        let rule = ContributionRule::employer("maladie", "Assurance maladie", "13.00").unwrap();
        let evaluation = evaluate_contribution(dec("3000.00"), &rule, 9);

        let step = &evaluation.audit_step;
        assert_eq!(step.step_number, 9);
        assert_eq!(step.rule_id, "maladie");
        assert_eq!(step.rule_name, "Assurance maladie");
        assert_eq!(step.input["side"], "employer");
        assert_eq!(step.input["limit"], "uncapped");
        assert!(step.reasoning.contains("13%"));
    }
}
