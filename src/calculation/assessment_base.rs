//! Assessment base resolution.
//!
//! The assessment base is the slice of gross salary a contribution rate is
//! applied to. It is obtained in two stages:
//!
//! 1. the [`AssessmentKind`] reduces the gross (full, or abated to 98.25%)
//! 2. the [`BaseLimit`] caps the result at a ceiling and/or keeps only the
//!    part above a bracket floor
//!
//! The resolved base is never negative and is not rounded.

use rust_decimal::Decimal;

use crate::models::{AssessmentKind, AuditWarning, BaseLimit, ContributionRule};

/// The assessment base of one rule for one gross salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBase {
    /// The gross salary after the assessment kind's reduction.
    pub reduced_gross: Decimal,
    /// The final assessment base.
    pub base: Decimal,
    /// Whether the ceiling limited the base.
    pub ceiling_applied: bool,
    /// Whether a bracket floor was subtracted.
    pub floor_applied: bool,
}

/// Resolves the assessment base of `rule` for a gross salary.
///
/// | limit        | base                                   |
/// |--------------|----------------------------------------|
/// | uncapped     | `reduced`                              |
/// | capped       | `min(reduced, ceiling)`                |
/// | above floor  | `max(reduced - floor, 0)`              |
/// | bracketed    | `max(min(reduced, ceiling) - floor, 0)`|
///
/// where `reduced` is the gross after the rule's [`AssessmentKind`].
///
/// # Examples
///
/// ```
/// use contribution_engine::calculation::resolve_assessment_base;
/// use contribution_engine::models::ContributionRule;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
///
/// let csg = ContributionRule::employee("csg_deductible", "CSG déductible", "6.80")
///     .unwrap()
///     .abated_9825();
/// assert_eq!(resolve_assessment_base(dec("5000.00"), &csg).base, dec("4912.50"));
///
/// let t2 = ContributionRule::employee("retraite_t2", "Retraite T2", "8.64")
///     .unwrap()
///     .with_bracket(dec("4005.00"), dec("32040.00"))
///     .unwrap();
/// assert_eq!(resolve_assessment_base(dec("5000.00"), &t2).base, dec("995.00"));
/// assert_eq!(resolve_assessment_base(dec("3000.00"), &t2).base, Decimal::ZERO);
/// ```
pub fn resolve_assessment_base(gross_salary: Decimal, rule: &ContributionRule) -> ResolvedBase {
    let reduced_gross = reduce(gross_salary, &rule.kind);

    let (base, ceiling_applied, floor_applied) = match rule.limit {
        BaseLimit::Uncapped => (reduced_gross, false, false),
        BaseLimit::Capped { ceiling } => {
            let capped = reduced_gross.min(ceiling);
            (capped, reduced_gross > ceiling, false)
        }
        BaseLimit::AboveFloor { floor } => {
            let above = (reduced_gross - floor).max(Decimal::ZERO);
            (above, false, true)
        }
        BaseLimit::Bracketed { floor, ceiling } => {
            let capped = reduced_gross.min(ceiling);
            let slice = (capped - floor).max(Decimal::ZERO);
            (slice, reduced_gross > ceiling, true)
        }
    };

    ResolvedBase {
        reduced_gross,
        base,
        ceiling_applied,
        floor_applied,
    }
}

fn reduce(gross_salary: Decimal, kind: &AssessmentKind) -> Decimal {
    // Negative gross is rejected upstream; clamp so the base stays non-negative.
    kind.apply(gross_salary).max(Decimal::ZERO)
}

/// Flags a resolved base that lies above the rule's ceiling.
///
/// Resolution caps every base, so this only fires if the rule's limit and
/// the resolved base disagree.
pub fn check_base_within_ceiling(
    rule: &ContributionRule,
    resolved: &ResolvedBase,
) -> Option<AuditWarning> {
    let ceiling = rule.limit.ceiling()?;
    if resolved.base > ceiling {
        Some(AuditWarning::base_exceeds_ceiling(
            &rule.id,
            resolved.base,
            ceiling,
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn uncapped() -> ContributionRule {
        ContributionRule::employee("vieillesse_deplafonnee", "Vieillesse déplafonnée", "0.40")
            .unwrap()
    }

    fn capped() -> ContributionRule {
        ContributionRule::employee("vieillesse_plafonnee", "Vieillesse plafonnée", "6.90")
            .unwrap()
            .with_ceiling(dec("4005.00"))
            .unwrap()
    }

    fn bracketed() -> ContributionRule {
        ContributionRule::employee("retraite_complementaire_t2", "Retraite T2", "8.64")
            .unwrap()
            .with_bracket(dec("4005.00"), dec("32040.00"))
            .unwrap()
    }

    #[test]
    fn test_uncapped_base_is_gross() {
        let resolved = resolve_assessment_base(dec("3000.00"), &uncapped());
        assert_eq!(resolved.base, dec("3000.00"));
        assert!(!resolved.ceiling_applied);
        assert!(!resolved.floor_applied);
    }

    #[test]
    fn test_abated_base() {
        let rule = uncapped().abated_9825();
        let resolved = resolve_assessment_base(dec("5000.00"), &rule);
        assert_eq!(resolved.reduced_gross, dec("4912.50"));
        assert_eq!(resolved.base, dec("4912.50"));
    }

    #[test]
    fn test_capped_base_below_ceiling() {
        let resolved = resolve_assessment_base(dec("3000.00"), &capped());
        assert_eq!(resolved.base, dec("3000.00"));
        assert!(!resolved.ceiling_applied);
    }

    #[test]
    fn test_capped_base_above_ceiling() {
        let resolved = resolve_assessment_base(dec("5000.00"), &capped());
        assert_eq!(resolved.base, dec("4005.00"));
        assert!(resolved.ceiling_applied);
    }

    #[test]
    fn test_capped_base_exactly_at_ceiling() {
        let resolved = resolve_assessment_base(dec("4005.00"), &capped());
        assert_eq!(resolved.base, dec("4005.00"));
        assert!(!resolved.ceiling_applied);
    }

    #[test]
    fn test_bracket_inside() {
        let resolved = resolve_assessment_base(dec("5000.00"), &bracketed());
        assert_eq!(resolved.base, dec("995.00"));
        assert!(resolved.floor_applied);
        assert!(!resolved.ceiling_applied);
    }

    #[test]
    fn test_bracket_below_floor_is_zero() {
        let resolved = resolve_assessment_base(dec("3000.00"), &bracketed());
        assert_eq!(resolved.base, Decimal::ZERO);
    }

    #[test]
    fn test_bracket_at_floor_is_zero() {
        let resolved = resolve_assessment_base(dec("4005.00"), &bracketed());
        assert_eq!(resolved.base, Decimal::ZERO);
    }

    #[test]
    fn test_bracket_above_ceiling_is_full_width() {
        let resolved = resolve_assessment_base(dec("50000.00"), &bracketed());
        assert_eq!(resolved.base, dec("28035.00"));
        assert!(resolved.ceiling_applied);
    }

    #[test]
    fn test_above_floor_without_ceiling() {
        let rule = uncapped().above_floor(dec("4005.00")).unwrap();
        assert_eq!(
            resolve_assessment_base(dec("10000.00"), &rule).base,
            dec("5995.00")
        );
        assert_eq!(
            resolve_assessment_base(dec("1000.00"), &rule).base,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_abatement_applies_before_ceiling() {
        let rule = uncapped()
            .abated_9825()
            .with_ceiling(dec("4000.00"))
            .unwrap();
        // 4050 × 0.9825 = 3979.125, under the ceiling
        let resolved = resolve_assessment_base(dec("4050.00"), &rule);
        assert_eq!(resolved.base, dec("3979.125"));
        assert!(!resolved.ceiling_applied);
    }

    #[test]
    fn test_zero_gross_gives_zero_base() {
        for rule in [uncapped(), capped(), bracketed(), uncapped().abated_9825()] {
            assert_eq!(
                resolve_assessment_base(Decimal::ZERO, &rule).base,
                Decimal::ZERO
            );
        }
    }

    #[test]
    fn test_base_never_exceeds_ceiling() {
        for gross in ["0", "1000", "4005", "4005.01", "32040", "99999.99"] {
            let resolved = resolve_assessment_base(dec(gross), &capped());
            assert!(resolved.base <= dec("4005.00"));
            assert!(check_base_within_ceiling(&capped(), &resolved).is_none());
        }
    }

    #[test]
    fn test_check_flags_inconsistent_base() {
        let resolved = ResolvedBase {
            reduced_gross: dec("5000"),
            base: dec("5000"),
            ceiling_applied: false,
            floor_applied: false,
        };
        let warning = check_base_within_ceiling(&capped(), &resolved).unwrap();
        assert_eq!(warning.code, "BASE_EXCEEDS_CEILING");
    }

    #[test]
    fn test_check_ignores_uncapped_rules() {
        let resolved = resolve_assessment_base(dec("100000"), &uncapped());
        assert!(check_base_within_ceiling(&uncapped(), &resolved).is_none());
    }
}
