//! Configuration types for contribution catalogs.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. They are converted into
//! validated domain types before use.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{AssessmentKind, BaseLimit, Collector, ContributionRule, ContributionSide, RuleId};

/// Metadata about the contribution schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleMetadata {
    /// Short code for the schedule (e.g., "URSSAF").
    pub code: String,
    /// The human-readable name of the schedule.
    pub name: String,
    /// The jurisdiction the rates apply to (e.g., "FR").
    pub jurisdiction: String,
    /// URL to the official rate documentation.
    pub source_url: String,
}

/// How a contribution's base is derived from gross salary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum AssessmentConfig {
    /// The full gross salary.
    #[default]
    #[serde(rename = "full")]
    Full,
    /// Gross salary × 0.9825.
    #[serde(rename = "abated_9825")]
    Abated9825,
}

/// One contribution entry in a catalog file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContributionConfig {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Rate in percent.
    pub rate_percent: Decimal,
    /// Assessment base kind.
    #[serde(default)]
    pub assessment: AssessmentConfig,
    /// Ceiling as an amount.
    #[serde(default)]
    pub ceiling: Option<Decimal>,
    /// Ceiling as a multiple of the social-security ceiling.
    #[serde(default)]
    pub ceiling_pmss: Option<Decimal>,
    /// Bracket floor as an amount.
    #[serde(default)]
    pub bracket_floor: Option<Decimal>,
    /// Bracket floor as a multiple of the social-security ceiling.
    #[serde(default)]
    pub bracket_floor_pmss: Option<Decimal>,
    /// Whether the employer pays.
    #[serde(default)]
    pub employer_side: bool,
    /// Inactive contributions are skipped.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Collecting body.
    #[serde(default)]
    pub collector: Collector,
    /// Whether the contribution reduces taxable income.
    #[serde(default)]
    pub tax_deductible: bool,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

fn default_active() -> bool {
    true
}

impl ContributionConfig {
    /// Converts the entry into a validated rule.
    ///
    /// `social_security_ceiling` resolves the `*_pmss` multiples.
    pub fn into_rule(self, social_security_ceiling: Decimal) -> EngineResult<ContributionRule> {
        let id = RuleId::new(self.id)?;

        let ceiling = resolve_amount(
            &id,
            "ceiling",
            self.ceiling,
            self.ceiling_pmss,
            social_security_ceiling,
        )?;
        let floor = resolve_amount(
            &id,
            "bracket_floor",
            self.bracket_floor,
            self.bracket_floor_pmss,
            social_security_ceiling,
        )?;

        let rule = ContributionRule {
            limit: BaseLimit::from_bounds(id.as_str(), floor, ceiling)?,
            id,
            name: self.name,
            rate_percent: self.rate_percent,
            kind: match self.assessment {
                AssessmentConfig::Full => AssessmentKind::Full,
                AssessmentConfig::Abated9825 => AssessmentKind::abated_9825(),
            },
            side: if self.employer_side {
                ContributionSide::Employer
            } else {
                ContributionSide::Employee
            },
            is_active: self.active,
            collector: self.collector,
            tax_deductible: self.tax_deductible,
            description: self.description,
        };

        rule.validate()?;
        Ok(rule)
    }
}

fn resolve_amount(
    id: &RuleId,
    field: &str,
    amount: Option<Decimal>,
    pmss_multiple: Option<Decimal>,
    social_security_ceiling: Decimal,
) -> EngineResult<Option<Decimal>> {
    match (amount, pmss_multiple) {
        (Some(_), Some(_)) => Err(EngineError::invalid_rule(
            id.as_str(),
            format!("set either {field} or {field}_pmss, not both"),
        )),
        (Some(amount), None) => Ok(Some(amount)),
        (None, Some(multiple)) => multiple
            .checked_mul(social_security_ceiling)
            .map(Some)
            .ok_or_else(|| {
                EngineError::invalid_rule(
                    id.as_str(),
                    format!("{field}_pmss {multiple} overflows the social-security ceiling"),
                )
            }),
        (None, None) => Ok(None),
    }
}

/// A catalog file as read from disk.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// The date from which the catalog applies.
    pub effective_date: NaiveDate,
    /// Version label.
    pub version: String,
    /// Monthly social-security ceiling (PMSS).
    pub social_security_ceiling: Decimal,
    /// The contributions, in evaluation order.
    pub contributions: Vec<ContributionConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parse(yaml: &str) -> ContributionConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(
            r#"
id: maladie
name: Assurance maladie
rate_percent: "13.00"
"#,
        );
        assert_eq!(config.assessment, AssessmentConfig::Full);
        assert!(config.active);
        assert!(!config.employer_side);
        assert_eq!(config.collector, Collector::Urssaf);
    }

    #[test]
    fn test_pmss_multiples_are_resolved() {
        let rule = parse(
            r#"
id: retraite_complementaire_t2
name: Retraite complémentaire T2
rate_percent: "8.64"
bracket_floor_pmss: "1"
ceiling_pmss: "8"
collector: agirc_arrco
"#,
        )
        .into_rule(dec("4005"))
        .unwrap();

        assert_eq!(
            rule.limit,
            BaseLimit::Bracketed {
                floor: dec("4005"),
                ceiling: dec("32040")
            }
        );
        assert_eq!(rule.collector, Collector::AgircArrco);
    }

    #[test]
    fn test_abated_assessment() {
        let rule = parse(
            r#"
id: csg_deductible
name: CSG déductible
rate_percent: "6.80"
assessment: abated_9825
tax_deductible: true
"#,
        )
        .into_rule(dec("4005"))
        .unwrap();

        assert_eq!(rule.kind, AssessmentKind::abated_9825());
        assert!(rule.tax_deductible);
    }

    #[test]
    fn test_amount_and_multiple_conflict() {
        let result = parse(
            r#"
id: vieillesse_plafonnee
name: Vieillesse plafonnée
rate_percent: "6.90"
ceiling: "4005"
ceiling_pmss: "1"
"#,
        )
        .into_rule(dec("4005"));

        match result {
            Err(EngineError::InvalidRule { rule_id, message }) => {
                assert_eq!(rule_id, "vieillesse_plafonnee");
                assert!(message.contains("ceiling_pmss"));
            }
            other => panic!("Expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_pmss_multiple_is_rejected() {
        let result = parse(
            r#"
id: retraite_t2
name: Retraite T2
rate_percent: "8.64"
bracket_floor_pmss: "1"
ceiling_pmss: "79228162514264337593543950335"
"#,
        )
        .into_rule(dec("4005"));

        match result {
            Err(EngineError::InvalidRule { rule_id, message }) => {
                assert_eq!(rule_id, "retraite_t2");
                assert!(message.contains("ceiling_pmss"));
                assert!(message.contains("overflows"));
            }
            other => panic!("Expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_bracket_rejected() {
        let result = parse(
            r#"
id: broken
name: Broken
rate_percent: "1.00"
bracket_floor: "32040"
ceiling: "4005"
"#,
        )
        .into_rule(dec("4005"));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let result = parse(
            r#"
id: negative
name: Negative
rate_percent: "-1.00"
"#,
        )
        .into_rule(dec("4005"));
        assert!(matches!(result, Err(EngineError::InvalidRule { .. })));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ContributionConfig, _> = serde_yaml::from_str(
            r#"
id: maladie
name: Assurance maladie
rate_percent: "13.00"
patronal: true
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_employer_side_flag() {
        let rule = parse(
            r#"
id: maladie
name: Assurance maladie
rate_percent: "13.00"
employer_side: true
"#,
        )
        .into_rule(dec("4005"))
        .unwrap();
        assert!(rule.is_employer_side());
    }
}
