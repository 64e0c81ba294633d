//! Validated contribution catalogs.
//!
//! A [`ContributionCatalog`] is the complete rule set in force from one
//! effective date. Every rule it holds has been validated, and the catalog
//! as a whole has been checked for consistency.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{ContributionRule, ContributionSide, MAX_RATE_PERCENT};

use super::types::CatalogConfig;

/// A consistent set of contribution rules effective from a date.
///
/// # Example
///
/// ```
/// use contribution_engine::config::ContributionCatalog;
/// use contribution_engine::models::{ContributionRule, ContributionSide};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let catalog = ContributionCatalog::new(
///     "2026-01",
///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     Decimal::from_str("4005.00").unwrap(),
///     vec![
///         ContributionRule::employee("vieillesse_deplafonnee", "Vieillesse déplafonnée", "0.40").unwrap(),
///         ContributionRule::employer("maladie", "Assurance maladie", "13.00").unwrap(),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(catalog.active_rules(ContributionSide::Employee).count(), 1);
/// assert!(catalog.rule("maladie").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ContributionCatalog {
    version: String,
    effective_date: NaiveDate,
    social_security_ceiling: Decimal,
    rules: Vec<ContributionRule>,
}

impl ContributionCatalog {
    /// Creates a catalog, validating every rule and the set as a whole.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidRule`] if any rule is inconsistent
    /// * [`EngineError::InvalidCatalog`] for a non-positive social-security
    ///   ceiling, duplicate rule ids or names, or active employee-side rules
    ///   whose combined marginal rate exceeds 100%
    pub fn new(
        version: impl Into<String>,
        effective_date: NaiveDate,
        social_security_ceiling: Decimal,
        rules: Vec<ContributionRule>,
    ) -> EngineResult<Self> {
        let version = version.into();
        let invalid = |message: String| EngineError::InvalidCatalog {
            version: version.clone(),
            message,
        };

        if social_security_ceiling <= Decimal::ZERO {
            return Err(invalid(format!(
                "social security ceiling {} must be positive",
                social_security_ceiling
            )));
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for rule in &rules {
            rule.validate()?;

            if !ids.insert(rule.id.as_str()) {
                return Err(invalid(format!("duplicate rule id '{}'", rule.id)));
            }
            if !names.insert(rule.name.as_str()) {
                return Err(invalid(format!("duplicate rule name '{}'", rule.name)));
            }
        }

        let catalog = Self {
            version: version.clone(),
            effective_date,
            social_security_ceiling,
            rules,
        };

        let marginal = catalog.employee_marginal_rate();
        if marginal > MAX_RATE_PERCENT {
            return Err(invalid(format!(
                "active employee-side rules withhold {}% of each additional unit of gross",
                marginal.normalize()
            )));
        }

        Ok(catalog)
    }

    /// Builds a catalog from a parsed catalog file.
    pub fn from_config(config: CatalogConfig) -> EngineResult<Self> {
        let pmss = config.social_security_ceiling;
        let rules = config
            .contributions
            .into_iter()
            .map(|entry| entry.into_rule(pmss))
            .collect::<EngineResult<Vec<_>>>()?;

        Self::new(config.version, config.effective_date, pmss, rules)
    }

    /// The version label.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The date from which the catalog applies.
    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }

    /// The monthly social-security ceiling (PMSS).
    pub fn social_security_ceiling(&self) -> Decimal {
        self.social_security_ceiling
    }

    /// All rules, active or not, in catalog order.
    pub fn rules(&self) -> &[ContributionRule] {
        &self.rules
    }

    /// Looks up a rule by identifier.
    pub fn rule(&self, id: &str) -> Option<&ContributionRule> {
        self.rules.iter().find(|rule| rule.id.as_str() == id)
    }

    /// Active rules on one side, in catalog order.
    pub fn active_rules(&self, side: ContributionSide) -> impl Iterator<Item = &ContributionRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.is_active && rule.side == side)
    }

    /// Combined marginal rate of active employee-side rules, in percent.
    ///
    /// This bounds how much of each additional unit of gross salary can be
    /// withheld. Keeping it at or below 100% keeps net salary
    /// non-decreasing in gross.
    pub fn employee_marginal_rate(&self) -> Decimal {
        self.active_rules(ContributionSide::Employee)
            .map(ContributionRule::marginal_rate_percent)
            .sum()
    }
}
