//! Contribution line models.
//!
//! A [`ContributionLine`] is one evaluated contribution produced by a
//! calculation. Once bound to a payroll record it becomes a persisted
//! [`LineItem`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Collector, ContributionRule, ContributionSide, RuleId};

/// One evaluated contribution.
///
/// `base` is the exact (unrounded) assessment base. `amount` is rounded to
/// cents; totals are sums of these rounded amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionLine {
    /// Position in the calculation, starting at 1.
    pub sequence: u32,
    /// The rule that produced the line.
    pub rule_id: RuleId,
    /// The rule's display name at calculation time.
    pub rule_name: String,
    /// Who pays.
    pub side: ContributionSide,
    /// Collecting body.
    pub collector: Collector,
    /// Whether the contribution reduces taxable income.
    pub tax_deductible: bool,
    /// Assessment base.
    pub base: Decimal,
    /// Rate in percent.
    pub rate_percent: Decimal,
    /// Contribution amount rounded to cents.
    pub amount: Decimal,
}

impl ContributionLine {
    /// Builds a line for `rule` from an already resolved base and rounded amount.
    pub fn for_rule(sequence: u32, rule: &ContributionRule, base: Decimal, amount: Decimal) -> Self {
        Self {
            sequence,
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            side: rule.side,
            collector: rule.collector,
            tax_deductible: rule.tax_deductible,
            base,
            rate_percent: rule.rate_percent,
            amount,
        }
    }
}

/// A contribution line persisted against a payroll record.
///
/// # Example
///
/// ```
/// use contribution_engine::models::{ContributionLine, ContributionRule, LineItem};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
/// use uuid::Uuid;
///
/// let rule = ContributionRule::employee("crds", "CRDS", "0.50").unwrap().abated_9825();
/// let line = ContributionLine::for_rule(
///     1,
///     &rule,
///     Decimal::from_str("4912.50").unwrap(),
///     Decimal::from_str("24.56").unwrap(),
/// );
///
/// let record_id = Uuid::new_v4();
/// let item = LineItem::bind(record_id, line);
/// assert_eq!(item.record_id, record_id);
/// assert_eq!(item.rule_id.as_str(), "crds");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The owning payroll record.
    pub record_id: Uuid,
    /// Position within the record, starting at 1.
    pub sequence: u32,
    /// The rule that produced the item.
    pub rule_id: RuleId,
    /// The rule's display name at calculation time.
    pub rule_name: String,
    /// Who pays.
    pub side: ContributionSide,
    /// Collecting body.
    pub collector: Collector,
    /// Whether the contribution reduces taxable income.
    pub tax_deductible: bool,
    /// Assessment base.
    pub base: Decimal,
    /// Rate in percent.
    pub rate_percent: Decimal,
    /// Contribution amount rounded to cents.
    pub amount: Decimal,
}

impl LineItem {
    /// Attaches a calculated line to a payroll record.
    pub fn bind(record_id: Uuid, line: ContributionLine) -> Self {
        Self {
            record_id,
            sequence: line.sequence,
            rule_id: line.rule_id,
            rule_name: line.rule_name,
            side: line.side,
            collector: line.collector,
            tax_deductible: line.tax_deductible,
            base: line.base,
            rate_percent: line.rate_percent,
            amount: line.amount,
        }
    }

    /// Returns `true` for employer-side items.
    pub fn is_employer_side(&self) -> bool {
        self.side == ContributionSide::Employer
    }
}
