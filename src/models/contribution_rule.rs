//! Contribution rule models.
//!
//! A [`ContributionRule`] describes one statutory contribution: its rate, how
//! its assessment base is derived from the gross salary, and who pays it.
//! The assessment base is modelled with two closed variants,
//! [`AssessmentKind`] (what the gross is reduced to) and [`BaseLimit`]
//! (which slice of it is taxed), so a floor without a declared bracket
//! shape cannot be expressed.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The legal 1.75% abatement applied to the CSG/CRDS base (gross × 0.9825).
pub const ABATEMENT_FACTOR_9825: Decimal = Decimal::from_parts(9825, 0, 0, false, 4);

/// Upper bound accepted for a single contribution rate, in percent.
pub const MAX_RATE_PERCENT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Stable identifier of a contribution rule (e.g. `vieillesse_plafonnee`).
///
/// Identifiers are lowercase ASCII slugs. Rules are always looked up by
/// identifier, never by matching fragments of their display name.
///
/// # Example
///
/// ```
/// use contribution_engine::models::RuleId;
///
/// let id = RuleId::new("csg_deductible").unwrap();
/// assert_eq!(id.as_str(), "csg_deductible");
/// assert!(RuleId::new("CSG déductible").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl RuleId {
    /// Creates a rule identifier, rejecting anything that is not a
    /// lowercase slug of `a-z`, `0-9` and `_`.
    pub fn new(id: impl Into<String>) -> EngineResult<Self> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            && !id.starts_with('_');

        if !valid {
            return Err(EngineError::invalid_rule(
                &id,
                "identifier must be a lowercase slug of letters, digits and underscores",
            ));
        }

        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RuleId {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RuleId::new(value)
    }
}

impl From<RuleId> for String {
    fn from(id: RuleId) -> Self {
        id.0
    }
}

/// Who bears a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionSide {
    /// Deducted from the employee's gross salary.
    Employee,
    /// Paid by the employer on top of gross salary; never reduces net salary.
    Employer,
}

impl ContributionSide {
    /// Returns `true` for the employer side.
    pub fn is_employer(self) -> bool {
        self == ContributionSide::Employer
    }

    /// Returns the snake_case label used in traces and logs.
    pub fn label(self) -> &'static str {
        match self {
            ContributionSide::Employee => "employee",
            ContributionSide::Employer => "employer",
        }
    }
}

/// The body that collects a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collector {
    /// URSSAF (social security and CSG/CRDS).
    #[default]
    Urssaf,
    /// AGIRC-ARRCO supplementary pensions.
    AgircArrco,
    /// France Travail (unemployment insurance).
    #[serde(alias = "pole_emploi")]
    FranceTravail,
    /// Any other collecting body.
    Other,
}

/// How the gross salary is reduced before any ceiling or floor applies.
///
/// # Example
///
/// ```
/// use contribution_engine::models::AssessmentKind;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let kind = AssessmentKind::abated_9825();
/// let gross = Decimal::from_str("5000.00").unwrap();
/// assert_eq!(kind.apply(gross), Decimal::from_str("4912.50").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssessmentKind {
    /// The base is the full gross salary.
    Full,
    /// The base is the gross salary multiplied by `factor`.
    Abated {
        /// Multiplier applied to the gross, in `(0, 1]`.
        factor: Decimal,
    },
}

impl AssessmentKind {
    /// The CSG/CRDS abatement (gross × 0.9825).
    pub fn abated_9825() -> Self {
        AssessmentKind::Abated {
            factor: ABATEMENT_FACTOR_9825,
        }
    }

    /// Returns the multiplier applied to the gross salary.
    pub fn factor(&self) -> Decimal {
        match self {
            AssessmentKind::Full => Decimal::ONE,
            AssessmentKind::Abated { factor } => *factor,
        }
    }

    /// Applies the reduction to a gross salary.
    pub fn apply(&self, gross: Decimal) -> Decimal {
        match self {
            AssessmentKind::Full => gross,
            AssessmentKind::Abated { factor } => gross * *factor,
        }
    }

    /// Returns the label used in traces and logs.
    pub fn label(&self) -> &'static str {
        match self {
            AssessmentKind::Full => "full",
            AssessmentKind::Abated { .. } => "abated",
        }
    }
}

/// Which slice of the (possibly abated) gross salary is taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BaseLimit {
    /// The whole base is taxed.
    Uncapped,
    /// The base is taxed up to `ceiling`.
    Capped {
        /// Upper bound on the base.
        ceiling: Decimal,
    },
    /// Only the part of the base above `floor` is taxed, without upper bound.
    AboveFloor {
        /// Lower bound of the taxed slice.
        floor: Decimal,
    },
    /// Only the slice between `floor` and `ceiling` is taxed (a tranche).
    Bracketed {
        /// Lower bound of the tranche.
        floor: Decimal,
        /// Upper bound of the tranche.
        ceiling: Decimal,
    },
}

impl BaseLimit {
    /// Builds the limit from optional floor and ceiling values.
    ///
    /// Rejects negative bounds and brackets whose ceiling does not lie
    /// strictly above their floor: such a bracket would always resolve to a
    /// zero base and look like "no contribution due".
    pub fn from_bounds(
        rule_id: &str,
        floor: Option<Decimal>,
        ceiling: Option<Decimal>,
    ) -> EngineResult<Self> {
        if let Some(floor) = floor {
            if floor < Decimal::ZERO {
                return Err(EngineError::invalid_rule(
                    rule_id,
                    format!("bracket floor {} is negative", floor),
                ));
            }
        }
        if let Some(ceiling) = ceiling {
            if ceiling <= Decimal::ZERO {
                return Err(EngineError::invalid_rule(
                    rule_id,
                    format!("ceiling {} must be positive", ceiling),
                ));
            }
        }

        let limit = match (floor, ceiling) {
            (None, None) => BaseLimit::Uncapped,
            (None, Some(ceiling)) => BaseLimit::Capped { ceiling },
            (Some(floor), None) => BaseLimit::AboveFloor { floor },
            (Some(floor), Some(ceiling)) => {
                if ceiling <= floor {
                    return Err(EngineError::invalid_rule(
                        rule_id,
                        format!(
                            "ceiling {} must be above the bracket floor {}",
                            ceiling, floor
                        ),
                    ));
                }
                BaseLimit::Bracketed { floor, ceiling }
            }
        };

        Ok(limit)
    }

    /// Returns the ceiling, if the limit has one.
    pub fn ceiling(&self) -> Option<Decimal> {
        match self {
            BaseLimit::Capped { ceiling } | BaseLimit::Bracketed { ceiling, .. } => Some(*ceiling),
            BaseLimit::Uncapped | BaseLimit::AboveFloor { .. } => None,
        }
    }

    /// Returns the bracket floor, if the limit has one.
    pub fn floor(&self) -> Option<Decimal> {
        match self {
            BaseLimit::AboveFloor { floor } | BaseLimit::Bracketed { floor, .. } => Some(*floor),
            BaseLimit::Uncapped | BaseLimit::Capped { .. } => None,
        }
    }

    /// Returns the label used in traces and logs.
    pub fn label(&self) -> &'static str {
        match self {
            BaseLimit::Uncapped => "uncapped",
            BaseLimit::Capped { .. } => "capped",
            BaseLimit::AboveFloor { .. } => "above_floor",
            BaseLimit::Bracketed { .. } => "bracketed",
        }
    }
}

/// One statutory contribution.
///
/// Rules are read-only during evaluation. Build them with the chaining
/// helpers and call [`ContributionRule::validate`] (catalogs do this for
/// every rule they hold).
///
/// # Example
///
/// ```
/// use contribution_engine::models::ContributionRule;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rule = ContributionRule::employee("vieillesse_plafonnee", "Vieillesse plafonnée (T1)", "6.90")
///     .unwrap()
///     .with_ceiling(Decimal::from_str("4005.00").unwrap())
///     .unwrap();
///
/// assert!(rule.validate().is_ok());
/// assert!(!rule.is_employer_side());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRule {
    /// Stable identifier.
    pub id: RuleId,
    /// Human-readable label, unique within a catalog.
    pub name: String,
    /// Rate in percent (6.90 means 6.90%).
    pub rate_percent: Decimal,
    /// Reduction applied to the gross before limits.
    pub kind: AssessmentKind,
    /// Slice of the base that is taxed.
    pub limit: BaseLimit,
    /// Who pays the contribution.
    pub side: ContributionSide,
    /// Inactive rules are skipped entirely.
    pub is_active: bool,
    /// Collecting body.
    pub collector: Collector,
    /// Whether the contribution reduces taxable income.
    pub tax_deductible: bool,
    /// Free-text description.
    pub description: String,
}

impl ContributionRule {
    /// Creates an active, employee-side rule on the full, uncapped gross.
    pub fn employee(id: &str, name: &str, rate_percent: &str) -> EngineResult<Self> {
        let rate_percent: Decimal = rate_percent.parse().map_err(|_| {
            EngineError::invalid_rule(id, format!("rate '{}' is not a decimal", rate_percent))
        })?;

        Ok(Self {
            id: RuleId::new(id)?,
            name: name.to_string(),
            rate_percent,
            kind: AssessmentKind::Full,
            limit: BaseLimit::Uncapped,
            side: ContributionSide::Employee,
            is_active: true,
            collector: Collector::Urssaf,
            tax_deductible: false,
            description: String::new(),
        })
    }

    /// Creates an active, employer-side rule on the full, uncapped gross.
    pub fn employer(id: &str, name: &str, rate_percent: &str) -> EngineResult<Self> {
        Ok(Self::employee(id, name, rate_percent)?.employer_side())
    }

    /// Switches the rule to the 98.25% abated base.
    pub fn abated_9825(mut self) -> Self {
        self.kind = AssessmentKind::abated_9825();
        self
    }

    /// Caps the base at `ceiling`.
    pub fn with_ceiling(self, ceiling: Decimal) -> EngineResult<Self> {
        let floor = self.limit.floor();
        self.with_bounds(floor, Some(ceiling))
    }

    /// Taxes only the slice between `floor` and `ceiling`.
    pub fn with_bracket(self, floor: Decimal, ceiling: Decimal) -> EngineResult<Self> {
        self.with_bounds(Some(floor), Some(ceiling))
    }

    /// Taxes only the part of the base above `floor`, uncapped.
    pub fn above_floor(self, floor: Decimal) -> EngineResult<Self> {
        self.with_bounds(Some(floor), None)
    }

    fn with_bounds(mut self, floor: Option<Decimal>, ceiling: Option<Decimal>) -> EngineResult<Self> {
        self.limit = BaseLimit::from_bounds(self.id.as_str(), floor, ceiling)?;
        Ok(self)
    }

    /// Moves the rule to the employer side.
    pub fn employer_side(mut self) -> Self {
        self.side = ContributionSide::Employer;
        self
    }

    /// Marks the rule inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Sets the collecting body.
    pub fn collected_by(mut self, collector: Collector) -> Self {
        self.collector = collector;
        self
    }

    /// Returns `true` for employer-side contributions.
    pub fn is_employer_side(&self) -> bool {
        self.side == ContributionSide::Employer
    }

    /// Checks the rule for internal consistency.
    ///
    /// Returns [`EngineError::InvalidRule`] for an empty name, a negative
    /// rate or one above 100%, an abatement factor outside `(0, 1]`, or
    /// bounds that [`BaseLimit::from_bounds`] would reject.
    pub fn validate(&self) -> EngineResult<()> {
        let id = self.id.as_str();

        if self.name.trim().is_empty() {
            return Err(EngineError::invalid_rule(id, "name must not be empty"));
        }
        if self.rate_percent < Decimal::ZERO {
            return Err(EngineError::invalid_rule(
                id,
                format!("rate {}% is negative", self.rate_percent),
            ));
        }
        if self.rate_percent > MAX_RATE_PERCENT {
            return Err(EngineError::invalid_rule(
                id,
                format!("rate {}% exceeds 100%", self.rate_percent),
            ));
        }
        if let AssessmentKind::Abated { factor } = self.kind {
            if factor <= Decimal::ZERO || factor > Decimal::ONE {
                return Err(EngineError::invalid_rule(
                    id,
                    format!("abatement factor {} must be in (0, 1]", factor),
                ));
            }
        }

        // Limits built by hand bypass from_bounds; re-run its checks.
        BaseLimit::from_bounds(id, self.limit.floor(), self.limit.ceiling())?;

        Ok(())
    }

    /// The rate applied to each additional unit of gross salary while the
    /// base is growing, in percent (rate × abatement factor).
    pub fn marginal_rate_percent(&self) -> Decimal {
        self.rate_percent * self.kind.factor()
    }
}
