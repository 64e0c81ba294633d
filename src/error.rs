//! Error types for the contribution engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading contribution
//! catalogs and recomputing payroll records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::PayrollStatus;

/// The main error type for the contribution engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use contribution_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A contribution rule is internally inconsistent.
    #[error("Invalid contribution rule '{rule_id}': {message}")]
    InvalidRule {
        /// The identifier of the offending rule.
        rule_id: String,
        /// A description of the inconsistency.
        message: String,
    },

    /// A contribution catalog as a whole is inconsistent.
    #[error("Invalid contribution catalog '{version}': {message}")]
    InvalidCatalog {
        /// The version label of the catalog.
        version: String,
        /// A description of the inconsistency.
        message: String,
    },

    /// No catalog is effective on the requested date.
    #[error("No contribution catalog effective on {date}")]
    CatalogNotFound {
        /// The date for which a catalog was requested.
        date: NaiveDate,
    },

    /// The gross salary supplied for evaluation is not acceptable.
    #[error("Invalid gross salary {value}: {message}")]
    InvalidGrossSalary {
        /// The rejected gross salary.
        value: Decimal,
        /// Why the value was rejected.
        message: String,
    },

    /// A pay period label could not be parsed.
    #[error("Invalid pay period '{value}': {message}")]
    InvalidPeriod {
        /// The raw period value.
        value: String,
        /// Why the value was rejected.
        message: String,
    },

    /// An employee identifier is not acceptable.
    #[error("Invalid employee id '{employee_id}': {message}")]
    InvalidEmployee {
        /// The rejected identifier.
        employee_id: String,
        /// Why the value was rejected.
        message: String,
    },

    /// No payroll record exists with the given identifier.
    #[error("Payroll record not found: {record_id}")]
    RecordNotFound {
        /// The identifier that was looked up.
        record_id: Uuid,
    },

    /// A payroll record already exists for the employee and period.
    #[error("Payroll record already exists for employee '{employee_id}' in {period}")]
    DuplicateRecord {
        /// The employee identifier.
        employee_id: String,
        /// The pay period label.
        period: String,
    },

    /// The record has been validated or paid and can no longer change.
    #[error("Payroll record {record_id} is {status} and cannot be recomputed")]
    RecordLocked {
        /// The locked record.
        record_id: Uuid,
        /// The status that locks it.
        status: PayrollStatus,
    },

    /// A status change that the payroll workflow does not allow.
    #[error("Cannot move payroll record from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: PayrollStatus,
        /// The requested status.
        to: PayrollStatus,
    },

    /// The record changed between the start of a recompute and its commit.
    #[error("Payroll record {record_id} was modified by a concurrent recompute")]
    ConcurrentRecompute {
        /// The contended record.
        record_id: Uuid,
    },

    /// The payroll ledger could not be accessed.
    #[error("Payroll ledger unavailable: {message}")]
    LedgerUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// Broad classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The contribution configuration is missing or inconsistent.
    Configuration,
    /// The caller supplied an invalid value.
    Input,
    /// The operation conflicts with the current state of a record.
    State,
    /// An unexpected internal failure.
    Internal,
}

impl EngineError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidRule { .. }
            | EngineError::InvalidCatalog { .. }
            | EngineError::CatalogNotFound { .. } => ErrorKind::Configuration,
            EngineError::InvalidGrossSalary { .. }
            | EngineError::InvalidPeriod { .. }
            | EngineError::InvalidEmployee { .. } => ErrorKind::Input,
            EngineError::RecordNotFound { .. }
            | EngineError::DuplicateRecord { .. }
            | EngineError::RecordLocked { .. }
            | EngineError::InvalidStatusTransition { .. }
            | EngineError::ConcurrentRecompute { .. } => ErrorKind::State,
            EngineError::LedgerUnavailable { .. } | EngineError::CalculationError { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Shorthand for building an [`EngineError::InvalidRule`].
    pub(crate) fn invalid_rule(rule_id: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidRule {
            rule_id: rule_id.to_string(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/file.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/file.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_rule_displays_id_and_message() {
        let error = EngineError::invalid_rule("retraite_t2", "ceiling is below the bracket floor");
        assert_eq!(
            error.to_string(),
            "Invalid contribution rule 'retraite_t2': ceiling is below the bracket floor"
        );
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_catalog_not_found_displays_date() {
        let error = EngineError::CatalogNotFound {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "No contribution catalog effective on 2020-01-01"
        );
    }

    #[test]
    fn test_invalid_gross_salary_is_input_error() {
        let error = EngineError::InvalidGrossSalary {
            value: Decimal::from_str("-1").unwrap(),
            message: "must not be negative".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid gross salary -1: must not be negative");
        assert_eq!(error.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_record_locked_displays_status() {
        let record_id = Uuid::nil();
        let error = EngineError::RecordLocked {
            record_id,
            status: PayrollStatus::Paid,
        };
        assert_eq!(
            error.to_string(),
            "Payroll record 00000000-0000-0000-0000-000000000000 is paid and cannot be recomputed"
        );
        assert_eq!(error.kind(), ErrorKind::State);
    }

    #[test]
    fn test_invalid_status_transition_displays_both_states() {
        let error = EngineError::InvalidStatusTransition {
            from: PayrollStatus::Draft,
            to: PayrollStatus::Paid,
        };
        assert_eq!(error.to_string(), "Cannot move payroll record from draft to paid");
    }

    #[test]
    fn test_calculation_error_displays_message() {
        let error = EngineError::CalculationError {
            message: "decimal overflow".to_string(),
        };
        assert_eq!(error.to_string(), "Calculation error: decimal overflow");
        assert_eq!(error.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_config_not_found() -> EngineResult<()> {
            Err(EngineError::ConfigNotFound {
                path: "/test".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_config_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
