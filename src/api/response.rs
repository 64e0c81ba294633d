//! Response types for the contribution engine API.
//!
//! This module defines the error response structures, the mapping from
//! [`EngineError`] to HTTP status codes, and the payroll detail body.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::ledger::LedgerEntry;
use crate::models::{LineItem, PayrollRecord};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an invalid path parameter error response.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::new("INVALID_PATH_PARAMETER", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a `400 Bad Request` response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::InvalidRule { .. } | EngineError::InvalidCatalog { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Contribution catalog is inconsistent",
                    message,
                ),
            ),
            EngineError::CatalogNotFound { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "CATALOG_NOT_FOUND",
                    message,
                    "No contribution catalog covers the requested date",
                ),
            ),
            EngineError::InvalidGrossSalary { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_GROSS_SALARY", message),
            ),
            EngineError::InvalidPeriod { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PERIOD", message),
            ),
            EngineError::InvalidEmployee { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_EMPLOYEE", message),
            ),
            EngineError::RecordNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("RECORD_NOT_FOUND", message),
            ),
            EngineError::DuplicateRecord { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("DUPLICATE_RECORD", message),
            ),
            EngineError::RecordLocked { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "RECORD_LOCKED",
                    message,
                    "Validated and paid records keep their contributions",
                ),
            ),
            EngineError::InvalidStatusTransition { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("INVALID_STATUS_TRANSITION", message),
            ),
            EngineError::ConcurrentRecompute { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "CONCURRENT_RECOMPUTE",
                    message,
                    "The record kept changing while it was being recomputed; retry the request",
                ),
            ),
            EngineError::LedgerUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::with_details("LEDGER_UNAVAILABLE", "Payroll ledger unavailable", message),
            ),
            EngineError::CalculationError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

/// Body of `GET /payrolls/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollDetail {
    /// The payroll record.
    pub record: PayrollRecord,
    /// Its line items, in sequence order.
    pub line_items: Vec<LineItem>,
    /// Sum of the employee-side line items.
    pub employee_lines_total: Decimal,
    /// Sum of the employer-side line items.
    pub employer_lines_total: Decimal,
    /// Gross salary plus employer contributions.
    pub total_employer_cost: Decimal,
}

impl From<LedgerEntry> for PayrollDetail {
    fn from(entry: LedgerEntry) -> Self {
        let employee_lines_total = entry.employee_lines_total();
        let employer_lines_total = entry.employer_lines_total();
        let total_employer_cost = entry.record.total_employer_cost();
        Self {
            record: entry.record,
            line_items: entry.line_items,
            employee_lines_total,
            employer_lines_total,
            total_employer_cost,
        }
    }
}
