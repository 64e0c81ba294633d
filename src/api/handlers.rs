//! HTTP request handlers for the contribution engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::PayrollCalculator;
use crate::error::EngineError;
use crate::models::PayPeriod;

use super::request::{CreatePayrollRequest, RecomputeRequest, SimulationRequest};
use super::response::{ApiError, ApiErrorResponse, PayrollDetail};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/simulate", post(simulate_handler))
        .route("/payrolls", post(create_payroll_handler))
        .route("/payrolls/:id", get(get_payroll_handler))
        .route("/payrolls/:id/recompute", post(recompute_handler))
        .route("/payrolls/:id/validate", post(validate_handler))
        .route("/payrolls/:id/mark-paid", post(mark_paid_handler))
        .route("/periods/:period/recompute", post(recompute_period_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps a JSON body rejection to a `400` error.
fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error)
}

fn path_rejection(correlation_id: Uuid, rejection: PathRejection) -> ApiErrorResponse {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Invalid path parameter"
    );
    ApiErrorResponse::bad_request(ApiError::invalid_path(body_text))
}

fn engine_failure(correlation_id: Uuid, err: EngineError) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        kind = ?err.kind(),
        error = %err,
        "Request failed"
    );
    err.into()
}

/// Handler for `POST /simulate`.
///
/// Computes the breakdown of a gross salary without touching the ledger.
async fn simulate_handler(
    State(state): State<AppState>,
    payload: Result<Json<SimulationRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing simulation request");

    let Json(request) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;
    let date = request.date.unwrap_or_else(|| Utc::now().date_naive());

    let start_time = Instant::now();
    let calculator = PayrollCalculator::new(state.config(), state.ledger());
    let mut breakdown = calculator
        .simulate(request.gross_salary, date)
        .map_err(|err| engine_failure(correlation_id, err))?;
    breakdown.audit_trace.duration_us = start_time.elapsed().as_micros() as u64;

    info!(
        correlation_id = %correlation_id,
        catalog = %breakdown.catalog_version,
        gross_salary = %breakdown.totals.gross_salary,
        net_salary = %breakdown.totals.net_salary,
        duration_us = breakdown.audit_trace.duration_us,
        "Simulation completed"
    );

    Ok(json_response(StatusCode::OK, breakdown))
}

/// Handler for `POST /payrolls`.
///
/// Opens a draft record. Contributions are computed by a later recompute.
async fn create_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreatePayrollRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll creation request");

    let Json(request) = payload.map_err(|rejection| json_rejection(correlation_id, rejection))?;

    let calculator = PayrollCalculator::new(state.config(), state.ledger());
    let record = calculator
        .open_record(&request.employee_id, request.period, request.gross_salary)
        .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        record_id = %record.id,
        employee_id = %record.employee_id,
        period = %record.period,
        "Payroll record opened"
    );

    Ok(json_response(StatusCode::CREATED, record))
}

/// Handler for `GET /payrolls/:id`.
async fn get_payroll_handler(
    State(state): State<AppState>,
    record_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let Path(record_id) = record_id.map_err(|rejection| path_rejection(correlation_id, rejection))?;
    info!(correlation_id = %correlation_id, record_id = %record_id, "Fetching payroll record");

    let entry = state
        .ledger()
        .fetch(record_id)
        .map_err(|err| engine_failure(correlation_id, err))?;

    Ok(json_response(StatusCode::OK, PayrollDetail::from(entry)))
}

/// Handler for `POST /payrolls/:id/recompute`.
///
/// The body is optional; an empty body recomputes from the stored gross.
async fn recompute_handler(
    State(state): State<AppState>,
    record_id: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let Path(record_id) = record_id.map_err(|rejection| path_rejection(correlation_id, rejection))?;
    info!(correlation_id = %correlation_id, record_id = %record_id, "Processing recompute request");

    let request = parse_recompute_body(correlation_id, &body)?;

    let calculator = PayrollCalculator::new(state.config(), state.ledger());
    let outcome = match request.gross_salary {
        Some(gross_salary) => calculator.recompute_with_gross(record_id, gross_salary),
        None => calculator.recompute(record_id),
    }
    .map_err(|err| engine_failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        record_id = %record_id,
        calculation_id = %outcome.calculation_id,
        warnings = outcome.audit_trace.warnings.len(),
        "Recompute completed"
    );

    Ok(json_response(StatusCode::OK, outcome))
}

fn parse_recompute_body(correlation_id: Uuid, body: &[u8]) -> Result<RecomputeRequest, ApiErrorResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecomputeRequest::default());
    }

    serde_json::from_slice(body).map_err(|err| {
        warn!(
            correlation_id = %correlation_id,
            error = %err,
            "Recompute body rejected"
        );
        let error = if err.is_data() {
            ApiError::validation_error(err.to_string())
        } else {
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        };
        ApiErrorResponse::bad_request(error)
    })
}

/// Handler for `POST /payrolls/:id/validate`.
async fn validate_handler(
    State(state): State<AppState>,
    record_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let Path(record_id) = record_id.map_err(|rejection| path_rejection(correlation_id, rejection))?;
    info!(correlation_id = %correlation_id, record_id = %record_id, "Validating payroll record");

    let calculator = PayrollCalculator::new(state.config(), state.ledger());
    let record = calculator
        .validate(record_id)
        .map_err(|err| engine_failure(correlation_id, err))?;

    Ok(json_response(StatusCode::OK, record))
}

/// Handler for `POST /payrolls/:id/mark-paid`.
async fn mark_paid_handler(
    State(state): State<AppState>,
    record_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let Path(record_id) = record_id.map_err(|rejection| path_rejection(correlation_id, rejection))?;
    info!(correlation_id = %correlation_id, record_id = %record_id, "Marking payroll record paid");

    let calculator = PayrollCalculator::new(state.config(), state.ledger());
    let record = calculator
        .mark_paid(record_id)
        .map_err(|err| engine_failure(correlation_id, err))?;

    Ok(json_response(StatusCode::OK, record))
}

/// Handler for `POST /periods/:period/recompute`.
///
/// Each unlocked record is recomputed on its own blocking task. Results are
/// collected in employee order.
async fn recompute_period_handler(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, period = %period, "Processing period recompute request");

    let period: PayPeriod = period
        .parse()
        .map_err(|err| engine_failure(correlation_id, err))?;
    let mut batch = PayrollCalculator::new(state.config(), state.ledger())
        .begin_period(period)
        .map_err(|err| engine_failure(correlation_id, err))?;

    let tasks: Vec<_> = batch
        .take_pending()
        .into_iter()
        .map(|record| {
            let config = state.shared_config();
            let ledger = state.shared_ledger();
            let record_id = record.id;
            let task = tokio::task::spawn_blocking(move || {
                PayrollCalculator::new(&config, ledger.as_ref()).recompute(record_id)
            });
            (record, task)
        })
        .collect();

    for (record, task) in tasks {
        let result = task.await.unwrap_or_else(|err| {
            Err(EngineError::CalculationError {
                message: format!("recompute task failed: {}", err),
            })
        });
        batch.file(&record, result);
    }

    let report = batch.finish();
    info!(
        correlation_id = %correlation_id,
        period = %report.period,
        "Period recompute completed"
    );

    Ok(json_response(StatusCode::OK, report))
}
