//! HTTP API module for the contribution engine.
//!
//! This module provides the REST endpoints for simulating breakdowns and
//! managing payroll records through their calculation lifecycle.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CreatePayrollRequest, RecomputeRequest, SimulationRequest};
pub use response::{ApiError, ApiErrorResponse, PayrollDetail};
pub use state::AppState;
