//! Error taxonomy for the KPI service.
//!
//! # Data Flow
//! ```text
//! sqlx / pool failure → StoreError ─┐
//! query param problems ─────────────┴→ ApiError → JSON body + status
//! ```
//!
//! A zero-row result is not an error; the handler answers it with 404
//! directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::http::response::ErrorBody;

/// Fixed message returned for every parameter problem.
pub const MISSING_PARAMS_MESSAGE: &str = "Missing required query params: driver_id, year";

/// Failure talking to or executing against the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The pool could not be created at startup.
    #[error("MySQL error: connection pool is not initialized")]
    PoolUnavailable,

    /// Connectivity loss, SQL error, pool exhaustion.
    #[error("MySQL error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", MISSING_PARAMS_MESSAGE)]
    MissingParams,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParams => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
