//! `GET /kpi` handler.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;
use crate::http::response::KpiBody;
use crate::http::server::AppState;
use crate::kpi::MonthlyKpis;

/// Validated `driver_id` / `year` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiParams {
    pub driver_id: String,
    pub year: i64,
}

impl KpiParams {
    /// Validate raw query pairs. The first occurrence of each key wins.
    ///
    /// An empty `driver_id`, a `year` that is not an integer, and `year=0`
    /// all count as missing.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ApiError> {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let driver_id = first("driver_id")
            .filter(|d| !d.is_empty())
            .ok_or(ApiError::MissingParams)?;
        let year = first("year")
            .and_then(parse_year)
            .filter(|y| *y != 0)
            .ok_or(ApiError::MissingParams)?;

        Ok(Self {
            driver_id: driver_id.to_string(),
            year,
        })
    }
}

/// Integer parse that tolerates surrounding whitespace and single
/// underscores between digits (`2_024`).
fn parse_year(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let digits = raw.strip_prefix(&['+', '-'][..]).unwrap_or(raw);
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    raw.replace('_', "").parse().ok()
}

pub async fn get_kpi(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<(StatusCode, Json<KpiBody>), ApiError> {
    let pairs = match query {
        Ok(Query(pairs)) => pairs,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable query string");
            return Err(ApiError::MissingParams);
        }
    };

    let params = KpiParams::from_pairs(&pairs).inspect_err(|_| {
        tracing::debug!("Rejected request with missing or invalid params");
    })?;

    let rows = state
        .store
        .fetch_kpis(&params.driver_id, params.year)
        .await
        .inspect_err(|e| {
            tracing::error!(
                driver_id = %params.driver_id,
                year = params.year,
                error = %e,
                "KPI query failed"
            );
        })?;

    if rows.is_empty() {
        tracing::info!(driver_id = %params.driver_id, year = params.year, "No KPI rows");
        return Ok((StatusCode::NOT_FOUND, Json(KpiBody::not_found(params.driver_id))));
    }

    let data = MonthlyKpis::from_rows(&rows);
    tracing::info!(
        driver_id = %params.driver_id,
        year = params.year,
        months = data.len(),
        "KPI rows served"
    );
    Ok((StatusCode::OK, Json(KpiBody::found(params.driver_id, data))))
}
