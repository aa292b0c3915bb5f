//! Response bodies for the `/kpi` endpoint.
//!
//! | Status | Body |
//! |---|---|
//! | 200 | `{"driver", "data"}` |
//! | 404 | `{"driver", "data": {}, "message"}` |
//! | 400 / 500 | `{"error"}` |

use serde::Serialize;

use crate::kpi::MonthlyKpis;

pub const NOT_FOUND_MESSAGE: &str = "No KPI rows found for given driver_id/year";

/// Body for found and not-found outcomes.
#[derive(Debug, Serialize)]
pub struct KpiBody {
    pub driver: String,
    pub data: MonthlyKpis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl KpiBody {
    pub fn found(driver: String, data: MonthlyKpis) -> Self {
        Self {
            driver,
            data,
            message: None,
        }
    }

    pub fn not_found(driver: String) -> Self {
        Self {
            driver,
            data: MonthlyKpis::new(),
            message: Some(NOT_FOUND_MESSAGE),
        }
    }
}

/// Body for client and server errors.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
