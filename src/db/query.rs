//! KPI query service.
//!
//! # Responsibilities
//! - Hold the fixed SELECT over `driverkpi`, built once
//! - Bind `driver_id` and `year`; nothing request-derived reaches the SQL text
//! - Decode rows into [`KpiRow`], coercing NULL KPIs to 0
//! - Hold a pool connection only for the duration of the fetch

use async_trait::async_trait;
use once_cell::sync::Lazy;
use sqlx::mysql::MySqlRow;
use sqlx::Row;

use crate::db::pool::ConnectionPool;
use crate::error::StoreError;
use crate::kpi::{KpiRow, KPI_COUNT};

/// `kpi_1` .. `kpi_9`.
pub static KPI_COLUMNS: Lazy<Vec<String>> =
    Lazy::new(|| (1..=KPI_COUNT).map(|i| format!("kpi_{}", i)).collect());

/// The only statement this service runs.
///
/// Every selected column is cast to `SIGNED` so unsigned and narrow integer
/// columns all decode as `BIGINT`.
pub static KPI_QUERY: Lazy<String> = Lazy::new(|| {
    let columns = std::iter::once("month")
        .chain(KPI_COLUMNS.iter().map(String::as_str))
        .map(signed_column)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {} FROM driverkpi WHERE driver_id = ? AND year = ? ORDER BY month",
        columns
    )
});

fn signed_column(name: &str) -> String {
    format!("CAST({name} AS SIGNED) AS {name}")
}

/// Read access to stored KPI rows.
#[async_trait]
pub trait KpiStore: Send + Sync {
    /// Rows for one driver-year in ascending month order.
    async fn fetch_kpis(&self, driver_id: &str, year: i64) -> Result<Vec<KpiRow>, StoreError>;
}

/// [`KpiStore`] backed by the MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlKpiStore {
    pool: ConnectionPool,
}

impl MySqlKpiStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

#[async_trait]
impl KpiStore for MySqlKpiStore {
    async fn fetch_kpis(&self, driver_id: &str, year: i64) -> Result<Vec<KpiRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;

        // The lease is dropped (and the connection returned) on both paths.
        let rows = sqlx::query(KPI_QUERY.as_str())
            .bind(driver_id)
            .bind(year)
            .fetch_all(&mut **conn)
            .await?;
        drop(conn);

        let rows = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(driver_id = %driver_id, year, rows = rows.len(), "KPI query complete");
        Ok(rows)
    }
}

fn decode_row(row: &MySqlRow) -> Result<KpiRow, sqlx::Error> {
    let month: i64 = row.try_get("month")?;
    let mut values = [None; KPI_COUNT];
    for (slot, column) in values.iter_mut().zip(KPI_COLUMNS.iter()) {
        *slot = row.try_get::<Option<i64>, _>(column.as_str())?;
    }
    Ok(KpiRow::from_nullable(month, values))
}
