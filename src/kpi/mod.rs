//! KPI domain model.
//!
//! # Data Flow
//! ```text
//! store row (month, kpi_1..kpi_9, nullable)
//!     → KpiRow (nulls coerced to 0)
//!     → MonthlyKpis ("<month>" → [k1..k9], query order)
//!     → response body
//! ```

pub mod model;

pub use model::{KpiRow, MonthlyKpis, KPI_COUNT};
