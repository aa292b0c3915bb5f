//! Driver KPI read service library.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod kpi;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use db::{ConnectionPool, KpiStore, MySqlKpiStore};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
