//! Relational store access.
//!
//! # Data Flow
//! ```text
//! startup: DatabaseConfig → pool.rs (ConnectionPool, 3 connections)
//! request: handler → query.rs (KpiStore::fetch_kpis)
//!     → pool.acquire() → Lease → SELECT ... → Lease dropped
//!     → Vec<KpiRow>
//! ```
//!
//! # Design Decisions
//! - The pool is injected into the store, never a global
//! - An unavailable pool is a normal value; every acquire then fails
//! - No retries; the first failure is reported to the caller

pub mod pool;
pub mod query;

pub use pool::{ConnectionPool, Lease, PoolStats};
pub use query::{KpiStore, MySqlKpiStore, KPI_COLUMNS, KPI_QUERY};
