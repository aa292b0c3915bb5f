//! Connection pool lifecycle.
//!
//! # Responsibilities
//! - Open a fixed-size MySQL pool once, at startup
//! - Degrade to an unavailable pool when the store is unreachable at boot
//! - Lend connections as [`Lease`]s that always go back to the pool
//! - Count acquisitions and releases so leaks are observable

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{Connection, MySql};

use crate::config::DatabaseConfig;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct LeaseCounters {
    acquired: AtomicU64,
    released: AtomicU64,
}

/// A borrowed pool connection.
///
/// Dropping the lease records the release; the inner connection then
/// returns itself to the pool.
#[derive(Debug)]
pub struct Lease<C> {
    conn: C,
    counters: Arc<LeaseCounters>,
}

impl<C> Lease<C> {
    fn new(conn: C, counters: Arc<LeaseCounters>) -> Self {
        counters.acquired.fetch_add(1, Ordering::Relaxed);
        Self { conn, counters }
    }
}

impl<C> Deref for Lease<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.conn
    }
}

impl<C> DerefMut for Lease<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.conn
    }
}

impl<C> Drop for Lease<C> {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time view of pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub available: bool,
    pub acquired: u64,
    pub released: u64,
    /// Open connections (idle + lent out).
    pub size: u32,
    pub idle: usize,
}

impl PoolStats {
    /// Connections currently lent out through this handle.
    pub fn in_use(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

/// Shared handle to the MySQL pool, possibly unavailable.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    pool: Option<MySqlPool>,
    counters: Arc<LeaseCounters>,
}

impl ConnectionPool {
    /// Open the pool with every connection established up front.
    ///
    /// A single direct connection is tried first. If it fails the pool is
    /// left unavailable straight away, without the pool's connect backoff.
    pub async fn connect(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        match MySqlConnection::connect_with(&options).await {
            Ok(conn) => {
                let _ = conn.close().await;
            }
            Err(e) => {
                tracing::warn!(
                    host = %config.host,
                    database = %config.name,
                    error = %e,
                    "Store unreachable at startup; KPI requests will fail"
                );
                return Self::unavailable();
            }
        }

        let result = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await;

        match result {
            Ok(pool) => {
                tracing::info!(
                    host = %config.host,
                    database = %config.name,
                    pool_size = config.pool_size,
                    "Connection pool ready"
                );
                Self::from_pool(pool)
            }
            Err(e) => {
                tracing::warn!(
                    host = %config.host,
                    database = %config.name,
                    error = %e,
                    "Connection pool unavailable; KPI requests will fail"
                );
                Self::unavailable()
            }
        }
    }

    /// Wrap an already-built pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self {
            pool: Some(pool),
            counters: Arc::default(),
        }
    }

    /// A pool that failed to initialize.
    pub fn unavailable() -> Self {
        Self {
            pool: None,
            counters: Arc::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    /// Borrow a connection, waiting while all pooled connections are lent.
    pub async fn acquire(&self) -> Result<Lease<PoolConnection<MySql>>, StoreError> {
        let pool = self.pool.as_ref().ok_or(StoreError::PoolUnavailable)?;
        let conn = pool.acquire().await?;
        Ok(Lease::new(conn, self.counters.clone()))
    }

    pub fn stats(&self) -> PoolStats {
        let (size, idle) = match &self.pool {
            Some(pool) => (pool.size(), pool.num_idle()),
            None => (0, 0),
        };
        PoolStats {
            available: self.pool.is_some(),
            acquired: self.counters.acquired.load(Ordering::Relaxed),
            released: self.counters.released.load(Ordering::Relaxed),
            size,
            idle,
        }
    }

    /// Close all connections. Further acquisitions fail.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("Connection pool closed");
        }
    }
}
