//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use driver_kpi::config::ServiceConfig;
use driver_kpi::db::KpiStore;
use driver_kpi::error::StoreError;
use driver_kpi::http::HttpServer;
use driver_kpi::kpi::KpiRow;
use driver_kpi::lifecycle::Shutdown;
use tokio::net::TcpListener;

/// In-memory store keyed by (driver_id, year).
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<(String, i64, KpiRow)>>,
    fail: Mutex<Option<String>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, driver_id: &str, year: i64, row: KpiRow) {
        self.rows.lock().unwrap().push((driver_id.to_string(), year, row));
    }

    /// Make every subsequent query fail with a connectivity error.
    pub fn fail_with(&self, message: &str) {
        *self.fail.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KpiStore for MemoryStore {
    async fn fetch_kpis(&self, driver_id: &str, year: i64) -> Result<Vec<KpiRow>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail.lock().unwrap().clone() {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, message);
            return Err(StoreError::Database(sqlx::Error::Io(io)));
        }
        let mut rows: Vec<KpiRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, y, _)| d == driver_id && *y == year)
            .map(|(_, _, row)| *row)
            .collect();
        rows.sort_by_key(|row| row.month);
        Ok(rows)
    }
}

/// A running server bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub async fn start(store: Arc<dyn KpiStore>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();

        let server = HttpServer::new(ServiceConfig::default(), store);
        let signal = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, signal).await;
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self { addr, shutdown }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Client that never reuses connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
