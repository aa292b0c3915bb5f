//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers, pool, lifecycle
//!     → tracing events (structured fields: request_id, driver_id, year)
//!     → logging.rs subscriber (fmt, env filter)
//!     → stdout
//! ```

pub mod logging;

pub use logging::init_logging;
