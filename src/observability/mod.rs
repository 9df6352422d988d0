//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (fields, not formatted strings)
//! - Request ID flows through the HTTP trace span
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
