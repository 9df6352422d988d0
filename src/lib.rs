//! Country/language URL-prefix routing.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request id, trace, timeout)
//!                         │
//!                         ▼
//!                     http::middleware::locale ── locale (negotiate, activate)
//!                         │
//!                         ▼
//!                     dispatch ── routing (route table, country prefix pattern)
//!                         │
//!                         ▼
//!                     endpoint handler
//!                         │
//!     Client Response     ▼
//!     ◀────────────── http::middleware::locale (repair redirect, Vary, Content-Language)
//!
//!     Cross-cutting: config (load, validate, watch), observability, lifecycle
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod locale;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub mod views;

pub use config::LocaleRouterConfig;
pub use http::{LocaleServer, ServerError};
pub use lifecycle::Shutdown;
