//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → middleware/locale.rs (negotiate + activate locale)
//!     → server.rs dispatch (route table lookup under the active locale)
//!     → endpoint handler
//!     → middleware/locale.rs (repair redirect or Vary / Content-Language)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, RequestIdExt, RequestOrigin, X_REQUEST_ID};
pub use server::{AppState, LocaleServer, ServerError, Snapshot};
