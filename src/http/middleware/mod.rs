//! Request/response middleware.

pub mod locale;

pub use locale::{activate, country_language_middleware, process_response};
