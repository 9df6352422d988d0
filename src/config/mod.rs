//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LocaleRouterConfig (validated, immutable)
//!     → server builds a snapshot (country set, negotiator, route table)
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the server snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CountryConfig, ListenerConfig, LocaleConfig, LocaleRouterConfig, ObservabilityConfig,
    RoutingConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
