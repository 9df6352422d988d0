//! Locale subsystem.
//!
//! # Data Flow
//! ```text
//! Request (path, cookies, Accept-Language)
//!     → negotiation.rs (ResolvedLocale: country?, language?, language code)
//!     → context.rs (LocaleContext activated for this request only)
//!     → routing (prefix pattern reads the active country)
//! ```
//!
//! # Design Decisions
//! - Country set is built once per configuration and shared via Arc
//! - No process-global "current locale"; context is request-scoped

pub mod context;
pub mod country;
pub mod negotiation;

pub use context::{LocaleContext, PrefixKey};
pub use country::{Country, CountrySet, Language, LanguageCode};
pub use negotiation::{DefaultNegotiator, LocaleNegotiator, ResolvedLocale};
