//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming path + active LocaleContext
//!     → table.rs (walk entries in order)
//!     → resolver.rs (strip the active country prefix, recurse)
//!     → pattern.rs (literal / dynamic prefix matching, cached matchers)
//!     → Return: matched Endpoint + RouteCaptures, or no match
//!
//! Route Table Construction (at startup and on reload):
//!     RouteFactory(country set, routing config)
//!     → validate names and patterns
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Tables immutable at runtime; reload builds a new table
//! - No regex in hot path (literal prefix matching only)
//! - Deterministic: same path and locale always match the same route
//! - First match wins (registration order)

pub mod pattern;
pub mod resolver;
pub mod table;

pub use pattern::{CountryPrefixPattern, LiteralPattern, PatternMatch, PrefixMatcher, RoutePattern};
pub use resolver::{country_patterns, CountryPrefixResolver, ResolverDescription};
pub use table::{
    route, route_prefix, Endpoint, PrefixUsage, ResolvedRoute, RouteCaptures, RouteEntry,
    RouteTable, RouteTableError, TableId,
};

use crate::config::RoutingConfig;
use crate::locale::CountrySet;

/// Builds the route table for a configuration; called again on every reload.
pub trait RouteFactory: Send + Sync {
    fn build(&self, countries: &CountrySet, routing: &RoutingConfig) -> Result<RouteTable, RouteTableError>;
}

impl<F> RouteFactory for F
where
    F: Fn(&CountrySet, &RoutingConfig) -> Result<RouteTable, RouteTableError> + Send + Sync,
{
    fn build(&self, countries: &CountrySet, routing: &RoutingConfig) -> Result<RouteTable, RouteTableError> {
        self(countries, routing)
    }
}
