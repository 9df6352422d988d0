//! Country-prefixed route subtree.
//!
//! Binds a set of routes to a [`CountryPrefixPattern`]: the active country's
//! prefix is stripped first, then the remainder is dispatched through the
//! wrapped routes. A prefix miss is an ordinary routing miss.

use serde::Serialize;

use crate::locale::{Country, LocaleContext};
use crate::routing::pattern::{CountryPrefixPattern, RoutePattern};
use crate::routing::table::{resolve_entries, ResolvedRoute, RouteCaptures, RouteEntry};

/// Routes registered under the dynamic country prefix.
#[derive(Debug)]
pub struct CountryPrefixResolver {
    pattern: CountryPrefixPattern,
    routes: Vec<RouteEntry>,
}

/// Introspection summary of a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverDescription {
    /// Prefix under the context it was described with, e.g. `'us/'`.
    pub pattern: String,
    pub prefix_default_country: bool,
    pub routes: usize,
}

impl CountryPrefixResolver {
    pub fn new(default_country: Country, prefix_default_country: bool, routes: Vec<RouteEntry>) -> Self {
        Self {
            pattern: CountryPrefixPattern::new(default_country, prefix_default_country),
            routes,
        }
    }

    pub fn pattern(&self) -> &CountryPrefixPattern {
        &self.pattern
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Whether the default country must appear in URLs too.
    pub fn prefix_default_country(&self) -> bool {
        self.pattern.prefix_default_country()
    }

    pub fn describe(&self, ctx: &LocaleContext) -> ResolverDescription {
        ResolverDescription {
            pattern: self.pattern.describe(ctx),
            prefix_default_country: self.prefix_default_country(),
            routes: self.routes.len(),
        }
    }

    pub(crate) fn resolve<'t>(
        &'t self,
        path: &str,
        ctx: &LocaleContext,
        outer: &RouteCaptures,
    ) -> Option<ResolvedRoute<'t>> {
        let matched = self.pattern.matches(path, ctx)?;
        let prefix = &path[..path.len() - matched.remainder.len()];
        let captures = RouteCaptures {
            route_name: None,
            route: format!("{}{}", outer.route, prefix),
            country: matched.country.or_else(|| outer.country.clone()),
            language: matched.language.or_else(|| outer.language.clone()),
            tail: String::new(),
        };
        resolve_entries(&self.routes, matched.remainder, ctx, &captures)
    }
}

/// Register `routes` under the country prefix.
pub fn country_patterns(
    default_country: Country,
    prefix_default_country: bool,
    routes: Vec<RouteEntry>,
) -> CountryPrefixResolver {
    CountryPrefixResolver::new(default_country, prefix_default_country, routes)
}
