//! Route table lookup.
//!
//! # Responsibilities
//! - Store route entries (endpoints and country-prefixed subtrees)
//! - Resolve a path under the request's locale to an endpoint
//! - Answer "is this path routable?" without failing
//! - Report whether country prefix routing is in use
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins, in registration order
//! - Each table gets a process-unique id; introspection is memoized per table,
//!   so a reloaded table starts with a fresh memo

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use axum::routing::MethodRouter;
use serde::Serialize;
use thiserror::Error;

use crate::locale::{Country, Language, LocaleContext};
use crate::routing::pattern::{LiteralPattern, RoutePattern};
use crate::routing::resolver::CountryPrefixResolver;

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Errors raised while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("route name {0:?} is used more than once")]
    DuplicateName(String),

    #[error("route pattern {0:?} must not start with '/'")]
    LeadingSlash(String),
}

/// A named handler registered under a literal pattern.
#[derive(Clone)]
pub struct Endpoint {
    pattern: LiteralPattern,
    name: Option<String>,
    handler: MethodRouter,
}

impl Endpoint {
    pub fn new(pattern: LiteralPattern, handler: MethodRouter) -> Self {
        Self {
            pattern,
            name: None,
            handler,
        }
    }

    /// Attach a route name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pattern(&self) -> &LiteralPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &MethodRouter {
        &self.handler
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Endpoint matching `path` exactly (no leading '/').
pub fn route(path: impl Into<String>, handler: MethodRouter) -> Endpoint {
    Endpoint::new(LiteralPattern::exact(path), handler)
}

/// Endpoint matching every path starting with `prefix`.
pub fn route_prefix(prefix: impl Into<String>, handler: MethodRouter) -> Endpoint {
    Endpoint::new(LiteralPattern::prefix(prefix), handler)
}

/// One entry of a route table or subtree.
#[derive(Debug)]
pub enum RouteEntry {
    Endpoint(Endpoint),
    CountryPrefixed(CountryPrefixResolver),
}

impl From<Endpoint> for RouteEntry {
    fn from(endpoint: Endpoint) -> Self {
        Self::Endpoint(endpoint)
    }
}

impl From<CountryPrefixResolver> for RouteEntry {
    fn from(resolver: CountryPrefixResolver) -> Self {
        Self::CountryPrefixed(resolver)
    }
}

/// What routing captured for a request; attached to the request for handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteCaptures {
    /// Name of the matched endpoint.
    pub route_name: Option<String>,
    /// Concrete path pattern that matched, e.g. `fr/subpath/`.
    pub route: String,
    /// Country whose prefix was stripped, if any.
    pub country: Option<Country>,
    /// Language active when the prefix was stripped.
    pub language: Option<Language>,
    /// Unmatched tail for prefix endpoints.
    pub tail: String,
}

/// A successful lookup.
#[derive(Debug)]
pub struct ResolvedRoute<'t> {
    endpoint: &'t Endpoint,
    captures: RouteCaptures,
}

impl<'t> ResolvedRoute<'t> {
    pub fn endpoint(&self) -> &'t Endpoint {
        self.endpoint
    }

    pub fn captures(&self) -> &RouteCaptures {
        &self.captures
    }

    pub fn into_captures(self) -> RouteCaptures {
        self.captures
    }
}

/// Whether a table routes through a country prefix, and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrefixUsage {
    pub used: bool,
    pub prefix_default_country: bool,
}

/// Identity of a route table instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TableId(u64);

/// Immutable, ordered set of routes.
#[derive(Debug)]
pub struct RouteTable {
    id: TableId,
    entries: Vec<RouteEntry>,
    prefix_usage: OnceLock<PrefixUsage>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate route names and absolute patterns.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteTableError> {
        let mut names = HashSet::new();
        check_entries(&entries, &mut names)?;

        Ok(Self {
            id: TableId(NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed)),
            entries,
            prefix_usage: OnceLock::new(),
        })
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Resolve `path_info` (with its leading '/') under `ctx`.
    pub fn resolve<'t>(&'t self, path_info: &str, ctx: &LocaleContext) -> Option<ResolvedRoute<'t>> {
        let path = path_info.strip_prefix('/').unwrap_or(path_info);
        resolve_entries(&self.entries, path, ctx, &RouteCaptures::default())
    }

    /// True when `path_info` resolves under `ctx`. Never fails.
    pub fn is_valid_path(&self, path_info: &str, ctx: &LocaleContext) -> bool {
        self.resolve(path_info, ctx).is_some()
    }

    /// Country prefix usage of the top-level entries, computed once per table.
    pub fn prefix_usage(&self) -> PrefixUsage {
        *self.prefix_usage.get_or_init(|| {
            self.country_prefix_resolver()
                .map(|resolver| PrefixUsage {
                    used: true,
                    prefix_default_country: resolver.prefix_default_country(),
                })
                .unwrap_or_default()
        })
    }

    /// First top-level country-prefixed subtree, if any.
    pub fn country_prefix_resolver(&self) -> Option<&CountryPrefixResolver> {
        self.entries.iter().find_map(|entry| match entry {
            RouteEntry::CountryPrefixed(resolver) => Some(resolver),
            RouteEntry::Endpoint(_) => None,
        })
    }

    /// One line per endpoint, patterns rendered under `ctx`.
    pub fn describe(&self, ctx: &LocaleContext) -> Vec<String> {
        let mut lines = Vec::new();
        describe_entries(&self.entries, ctx, "", &mut lines);
        lines
    }
}

pub(crate) fn resolve_entries<'t>(
    entries: &'t [RouteEntry],
    path: &str,
    ctx: &LocaleContext,
    outer: &RouteCaptures,
) -> Option<ResolvedRoute<'t>> {
    entries.iter().find_map(|entry| match entry {
        RouteEntry::Endpoint(endpoint) => {
            let matched = endpoint.pattern.matches(path, ctx)?;
            let consumed = &path[..path.len() - matched.remainder.len()];
            Some(ResolvedRoute {
                endpoint,
                captures: RouteCaptures {
                    route_name: endpoint.name.clone(),
                    route: format!("{}{}", outer.route, consumed),
                    country: outer.country.clone(),
                    language: outer.language.clone(),
                    tail: matched.remainder.to_string(),
                },
            })
        }
        RouteEntry::CountryPrefixed(resolver) => resolver.resolve(path, ctx, outer),
    })
}

pub(crate) fn describe_entries(
    entries: &[RouteEntry],
    ctx: &LocaleContext,
    outer: &str,
    lines: &mut Vec<String>,
) {
    for entry in entries {
        match entry {
            RouteEntry::Endpoint(endpoint) => {
                let name = endpoint.name.as_deref().unwrap_or("-");
                lines.push(format!("{}{} [{}]", outer, endpoint.pattern.describe(ctx), name));
            }
            RouteEntry::CountryPrefixed(resolver) => {
                let outer = format!("{}{} ", outer, resolver.pattern().describe(ctx));
                describe_entries(resolver.routes(), ctx, &outer, lines);
            }
        }
    }
}

fn check_entries(entries: &[RouteEntry], names: &mut HashSet<String>) -> Result<(), RouteTableError> {
    for entry in entries {
        match entry {
            RouteEntry::Endpoint(endpoint) => {
                if endpoint.pattern.as_str().starts_with('/') {
                    return Err(RouteTableError::LeadingSlash(
                        endpoint.pattern.as_str().to_string(),
                    ));
                }
                if let Some(name) = &endpoint.name {
                    if !names.insert(name.clone()) {
                        return Err(RouteTableError::DuplicateName(name.clone()));
                    }
                }
            }
            RouteEntry::CountryPrefixed(resolver) => check_entries(resolver.routes(), names)?,
        }
    }
    Ok(())
}
