//! Route patterns.
//!
//! # Responsibilities
//! - Define the pattern abstraction route entries are registered under
//! - Match literal path segments (exact or prefix)
//! - Match the dynamic country prefix computed from the active locale
//!
//! # Design Decisions
//! - Patterns receive the request's `LocaleContext` explicitly; nothing global
//! - No regex in hot path: a compiled prefix matcher is a literal
//! - One compiled matcher per prefix key, memoized for the pattern's lifetime

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::locale::{Country, Language, LocaleContext, PrefixKey};
use crate::observability::metrics;

/// Result of a successful pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'p> {
    /// Path left over for the next pattern.
    pub remainder: &'p str,
    /// Country the matched prefix stands for, if the pattern carries one.
    pub country: Option<Country>,
    /// Language active when the prefix matched.
    pub language: Option<Language>,
}

/// A pattern route entries can be registered under.
///
/// Implementations are re-queried on every request and may depend on the
/// active locale.
pub trait RoutePattern: Send + Sync + fmt::Debug {
    /// Match `path` (no leading '/') under `ctx`.
    fn matches<'p>(&self, path: &'p str, ctx: &LocaleContext) -> Option<PatternMatch<'p>>;

    /// Human-readable form of the pattern under `ctx`.
    fn describe(&self, ctx: &LocaleContext) -> String;
}

/// Static literal pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralPattern {
    /// Whole remaining path must equal the literal.
    Exact(String),
    /// Remaining path must start with the literal.
    Prefix(String),
}

impl LiteralPattern {
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    pub fn prefix(path: impl Into<String>) -> Self {
        Self::Prefix(path.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(path) | Self::Prefix(path) => path,
        }
    }
}

impl RoutePattern for LiteralPattern {
    fn matches<'p>(&self, path: &'p str, _ctx: &LocaleContext) -> Option<PatternMatch<'p>> {
        let remainder = match self {
            Self::Exact(literal) => (path == literal).then_some(""),
            Self::Prefix(literal) => path.strip_prefix(literal.as_str()),
        }?;
        Some(PatternMatch {
            remainder,
            country: None,
            language: None,
        })
    }

    fn describe(&self, _ctx: &LocaleContext) -> String {
        match self {
            Self::Exact(literal) => format!("'{}'", literal),
            Self::Prefix(literal) => format!("'{}*'", literal),
        }
    }
}

/// A compiled country prefix, e.g. `fr/`.
#[derive(Debug, PartialEq, Eq)]
pub struct PrefixMatcher {
    country: Option<Country>,
    prefix: String,
}

impl PrefixMatcher {
    /// Literal prefix this matcher strips; empty matches every path.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn country(&self) -> Option<&Country> {
        self.country.as_ref()
    }

    /// Path with the prefix removed, or `None` when it doesn't start with it.
    pub fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_prefix(self.prefix.as_str())
    }
}

/// Dynamic `<country>/` prefix computed from the active locale.
#[derive(Debug)]
pub struct CountryPrefixPattern {
    prefix_default_country: bool,
    default_country: Country,
    matchers: DashMap<PrefixKey, Arc<PrefixMatcher>>,
}

impl CountryPrefixPattern {
    pub fn new(default_country: Country, prefix_default_country: bool) -> Self {
        Self {
            prefix_default_country,
            default_country,
            matchers: DashMap::new(),
        }
    }

    pub fn prefix_default_country(&self) -> bool {
        self.prefix_default_country
    }

    /// Prefix implied by `ctx`.
    ///
    /// Empty when no country is pinned and the default country is not
    /// prefixed; `"<country-or-default>/"` otherwise.
    pub fn current_prefix(&self, ctx: &LocaleContext) -> String {
        self.matcher_for(ctx).prefix().to_string()
    }

    /// Compiled matcher for `ctx`, built at most once per prefix key.
    pub fn matcher_for(&self, ctx: &LocaleContext) -> Arc<PrefixMatcher> {
        let key = ctx.prefix_key();
        if let Some(matcher) = self.matchers.get(&key) {
            return Arc::clone(matcher.value());
        }

        let matcher = Arc::clone(
            self.matchers
                .entry(key.clone())
                .or_insert_with(|| Arc::new(self.compile(&key)))
                .value(),
        );
        metrics::record_prefix_cache_size(self.matchers.len());
        tracing::debug!(prefix = %matcher.prefix, "Compiled country prefix matcher");
        matcher
    }

    /// Number of distinct prefix keys compiled so far.
    pub fn cached_matchers(&self) -> usize {
        self.matchers.len()
    }

    fn compile(&self, key: &PrefixKey) -> PrefixMatcher {
        match key {
            PrefixKey::Unset if !self.prefix_default_country => PrefixMatcher {
                country: None,
                prefix: String::new(),
            },
            PrefixKey::Unset => PrefixMatcher {
                country: Some(self.default_country.clone()),
                prefix: format!("{}/", self.default_country),
            },
            PrefixKey::Country(country) => PrefixMatcher {
                country: Some(country.clone()),
                prefix: format!("{}/", country),
            },
        }
    }
}

impl RoutePattern for CountryPrefixPattern {
    fn matches<'p>(&self, path: &'p str, ctx: &LocaleContext) -> Option<PatternMatch<'p>> {
        let matcher = self.matcher_for(ctx);
        let remainder = matcher.strip(path)?;
        Some(PatternMatch {
            remainder,
            country: matcher.country().cloned(),
            language: ctx.language().cloned(),
        })
    }

    fn describe(&self, ctx: &LocaleContext) -> String {
        format!("'{}'", self.current_prefix(ctx))
    }
}
