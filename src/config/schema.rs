//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LocaleRouterConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Recognised countries, their languages and negotiation inputs.
    pub locale: LocaleConfig,

    /// Prefix routing and repair-redirect policy.
    pub routing: RoutingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Locale configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Country activated when the request pins none.
    pub default_country: String,

    /// All recognised countries.
    pub countries: Vec<CountryConfig>,

    /// Cookie consulted for the country when the path has no prefix.
    pub country_cookie: String,

    /// Cookie consulted for the language when the path has no language segment.
    pub language_cookie: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default_country: "us".to_string(),
            countries: vec![
                CountryConfig {
                    code: "us".to_string(),
                    languages: vec!["en".to_string(), "es".to_string()],
                    default_language: None,
                },
                CountryConfig {
                    code: "fr".to_string(),
                    languages: vec!["fr".to_string(), "en".to_string()],
                    default_language: None,
                },
                CountryConfig {
                    code: "de".to_string(),
                    languages: vec!["de".to_string(), "en".to_string()],
                    default_language: None,
                },
            ],
            country_cookie: "country".to_string(),
            language_cookie: "language".to_string(),
        }
    }
}

/// One recognised country.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CountryConfig {
    /// URL code, e.g. "us".
    pub code: String,

    /// Languages offered in this country; the first is the default.
    pub languages: Vec<String>,

    /// Overrides the default language (must be one of `languages`).
    #[serde(default)]
    pub default_language: Option<String>,
}

/// Prefix routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Require the default country's code in URLs too.
    pub prefix_default_country: bool,

    /// Try the slash-appended path when repairing a missing prefix.
    pub append_slash: bool,

    /// Sub-path the application is mounted under (starts and ends with '/').
    pub script_prefix: String,

    /// Use 301 instead of 302 for locale repair redirects.
    pub permanent_redirects: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            prefix_default_country: true,
            append_slash: true,
            script_prefix: "/".to_string(),
            permanent_redirects: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
