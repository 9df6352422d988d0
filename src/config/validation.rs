//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default country/language are configured)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LocaleRouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{LocaleConfig, LocaleRouterConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one country must be configured")]
    NoCountries,

    #[error("invalid country code {0:?}")]
    InvalidCountryCode(String),

    #[error("country {0:?} is configured more than once")]
    DuplicateCountry(String),

    #[error("country {0:?} has no languages")]
    NoLanguages(String),

    #[error("invalid language code {language:?} for country {country:?}")]
    InvalidLanguageCode { country: String, language: String },

    #[error("default language {language:?} is not offered in country {country:?}")]
    UnknownDefaultLanguage { country: String, language: String },

    #[error("default country {0:?} is not configured")]
    UnknownDefaultCountry(String),

    #[error("cookie name for {0} must not be empty")]
    EmptyCookieName(&'static str),

    #[error("script prefix {0:?} must start and end with '/'")]
    InvalidScriptPrefix(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid {field} address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("unknown log format {0:?} (expected \"pretty\" or \"json\")")]
    UnknownLogFormat(String),
}

/// Validate the whole configuration.
pub fn validate_config(config: &LocaleRouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = match validate_locale(&config.locale) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    let prefix = &config.routing.script_prefix;
    if !prefix.starts_with('/') || !prefix.ends_with('/') {
        errors.push(ValidationError::InvalidScriptPrefix(prefix.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics",
            value: config.observability.metrics_address.clone(),
        });
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::UnknownLogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the locale section on its own; the country set is built from it.
pub fn validate_locale(config: &LocaleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.countries.is_empty() {
        errors.push(ValidationError::NoCountries);
    }

    let mut seen = HashSet::new();
    for country in &config.countries {
        if !is_valid_code(&country.code) {
            errors.push(ValidationError::InvalidCountryCode(country.code.clone()));
        }
        if !seen.insert(country.code.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateCountry(country.code.clone()));
        }
        if country.languages.is_empty() {
            errors.push(ValidationError::NoLanguages(country.code.clone()));
        }
        for language in &country.languages {
            if !is_valid_code(language) {
                errors.push(ValidationError::InvalidLanguageCode {
                    country: country.code.clone(),
                    language: language.clone(),
                });
            }
        }
        if let Some(default) = &country.default_language {
            if !country
                .languages
                .iter()
                .any(|language| language.eq_ignore_ascii_case(default))
            {
                errors.push(ValidationError::UnknownDefaultLanguage {
                    country: country.code.clone(),
                    language: default.clone(),
                });
            }
        }
    }

    if !config
        .countries
        .iter()
        .any(|country| country.code.eq_ignore_ascii_case(&config.default_country))
    {
        errors.push(ValidationError::UnknownDefaultCountry(
            config.default_country.clone(),
        ));
    }

    if config.country_cookie.is_empty() {
        errors.push(ValidationError::EmptyCookieName("country"));
    }
    if config.language_cookie.is_empty() {
        errors.push(ValidationError::EmptyCookieName("language"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Codes become single path segments: lowercase ASCII alphanumerics, '-' or '_'.
fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
