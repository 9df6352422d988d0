//! Country and language negotiation from the request.
//!
//! # Responsibilities
//! - Read an explicit `/<country>/<language>/` prefix from the path
//! - Fall back to cookies, then `Accept-Language`
//! - Never return a code outside the configured set
//!
//! # Design Decisions
//! - Pure function of (path, headers): the middleware calls it twice per request
//! - Unknown codes are dropped here, so downstream code never re-validates

use std::fmt::Debug;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use serde::Serialize;

use super::country::{Country, CountrySet, Language, LanguageCode};

/// Outcome of negotiation, attached to the request for downstream consumers.
///
/// `country` and `language` stay `None` when nothing in the request pinned
/// them; `language_code` is always usable for activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocale {
    pub country: Option<Country>,
    pub language: Option<Language>,
    pub language_code: LanguageCode,
}

/// Resolves the request's country and language.
pub trait LocaleNegotiator: Send + Sync + Debug {
    fn resolve(&self, path_info: &str, headers: &HeaderMap) -> ResolvedLocale;
}

/// Path, then cookies, then `Accept-Language`.
#[derive(Debug, Clone)]
pub struct DefaultNegotiator {
    countries: Arc<CountrySet>,
    country_cookie: String,
    language_cookie: String,
}

impl DefaultNegotiator {
    pub fn new(
        countries: Arc<CountrySet>,
        country_cookie: impl Into<String>,
        language_cookie: impl Into<String>,
    ) -> Self {
        Self {
            countries,
            country_cookie: country_cookie.into(),
            language_cookie: language_cookie.into(),
        }
    }

    fn country_from_headers(&self, headers: &HeaderMap, accepted: &[LanguageTag]) -> Option<Country> {
        if let Some(country) = cookie(headers, &self.country_cookie)
            .and_then(|value| self.countries.get(value))
        {
            return Some(country.clone());
        }
        accepted
            .iter()
            .filter_map(|tag| tag.region.as_deref())
            .find_map(|region| self.countries.get(region))
            .cloned()
    }

    fn language_from_headers(
        &self,
        headers: &HeaderMap,
        accepted: &[LanguageTag],
        country: &Country,
    ) -> Option<Language> {
        if let Some(language) = cookie(headers, &self.language_cookie)
            .and_then(|value| self.countries.language(country, value))
        {
            return Some(language.clone());
        }
        accepted
            .iter()
            .find_map(|tag| self.countries.language(country, &tag.primary))
            .cloned()
    }
}

impl LocaleNegotiator for DefaultNegotiator {
    fn resolve(&self, path_info: &str, headers: &HeaderMap) -> ResolvedLocale {
        let accepted = accept_language(headers);

        let country = match self.countries.country_from_path(path_info) {
            Some(country) => Some(country.clone()),
            None => self.country_from_headers(headers, &accepted),
        };
        let effective = country
            .clone()
            .unwrap_or_else(|| self.countries.default_country().clone());

        let language = match self.countries.language_from_path(path_info) {
            Some(language) => Some(language.clone()),
            None => self.language_from_headers(headers, &accepted, &effective),
        };

        let language_code = match &language {
            Some(language) => LanguageCode::compose(language, &effective),
            None => LanguageCode::compose(self.countries.default_language(&effective), &effective),
        };

        ResolvedLocale {
            country,
            language,
            language_code,
        }
    }
}

/// One `Accept-Language` entry split into primary subtag and optional region.
#[derive(Debug, Clone, PartialEq)]
struct LanguageTag {
    primary: String,
    region: Option<String>,
    quality: f32,
}

/// Parse `Accept-Language`, best quality first; equal qualities keep header order.
fn accept_language(headers: &HeaderMap) -> Vec<LanguageTag> {
    let Some(value) = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
    else {
        return Vec::new();
    };

    let mut tags: Vec<LanguageTag> = value
        .split(',')
        .filter_map(|part| {
            let mut params = part.split(';').map(str::trim);
            let tag = params.next().filter(|tag| !tag.is_empty() && *tag != "*")?;
            let quality = params
                .find_map(|param| param.strip_prefix("q="))
                .map(|q| q.parse::<f32>().ok())
                .unwrap_or(Some(1.0))?;
            if !quality.is_finite() || quality <= 0.0 || quality > 1.0 {
                return None;
            }
            let mut subtags = tag.split(['-', '_']);
            let primary = subtags.next()?.to_ascii_lowercase();
            let region = subtags
                .find(|subtag| subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()))
                .map(str::to_ascii_lowercase);
            Some(LanguageTag {
                primary,
                region,
                quality,
            })
        })
        .collect();

    // Stable sort keeps header order among equal qualities.
    tags.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    tags
}

/// Value of the cookie `name`, if present.
fn cookie<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CountryConfig, LocaleConfig};
    use axum::http::HeaderValue;

    fn negotiator() -> DefaultNegotiator {
        let config = LocaleConfig {
            default_country: "us".into(),
            countries: vec![
                CountryConfig {
                    code: "us".into(),
                    languages: vec!["en".into(), "es".into()],
                    default_language: None,
                },
                CountryConfig {
                    code: "fr".into(),
                    languages: vec!["fr".into(), "en".into()],
                    default_language: None,
                },
            ],
            ..LocaleConfig::default()
        };
        let countries = Arc::new(CountrySet::try_from(&config).unwrap());
        DefaultNegotiator::new(countries, "country", "language")
    }

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(name.clone(), HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_path_wins() {
        let resolved = negotiator().resolve(
            "/fr/en/page/",
            &headers(&[(header::ACCEPT_LANGUAGE, "es-US")]),
        );
        assert_eq!(resolved.country, Some(Country::new("fr")));
        assert_eq!(resolved.language, Some(Language::new("en")));
        assert_eq!(resolved.language_code.as_str(), "en-fr");
    }

    #[test]
    fn test_nothing_pinned_uses_defaults_for_code_only() {
        let resolved = negotiator().resolve("/some/view", &HeaderMap::new());
        assert_eq!(resolved.country, None);
        assert_eq!(resolved.language, None);
        assert_eq!(resolved.language_code.as_str(), "en-us");
    }

    #[test]
    fn test_country_prefix_without_language() {
        let resolved = negotiator().resolve("/fr/some/view", &HeaderMap::new());
        assert_eq!(resolved.country, Some(Country::new("fr")));
        assert_eq!(resolved.language, None);
        assert_eq!(resolved.language_code.as_str(), "fr-fr");
    }

    #[test]
    fn test_cookies() {
        let resolved = negotiator().resolve(
            "/some/view",
            &headers(&[(header::COOKIE, "session=abc; country=fr; language=en")]),
        );
        assert_eq!(resolved.country, Some(Country::new("fr")));
        assert_eq!(resolved.language, Some(Language::new("en")));
    }

    #[test]
    fn test_unknown_cookie_values_are_ignored() {
        let resolved = negotiator().resolve(
            "/",
            &headers(&[(header::COOKIE, "country=zz; language=xx")]),
        );
        assert_eq!(resolved.country, None);
        assert_eq!(resolved.language, None);
    }

    #[test]
    fn test_accept_language_quality_order() {
        let resolved = negotiator().resolve(
            "/",
            &headers(&[(header::ACCEPT_LANGUAGE, "de-DE;q=0.9, es-US;q=0.5, fr-FR")]),
        );
        assert_eq!(resolved.country, Some(Country::new("fr")));
        assert_eq!(resolved.language, Some(Language::new("fr")));
        assert_eq!(resolved.language_code.as_str(), "fr-fr");
    }

    #[test]
    fn test_accept_language_language_must_fit_country() {
        // es is not offered in fr; en is.
        let resolved = negotiator().resolve(
            "/fr/",
            &headers(&[(header::ACCEPT_LANGUAGE, "es, en;q=0.8")]),
        );
        assert_eq!(resolved.language, Some(Language::new("en")));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let negotiator = negotiator();
        let headers = headers(&[(header::ACCEPT_LANGUAGE, "es-US")]);
        assert_eq!(
            negotiator.resolve("/x/", &headers),
            negotiator.resolve("/x/", &headers)
        );
    }

    #[test]
    fn test_accept_language_parsing() {
        let tags = accept_language(&headers(&[(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9,*;q=0.1,fr;q=0")]));
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].primary, "en");
        assert_eq!(tags[0].region.as_deref(), Some("us"));
        assert_eq!(tags[1].region, None);
    }

    #[test]
    fn test_accept_language_rejects_bad_quality() {
        let tags = accept_language(&headers(&[(
            header::ACCEPT_LANGUAGE,
            "de;q=NaN, es;q=inf, it;q=1.5, fr;q=0.3",
        )]));
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].primary, "fr");

        let resolved = negotiator().resolve(
            "/us/",
            &headers(&[(header::ACCEPT_LANGUAGE, "es;q=NaN, en;q=0.2")]),
        );
        assert_eq!(resolved.language, Some(Language::new("en")));
    }
}
