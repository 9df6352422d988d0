//! Country and language identifiers plus the configured country set.
//!
//! # Design Decisions
//! - Codes are normalized to lowercase once, at construction
//! - The set is immutable after construction and shared via Arc
//! - Path helpers only recognise configured codes; anything else is "no prefix"

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::validation::{validate_locale, ValidationError};
use crate::config::LocaleConfig;

/// A configured country code, e.g. `us`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Country(String);

impl Country {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A language code as it appears in URLs and cookies, e.g. `en`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Country-qualified language code used for activation and headers, e.g. `en-us`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Compose `<language>-<country>`.
    pub fn compose(language: &Language, country: &Country) -> Self {
        Self(format!("{}-{}", language, country))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CountryEntry {
    languages: Vec<Language>,
    default_language: Language,
}

/// The finite set of recognised countries and their languages.
#[derive(Debug, Clone)]
pub struct CountrySet {
    countries: BTreeMap<Country, CountryEntry>,
    default_country: Country,
}

impl CountrySet {
    /// Look up a configured country by its URL code.
    pub fn get(&self, code: &str) -> Option<&Country> {
        self.countries
            .get_key_value(&Country::new(code))
            .map(|(country, _)| country)
    }

    pub fn default_country(&self) -> &Country {
        &self.default_country
    }

    /// Iterate all configured countries in code order.
    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.keys()
    }

    /// Default language of `country`, or of the default country when `country` is unknown.
    pub fn default_language(&self, country: &Country) -> &Language {
        let entry = self
            .countries
            .get(country)
            .or_else(|| self.countries.get(&self.default_country));
        match entry {
            Some(entry) => &entry.default_language,
            // Construction guarantees the default country is present.
            None => unreachable!("default country missing from country set"),
        }
    }

    /// Return the language `code` if `country` supports it.
    pub fn language(&self, country: &Country, code: &str) -> Option<&Language> {
        let wanted = Language::new(code);
        self.countries
            .get(country)?
            .languages
            .iter()
            .find(|language| **language == wanted)
    }

    /// Country named by the first path segment, if it is configured.
    ///
    /// Matches `^/<code>(/|$)`.
    pub fn country_from_path(&self, path_info: &str) -> Option<&Country> {
        let (first, _) = leading_segments(path_info)?;
        self.countries
            .get_key_value(&Country(first.to_string()))
            .map(|(country, _)| country)
    }

    /// Language named by the segment right after a configured country segment.
    pub fn language_from_path(&self, path_info: &str) -> Option<&Language> {
        let country = self.country_from_path(path_info)?;
        let (_, second) = leading_segments(path_info)?;
        let second = second?;
        self.countries
            .get(country)?
            .languages
            .iter()
            .find(|language| language.as_str() == second)
    }
}

impl TryFrom<&LocaleConfig> for CountrySet {
    type Error = Vec<ValidationError>;

    fn try_from(config: &LocaleConfig) -> Result<Self, Self::Error> {
        validate_locale(config)?;

        let countries = config
            .countries
            .iter()
            .map(|entry| {
                let languages: Vec<Language> =
                    entry.languages.iter().map(Language::new).collect();
                let default_language = entry
                    .default_language
                    .as_ref()
                    .map(Language::new)
                    .unwrap_or_else(|| languages[0].clone());
                (
                    Country::new(&entry.code),
                    CountryEntry {
                        languages,
                        default_language,
                    },
                )
            })
            .collect();

        Ok(Self {
            countries,
            default_country: Country::new(&config.default_country),
        })
    }
}

/// Split `/<first>/<second>...` into its first two segments.
/// Returns `None` when the path has no non-empty first segment.
fn leading_segments(path_info: &str) -> Option<(&str, Option<&str>)> {
    let rest = path_info.strip_prefix('/')?;
    let mut segments = rest.splitn(3, '/');
    let first = segments.next().filter(|s| !s.is_empty())?;
    let second = segments.next().filter(|s| !s.is_empty());
    Some((first, second))
}
