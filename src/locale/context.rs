//! Per-request locale context.
//!
//! The active locale travels with the request in two ways: as a request
//! extension (read by the dispatcher and route patterns) and as a
//! task-local scoped to the request's future (read by handlers through
//! [`current`]). Neither is process-global, so concurrent requests never
//! observe each other's locale.

use std::future::Future;

use super::country::{Country, Language, LanguageCode};

tokio::task_local! {
    static ACTIVE_LOCALE: LocaleContext;
}

/// Cache key for prefix matchers: the active country, or the "no country" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrefixKey {
    Country(Country),
    Unset,
}

/// The country and language active for one in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleContext {
    country: Option<Country>,
    language: Option<Language>,
    language_code: LanguageCode,
}

impl LocaleContext {
    pub fn new(
        country: Option<Country>,
        language: Option<Language>,
        language_code: LanguageCode,
    ) -> Self {
        Self {
            country,
            language,
            language_code,
        }
    }

    /// Context with `country` pinned, as activated by the middleware.
    pub fn activate(
        country: Country,
        language: Option<Language>,
        language_code: LanguageCode,
    ) -> Self {
        Self::new(Some(country), language, language_code)
    }

    /// `None` means no country was pinned; matching falls back to the default.
    pub fn country(&self) -> Option<&Country> {
        self.country.as_ref()
    }

    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    pub fn language_code(&self) -> &LanguageCode {
        &self.language_code
    }

    pub fn prefix_key(&self) -> PrefixKey {
        match &self.country {
            Some(country) => PrefixKey::Country(country.clone()),
            None => PrefixKey::Unset,
        }
    }
}

/// Run `fut` with `context` as the active locale.
pub async fn scope<F>(context: LocaleContext, fut: F) -> F::Output
where
    F: Future,
{
    ACTIVE_LOCALE.scope(context, fut).await
}

/// The locale active for the current task, if any.
pub fn current() -> Option<LocaleContext> {
    ACTIVE_LOCALE.try_with(LocaleContext::clone).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(country: &str, language: &str) -> LocaleContext {
        let country = Country::new(country);
        let language = Language::new(language);
        let code = LanguageCode::compose(&language, &country);
        LocaleContext::activate(country, Some(language), code)
    }

    #[test]
    fn test_no_context_outside_scope() {
        assert!(current().is_none());
    }

    #[test]
    fn test_prefix_key() {
        assert_eq!(
            context("fr", "fr").prefix_key(),
            PrefixKey::Country(Country::new("fr"))
        );
        let unset = LocaleContext::new(None, None, LanguageCode::compose(&Language::new("en"), &Country::new("us")));
        assert_eq!(unset.prefix_key(), PrefixKey::Unset);
    }

    #[tokio::test]
    async fn test_scope_exposes_context() {
        let ctx = context("de", "de");
        let seen = scope(ctx.clone(), async { current() }).await;
        assert_eq!(seen, Some(ctx));
        assert!(current().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_scopes_do_not_leak() {
        let mut tasks = Vec::new();
        for i in 0..64 {
            let country = if i % 2 == 0 { "us" } else { "fr" };
            let ctx = context(country, "en");
            tasks.push(tokio::spawn(scope(ctx.clone(), async move {
                for _ in 0..10 {
                    tokio::task::yield_now().await;
                    assert_eq!(current().as_ref(), Some(&ctx));
                }
            })));
        }
        for task in tasks {
            task.await.unwrap();
        }
    }
}
