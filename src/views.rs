//! Sample endpoints served by the binary.
//!
//! The route layout nests a default view and a sub-path under the country
//! prefix, next to two unprefixed routes.

use axum::{extract::Extension, routing::get, Json};
use serde::Serialize;

use crate::config::RoutingConfig;
use crate::locale::{context, Country, CountrySet, Language, LanguageCode, ResolvedLocale};
use crate::routing::{country_patterns, route, RouteCaptures, RouteTable, RouteTableError};

/// Response body of [`locale_info`].
#[derive(Debug, Serialize)]
pub struct LocaleInfo {
    pub resolved: ResolvedLocale,
    pub active_country: Option<Country>,
    pub active_language: Option<Language>,
    pub active_language_code: Option<LanguageCode>,
    pub route: RouteCaptures,
}

/// Echo the negotiated locale, the task-local active locale and the route match.
pub async fn locale_info(
    Extension(resolved): Extension<ResolvedLocale>,
    Extension(route): Extension<RouteCaptures>,
) -> Json<LocaleInfo> {
    let active = context::current();
    Json(LocaleInfo {
        resolved,
        active_country: active.as_ref().and_then(|ctx| ctx.country().cloned()),
        active_language: active.as_ref().and_then(|ctx| ctx.language().cloned()),
        active_language_code: active.map(|ctx| ctx.language_code().clone()),
        route,
    })
}

/// Route table served by the binary.
pub fn demo_routes(countries: &CountrySet, routing: &RoutingConfig) -> Result<RouteTable, RouteTableError> {
    RouteTable::new(vec![
        country_patterns(
            countries.default_country().clone(),
            routing.prefix_default_country,
            vec![
                route("", get(locale_info)).named("default").into(),
                route("subpath/", get(locale_info)).named("subpath").into(),
            ],
        )
        .into(),
        route("xx/", get(locale_info)).named("xx").into(),
        route("yy/zz/", get(locale_info)).named("yyzz").into(),
    ])
}
