//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

use locale_prefix_router::config::{CountryConfig, LocaleRouterConfig, RoutingConfig};
use locale_prefix_router::locale::CountrySet;
use locale_prefix_router::routing::{country_patterns, route, RouteTable, RouteTableError};
use locale_prefix_router::views::locale_info;
use locale_prefix_router::LocaleServer;

/// The sample layout plus one nested, slash-less view.
pub fn routes(countries: &CountrySet, routing: &RoutingConfig) -> Result<RouteTable, RouteTableError> {
    RouteTable::new(vec![
        country_patterns(
            countries.default_country().clone(),
            routing.prefix_default_country,
            vec![
                route("", get(locale_info)).named("default").into(),
                route("subpath/", get(locale_info)).named("subpath").into(),
                route("some/view", get(locale_info)).named("view").into(),
            ],
        )
        .into(),
        route("xx/", get(locale_info)).named("xx").into(),
        route("yy/zz/", get(locale_info)).named("yyzz").into(),
    ])
}

pub fn config() -> LocaleRouterConfig {
    LocaleRouterConfig::default()
}

/// Default configuration with one extra country.
pub fn config_with(code: &str, languages: &[&str]) -> LocaleRouterConfig {
    let mut config = config();
    config.locale.countries.push(CountryConfig {
        code: code.to_string(),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        default_language: None,
    });
    config
}

pub fn server(config: LocaleRouterConfig) -> LocaleServer {
    LocaleServer::new(config, routes).unwrap()
}

/// Drive one GET through `router` with extra headers.
pub async fn send_get_with(router: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    router
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn send_get(router: Router, uri: &str) -> Response<Body> {
    send_get_with(router, uri, &[]).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn header<'r>(response: &'r Response<Body>, name: &str) -> Option<&'r str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
