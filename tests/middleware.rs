//! Locale middleware behaviour through the assembled router.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;

use locale_prefix_router::config::RoutingConfig;
use locale_prefix_router::locale::CountrySet;
use locale_prefix_router::routing::{country_patterns, route, RouteTable, RouteTableError};
use locale_prefix_router::LocaleServer;

mod common;

use common::{body_json, header, send_get, send_get_with};

#[tokio::test]
async fn test_missing_prefix_redirects_to_default_country() {
    let router = common::server(common::config()).router();

    let response = send_get(router, "/some/view?page=2").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header(&response, "location"), Some("/us/some/view?page=2"));
}

#[tokio::test]
async fn test_missing_prefix_and_slash_redirects_once() {
    let router = common::server(common::config()).router();

    let response = send_get(router, "/subpath").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header(&response, "location"), Some("/us/subpath/"));
}

#[tokio::test]
async fn test_root_redirects_to_default_country_root() {
    let router = common::server(common::config()).router();

    let response = send_get(router.clone(), "/").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header(&response, "location"), Some("/us/"));

    let response = send_get(router, "/subpath?x=1").await;
    assert_eq!(header(&response, "location"), Some("/us/subpath/?x=1"));
}

#[tokio::test]
async fn test_redirect_follows_negotiated_country() {
    let router = common::server(common::config()).router();

    let response = send_get_with(router.clone(), "/subpath/", &[("cookie", "country=fr")]).await;
    assert_eq!(header(&response, "location"), Some("/fr/subpath/"));

    let response = send_get_with(router, "/subpath/", &[("accept-language", "de-DE,de;q=0.9")]).await;
    assert_eq!(header(&response, "location"), Some("/de/subpath/"));
}

#[tokio::test]
async fn test_bare_country_redirects_to_trailing_slash() {
    let router = common::server(common::config()).router();

    let response = send_get(router, "/fr").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header(&response, "location"), Some("/fr/"));
}

#[tokio::test]
async fn test_prefixed_request_is_served_under_its_country() {
    let router = common::server(common::config()).router();

    let response = send_get(router, "/fr/subpath/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-language"), Some("fr-fr"));
    assert_eq!(header(&response, "vary"), Some("Accept-Language"));

    let body = body_json(response).await;
    assert_eq!(body["active_country"], "fr");
    assert_eq!(body["active_language_code"], "fr-fr");
    assert_eq!(body["resolved"]["country"], "fr");
    assert_eq!(body["route"]["route_name"], "subpath");
    assert_eq!(body["route"]["route"], "fr/subpath/");
    assert_eq!(body["route"]["country"], "fr");
}

#[tokio::test]
async fn test_accept_language_selects_supported_language() {
    let router = common::server(common::config()).router();

    let response = send_get_with(router, "/fr/", &[("accept-language", "es, en;q=0.5")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-language"), Some("en"));

    let body = body_json(response).await;
    assert_eq!(body["resolved"]["language"], "en");
    assert_eq!(body["route"]["route_name"], "default");
}

#[tokio::test]
async fn test_language_segment_drops_vary() {
    let router = common::server(common::config()).router();

    // No route below the language segment, but headers are still patched.
    let response = send_get(router, "/fr/en/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get("vary").is_none());
    assert_eq!(header(&response, "content-language"), Some("en"));
}

#[tokio::test]
async fn test_unprefixed_routes_still_resolve() {
    let router = common::server(common::config()).router();

    let response = send_get(router.clone(), "/xx/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-language"), Some("en-us"));

    let response = send_get(router, "/yy/zz/").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unrepairable_404_is_kept() {
    let router = common::server(common::config()).router();

    let response = send_get(router.clone(), "/nowhere/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(header(&response, "vary"), Some("Accept-Language"));

    // Unknown country segment; the repaired candidate does not route either.
    let response = send_get(router, "/it/subpath/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_no_repair_without_default_country_prefix() {
    let mut config = common::config();
    config.routing.prefix_default_country = false;
    let router = common::server(config).router();

    let response = send_get(router, "/some/view").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_script_prefix_and_permanent_redirects() {
    let mut config = common::config();
    config.routing.script_prefix = "/shop/".into();
    config.routing.permanent_redirects = true;
    let router = common::server(config).router();

    let response = send_get(router.clone(), "/shop/some/view").await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(header(&response, "location"), Some("/shop/us/some/view"));

    let response = send_get(router.clone(), "/shop/fr").await;
    assert_eq!(header(&response, "location"), Some("/shop/fr/"));

    let response = send_get(router, "/shop/de/subpath/").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_script_prefix_mount_edges() {
    let mut config = common::config();
    config.routing.script_prefix = "/shop/".into();
    let router = common::server(config).router();

    // Bare mount without its trailing slash.
    let response = send_get(router.clone(), "/shop").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header(&response, "location"), Some("/shop/us/"));

    let response = send_get(router.clone(), "/shop/subpath?x=1").await;
    assert_eq!(header(&response, "location"), Some("/shop/us/subpath/?x=1"));

    // Outside the mount nothing routes and nothing is repaired.
    for path in ["/subpath/", "/us/subpath/", "/shopping/"] {
        let response = send_get(router.clone(), path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        assert!(response.headers().get("location").is_none(), "{path}");
    }
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let router = common::server(common::config()).router();

    let response = send_get(router.clone(), "/us/").await;
    let generated = header(&response, "x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let response = send_get_with(router, "/some/view", &[("x-request-id", "req-42")]).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header(&response, "x-request-id"), Some("req-42"));
}

#[tokio::test]
async fn test_reload_swaps_route_table_and_countries() {
    let server = common::server(common::config());
    let router = server.router();
    let before = server.state().snapshot().routes.id();

    let response = send_get(router.clone(), "/gb/subpath/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.state().reload(&common::config_with("gb", &["en"])).unwrap();
    assert_ne!(server.state().snapshot().routes.id(), before);

    let response = send_get(router, "/gb/subpath/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-language"), Some("en-gb"));
}

#[tokio::test]
async fn test_invalid_reload_keeps_current_snapshot() {
    let server = common::server(common::config());
    let before = server.state().snapshot().routes.id();

    let mut config = common::config();
    config.locale.default_country = "zz".into();
    assert!(server.state().reload(&config).is_err());
    assert_eq!(server.state().snapshot().routes.id(), before);

    let response = send_get(server.router(), "/us/").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_keep_their_own_locale() {
    let router = common::server(common::config()).router();

    let mut tasks = Vec::new();
    for i in 0..48 {
        let country = ["us", "fr", "de"][i % 3];
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            let response = send_get(router, &format!("/{country}/subpath/")).await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["active_country"], country);
            assert_eq!(body["route"]["country"], country);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "late"
}

fn slow_routes(countries: &CountrySet, routing: &RoutingConfig) -> Result<RouteTable, RouteTableError> {
    RouteTable::new(vec![country_patterns(
        countries.default_country().clone(),
        routing.prefix_default_country,
        vec![route("slow/", get(slow)).into()],
    )
    .into()])
}

#[tokio::test]
async fn test_slow_handler_times_out_with_408() {
    let mut config = common::config();
    config.timeouts.request_secs = 1;
    let router = LocaleServer::new(config, slow_routes)
        .unwrap()
        .router();

    let response = send_get(router, "/us/slow/").await;
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}
