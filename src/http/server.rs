//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the per-configuration snapshot (country set, negotiator, route table)
//! - Create the Axum Router with the locale middleware and dispatcher
//! - Wire up middleware (tracing, timeout, request ID)
//! - Swap snapshots on configuration reload
//! - Serve until shutdown is signalled

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceExt;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{validate_config, LocaleRouterConfig, RoutingConfig, ValidationError};
use crate::http::middleware::country_language_middleware;
use crate::http::request::{self, MakeRequestUuid, X_REQUEST_ID};
use crate::locale::{CountrySet, DefaultNegotiator, LanguageCode, LocaleContext, LocaleNegotiator};
use crate::observability::metrics;
use crate::routing::{RouteFactory, RouteTable, RouteTableError};

/// Errors raised while building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0:?}")]
    Config(Vec<ValidationError>),

    #[error("invalid route table: {0}")]
    Routes(#[from] RouteTableError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server terminated unexpectedly: {0}")]
    Serve(#[source] std::io::Error),
}

/// Everything request handling needs from one configuration.
///
/// In-flight requests keep the snapshot they started with across reloads.
#[derive(Debug)]
pub struct Snapshot {
    pub countries: Arc<CountrySet>,
    pub negotiator: Arc<dyn LocaleNegotiator>,
    pub routes: Arc<RouteTable>,
    pub routing: RoutingConfig,
}

impl Snapshot {
    /// Validate `config` and build a snapshot with the default negotiator.
    pub fn build(config: &LocaleRouterConfig, factory: &dyn RouteFactory) -> Result<Self, ServerError> {
        validate_config(config).map_err(ServerError::Config)?;
        let countries = Arc::new(CountrySet::try_from(&config.locale).map_err(ServerError::Config)?);
        let negotiator = Arc::new(DefaultNegotiator::new(
            Arc::clone(&countries),
            config.locale.country_cookie.clone(),
            config.locale.language_cookie.clone(),
        ));
        let routes = Arc::new(factory.build(&countries, &config.routing)?);

        Ok(Self {
            countries,
            negotiator,
            routes,
            routing: config.routing.clone(),
        })
    }

    /// Replace the negotiation collaborator.
    pub fn with_negotiator(mut self, negotiator: Arc<dyn LocaleNegotiator>) -> Self {
        self.negotiator = negotiator;
        self
    }

    /// Context with no country pinned, for code running outside the middleware.
    pub fn inactive_context(&self) -> LocaleContext {
        let country = self.countries.default_country();
        let language = self.countries.default_language(country);
        LocaleContext::new(None, None, LanguageCode::compose(language, country))
    }
}

/// Application state injected into the middleware and dispatcher.
#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<ArcSwap<Snapshot>>,
    factory: Arc<dyn RouteFactory>,
}

impl AppState {
    pub fn new(snapshot: Snapshot, factory: Arc<dyn RouteFactory>) -> Self {
        Self {
            snapshot: Arc::new(ArcSwap::from_pointee(snapshot)),
            factory,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Rebuild the snapshot from `config` and swap it in.
    ///
    /// On error the current snapshot stays active.
    pub fn reload(&self, config: &LocaleRouterConfig) -> Result<(), ServerError> {
        let snapshot = Snapshot::build(config, self.factory.as_ref())?;
        tracing::info!(
            table = ?snapshot.routes.id(),
            countries = snapshot.countries.countries().count(),
            "Swapping in reloaded configuration"
        );
        self.snapshot.store(Arc::new(snapshot));
        Ok(())
    }
}

/// HTTP server for the locale-prefixed application.
pub struct LocaleServer {
    router: Router,
    state: AppState,
    config: LocaleRouterConfig,
}

impl LocaleServer {
    /// Create a new server with the given configuration and route factory.
    pub fn new<F>(config: LocaleRouterConfig, factory: F) -> Result<Self, ServerError>
    where
        F: RouteFactory + 'static,
    {
        let factory: Arc<dyn RouteFactory> = Arc::new(factory);
        let snapshot = Snapshot::build(&config, factory.as_ref())?;
        Ok(Self::from_snapshot(config, snapshot, factory))
    }

    /// Create a server around a prepared snapshot (e.g. with a custom negotiator).
    pub fn from_snapshot(
        config: LocaleRouterConfig,
        snapshot: Snapshot,
        factory: Arc<dyn RouteFactory>,
    ) -> Self {
        let state = AppState::new(snapshot, factory);
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            state,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &LocaleRouterConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                country_language_middleware,
            ))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The assembled router, for serving or driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &LocaleRouterConfig {
        &self.config
    }

    /// Serve on `listener`, applying configuration updates, until `shutdown` fires.
    ///
    /// Listener and timeout settings are fixed at startup; reloads replace
    /// the locale and routing snapshot only.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<LocaleRouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr().map_err(ServerError::Serve)?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match state.reload(&config) {
                    Ok(()) => metrics::record_config_reload("applied"),
                    Err(e) => {
                        metrics::record_config_reload("rejected");
                        tracing::error!(error = %e, "Rejected configuration update, keeping current configuration");
                    }
                }
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        reloader.abort();
        served.map_err(ServerError::Serve)?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the path through the route table and hand the request to the endpoint.
async fn dispatch(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start = Instant::now();
    let snapshot = request
        .extensions()
        .get::<Arc<Snapshot>>()
        .cloned()
        .unwrap_or_else(|| state.snapshot());
    let active = request
        .extensions()
        .get::<LocaleContext>()
        .cloned()
        .unwrap_or_else(|| snapshot.inactive_context());
    let method = request.method().to_string();
    let path_info = request::path_info(request.uri().path(), &snapshot.routing.script_prefix)
        .map(str::to_string);

    let Some(resolved) = path_info
        .as_deref()
        .and_then(|path_info| snapshot.routes.resolve(path_info, &active))
    else {
        tracing::debug!(path = %request.uri().path(), "No route matched");
        metrics::record_request(&method, StatusCode::NOT_FOUND.as_u16(), "none", start);
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    let handler = resolved.endpoint().handler().clone();
    let captures = resolved.into_captures();
    let label = captures
        .route_name
        .clone()
        .unwrap_or_else(|| captures.route.clone());
    request.extensions_mut().insert(captures);

    let response = match handler.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    metrics::record_request(&method, response.status().as_u16(), &label, start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{Country, Language, ResolvedLocale};
    use crate::views::demo_routes;
    use axum::http::HeaderMap;

    /// Always resolves to French in France.
    #[derive(Debug)]
    struct Fixed;

    impl LocaleNegotiator for Fixed {
        fn resolve(&self, _path_info: &str, _headers: &HeaderMap) -> ResolvedLocale {
            let country = Country::new("fr");
            let language = Language::new("fr");
            ResolvedLocale {
                language_code: LanguageCode::compose(&language, &country),
                country: Some(country),
                language: Some(language),
            }
        }
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = LocaleRouterConfig::default();
        config.routing.script_prefix = "shop".into();
        let err = Snapshot::build(&config, &demo_routes).unwrap_err();
        assert!(matches!(err, ServerError::Config(errors) if errors.len() == 1));
    }

    #[test]
    fn test_inactive_context_pins_no_country() {
        let snapshot = Snapshot::build(&LocaleRouterConfig::default(), &demo_routes).unwrap();
        let ctx = snapshot.inactive_context();
        assert_eq!(ctx.country(), None);
        assert_eq!(ctx.language_code().as_str(), "en-us");
    }

    #[test]
    fn test_custom_negotiator_and_reload() {
        let config = LocaleRouterConfig::default();
        let snapshot = Snapshot::build(&config, &demo_routes)
            .unwrap()
            .with_negotiator(Arc::new(Fixed));
        let resolved = snapshot.negotiator.resolve("/", &HeaderMap::new());
        assert_eq!(resolved.country, Some(Country::new("fr")));

        let state = AppState::new(snapshot, Arc::new(demo_routes));
        let before = state.snapshot().routes.id();
        state.reload(&config).unwrap();
        assert_ne!(state.snapshot().routes.id(), before);
        // Reload rebuilds with the default negotiator.
        let resolved = state.snapshot().negotiator.resolve("/", &HeaderMap::new());
        assert_eq!(resolved.country, None);
    }
}
