//! Country/language middleware.
//!
//! Request phase: negotiate the locale, activate it for this request only and
//! attach it to the request. Response phase: turn a 404 caused by a missing
//! country prefix into a redirect, then patch `Vary` and `Content-Language`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::http::request::RequestOrigin;
use crate::http::response::{patch_vary_headers, redirect, set_header_if_absent};
use crate::http::server::{AppState, Snapshot};
use crate::locale::{context, Country, LocaleContext, ResolvedLocale};
use crate::observability::metrics;

pub async fn country_language_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let snapshot = state.snapshot();
    let origin = RequestOrigin::new(
        request.uri(),
        request.headers(),
        &snapshot.routing.script_prefix,
    );

    let resolved = snapshot.negotiator.resolve(&origin.path_info, &origin.headers);
    let active = activate(&snapshot, &resolved);

    tracing::debug!(
        request_id = ?origin.request_id,
        path = %origin.path_info,
        country = ?resolved.country,
        language = ?resolved.language,
        language_code = %resolved.language_code,
        "Locale resolved"
    );

    request.extensions_mut().insert(resolved);
    request.extensions_mut().insert(active.clone());
    request.extensions_mut().insert(Arc::clone(&snapshot));

    let response = context::scope(active, next.run(request)).await;

    process_response(&snapshot, &origin, response)
}

/// Context for a resolution: the resolved country, else the default.
pub fn activate(snapshot: &Snapshot, resolved: &ResolvedLocale) -> LocaleContext {
    let country = resolved
        .country
        .clone()
        .unwrap_or_else(|| snapshot.countries.default_country().clone());
    LocaleContext::activate(
        country,
        resolved.language.clone(),
        resolved.language_code.clone(),
    )
}

/// Response phase: repair redirects, then header patching.
///
/// Re-resolves the locale from `origin`; resolution is pure, so this agrees
/// with the request phase.
pub fn process_response(snapshot: &Snapshot, origin: &RequestOrigin, mut response: Response) -> Response {
    let resolved = snapshot.negotiator.resolve(&origin.path_info, &origin.headers);
    let country_from_path = snapshot.countries.country_from_path(&origin.path_info);
    let language_from_path = snapshot.countries.language_from_path(&origin.path_info);
    let usage = snapshot.routes.prefix_usage();

    // Requests outside the script prefix are never repaired.
    if response.status() == StatusCode::NOT_FOUND && origin.is_mounted() {
        let repaired = match country_from_path {
            None if usage.used && usage.prefix_default_country => {
                missing_prefix_redirect(snapshot, origin, &resolved)
            }
            Some(country) => bare_country_redirect(snapshot, origin, country),
            None => None,
        };
        if let Some(repaired) = repaired {
            return repaired;
        }
    }

    if !(usage.used && language_from_path.is_some()) {
        patch_vary_headers(response.headers_mut(), &["Accept-Language"]);
    }

    let content_language = match &resolved.language {
        Some(language) => language.to_string(),
        None => resolved.language_code.to_string(),
    };
    set_header_if_absent(
        response.headers_mut(),
        header::CONTENT_LANGUAGE,
        &content_language,
    );

    response
}

/// Redirect `/<path>` to `/<country>/<path>` when the latter routes.
fn missing_prefix_redirect(
    snapshot: &Snapshot,
    origin: &RequestOrigin,
    resolved: &ResolvedLocale,
) -> Option<Response> {
    let ctx = activate(snapshot, resolved);
    let country = ctx.country()?.clone();

    let country_path = format!("/{}{}", country, origin.path_info);
    let path_valid = snapshot.routes.is_valid_path(&country_path, &ctx);
    let path_needs_slash = !path_valid
        && snapshot.routing.append_slash
        && !country_path.ends_with('/')
        && snapshot
            .routes
            .is_valid_path(&format!("{}/", country_path), &ctx);

    if !(path_valid || path_needs_slash) {
        tracing::debug!(
            request_id = ?origin.request_id,
            candidate = %country_path,
            "Prefixed path does not route, keeping 404"
        );
        return None;
    }

    let location = origin.prefixed_location(
        &snapshot.routing.script_prefix,
        &country,
        path_needs_slash,
    );

    let response = redirect(&location, snapshot.routing.permanent_redirects)?;
    metrics::record_locale_redirect("missing_prefix");
    tracing::info!(
        request_id = ?origin.request_id,
        from = %origin.path,
        to = %location,
        "Redirecting to country-prefixed path"
    );
    Some(response)
}

/// Redirect exactly `/<country>` to `/<country>/`.
fn bare_country_redirect(
    snapshot: &Snapshot,
    origin: &RequestOrigin,
    country: &Country,
) -> Option<Response> {
    if origin.path_info != format!("/{}", country) {
        return None;
    }

    let location = format!("{}{}/", snapshot.routing.script_prefix, country);
    let response = redirect(&location, snapshot.routing.permanent_redirects)?;
    metrics::record_locale_redirect("bare_country");
    tracing::info!(
        request_id = ?origin.request_id,
        from = %origin.path,
        to = %location,
        "Redirecting bare country path"
    );
    Some(response)
}
