//! Response handling helpers.
//!
//! # Responsibilities
//! - Build locale repair redirects
//! - Append to `Vary` without duplicating or replacing entries
//! - Set headers only when the handler left them unset
//!
//! # Design Decisions
//! - Header helpers never fail: an unencodable value is skipped and logged

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};

/// 302 (or 301 when `permanent`) to `location`.
///
/// `None` when `location` is not a valid header value.
pub fn redirect(location: &str, permanent: bool) -> Option<Response<Body>> {
    let value = match HeaderValue::from_str(location) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(location = %location, error = %e, "Cannot encode redirect target");
            return None;
        }
    };
    let status = if permanent {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::FOUND
    };

    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response.headers_mut().insert(header::LOCATION, value);
    Some(response)
}

/// Add `new_headers` to `Vary`, keeping existing entries and their order.
///
/// Comparison is case-insensitive; a `*` entry collapses the header to `*`.
pub fn patch_vary_headers(headers: &mut HeaderMap, new_headers: &[&str]) {
    let mut vary: Vec<String> = headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();

    for new in new_headers {
        if !vary.iter().any(|existing| existing.eq_ignore_ascii_case(new)) {
            vary.push((*new).to_string());
        }
    }

    let joined = if vary.iter().any(|entry| entry == "*") {
        "*".to_string()
    } else {
        vary.join(", ")
    };

    match HeaderValue::from_str(&joined) {
        Ok(value) => {
            headers.insert(header::VARY, value);
        }
        Err(e) => tracing::warn!(vary = %joined, error = %e, "Cannot encode Vary header"),
    }
}

/// Set `name` to `value` unless the response already carries it.
pub fn set_header_if_absent(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if headers.contains_key(&name) {
        return;
    }
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => tracing::warn!(header = %name, error = %e, "Cannot encode header value"),
    }
}
