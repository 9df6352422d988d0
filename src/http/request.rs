//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Split the request path into script prefix and path info
//! - Capture what the response phase needs before the request is consumed
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The captured origin is owned, so it outlives the dispatched request

use axum::http::{HeaderMap, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::locale::Country;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID header.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
    }
}

/// Path relative to the script prefix, keeping its leading '/'.
///
/// `"/app/us/x"` under `"/app/"` is `"/us/x"`; `"/app"` is `"/"`. `None` for
/// paths outside the prefix.
pub fn path_info<'p>(path: &'p str, script_prefix: &str) -> Option<&'p str> {
    let mount = script_prefix.trim_end_matches('/');
    if mount.is_empty() {
        return Some(path);
    }
    match path.strip_prefix(mount) {
        Some("") => Some("/"),
        Some(rest) if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

/// What the response phase needs to know about the original request.
#[derive(Debug, Clone)]
pub struct RequestOrigin {
    /// Full request path, script prefix included.
    pub path: String,
    pub query: Option<String>,
    /// Path below the script prefix; empty when the request is outside it.
    pub path_info: String,
    pub headers: HeaderMap,
    pub request_id: Option<String>,
}

impl RequestOrigin {
    pub fn new(uri: &Uri, headers: &HeaderMap, script_prefix: &str) -> Self {
        let path = uri.path().to_string();
        let path_info = path_info(&path, script_prefix)
            .unwrap_or_default()
            .to_string();
        Self {
            query: uri.query().map(str::to_string),
            request_id: headers
                .get(X_REQUEST_ID)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
            headers: headers.clone(),
            path,
            path_info,
        }
    }

    /// True when the request path lies under the script prefix.
    pub fn is_mounted(&self) -> bool {
        !self.path_info.is_empty()
    }

    /// `<mount>/<country><path_info>[/][?query]`: the request with `country`
    /// inserted right after the script prefix.
    pub fn prefixed_location(&self, script_prefix: &str, country: &Country, append_slash: bool) -> String {
        let mount = script_prefix.trim_end_matches('/');
        let mut location = format!("{}/{}{}", mount, country, self.path_info);
        if append_slash && !location.ends_with('/') {
            location.push('/');
        }
        if let Some(query) = &self.query {
            location.push('?');
            location.push_str(query);
        }
        location
    }
}
