//! Cross-origin policy.
//!
//! Browsers attach the `auth_token` cookie to any request aimed at the
//! catalog, so credentialed CORS is limited to configured origins and
//! cookie-authenticated writes must come from the catalog's own pages.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::AUTH_COOKIE;
use crate::errors::AppError;
use crate::pages::{INERTIA_HEADER, VERSION_HEADER};
use crate::state::ServerState;

/// CORS for the configured origins only; with none configured no
/// `Access-Control-Allow-*` headers are ever sent.
pub fn build_cors(allowed: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim_end_matches('/')).ok())
        .collect();
    if origins.is_empty() {
        return CorsLayer::new();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(INERTIA_HEADER),
            HeaderName::from_static(VERSION_HEADER),
        ])
        .allow_credentials(true)
}

/// `scheme://host[:port]` of the page that sent the request: `Origin`, else `Referer`.
fn request_origin(headers: &HeaderMap) -> Option<String> {
    if let Some(origin) = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) {
        return Some(origin.trim_end_matches('/').to_string());
    }
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok())?;
    let (scheme, rest) = referer.split_once("://")?;
    let authority = rest.split(|c: char| matches!(c, '/' | '?' | '#')).next().unwrap_or(rest);
    Some(format!("{scheme}://{authority}"))
}

fn same_origin(origin: &str, headers: &HeaderMap, allowed: &[String]) -> bool {
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(origin)) {
        return true;
    }
    let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    origin
        .split_once("://")
        .map(|(_, authority)| authority.eq_ignore_ascii_case(host))
        .unwrap_or(false)
}

/// Only the cookie is sent by browsers on their own; a Bearer header never is.
fn cookie_authenticated(headers: &HeaderMap) -> bool {
    headers.get(header::AUTHORIZATION).is_none() && CookieJar::from_headers(headers).get(AUTH_COOKIE).is_some()
}

/// Refuse cookie-authenticated writes sent from another site.
pub async fn require_same_origin(State(state): State<ServerState>, req: Request, next: Next) -> Response {
    let safe = matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS);
    if safe || !cookie_authenticated(req.headers()) {
        return next.run(req).await;
    }
    match request_origin(req.headers()) {
        Some(origin) if !same_origin(&origin, req.headers(), &state.allowed_origins) => {
            tracing::warn!(%origin, method = %req.method(), path = %req.uri().path(), "cross-site write refused");
            AppError::Forbidden("cross-site request refused".into()).into_response()
        }
        _ => next.run(req).await,
    }
}
