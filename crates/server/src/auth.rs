use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde::{Deserialize, Serialize};
use service::products::domain::Owner;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

/// Claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub uid: Uuid,
    pub sub: String,
    pub name: String,
    pub exp: usize,
}

/// The authenticated user of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Owner);

/// Sign a token for `owner`, valid for `ttl`.
pub fn issue_token(secret: &str, owner: &Owner, ttl: chrono::Duration) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims { uid: owner.id, sub: owner.email.clone(), name: owner.name.clone(), exp };
    encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn verify_token(secret: &str, token: &str) -> Result<Owner, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &key, &validation)?;
    let c = data.claims;
    Ok(Owner { id: c.uid, email: c.sub, name: c.name })
}

/// `Authorization: Bearer` wins over the `auth_token` cookie.
fn token_from_headers(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    if let Some(h) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(tok) if !tok.trim().is_empty() => Ok(Some(tok.trim().to_string())),
            _ => Err(AppError::Unauthorized("invalid Authorization header, expected Bearer token".into())),
        };
    }
    let jar = CookieJar::from_headers(headers);
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

#[async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let Some(token) = token_from_headers(&parts.headers)? else {
            tracing::warn!(%path, "missing Authorization header and auth_token cookie");
            return Err(AppError::Unauthorized("authentication required".into()));
        };
        match verify_token(&state.auth.jwt_secret, &token) {
            Ok(owner) => Ok(CurrentUser(owner)),
            Err(e) => {
                tracing::warn!(%path, err = %e, "token validation failed");
                Err(AppError::Unauthorized("invalid or expired token".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn owner() -> Owner {
        Owner { id: Uuid::new_v4(), email: "alice@example.com".into(), name: "Alice".into() }
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let o = owner();
        let tok = issue_token("secret", &o, chrono::Duration::hours(1)).unwrap();
        assert_eq!(verify_token("secret", &tok).unwrap(), o);
        assert!(verify_token("other-secret", &tok).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let tok = issue_token("secret", &owner(), chrono::Duration::hours(-2)).unwrap();
        assert!(verify_token("secret", &tok).is_err());
    }

    #[test]
    fn bearer_header_preferred_over_cookie() {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        h.insert(header::COOKIE, HeaderValue::from_static("auth_token=xyz"));
        assert_eq!(token_from_headers(&h).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_used_without_header() {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_static("theme=dark; auth_token=xyz"));
        assert_eq!(token_from_headers(&h).unwrap().as_deref(), Some("xyz"));
    }

    #[test]
    fn non_bearer_header_is_rejected() {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(matches!(token_from_headers(&h), Err(AppError::Unauthorized(_))));
        assert_eq!(token_from_headers(&HeaderMap::new()).unwrap(), None);
    }
}
