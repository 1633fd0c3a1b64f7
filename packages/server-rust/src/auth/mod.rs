//! Bearer-token authentication and per-route table authorization.
//!
//! [`authenticate`] runs in front of every `/v1` route: it verifies the
//! `Authorization: Bearer <token>` header through the configured
//! [`Authenticator`] and stores the resulting [`RequestContext`] and
//! [`Claims`] in the request extensions. [`authorize`] runs per route and
//! checks the table-access policy plus the route's [`Rule`].

mod jwt;
pub mod policy;

pub use jwt::{AuthConfig, JwtAuthenticator};
pub use policy::{Access, Rule, TableAction};

use std::sync::Arc;

use axum::extract::{rejection::RawPathParamsRejection, RawPathParams, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use ichor_core::{Error, RequestContext};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::api::ApiError;

/// Message returned when the authorization header is missing or malformed.
pub const BEARER_FORMAT: &str = "expected authorization header format: Bearer <token>";

/// Token claims carried by every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub roles: Vec<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Errors raised while issuing or verifying tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("signing secret must not be empty")]
    MissingSecret,
    #[error("token lifetime out of range")]
    Lifetime,
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Verifies a bearer token and returns its claims.
///
/// Used as `Arc<dyn Authenticator>`.
pub trait Authenticator: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the token is malformed, expired, signed with a
    /// different key or issued by a different issuer.
    fn authenticate(&self, token: &str) -> Result<Claims, AuthError>;
}

/// State of the [`authenticate`] middleware.
#[derive(Clone)]
pub struct AuthState {
    authenticator: Arc<dyn Authenticator>,
}

impl AuthState {
    #[must_use]
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }
}

/// Extracts the token from `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Authentication middleware.
///
/// # Errors
///
/// `Unauthenticated` if the header is missing or the token does not verify.
pub async fn authenticate(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let token = bearer_token(req.headers()).ok_or_else(|| Error::unauthenticated(BEARER_FORMAT))?;
        auth.authenticator
            .authenticate(token)
            .map_err(|e| Error::unauthenticated(format!("authentication failed: {e}")))?
    };

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut ctx = RequestContext::new(claims.sub, claims.roles.clone());
    if let Some(id) = request_id {
        ctx = ctx.with_request_id(id);
    }

    debug!(user_id = %ctx.user_id, "request authenticated");
    req.extensions_mut().insert(ctx);
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Authorization middleware, installed per route with
/// `from_fn_with_state(access, authorize)`.
///
/// # Errors
///
/// `Unauthenticated` if no context was attached, the user's roles do not
/// grant `access.action` on `access.table`, or the route's rule rejects the
/// user.
pub async fn authorize(
    State(access): State<Access>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let subject = params.ok().and_then(|params| {
        params
            .iter()
            .find(|(key, _)| *key == "id")
            .and_then(|(_, value)| Uuid::parse_str(value).ok())
    });

    let ctx = req
        .extensions()
        .get::<RequestContext>()
        .ok_or_else(|| Error::unauthenticated(BEARER_FORMAT))?;

    if !policy::allows(ctx, access.table, access.action) {
        return Err(Error::unauthenticated(format!(
            "user does not have permission {} for table: {}",
            access.action, access.table
        ))
        .into());
    }

    if !access.rule.permits(ctx, subject) {
        return Err(Error::unauthenticated(format!(
            "you are not authorized for that action, rule[{}]",
            access.rule
        ))
        .into());
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_requires_scheme_and_token() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
