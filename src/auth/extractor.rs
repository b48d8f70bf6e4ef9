// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require a valid local session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use super::{session_cookie::SESSION_COOKIE_NAME, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// A place a session token may be found on a request.
pub trait TokenSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Return the raw token, if this source carries one.
    fn extract(&self, parts: &Parts) -> Option<String>;
}

/// The `access_token` cookie.
pub struct CookieTokenSource;

impl TokenSource for CookieTokenSource {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn extract(&self, parts: &Parts) -> Option<String> {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().trim().to_string())
            .filter(|token| !token.is_empty())
    }
}

/// `Authorization: Bearer <token>`. Other schemes are treated as absent.
pub struct BearerTokenSource;

impl TokenSource for BearerTokenSource {
    fn name(&self) -> &'static str {
        "bearer"
    }

    fn extract(&self, parts: &Parts) -> Option<String> {
        let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

/// Token sources in priority order: cookie first, bearer header second.
pub const TOKEN_SOURCES: &[&dyn TokenSource] = &[&CookieTokenSource, &BearerTokenSource];

/// Try each source in order; the first token that verifies and maps to an
/// active identity wins.
///
/// When no candidate verifies, the error of the first candidate is returned
/// (or `MissingToken` when no source carried one).
pub async fn authenticate(
    parts: &Parts,
    state: &AppState,
    sources: &[&dyn TokenSource],
) -> Result<AuthenticatedUser, AuthError> {
    let mut first_error = None;

    for source in sources {
        let Some(token) = source.extract(parts) else {
            continue;
        };

        match resolve(&token, state).await {
            Ok((identity, expires_at)) => {
                return Ok(AuthenticatedUser {
                    identity,
                    token_source: source.name(),
                    expires_at,
                });
            }
            Err(e) => {
                tracing::debug!(source = source.name(), error = %e, "Rejected session token");
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.unwrap_or(AuthError::MissingToken))
}

async fn resolve(
    token: &str,
    state: &AppState,
) -> Result<(crate::models::Identity, i64), AuthError> {
    let claims = state.tokens.verify(token)?;

    let store = state.store.read().await;
    let identity = store
        .user_by_id(&claims.sub)
        .map(|user| user.identity.clone())
        .filter(|identity| identity.is_active)
        .ok_or(AuthError::UnknownIdentity)?;

    Ok((identity, claims.exp))
}

/// Extractor for authenticated users.
///
/// Verifies the session token and attaches the resulting
/// [`AuthenticatedUser`] to the request extensions, so later extractors on
/// the same request reuse it.
///
/// # Example
///
/// ```rust,ignore
/// async fn check(Auth(user): Auth) -> Json<CheckResponse> {
///     // user.identity is the stored identity behind the token
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let user = authenticate(parts, state, TOKEN_SOURCES).await?;
        parts.extensions.insert(user.clone());

        Ok(Auth(user))
    }
}
