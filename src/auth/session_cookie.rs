// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The local session cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};

use super::token::SESSION_LIFETIME_SECS;
use crate::config::Environment;

/// Name of the cookie carrying the local session token.
pub const SESSION_COOKIE_NAME: &str = "access_token";

/// Build the `access_token` cookie for a freshly issued token.
///
/// `HttpOnly`, `SameSite=Lax`, `Path=/`, `Max-Age` matching the token
/// lifetime; `Secure` only in production.
pub fn session_cookie(token: String, environment: Environment) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .secure(environment.is_production())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(SESSION_LIFETIME_SECS))
        .path("/")
        .build()
}

/// A cookie that clears `access_token`, with the same scope attributes it was
/// set with.
pub fn clear_session_cookie(environment: Environment) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .secure(environment.is_production())
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    cookie.make_removal();
    cookie
}
