// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cookie plumbing between the browser and the Appscode backend.
//!
//! Inbound: [`relay_cookies`] turns raw upstream directives into cookies,
//! and [`set_cookie_headers`] emits each of them as its own `Set-Cookie`
//! header. Outbound: [`RequestCookies`] turns the browser's cookie jar into
//! the `Cookie` / `x-csrf-token` headers sent upstream.
//!
//! Relayed cookies never go through a [`CookieJar`]: the jar is keyed by
//! name, so two directives sharing a name would collapse into one.

use std::collections::BTreeMap;

use axum::{
    http::{header::SET_COOKIE, HeaderName},
    response::AppendHeaders,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::directive::parse_directive;
use crate::auth::SESSION_COOKIE_NAME;

/// Cookie holding the CSRF token issued by the Appscode backend.
pub const CSRF_COOKIE_NAME: &str = "_csrf";
/// Header the Appscode backend expects the CSRF token in.
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// Parse each directive into a cookie for the client response, in order.
///
/// Directives are handled independently: a malformed one is logged and
/// skipped, and so is any directive that would overwrite the local session
/// cookie. Directives sharing a name all survive.
pub fn relay_cookies(directives: &[String]) -> Vec<Cookie<'static>> {
    let mut relayed = Vec::with_capacity(directives.len());
    for raw in directives {
        match parse_directive(raw) {
            Ok(parsed) if parsed.name == SESSION_COOKIE_NAME => {
                tracing::warn!(
                    cookie = %parsed.name,
                    "Skipping upstream cookie that collides with the local session"
                );
            }
            Ok(parsed) => {
                tracing::debug!(cookie = %parsed.name, "Relaying upstream cookie");
                relayed.push(parsed.to_cookie());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed cookie directive");
            }
        }
    }
    relayed
}

/// Relayed cookies as response headers.
pub type SetCookieHeaders = AppendHeaders<Vec<(HeaderName, String)>>;

/// One `Set-Cookie` header per cookie, appended after whatever the response
/// already sets.
pub fn set_cookie_headers(cookies: &[Cookie<'static>]) -> SetCookieHeaders {
    AppendHeaders(
        cookies
            .iter()
            .map(|cookie| (SET_COOKIE, cookie.to_string()))
            .collect(),
    )
}

/// Snapshot of the cookies on an incoming request, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCookies(BTreeMap<String, String>);

impl RequestCookies {
    pub fn from_jar(jar: &CookieJar) -> Self {
        Self(
            jar.iter()
                .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `name=value` pairs joined with `; `, or `None` for an empty jar.
    pub fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.0
            .get(CSRF_COOKIE_NAME)
            .map(String::as_str)
            .filter(|token| !token.is_empty())
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl FromIterator<(String, String)> for RequestCookies {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
