// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Appscode Session Relay
//!
//! The relay keeps a second, independent session with the Appscode backend
//! alive in the browser:
//!
//! 1. After a successful local login, [`relay_login`] logs in to Appscode
//!    with the service credential.
//! 2. Every `Set-Cookie` directive Appscode returns is parsed
//!    ([`directive`]) and re-set as a first-party cookie on the response
//!    ([`cookies`]).
//! 3. Later, the profile proxy replays the browser's full cookie jar (local
//!    and relayed cookies) plus the CSRF token against Appscode.
//!
//! The relayed login is best-effort: one attempt, no retry, and a failure
//! never affects the local session.

pub mod appscode;
pub mod cookies;
pub mod directive;

use axum_extra::extract::cookie::Cookie;

pub use appscode::{AppscodeClient, AppscodeSession};
pub use cookies::{relay_cookies, set_cookie_headers, RequestCookies, SetCookieHeaders};
pub use directive::{parse_directive, DirectiveError, ParsedCookie};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Appscode relay is not configured")]
    NotConfigured,

    #[error("Appscode backend unreachable: {0}")]
    Unreachable(String),

    #[error("Appscode backend did not answer in time")]
    Timeout,

    #[error("Appscode backend returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Appscode client setup failed: {0}")]
    Client(String),

    #[error("Invalid Appscode URL: {0}")]
    InvalidUrl(String),
}

impl RelayError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout
        } else {
            RelayError::Unreachable(err.to_string())
        }
    }
}

/// Perform the secondary Appscode login and turn its directives into
/// cookies for the client response.
///
/// Never fails: on any error no cookies are returned, along with `None`.
pub async fn relay_login(
    client: &AppscodeClient,
) -> (Vec<Cookie<'static>>, Option<AppscodeSession>) {
    match client.login().await {
        Ok(session) => {
            let relayed = relay_cookies(&session.cookies);
            tracing::info!(
                received = session.cookies.len(),
                applied = relayed.len(),
                "Relayed Appscode session cookies"
            );
            (relayed, Some(session))
        }
        Err(RelayError::NotConfigured) => {
            tracing::debug!("Appscode relay disabled; skipping secondary login");
            (Vec::new(), None)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Appscode login failed; continuing with local session only");
            (Vec::new(), None)
        }
    }
}
