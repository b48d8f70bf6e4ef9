// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the Appscode backend.
//!
//! Redirects are never followed: a 3xx from Appscode is a meaningful answer
//! (usually "session invalid, go log in") and is passed back as-is. Any status
//! in 200..400 counts as success.

use std::time::Duration;

use reqwest::{
    header::{ACCEPT, COOKIE, SET_COOKIE},
    redirect::Policy,
    Client, StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use url::Url;
use utoipa::ToSchema;

use super::cookies::{RequestCookies, CSRF_HEADER_NAME};
use super::RelayError;
use crate::config::ServiceCredential;

const LOGIN_PATH: &str = "accounts/user/login";
const PROFILE_PATH: &str = "api/v1/user";

/// Result of the secondary login: the raw `Set-Cookie` directives returned
/// by Appscode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AppscodeSession {
    pub cookies: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppscodeClient {
    base_url: Url,
    credential: Option<ServiceCredential>,
    http: Client,
}

impl AppscodeClient {
    pub fn new(
        base_url: Url,
        credential: Option<ServiceCredential>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let http = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: with_trailing_slash(base_url),
            credential,
            http,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credential.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, RelayError> {
        self.base_url
            .join(path)
            .map_err(|e| RelayError::InvalidUrl(e.to_string()))
    }

    /// Log in to Appscode with the service credential and collect the
    /// session cookies it hands out.
    pub async fn login(&self) -> Result<AppscodeSession, RelayError> {
        let credential = self.credential.as_ref().ok_or(RelayError::NotConfigured)?;
        let url = self.endpoint(LOGIN_PATH)?;

        let response = self
            .http
            .post(url)
            .json(&json!({
                "username": credential.username,
                "password": credential.password,
            }))
            .send()
            .await
            .map_err(RelayError::from_transport)?;

        let status = response.status();
        if !is_accepted(status) {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| match value.to_str() {
                Ok(raw) => Some(raw.to_string()),
                Err(_) => {
                    tracing::debug!("Ignoring non-UTF-8 Set-Cookie header from Appscode");
                    None
                }
            })
            .collect();

        info!(
            status = status.as_u16(),
            cookies = cookies.len(),
            "Appscode login succeeded"
        );

        Ok(AppscodeSession { cookies })
    }

    /// Fetch the current user's profile from Appscode, replaying the
    /// browser's cookies and CSRF token.
    pub async fn fetch_profile(&self, cookies: &RequestCookies) -> Result<Value, RelayError> {
        let url = self.endpoint(PROFILE_PATH)?;

        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if let Some(header) = cookies.header_value() {
            request = request.header(COOKIE, header);
        }
        if let Some(token) = cookies.csrf_token() {
            request = request.header(CSRF_HEADER_NAME, token);
        }

        let response = request.send().await.map_err(RelayError::from_transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(RelayError::from_transport)?;

        if !is_accepted(status) {
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(body_to_value(&bytes))
    }
}

/// 2xx and 3xx are both answers worth passing on.
pub fn is_accepted(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

/// JSON when it parses, the raw text otherwise, `null` for an empty body.
fn body_to_value(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
