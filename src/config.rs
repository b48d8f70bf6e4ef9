// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment exactly once at startup into an
//! [`AppConfig`], which is then shared (immutably) through `AppState`.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HS256 signing secret for session tokens | Required |
//! | `APP_ENV` / `NODE_ENV` | `production` turns on `Secure` cookies | `development` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `APPSCODE_BASE_URL` | Base URL of the Appscode backend | `http://bb.test:3003` |
//! | `APPSCODE_USERNAME` | Service account used for the relayed login | Relay disabled if unset |
//! | `APPSCODE_PASSWORD` | Password of the service account | Relay disabled if unset |
//! | `UPSTREAM_TIMEOUT_SECS` | Timeout for calls to the Appscode backend | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, net::SocketAddr, time::Duration};

use url::Url;

/// Environment variable holding the token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const APP_ENV_ENV: &str = "APP_ENV";
/// Accepted as a fallback for `APP_ENV` so existing deployments keep working.
pub const NODE_ENV_ENV: &str = "NODE_ENV";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const APPSCODE_BASE_URL_ENV: &str = "APPSCODE_BASE_URL";
pub const APPSCODE_USERNAME_ENV: &str = "APPSCODE_USERNAME";
pub const APPSCODE_PASSWORD_ENV: &str = "APPSCODE_PASSWORD";
pub const UPSTREAM_TIMEOUT_ENV: &str = "UPSTREAM_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_APPSCODE_BASE_URL: &str = "http://bb.test:3003";
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `RUST_LOG` filter when none is set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set; refusing to start without a token signing secret")]
    MissingSecret(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Deployment mode. Only `Production` changes behaviour (the `Secure` cookie
/// attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// `production` (any case) selects `Production`; anything else is
    /// `Development`.
    pub fn from_name(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

/// Service credential used for the secondary Appscode login.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceCredential {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Process-wide configuration, built once in `main`.
#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: Vec<u8>,
    pub environment: Environment,
    pub bind_addr: SocketAddr,
    pub appscode_base_url: Url,
    /// `None` disables the relayed login entirely.
    pub appscode_credential: Option<ServiceCredential>,
    pub upstream_timeout: Duration,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("environment", &self.environment)
            .field("bind_addr", &self.bind_addr)
            .field("appscode_base_url", &self.appscode_base_url.as_str())
            .field("appscode_credential", &self.appscode_credential)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = get(JWT_SECRET_ENV)
            .ok_or(ConfigError::MissingSecret(JWT_SECRET_ENV))?
            .into_bytes();

        let environment = get(APP_ENV_ENV)
            .or_else(|| get(NODE_ENV_ENV))
            .map(|v| Environment::from_name(&v))
            .unwrap_or(Environment::Development);

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let base_url_raw =
            get(APPSCODE_BASE_URL_ENV).unwrap_or_else(|| DEFAULT_APPSCODE_BASE_URL.to_string());
        let appscode_base_url = Url::parse(&base_url_raw).map_err(|e| ConfigError::Invalid {
            name: APPSCODE_BASE_URL_ENV,
            reason: e.to_string(),
        })?;

        let appscode_credential = match (get(APPSCODE_USERNAME_ENV), get(APPSCODE_PASSWORD_ENV)) {
            (Some(username), Some(password)) => Some(ServiceCredential { username, password }),
            _ => None,
        };

        let upstream_timeout = match get(UPSTREAM_TIMEOUT_ENV) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: UPSTREAM_TIMEOUT_ENV,
                    reason: e.to_string(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: UPSTREAM_TIMEOUT_ENV,
                        reason: "must be at least 1 second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            jwt_secret,
            environment,
            bind_addr,
            appscode_base_url,
            appscode_credential,
            upstream_timeout,
            log_format,
        })
    }

    /// Configuration for tests: development mode, relay pointed at `base_url`.
    #[cfg(test)]
    pub(crate) fn for_tests(base_url: &str) -> Self {
        Self {
            jwt_secret: b"test-secret-key-that-is-long-enough".to_vec(),
            environment: Environment::Development,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            appscode_base_url: Url::parse(base_url).expect("valid test base URL"),
            appscode_credential: Some(ServiceCredential {
                username: "appscode".to_string(),
                password: "password".to_string(),
            }),
            upstream_timeout: Duration::from_secs(2),
            log_format: LogFormat::Pretty,
        }
    }
}
