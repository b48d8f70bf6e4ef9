// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. Field names are camelCase on
//! the wire to stay compatible with the existing frontend.
//!
//! ## Model Categories
//!
//! - **Identity**: the public view of a local user
//! - **Auth requests**: registration and login bodies
//! - **Auth responses**: envelopes returned by `/auth/*`, `/users/*` and
//!   `/kubedb/*`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::relay::AppscodeSession;

// =============================================================================
// Identity
// =============================================================================

/// A verified local user.
///
/// Owned by the identity store; the core only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable identifier (UUID v4), used as the token subject.
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Inactive identities can neither log in nor use existing tokens.
    pub is_active: bool,
}

// =============================================================================
// Auth Requests
// =============================================================================

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email address.
    pub identifier: String,
    pub password: String,
}

// =============================================================================
// Auth Responses
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: Identity,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: Identity,
    /// The session token, also set as the `access_token` cookie.
    pub access_token: String,
    /// Relayed Appscode session; `null` when the secondary login failed.
    pub appscodetoken: Option<AppscodeSession>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub message: String,
    pub user: Identity,
    /// Cookies the browser sent with this request.
    pub cookies: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckResponse {
    pub authenticated: bool,
    pub user: Identity,
    /// Session expiry (Unix seconds).
    pub expires_at: i64,
    /// Where the session token was found: `cookie` or `bearer`.
    pub token_source: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub message: String,
    pub user: Identity,
}

/// Envelope for `GET /kubedb/profile`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExternalProfileResponse {
    pub message: String,
    /// Body returned by the Appscode profile endpoint, untouched.
    #[schema(value_type = Object)]
    pub res: serde_json::Value,
    pub cookies: BTreeMap<String, String>,
}
