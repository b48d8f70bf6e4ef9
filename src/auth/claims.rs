// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and the authenticated user attached to requests.

use serde::{Deserialize, Serialize};

use crate::models::Identity;

/// Claims carried by a local session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject: the identity id
    pub sub: String,
    /// Email at issuance (informational only)
    pub email: String,
    /// Username at issuance (informational only)
    pub username: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

impl SessionClaims {
    pub fn for_identity(identity: &Identity, iat: i64, exp: i64) -> Self {
        Self {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            username: identity.username.clone(),
            iat,
            exp,
        }
    }
}

/// The identity behind a verified session, placed in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Identity as currently stored (not as it was at issuance).
    pub identity: Identity,
    /// Which token source produced the winning token.
    pub token_source: &'static str,
    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> &str {
        &self.identity.id
    }
}
