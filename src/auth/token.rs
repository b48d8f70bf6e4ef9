// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification (HS256).
//!
//! A token moves through `Unauthenticated -> Authenticated -> Expired`:
//! [`TokenService::issue`] is the only way into `Authenticated`, and
//! [`TokenService::verify`] reports `Expired` as soon as `now > exp`.
//! There is no revocation list; expiry is the only invalidation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, SessionClaims};
use crate::models::Identity;

/// Lifetime of a freshly issued session token.
pub const SESSION_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Signs and verifies session tokens with the configured secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime: Duration::seconds(SESSION_LIFETIME_SECS),
        }
    }

    /// Mint a token for `identity`, valid for the session lifetime from now.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    /// Mint a token as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires_at = issued_at + self.lifetime;
        let claims =
            SessionClaims::for_identity(identity, issued_at.timestamp(), expires_at.timestamp());

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(format!("failed to sign token: {e}")))
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            },
        )?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        Ok(data.claims)
    }
}
