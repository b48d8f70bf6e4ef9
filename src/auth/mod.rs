// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Local session authentication for the relay.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to `/auth/login` (or registers)
//! 2. The credential validator checks them against the identity store
//! 3. The token service mints an HS256 session token (24 h lifetime)
//! 4. The token is set as the `access_token` cookie and returned in the body
//! 5. On protected routes the `Auth` extractor:
//!    - tries the `access_token` cookie, then `Authorization: Bearer <token>`
//!    - verifies signature and expiry (no leeway)
//!    - re-reads the identity from the store and attaches it to the request
//!
//! ## Security
//!
//! - Unknown identity and wrong password are reported identically
//! - Inactive identities are rejected at login and on every request
//! - The session cookie is `HttpOnly`, `SameSite=Lax`, `Secure` in production

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod session_cookie;
pub mod token;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use credentials::{CredentialError, CredentialValidator};
pub use error::AuthError;
pub use extractor::{Auth, TokenSource};
pub use session_cookie::SESSION_COOKIE_NAME;
pub use token::TokenService;
