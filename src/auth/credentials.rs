// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential validation against the identity store.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Identity, LoginRequest, RegisterRequest};
use crate::store::{InMemoryStore, NewUser, StoredUser};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Checked in place of a stored hash when the identifier is unknown. Uses
/// the default Argon2 parameters, so the check costs the same as a real one.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$cmVsYXktZHVtbXktc2FsdA$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Unknown identifier, inactive user, or wrong password. Deliberately
    /// one variant so callers cannot enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("An account with this email or username already exists")]
    DuplicateIdentity,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Checks logins and registrations against the identity store.
pub struct CredentialValidator<'a> {
    store: &'a RwLock<InMemoryStore>,
}

impl<'a> CredentialValidator<'a> {
    pub fn new(store: &'a RwLock<InMemoryStore>) -> Self {
        Self { store }
    }

    /// Resolve an identifier/password pair to an active identity.
    pub async fn validate_login(&self, request: &LoginRequest) -> Result<Identity, CredentialError> {
        let identifier = request.identifier.trim();
        if identifier.is_empty() || request.password.is_empty() {
            return Err(CredentialError::InvalidInput(
                "identifier and password are required".to_string(),
            ));
        }

        // Clone out so the lock is not held while hashing.
        let user = {
            let store = self.store.read().await;
            store.user_by_identifier(identifier).cloned()
        };

        let password_ok = verify_password(hash_to_check(user.as_ref()), &request.password);

        match user {
            Some(user) if password_ok && user.identity.is_active => Ok(user.identity),
            _ => Err(CredentialError::InvalidCredentials),
        }
    }

    /// Create a new identity from registration data.
    pub async fn register(&self, request: RegisterRequest) -> Result<Identity, CredentialError> {
        let request = normalize_registration(request)?;
        let password_hash = hash_password(&request.password)?;

        let mut store = self.store.write().await;
        store.insert_user(NewUser {
            email: request.email,
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash,
        })
    }
}

/// The hash a login attempt is verified against. Unknown identifiers get the
/// dummy hash so both outcomes run Argon2.
fn hash_to_check(user: Option<&StoredUser>) -> &str {
    user.map_or(DUMMY_PASSWORD_HASH, |user| user.password_hash.as_str())
}

fn normalize_registration(request: RegisterRequest) -> Result<RegisterRequest, CredentialError> {
    let request = RegisterRequest {
        email: request.email.trim().to_string(),
        username: request.username.trim().to_string(),
        password: request.password,
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
    };

    let required = [
        ("email", &request.email),
        ("username", &request.username),
        ("firstName", &request.first_name),
        ("lastName", &request.last_name),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
        return Err(CredentialError::InvalidInput(format!("{field} is required")));
    }

    let valid_email = request
        .email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if !valid_email {
        return Err(CredentialError::InvalidInput("email is not valid".to_string()));
    }

    // Usernames must not look like emails, or identifier lookup becomes ambiguous.
    if request.username.contains('@') {
        return Err(CredentialError::InvalidInput(
            "username must not contain '@'".to_string(),
        ));
    }

    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    Ok(request)
}

/// Hash a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| CredentialError::Hashing(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

/// Verify a password against a stored PHC string. Unparseable hashes never match.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
