// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory identity store.
//!
//! Holds local users and their password hashes. Email lookups are
//! case-insensitive; usernames are matched exactly.

use std::collections::HashMap;

use uuid::Uuid;

use crate::auth::CredentialError;
use crate::models::Identity;

/// A user record as persisted, including the password hash.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub identity: Identity,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Fields required to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<String, StoredUser>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn user_by_id(&self, id: &str) -> Option<&StoredUser> {
        self.users.get(id)
    }

    /// Find a user by username, or by email when the identifier contains `@`.
    pub fn user_by_identifier(&self, identifier: &str) -> Option<&StoredUser> {
        if identifier.contains('@') {
            self.users
                .values()
                .find(|u| u.identity.email.eq_ignore_ascii_case(identifier))
        } else {
            self.users
                .values()
                .find(|u| u.identity.username == identifier)
        }
    }

    fn email_taken(&self, email: &str) -> bool {
        self.users
            .values()
            .any(|u| u.identity.email.eq_ignore_ascii_case(email))
    }

    fn username_taken(&self, username: &str) -> bool {
        self.users
            .values()
            .any(|u| u.identity.username == username)
    }

    pub fn insert_user(&mut self, user: NewUser) -> Result<Identity, CredentialError> {
        if self.email_taken(&user.email) || self.username_taken(&user.username) {
            return Err(CredentialError::DuplicateIdentity);
        }

        let id = Uuid::new_v4().to_string();
        let identity = Identity {
            id: id.clone(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: true,
        };
        self.users.insert(
            id,
            StoredUser {
                identity: identity.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(identity)
    }

    /// Flip the active flag. Returns `false` if the user does not exist.
    pub fn set_active(&mut self, id: &str, active: bool) -> bool {
        match self.users.get_mut(id) {
            Some(user) => {
                user.identity.is_active = active;
                true
            }
            None => false,
        }
    }
}
