// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KubeDB Auth Relay - Backend-for-Frontend for the KubeDB UI
//!
//! Issues local JWT sessions and, on login, relays a secondary Appscode
//! session to the browser by re-emitting the Appscode `Set-Cookie` headers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Local sessions: credentials, JWT issue/verify, extractor
//! - `relay` - Appscode client and `Set-Cookie` relay
//! - `store` - In-memory identity store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod relay;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;
