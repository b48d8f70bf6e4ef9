// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::relay::{AppscodeClient, RelayError};
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<RwLock<InMemoryStore>>,
    pub tokens: Arc<TokenService>,
    pub appscode: AppscodeClient,
}

impl AppState {
    pub fn new(config: AppConfig, store: InMemoryStore) -> Result<Self, RelayError> {
        let appscode = AppscodeClient::new(
            config.appscode_base_url.clone(),
            config.appscode_credential.clone(),
            config.upstream_timeout,
        )?;

        Ok(Self {
            tokens: Arc::new(TokenService::new(&config.jwt_secret)),
            config: Arc::new(config),
            store: Arc::new(RwLock::new(store)),
            appscode,
        })
    }

    /// Fresh state with an empty store and the relay pointed at `base_url`.
    #[cfg(test)]
    pub(crate) fn for_tests(base_url: &str) -> Self {
        Self::new(AppConfig::for_tests(base_url), InMemoryStore::new())
            .expect("test state builds")
    }
}
