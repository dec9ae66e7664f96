// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::TokenVerifier;
use crate::backend::ContainerBackend;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub backend: Arc<dyn ContainerBackend>,
}

impl AppState {
    pub fn new(verifier: TokenVerifier, backend: impl ContainerBackend + 'static) -> Self {
        Self {
            verifier: Arc::new(verifier),
            backend: Arc::new(backend),
        }
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}
