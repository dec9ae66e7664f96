// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Container management backend.
//!
//! The API only relays listings; it does not interpret them. Handlers talk
//! to the backend through [`ContainerBackend`] so tests can swap in a stub.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Certificate, Identity, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::BackendTls;

/// Request timeout for backend calls.
const BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

const INSTANCES_PATH: &str = "1.0/instances?recursion=1&instance-type=container";
const IMAGES_PATH: &str = "1.0/images?recursion=1";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("container backend is not configured")]
    Unconfigured,
    #[error("failed to read container backend credential {path}: {source}")]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid container backend TLS material: {0}")]
    Tls(#[source] reqwest::Error),
    #[error("container backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("container backend returned HTTP {0}")]
    Status(StatusCode),
    #[error("container backend response has no `metadata` member")]
    MissingMetadata,
}

#[async_trait::async_trait]
pub trait ContainerBackend: Send + Sync {
    /// All containers known to the backend.
    async fn list_containers(&self) -> Result<Value, BackendError>;

    /// All images known to the backend.
    async fn list_images(&self) -> Result<Value, BackendError>;
}

/// REST client for an LXD-style container API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &Url, tls: Option<&BackendTls>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder().timeout(BACKEND_TIMEOUT);

        if let Some(tls) = tls {
            builder = builder.identity(client_identity(tls)?);
            if let Some(ca) = &tls.server_ca {
                let pem = read_credential(ca)?;
                let cert = Certificate::from_pem(&pem).map_err(BackendError::Tls)?;
                // Pinned: the configured certificate is the only trust anchor.
                builder = builder
                    .tls_built_in_root_certs(false)
                    .add_root_certificate(cert);
            }
        }

        let client = builder.build().map_err(BackendError::Tls)?;

        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn fetch_metadata(&self, path: &str) -> Result<Value, BackendError> {
        let response = self.client.get(self.endpoint(path)).send().await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        let body: Value = response.json().await?;
        extract_metadata(body)
    }
}

fn read_credential(path: &Path) -> Result<Vec<u8>, BackendError> {
    fs::read(path).map_err(|source| BackendError::Credentials {
        path: path.to_path_buf(),
        source,
    })
}

/// Certificate and key concatenated into the single PEM bundle reqwest expects.
fn client_identity(tls: &BackendTls) -> Result<Identity, BackendError> {
    let mut bundle = read_credential(&tls.client_cert)?;
    bundle.push(b'\n');
    bundle.extend(read_credential(&tls.client_key)?);
    Identity::from_pem(&bundle).map_err(BackendError::Tls)
}

/// The container API wraps results as `{"type": "sync", "metadata": ...}`.
fn extract_metadata(mut body: Value) -> Result<Value, BackendError> {
    body.get_mut("metadata")
        .map(Value::take)
        .ok_or(BackendError::MissingMetadata)
}

#[async_trait::async_trait]
impl ContainerBackend for HttpBackend {
    async fn list_containers(&self) -> Result<Value, BackendError> {
        self.fetch_metadata(INSTANCES_PATH).await
    }

    async fn list_images(&self) -> Result<Value, BackendError> {
        self.fetch_metadata(IMAGES_PATH).await
    }
}

/// Backend used when no container API is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredBackend;

#[async_trait::async_trait]
impl ContainerBackend for UnconfiguredBackend {
    async fn list_containers(&self) -> Result<Value, BackendError> {
        Err(BackendError::Unconfigured)
    }

    async fn list_images(&self) -> Result<Value, BackendError> {
        Err(BackendError::Unconfigured)
    }
}
