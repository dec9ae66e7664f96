// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use axum_server::tls_rustls::RustlsConfig;
use codel_server::{
    api::router,
    auth::{KeyError, SigningKey, TokenVerifier},
    backend::{BackendError, HttpBackend, UnconfiguredBackend},
    config::{ConfigError, LogFormat, Settings},
    logging,
    state::AppState,
};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("unusable token signing key: {0}")]
    Key(#[from] KeyError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("failed to install rustls crypto provider")]
    CryptoProvider,
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => return config_failure(err),
    };
    logging::init(settings.log_format);

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Codel server failed");
            ExitCode::FAILURE
        }
    }
}

/// Settings could not be read, so log with the default format.
fn config_failure(err: ConfigError) -> ExitCode {
    logging::init(LogFormat::default());
    tracing::error!(error = %err, "Invalid configuration");
    ExitCode::FAILURE
}

async fn run(settings: Settings) -> Result<(), StartupError> {
    // A key that fails to parse aborts here, before anything is served.
    let key = SigningKey::load(&settings.key_source)?;
    let mut verifier = TokenVerifier::new(key);
    if let Some(issuer) = &settings.issuer {
        verifier = verifier.with_issuer(issuer);
    }
    if let Some(audience) = &settings.audience {
        verifier = verifier.with_audience(audience);
    }

    let state = match &settings.backend_url {
        Some(url) => {
            let backend_tls = settings.backend_tls.as_ref();
            tracing::info!(
                backend = %url,
                client_cert = backend_tls.is_some(),
                "Using container backend"
            );
            AppState::new(verifier, HttpBackend::new(url, backend_tls)?)
        }
        None => {
            tracing::warn!("CONTAINER_BACKEND_URL not set, container listings are disabled");
            AppState::new(verifier, UnconfiguredBackend)
        }
    };
    let app = router(state);

    let addr = settings.bind_addr;
    match &settings.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| StartupError::CryptoProvider)?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            tracing::info!(%addr, "Codel server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "Codel server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}
