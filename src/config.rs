// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. Invalid values
//! abort startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8081` |
//! | `SIGNING_KEY_FILE` | PEM file holding the realm public key | Built-in realm key |
//! | `SIGNING_KEY_PEM` | Realm public key as inline PEM | Built-in realm key |
//! | `TOKEN_ISSUER` | Expected `iss` claim | Not checked |
//! | `TOKEN_AUDIENCE` | Expected `aud` claim | Not checked |
//! | `CONTAINER_BACKEND_URL` | Base URL of the container REST API | Listing disabled |
//! | `CONTAINER_BACKEND_CLIENT_CERT` | PEM client certificate for the container API | No client auth |
//! | `CONTAINER_BACKEND_CLIENT_KEY` | PEM client key for the container API | No client auth |
//! | `CONTAINER_BACKEND_CA` | PEM server certificate to trust for the container API | System roots |
//! | `TLS_CERT_FILE` | PEM certificate chain for HTTPS | Plain HTTP |
//! | `TLS_KEY_FILE` | PEM private key for HTTPS | Plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use url::Url;

use crate::auth::KeySource;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SIGNING_KEY_FILE_ENV: &str = "SIGNING_KEY_FILE";
pub const SIGNING_KEY_PEM_ENV: &str = "SIGNING_KEY_PEM";
pub const TOKEN_ISSUER_ENV: &str = "TOKEN_ISSUER";
pub const TOKEN_AUDIENCE_ENV: &str = "TOKEN_AUDIENCE";
pub const CONTAINER_BACKEND_URL_ENV: &str = "CONTAINER_BACKEND_URL";
pub const CONTAINER_BACKEND_CLIENT_CERT_ENV: &str = "CONTAINER_BACKEND_CLIENT_CERT";
pub const CONTAINER_BACKEND_CLIENT_KEY_ENV: &str = "CONTAINER_BACKEND_CLIENT_KEY";
pub const CONTAINER_BACKEND_CA_ENV: &str = "CONTAINER_BACKEND_CA";
pub const TLS_CERT_FILE_ENV: &str = "TLS_CERT_FILE";
pub const TLS_KEY_FILE_ENV: &str = "TLS_KEY_FILE";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8081;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
    #[error("{0} and {1} are mutually exclusive")]
    Conflict(&'static str, &'static str),
    #[error("{0} requires {1}")]
    Requires(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "text" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

/// Certificate and key for the HTTPS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Client credentials for the container API, which authenticates callers by
/// TLS client certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTls {
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
    /// Server certificate to trust instead of the system roots.
    pub server_ca: Option<PathBuf>,
}

/// Validated server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub key_source: KeySource,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub backend_url: Option<Url>,
    pub backend_tls: Option<BackendTls>,
    pub tls: Option<TlsFiles>,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host: IpAddr = get(HOST_ENV)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })?;

        let port: u16 = match get(PORT_ENV) {
            Some(port) => port.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    name: PORT_ENV,
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_PORT,
        };

        let key_source = match (get(SIGNING_KEY_FILE_ENV), get(SIGNING_KEY_PEM_ENV)) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Conflict(
                    SIGNING_KEY_FILE_ENV,
                    SIGNING_KEY_PEM_ENV,
                ))
            }
            (Some(path), None) => KeySource::File(PathBuf::from(path)),
            (None, Some(pem)) => KeySource::Inline(pem),
            (None, None) => KeySource::BuiltIn,
        };

        let backend_url = get(CONTAINER_BACKEND_URL_ENV)
            .map(|raw| {
                let url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    name: CONTAINER_BACKEND_URL_ENV,
                    reason: e.to_string(),
                })?;
                match url.scheme() {
                    "http" | "https" => Ok(url),
                    other => Err(ConfigError::Invalid {
                        name: CONTAINER_BACKEND_URL_ENV,
                        reason: format!("unsupported scheme `{other}`"),
                    }),
                }
            })
            .transpose()?;

        let backend_tls = match (
            get(CONTAINER_BACKEND_CLIENT_CERT_ENV),
            get(CONTAINER_BACKEND_CLIENT_KEY_ENV),
            get(CONTAINER_BACKEND_CA_ENV),
        ) {
            (Some(cert), Some(key), ca) => Some(BackendTls {
                client_cert: PathBuf::from(cert),
                client_key: PathBuf::from(key),
                server_ca: ca.map(PathBuf::from),
            }),
            (None, None, None) => None,
            (None, None, Some(_)) => {
                return Err(ConfigError::Requires(
                    CONTAINER_BACKEND_CA_ENV,
                    CONTAINER_BACKEND_CLIENT_CERT_ENV,
                ))
            }
            _ => {
                return Err(ConfigError::Incomplete(
                    CONTAINER_BACKEND_CLIENT_CERT_ENV,
                    CONTAINER_BACKEND_CLIENT_KEY_ENV,
                ))
            }
        };
        if backend_tls.is_some() && backend_url.is_none() {
            return Err(ConfigError::Requires(
                CONTAINER_BACKEND_CLIENT_CERT_ENV,
                CONTAINER_BACKEND_URL_ENV,
            ));
        }

        let tls = match (get(TLS_CERT_FILE_ENV), get(TLS_KEY_FILE_ENV)) {
            (Some(cert), Some(key)) => Some(TlsFiles {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_FILE_ENV, TLS_KEY_FILE_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(value) => LogFormat::parse(&value).ok_or_else(|| ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                reason: format!("expected `json` or `pretty`, got `{value}`"),
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            key_source,
            issuer: get(TOKEN_ISSUER_ENV),
            audience: get(TOKEN_AUDIENCE_ENV),
            backend_url,
            backend_tls,
            tls,
            log_format,
        })
    }
}
