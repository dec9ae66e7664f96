// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token signing key material.
//!
//! The identity provider signs access tokens with a single asymmetric key.
//! The public half is loaded once at startup and shared read-only by every
//! verification call. There is no rotation: a new key means a restart.
//!
//! A key that cannot be parsed is fatal. Serving traffic without a usable
//! trust anchor would silently disable authentication.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use jsonwebtoken::{Algorithm, DecodingKey};
use rsa::pkcs8::DecodePublicKey;

/// Realm public key published by the society's Keycloak instance
/// (`https://sso.compsoc.ie/auth/realms/base`).
pub const REALM_PUBLIC_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAs+6jMR7u2nBq+MxtDfcH
t/jX78GcCwvLTRVOBAIOuS2XYCM26Ttxnxl9u5j4WJqlsw75XtfpPkELO36eJsUh
2yWV9yOh4JL+nDkU9SsHKxKCzmExoevZYbiq2QbngOz/25V6IdWTIVMzykmv6c9u
iYm2ZV/CAH3sE77Te9Do9QBFo6++kZJvAAzc0109Ey1H4GAKDG9/hs8T1bKE7+2+
3Vo6lQui/y2HaBRZVcda7cyRd+qf7cxqSNKHZfMMdmAP+Px6Om9yg/jKklvz88mP
Nre4Tp9k/v5LlCMvvoG8V9XBpjR5SVednIJiIlXoV5Qf3RDxK3tKiQv0qP4AvP8T
fQIDAQAB
-----END PUBLIC KEY-----
";

/// PEM tag expected around a DER `SubjectPublicKeyInfo`.
const PUBLIC_KEY_TAG: &str = "PUBLIC KEY";

/// Errors raised while loading the signing key. All of them abort startup.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to read signing key from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("signing key is not valid PEM: {0}")]
    Pem(#[from] pem::PemError),
    #[error("expected a `PUBLIC KEY` PEM block, found `{0}`")]
    UnexpectedTag(String),
    #[error("signing key DER is malformed or not an RSA, EC or Ed25519 public key")]
    UnsupportedKey,
}

/// Asymmetric scheme of the signing key.
///
/// The family decides which header algorithms a token may declare.
/// Symmetric algorithms are never accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    /// Algorithms a token may name when verified against a key of this family.
    pub fn algorithms(self) -> &'static [Algorithm] {
        match self {
            KeyFamily::Rsa => &[
                Algorithm::RS256,
                Algorithm::RS384,
                Algorithm::RS512,
                Algorithm::PS256,
                Algorithm::PS384,
                Algorithm::PS512,
            ],
            KeyFamily::Ec => &[Algorithm::ES256, Algorithm::ES384],
            KeyFamily::Ed => &[Algorithm::EdDSA],
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFamily::Rsa => write!(f, "rsa"),
            KeyFamily::Ec => write!(f, "ec"),
            KeyFamily::Ed => write!(f, "ed25519"),
        }
    }
}

/// Where the signing key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// PEM file on disk.
    File(PathBuf),
    /// PEM text passed through configuration.
    Inline(String),
    /// The realm key compiled into the binary.
    BuiltIn,
}

/// Parsed public key of the identity provider.
#[derive(Clone)]
pub struct SigningKey {
    key: DecodingKey,
    family: KeyFamily,
}

impl SigningKey {
    /// Parse a PEM-armoured DER public key.
    pub fn from_pem(pem_text: &str) -> Result<Self, KeyError> {
        let block = pem::parse(pem_text)?;
        if block.tag() != PUBLIC_KEY_TAG {
            return Err(KeyError::UnexpectedTag(block.tag().to_string()));
        }

        let bytes = pem_text.as_bytes();
        let (key, family) = if let Ok(key) = DecodingKey::from_rsa_pem(bytes) {
            (key, KeyFamily::Rsa)
        } else if let Ok(key) = DecodingKey::from_ec_pem(bytes) {
            (key, KeyFamily::Ec)
        } else if let Ok(key) = DecodingKey::from_ed_pem(bytes) {
            (key, KeyFamily::Ed)
        } else {
            return Err(KeyError::UnsupportedKey);
        };

        // The decoding key only unwraps the SPKI envelope; parse the body too.
        if !key_body_parses(family, block.contents()) {
            return Err(KeyError::UnsupportedKey);
        }

        Ok(Self { key, family })
    }

    /// Resolve a configured key source.
    pub fn load(source: &KeySource) -> Result<Self, KeyError> {
        let key = match source {
            KeySource::File(path) => {
                let text = fs::read_to_string(path).map_err(|source| KeyError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_pem(&text)?
            }
            KeySource::Inline(text) => Self::from_pem(text)?,
            KeySource::BuiltIn => Self::from_pem(REALM_PUBLIC_KEY_PEM)?,
        };

        tracing::info!(family = %key.family, source = ?source, "Loaded token signing key");
        Ok(key)
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    /// Whether a token declaring `alg` may be checked against this key.
    pub fn allows(&self, alg: Algorithm) -> bool {
        self.family.algorithms().contains(&alg)
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }
}

fn key_body_parses(family: KeyFamily, der: &[u8]) -> bool {
    match family {
        KeyFamily::Rsa => rsa::RsaPublicKey::from_public_key_der(der).is_ok(),
        KeyFamily::Ec => {
            p256::PublicKey::from_public_key_der(der).is_ok()
                || p384::PublicKey::from_public_key_der(der).is_ok()
        }
        KeyFamily::Ed => ed25519_dalek::VerifyingKey::from_public_key_der(der).is_ok(),
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}
