// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token signature verification.
//!
//! ## Security
//!
//! - The token header selects the algorithm, but only from the asymmetric
//!   family of the configured key. `none` and HMAC algorithms are refused
//!   before any cryptography runs.
//! - `exp` and `nbf` are enforced when present, with 60 seconds of leeway.
//! - Issuer and audience are only checked when configured.
//!
//! The verifier holds no mutable state and is shared across requests
//! behind an `Arc`.

use std::sync::Arc;

use base64ct::{Base64UrlUnpadded, Encoding};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::de::IgnoredAny;

use super::claims::{decode_claims, IdentityClaims};
use super::keys::SigningKey;
use super::AuthError;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Proof that a raw token's signature matched the signing key.
///
/// Carries no claims itself. Decode them with [`decode_claims`] or
/// [`VerifiedToken::claims`].
#[derive(Debug, Clone, Copy)]
pub struct VerifiedToken<'a> {
    raw: &'a str,
    algorithm: Algorithm,
}

impl<'a> VerifiedToken<'a> {
    /// Algorithm the token was verified with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn claims(&self) -> Result<IdentityClaims, AuthError> {
        decode_claims(self)
    }

    pub(super) fn payload_segment(&self) -> &'a str {
        // Three segments are guaranteed by `check_structure`.
        self.raw.split('.').nth(1).unwrap_or_default()
    }
}

/// Verifies bearer tokens against the identity provider's public key.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: Arc<SigningKey>,
    issuer: Option<String>,
    audience: Option<String>,
    leeway: u64,
}

impl TokenVerifier {
    pub fn new(key: SigningKey) -> Self {
        Self {
            key: Arc::new(key),
            issuer: None,
            audience: None,
            leeway: CLOCK_SKEW_LEEWAY,
        }
    }

    /// Require the `iss` claim to equal `issuer`.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Require the `aud` claim to contain `audience`.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }

    /// Validate the structure and signature of `raw`.
    pub fn verify<'a>(&self, raw: &'a str) -> Result<VerifiedToken<'a>, AuthError> {
        if raw.is_empty() {
            return Err(AuthError::MissingToken);
        }
        check_structure(raw)?;

        let header = decode_header(raw).map_err(|_| AuthError::MalformedToken)?;
        if !self.key.allows(header.alg) {
            tracing::warn!(
                alg = ?header.alg,
                key_family = %self.key.family(),
                "Token declares an algorithm outside the signing key's family"
            );
            return Err(AuthError::InvalidSignature);
        }

        let validation = self.validation();
        decode::<IgnoredAny>(raw, self.key.decoding_key(), &validation).map_err(classify)?;

        Ok(VerifiedToken {
            raw,
            algorithm: header.alg,
        })
    }

    fn validation(&self) -> Validation {
        let family = self.key.family().algorithms();
        let mut validation = Validation::new(family[0]);
        validation.algorithms = family.to_vec();
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        validation.required_spec_claims.clear();

        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer]);
        }

        if let Some(ref audience) = self.audience {
            validation.set_audience(&[audience]);
        } else {
            validation.validate_aud = false;
        }

        validation
    }
}

/// Three non-empty segments, each unpadded base64url.
fn check_structure(raw: &str) -> Result<(), AuthError> {
    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::MalformedToken);
    }

    for segment in segments {
        if segment.is_empty() || Base64UrlUnpadded::decode_vec(segment).is_err() {
            return Err(AuthError::MalformedToken);
        }
    }

    Ok(())
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        ErrorKind::InvalidAudience => AuthError::InvalidAudience,
        ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => AuthError::InvalidIssuer,
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" => AuthError::InvalidAudience,
        _ => AuthError::MalformedToken,
    }
}
