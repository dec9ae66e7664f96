// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction and the `Identity` extractor.
//!
//! Use the `Identity` extractor in handlers that need to know who is calling:
//!
//! ```rust,ignore
//! async fn whoami(Identity(claims): Identity) -> impl IntoResponse {
//!     // claims is IdentityClaims
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::claims::{decode_claims, IdentityClaims};
use super::middleware::authenticate;
use super::verifier::TokenVerifier;
use super::AuthError;

/// Pull the credential out of `Authorization: <scheme> <credential>`.
///
/// Returns an empty string when the header is absent, not valid UTF-8, or
/// does not split into exactly two whitespace-separated parts. Never fails;
/// callers treat the empty string as "no token".
pub fn extract_token(headers: &HeaderMap) -> &str {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return "";
    };
    let Ok(value) = value.to_str() else {
        return "";
    };

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_scheme), Some(credential), None) => credential,
        _ => "",
    }
}

/// Extractor for the caller's verified identity claims.
///
/// Reuses claims already attached by `require_admin`; otherwise verifies the
/// bearer token and decodes its payload.
pub struct Identity(pub IdentityClaims);

impl<S> FromRequestParts<S> for Identity
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<IdentityClaims>().cloned() {
            return Ok(Identity(claims));
        }

        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let token = authenticate(&parts.headers, &verifier)?;
        let claims = decode_claims(&token)?;

        Ok(Identity(claims))
    }
}
