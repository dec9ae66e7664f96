// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization middleware for Axum.
//!
//! Two gates, applied per router subtree:
//!
//! - [`authenticate_only`] - the bearer token must verify against the
//!   signing key. Claims are not decoded or attached.
//! - [`require_admin`] - additionally decodes the claims and requires an
//!   administrator group. The decoded [`IdentityClaims`] are inserted into
//!   the request extensions for the handler.
//!
//! Every rejection is the same `401`, whatever step failed. The cause is
//! only logged.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let verifier = Arc::new(TokenVerifier::new(SigningKey::load(&source)?));
//!
//! let app = Router::new()
//!     .route("/listContainers", get(list_containers))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         verifier.clone(),
//!         require_admin,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::claims::{decode_claims, IdentityClaims};
use super::extractor::extract_token;
use super::verifier::{TokenVerifier, VerifiedToken};
use super::AuthError;

/// Extract and verify the bearer token in `headers`.
pub fn authenticate<'a>(
    headers: &'a HeaderMap,
    verifier: &TokenVerifier,
) -> Result<VerifiedToken<'a>, AuthError> {
    let raw = extract_token(headers);
    if raw.is_empty() {
        return Err(AuthError::MissingToken);
    }
    verifier.verify(raw)
}

/// Authenticate, decode the claims and require an administrator group.
pub fn authorize_admin(
    headers: &HeaderMap,
    verifier: &TokenVerifier,
) -> Result<IdentityClaims, AuthError> {
    let token = authenticate(headers, verifier)?;
    let claims = decode_claims(&token)?;

    if !claims.is_admin() {
        tracing::info!(
            user = %claims.preferred_username,
            groups = ?claims.groups,
            "Caller lacks administrator group membership"
        );
        return Err(AuthError::InsufficientPrivilege);
    }

    Ok(claims)
}

/// Gate that only proves authentication.
pub async fn authenticate_only(
    State(verifier): State<Arc<TokenVerifier>>,
    request: Request,
    next: Next,
) -> Response {
    let outcome = authenticate(request.headers(), &verifier).map(|_| ());

    match outcome {
        Ok(()) => next.run(request).await,
        Err(err) => reject(&request, err),
    }
}

/// Gate that requires an authenticated administrator.
pub async fn require_admin(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authorize_admin(request.headers(), &verifier) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => reject(&request, err),
    }
}

fn reject(request: &Request, err: AuthError) -> Response {
    let path = request.uri().path();
    match err {
        AuthError::MissingToken => {
            tracing::debug!(path = %path, "Rejected request without bearer token");
        }
        _ => {
            tracing::warn!(
                path = %path,
                error = %err,
                error_code = err.error_code(),
                "Rejected request"
            );
        }
    }
    err.into_response()
}
