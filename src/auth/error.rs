// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every variant is a request-scoped failure. They carry full detail for the
//! logs, but the client always receives the same `401` body so it cannot
//! tell a missing token from a forged one or from a non-admin caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Body returned for every rejected request.
const UNAUTHORIZED_BODY: &str = "unauthorized";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No usable bearer token in the `Authorization` header
    #[error("no bearer token present in the authorization header")]
    MissingToken,
    /// Token is not three base64url segments with a parseable header
    #[error("token is malformed")]
    MalformedToken,
    /// Signature does not verify, or the header names a disallowed algorithm
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    TokenExpired,
    #[error("token is not yet valid")]
    TokenNotYetValid,
    #[error("token issuer is invalid")]
    InvalidIssuer,
    #[error("token audience is invalid")]
    InvalidAudience,
    /// Payload does not decode into identity claims
    #[error("token claims are malformed")]
    MalformedClaims,
    /// Caller is authenticated but belongs to no administrator group
    #[error("caller is not a member of an administrator group")]
    InsufficientPrivilege,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
}

impl AuthError {
    /// Internal error code, used in logs only.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::InvalidAudience => "invalid_audience",
            AuthError::MalformedClaims => "malformed_claims",
            AuthError::InsufficientPrivilege => "insufficient_privilege",
        }
    }

    /// HTTP status for this error. Always `401 Unauthorized`.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            error: UNAUTHORIZED_BODY,
        });
        (self.status_code(), body).into_response()
    }
}
