// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller identity endpoint.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Identity, IdentityClaims, Role};

/// Response for GET /whoami
#[derive(Debug, Serialize, ToSchema)]
pub struct WhoAmIResponse {
    /// Account username
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Group memberships from the token
    pub groups: Vec<String>,
    pub role: Role,
    /// Token expiry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<IdentityClaims> for WhoAmIResponse {
    fn from(claims: IdentityClaims) -> Self {
        let role = claims.role();
        let expires_at = claims.expires_at();
        Self {
            username: claims.preferred_username,
            name: claims.name,
            email: claims.email,
            groups: claims.groups,
            role,
            expires_at,
        }
    }
}

/// Get the authenticated caller's identity.
#[utoipa::path(
    get,
    path = "/whoami",
    tag = "Identity",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller identity", body = WhoAmIResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn whoami(Identity(claims): Identity) -> Json<WhoAmIResponse> {
    Json(claims.into())
}
