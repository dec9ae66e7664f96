// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Container and image listings, relayed from the container backend.
//!
//! `/listImages` is open to any authenticated member; `/listContainers`
//! requires an admin team membership. The gates are applied in the router.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::{error::ApiError, state::AppState};

/// List every container on the host. Admin only.
#[utoipa::path(
    get,
    path = "/listContainers",
    tag = "Containers",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Container list as reported by the backend"),
        (status = 401, description = "Unauthorized - missing, invalid or non-admin token"),
        (status = 502, description = "Container backend request failed"),
        (status = 503, description = "Container backend not configured"),
    )
)]
pub async fn list_containers(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let containers = state.backend.list_containers().await?;
    Ok(Json(containers))
}

/// List the images available for new containers.
#[utoipa::path(
    get,
    path = "/listImages",
    tag = "Containers",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Image list as reported by the backend"),
        (status = 401, description = "Unauthorized - missing or invalid token"),
        (status = 502, description = "Container backend request failed"),
        (status = 503, description = "Container backend not configured"),
    )
)]
pub async fn list_images(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let images = state.backend.list_images().await?;
    Ok(Json(images))
}
