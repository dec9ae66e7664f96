// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authenticate_only, require_admin, Role},
    state::AppState,
};

pub mod containers;
pub mod health;
pub mod identity;

pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/listContainers", get(containers::list_containers))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            require_admin,
        ));

    let member_routes = Router::new()
        .route("/listImages", get(containers::list_images))
        .route("/whoami", get(identity::whoami))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            authenticate_only,
        ));

    Router::new()
        .route("/", get(health::home))
        .route("/health/live", get(health::liveness))
        .merge(admin_routes)
        .merge(member_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::home,
        health::liveness,
        containers::list_containers,
        containers::list_images,
        identity::whoami
    ),
    components(
        schemas(
            health::HealthResponse,
            identity::WhoAmIResponse,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and landing page"),
        (name = "Containers", description = "Container and image listings"),
        (name = "Identity", description = "Caller identity")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::test_support::{foreign_token, signed_token, verifier};
    use crate::backend::{BackendError, ContainerBackend, UnconfiguredBackend};

    struct StubBackend;

    #[async_trait::async_trait]
    impl ContainerBackend for StubBackend {
        async fn list_containers(&self) -> Result<Value, BackendError> {
            Ok(json!([{ "name": "web01", "status": "Running" }]))
        }

        async fn list_images(&self) -> Result<Value, BackendError> {
            Ok(json!([{ "fingerprint": "a1b2", "properties": { "os": "ubuntu" } }]))
        }
    }

    struct FailingBackend;

    #[async_trait::async_trait]
    impl ContainerBackend for FailingBackend {
        async fn list_containers(&self) -> Result<Value, BackendError> {
            Err(BackendError::MissingMetadata)
        }

        async fn list_images(&self) -> Result<Value, BackendError> {
            Err(BackendError::MissingMetadata)
        }
    }

    fn app(backend: impl ContainerBackend + 'static) -> Router {
        router(AppState::new(verifier(), backend))
    }

    async fn get(app: Router, path: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = app(UnconfiguredBackend);
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn home_page_is_public() {
        let response = get(app(StubBackend), "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Homepage Endpoint Hit");
    }

    #[tokio::test]
    async fn liveness_is_public() {
        let response = get(app(StubBackend), "/health/live", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn images_require_authentication() {
        let response = get(app(StubBackend), "/listImages", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let forged = foreign_token(&["users/staff"]);
        let response = get(app(StubBackend), "/listImages", Some(&forged)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn members_can_list_images() {
        let token = signed_token(&["users/staff"]);
        let response = get(app(StubBackend), "/listImages", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await[0]["fingerprint"], "a1b2");
    }

    #[tokio::test]
    async fn members_cannot_list_containers() {
        let token = signed_token(&["users/staff"]);
        let response = get(app(StubBackend), "/listContainers", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({ "error": "unauthorized" }));
    }

    #[tokio::test]
    async fn admins_can_list_containers() {
        let token = signed_token(&["adminteam/ops"]);
        let response = get(app(StubBackend), "/listContainers", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await[0]["name"], "web01");
    }

    #[tokio::test]
    async fn whoami_returns_identity() {
        let token = signed_token(&["users/staff"]);
        let response = get(app(StubBackend), "/whoami", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["username"], "jdoe");
        assert_eq!(body["email"], "jdoe@example.com");
        assert_eq!(body["role"], "user");
        assert_eq!(body["groups"], json!(["users/staff"]));
    }

    #[tokio::test]
    async fn backend_failure_is_bad_gateway() {
        let token = signed_token(&["adminteam/ops"]);
        let response = get(app(FailingBackend), "/listContainers", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unconfigured_backend_is_unavailable() {
        let token = signed_token(&["users/staff"]);
        let response = get(app(UnconfiguredBackend), "/listImages", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = get(app(UnconfiguredBackend), "/api-doc/openapi.json", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let doc = json_body(response).await;
        assert!(doc["paths"].get("/listContainers").is_some());
        assert!(doc["components"]["securitySchemes"].get("bearer").is_some());
    }

    #[test]
    fn state_shares_one_verifier() {
        let state = AppState::new(verifier(), UnconfiguredBackend);
        let shared: Arc<crate::auth::TokenVerifier> = axum::extract::FromRef::from_ref(&state);
        assert!(Arc::ptr_eq(&shared, &state.verifier));
    }
}
