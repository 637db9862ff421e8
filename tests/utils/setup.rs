use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use jwt_login::{build_router, AppState, InMemoryUserRepository, SecretKey};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-secret";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(
            SecretKey::new(TEST_SECRET),
            Arc::new(InMemoryUserRepository::new()),
        );
        let router = build_router(state.clone());

        Self { state, router }
    }

    /// Sends `request` through a clone of the router and returns status + JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };

        (status, json)
    }

    /// Registers a user and returns the issued access token
    pub async fn register(&self, name: &str, username: &str, password: &str) -> String {
        let (status, json) = self
            .send(json_request(
                "POST",
                "/api/v1/user/register",
                serde_json::json!({ "name": name, "username": username, "password": password }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {json}");

        json["access_token"].as_str().unwrap().to_string()
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn profile_with_header(authorization: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/v1/user/profile")
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

pub fn profile_without_token() -> Request<Body> {
    Request::builder()
        .uri("/api/v1/user/profile")
        .body(Body::empty())
        .unwrap()
}
