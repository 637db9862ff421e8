use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, instrument, warn};

use super::{
    service::UserService,
    types::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest},
};
use crate::pipeline::{handler_fn, Handler, Payload, Request};
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a new user
///
/// POST /api/v1/user/register (JSON or form body)
/// Returns an access token for the new user
#[instrument(name = "register", skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    Payload(request): Payload<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    info!("Registering new user");

    let service = UserService::from_state(&state);
    let response = service.register(request).await?;

    info!(
        user_id = response.user.id,
        access_token_length = response.access_token.len(),
        "User registered successfully"
    );

    Ok(Json(response))
}

/// HTTP handler for logging in
///
/// POST /api/v1/user/login (JSON or form body)
#[instrument(name = "login", skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Payload(request): Payload<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    info!("Logging in user");

    let service = UserService::from_state(&state);
    let response = service.login(request).await?;

    info!(user_id = response.user.id, "User logged in successfully");

    Ok(Json(response))
}

/// Profile of the caller attached by the auth middleware
///
/// GET /api/v1/user/profile
pub async fn profile(req: Request) -> Result<Json<ProfileResponse>, AppError> {
    let user = req.user().ok_or_else(|| {
        warn!("Profile requested without an authenticated user");
        AppError::Unauthorized("missing authenticated user".to_string())
    })?;

    Ok(Json(ProfileResponse {
        user: user.profile(),
    }))
}

/// `profile` as a chain handler, to be wrapped by `protect`
pub fn profile_handler() -> Handler {
    handler_fn(|req: Request| async move { into_response(profile(req).await) })
}

fn into_response<T: IntoResponse>(result: Result<T, AppError>) -> Response {
    match result {
        Ok(body) => body.into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::into_route_handler;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::user::models::User;
    use crate::user::repository::InMemoryUserRepository;
    use axum::{
        body::Body,
        http::{HeaderMap, Method, Request as HttpRequest, StatusCode, Uri},
        routing::{get, post},
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/profile", get(into_route_handler(profile_handler())))
            .with_state(state)
    }

    fn json_post(uri: &str, body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_register_handler() {
        let state = AppStateBuilder::new()
            .with_user_repository(Arc::new(InMemoryUserRepository::new()))
            .build();

        let response = app(state)
            .oneshot(json_post(
                "/register",
                r#"{"name": "John Doe", "username": "john", "password": "s3cret"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let auth: AuthResponse = serde_json::from_value(read_json(response).await).unwrap();
        assert!(auth.access_token.contains('.')); // JWT has dots
        assert_eq!(auth.user.username, "john");
    }

    #[tokio::test]
    async fn test_register_handler_empty_username() {
        let state = AppStateBuilder::new()
            .with_user_repository(Arc::new(InMemoryUserRepository::new()))
            .build();

        let response = app(state)
            .oneshot(json_post(
                "/register",
                r#"{"name": "John Doe", "username": " ", "password": "s3cret"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(json["error"]["message"], "username cannot be empty");
    }

    #[tokio::test]
    async fn test_register_handler_form_body() {
        let state = AppStateBuilder::new()
            .with_user_repository(Arc::new(InMemoryUserRepository::new()))
            .build();

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/register")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("name=John+Doe&username=john&password=s3cret"))
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["user"]["name"], "John Doe");
        assert_eq!(json["user"]["username"], "john");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let state = AppStateBuilder::new()
            .with_user_repository(Arc::new(InMemoryUserRepository::new()))
            .build();

        let response = app(state)
            .oneshot(json_post("/login", r#"{"username": "john", "#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("fail when binding the payload: "));
    }

    #[tokio::test]
    async fn test_login_handler_unknown_user() {
        let state = AppStateBuilder::new()
            .with_user_repository(Arc::new(InMemoryUserRepository::new()))
            .build();

        let response = app(state)
            .oneshot(json_post(
                "/login",
                r#"{"username": "ghost", "password": "s3cret"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_without_user_is_unauthorized() {
        let state = AppStateBuilder::new().build();

        let request = HttpRequest::builder()
            .uri("/profile")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_returns_attached_user() {
        let mut req = Request::new(
            Method::GET,
            Uri::from_static("/profile"),
            HeaderMap::new(),
            Default::default(),
        );
        req.set_user(User::for_tests(4, "jane"));

        let response = profile_handler()(req).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = read_json(response).await;
        assert_eq!(json["user"]["id"], 4);
        assert_eq!(json["user"]["username"], "jane");
    }
}
