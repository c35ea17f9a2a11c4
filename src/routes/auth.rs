/**
 * Authentication Routes
 * Cookie session login, logout and session lookup for the admin
 */
use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::gate::{clear_session_cookie, session_cookie, AdminSession};
use crate::auth::Role;
use crate::error::{AppError, AppResult};
use crate::routes::SuccessResponse;
use crate::state::AppState;
use crate::validation::{parse_json, required, WireNames};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "Required"), email(message = "Invalid email"))]
    pub email: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 1, message = "Password is required")
    )]
    pub password: Option<String>,
}

impl WireNames for LoginRequest {}

/// Identity returned to the frontend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub role: Role,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, body: Bytes) -> AppResult<impl IntoResponse> {
    let request = parse_json::<LoginRequest>(&body)?;
    let email = required(request.email, "email")?;
    let password = required(request.password, "password")?;

    let authenticated = state
        .auth
        .authenticate(&email, &password)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let cookie = session_cookie(&authenticated.token, state.secure_cookies)
        .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))?;

    let user = UserInfo {
        id: authenticated.user.id.to_string(),
        email: authenticated.user.email,
        role: authenticated.user.role,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(user)))
}

/// POST /api/auth/logout
///
/// Sessions are stateless, so this only tells the browser to drop the cookie.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        Json(SuccessResponse::ok()),
    )
}

/// GET /api/auth/session
pub async fn session(AdminSession(session): AdminSession) -> Json<UserInfo> {
    Json(UserInfo {
        id: session.user_id,
        email: session.email,
        role: session.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{app, send, test_state, ADMIN_EMAIL, ADMIN_PASSWORD};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    async fn login_response(state: AppState, email: &str, password: &str) -> axum::response::Response {
        let req = Request::post("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(json!({"email": email, "password": password}).to_string()))
            .unwrap();
        app(state).oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let state = test_state(None).await;
        let res = login_response(state, ADMIN_EMAIL, "wrong").await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_none());

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_unknown_email_gets_same_answer() {
        let state = test_state(None).await;
        let res = login_response(state, "someone@example.com", ADMIN_PASSWORD).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_sets_cookie_that_unlocks_writes() {
        let state = test_state(None).await;
        let res = login_response(state.clone(), "Admin@Example.com", ADMIN_PASSWORD).await;
        assert_eq!(res.status(), StatusCode::OK);

        let set_cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("portfolio_session="));
        assert!(set_cookie.contains("HttpOnly"));

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let user: UserInfo = serde_json::from_slice(&body).unwrap();
        assert_eq!(user.email, ADMIN_EMAIL);
        assert_eq!(user.role, Role::Admin);

        let cookie = set_cookie.split(';').next().unwrap().to_string();
        let (status, created) = send(
            app(state.clone()),
            "POST",
            "/api/skills",
            Some(&cookie),
            Some(json!({"name": "Go", "level": "expert", "category": "backend"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created["id"].is_string());

        let (status, session) = send(app(state), "GET", "/api/auth/session", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["id"], user.id.as_str());
    }

    #[tokio::test]
    async fn test_malformed_login_is_400() {
        let state = test_state(None).await;
        let (status, body) = send(
            app(state.clone()),
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "not-an-email", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["fieldErrors"]["email"].is_array());

        let (status, _) = send(
            app(state),
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": ADMIN_EMAIL})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_requires_cookie() {
        let state = test_state(None).await;
        let (status, _) = send(app(state), "GET", "/api/auth/session", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let state = test_state(None).await;
        let req = Request::post("/api/auth/logout").body(Body::empty()).unwrap();
        let res = app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cleared = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cleared.contains("Max-Age=0"));
    }
}
