//! Helpers for driving the router in tests.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

use crate::auth::credentials::MemoryCredentialStore;
use crate::auth::session::SessionCodec;
use crate::config::AdminBootstrap;
use crate::media::MediaUploader;
use crate::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct";

/// In-memory state with the admin already bootstrapped.
pub async fn test_state(media: Option<Arc<dyn MediaUploader>>) -> AppState {
    let codec = Arc::new(SessionCodec::new("route-test-secret").unwrap());
    let state = AppState::in_memory(codec, Arc::new(MemoryCredentialStore::new()), media);
    state
        .auth
        .bootstrap(&AdminBootstrap {
            email: ADMIN_EMAIL.into(),
            password: Some(ADMIN_PASSWORD.into()),
        })
        .await
        .unwrap();
    state
}

pub fn app(state: AppState) -> Router {
    super::router().with_state(state)
}

/// A valid `Cookie` header value for the admin.
pub fn admin_cookie(state: &AppState) -> String {
    let token = state
        .codec
        .sign(&crate::auth::session::SessionPayload {
            user_id: "test-admin".into(),
            email: ADMIN_EMAIL.into(),
            role: crate::auth::Role::Admin,
        })
        .unwrap();
    format!("{}={}", crate::auth::gate::SESSION_COOKIE, token)
}

pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    let req = match body {
        Some(json) => req
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}
