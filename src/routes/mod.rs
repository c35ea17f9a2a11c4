/**
 * Routes Module
 * API route handlers
 */

pub mod auth;
pub mod content;
pub mod health;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::content::{BlogPost, Experience, Project, Skill};
use crate::state::AppState;

/// Success response (for delete and logout)
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Every API route, without the transport layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        .route(
            "/api/projects",
            get(content::list::<Project>).post(content::create::<Project>),
        )
        .route(
            "/api/projects/{id}",
            get(content::get_one::<Project>)
                .patch(content::update::<Project>)
                .delete(content::delete::<Project>),
        )
        .route(
            "/api/blog",
            get(content::list::<BlogPost>).post(content::create::<BlogPost>),
        )
        .route(
            "/api/blog/{slug}",
            get(content::get_one::<BlogPost>)
                .patch(content::update::<BlogPost>)
                .delete(content::delete::<BlogPost>),
        )
        .route(
            "/api/skills",
            get(content::list::<Skill>).post(content::create::<Skill>),
        )
        .route(
            "/api/skills/{id}",
            get(content::get_one::<Skill>)
                .patch(content::update::<Skill>)
                .delete(content::delete::<Skill>),
        )
        .route(
            "/api/experience",
            get(content::list::<Experience>).post(content::create::<Experience>),
        )
        .route(
            "/api/experience/{id}",
            get(content::get_one::<Experience>)
                .patch(content::update::<Experience>)
                .delete(content::delete::<Experience>),
        )
        .route(
            "/api/uploads",
            post(upload::upload_image).layer(DefaultBodyLimit::max(upload::MAX_REQUEST_SIZE)),
        )
        .route("/health", get(health::health_ping))
        .route("/health/database", get(health::health_database))
        .route("/health/ready", get(health::health_ready))
}
