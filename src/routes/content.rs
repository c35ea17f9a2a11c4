/**
 * Content Routes
 * List/get/create/update/delete for projects, blog posts, skills and experience
 */
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::gate::AdminSession;
use crate::content::{
    blog::BlogInput, experience::ExperienceInput, project::ProjectInput, skill::SkillInput,
    BlogPost, Experience, Project, Skill,
};
use crate::error::{AppError, AppResult};
use crate::routes::SuccessResponse;
use crate::state::AppState;
use crate::store::{ContentRepository, DocKey, Document, KeyKind, Record};
use crate::validation::{parse_json, parse_payload, Payload, WireNames};

// ============================================================================
// Resource wiring
// ============================================================================

/// A content kind exposed over HTTP.
pub trait Resource: Document {
    /// Create payload for this kind.
    type Input: Payload<Output = Self>;

    /// Name used in "not found" messages.
    const LABEL: &'static str;

    fn repository(state: &AppState) -> &Arc<dyn ContentRepository<Self>>;
}

impl Resource for Project {
    type Input = ProjectInput;
    const LABEL: &'static str = "Project";

    fn repository(state: &AppState) -> &Arc<dyn ContentRepository<Self>> {
        &state.projects
    }
}

impl Resource for BlogPost {
    type Input = BlogInput;
    const LABEL: &'static str = "Blog post";

    fn repository(state: &AppState) -> &Arc<dyn ContentRepository<Self>> {
        &state.blog
    }
}

impl Resource for Skill {
    type Input = SkillInput;
    const LABEL: &'static str = "Skill";

    fn repository(state: &AppState) -> &Arc<dyn ContentRepository<Self>> {
        &state.skills
    }
}

impl Resource for Experience {
    type Input = ExperienceInput;
    const LABEL: &'static str = "Experience";

    fn repository(state: &AppState) -> &Arc<dyn ContentRepository<Self>> {
        &state.experience
    }
}

/// Resolve a path segment into a lookup key. Ids that are not UUIDs are
/// rejected here, before any store is queried.
fn parse_key<E: Document>(raw: &str) -> AppResult<DocKey> {
    match E::KEY {
        KeyKind::Slug => Ok(DocKey::Slug(raw.to_string())),
        KeyKind::Id => Uuid::parse_str(raw)
            .map(DocKey::Id)
            .map_err(|_| AppError::BadRequest("Invalid ID".to_string())),
    }
}

fn not_found<E: Resource>() -> AppError {
    AppError::NotFound(format!("{} not found", E::LABEL))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/{kind}
pub async fn list<E: Resource>(State(state): State<AppState>) -> AppResult<Json<Vec<Record<E>>>> {
    let items = E::repository(&state).list().await?;
    Ok(Json(items))
}

/// GET /api/{kind}/{key}
pub async fn get_one<E: Resource>(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
) -> AppResult<Json<Record<E>>> {
    let key = parse_key::<E>(&raw_key)?;
    E::repository(&state)
        .get(&key)
        .await?
        .map(Json)
        .ok_or_else(not_found::<E>)
}

/// POST /api/{kind}
pub async fn create<E: Resource>(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Record<E>>)> {
    let data = parse_payload::<E::Input>(&body)?;
    let record = E::repository(&state).create(data).await?;

    tracing::info!(
        collection = E::COLLECTION,
        id = %record.id,
        admin = %admin.email,
        "Content created"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /api/{kind}/{key}
pub async fn update<E>(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
    body: Bytes,
) -> AppResult<Json<Record<E>>>
where
    E: Resource,
    E::Patch: DeserializeOwned + Validate + WireNames,
{
    let patch = parse_json::<E::Patch>(&body)?;
    let key = parse_key::<E>(&raw_key)?;
    let record = E::repository(&state)
        .update(&key, &patch)
        .await?
        .ok_or_else(not_found::<E>)?;

    tracing::info!(
        collection = E::COLLECTION,
        key = %key,
        admin = %admin.email,
        "Content updated"
    );
    Ok(Json(record))
}

/// DELETE /api/{kind}/{key}
///
/// Succeeds whether or not a document matched.
pub async fn delete<E: Resource>(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    let key = parse_key::<E>(&raw_key)?;
    let removed = E::repository(&state).delete(&key).await?;

    tracing::info!(
        collection = E::COLLECTION,
        key = %key,
        removed,
        admin = %admin.email,
        "Content deleted"
    );
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{admin_cookie, app, send, test_state};
    use serde_json::json;

    fn skill_go() -> serde_json::Value {
        json!({"name": "Go", "level": "expert", "category": "backend"})
    }

    fn hello_post(title: &str) -> serde_json::Value {
        json!({
            "title": title,
            "slug": "hello-world",
            "content": "This post has more than twenty characters.",
            "tags": ["intro"]
        })
    }

    #[tokio::test]
    async fn test_skill_lifecycle() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);

        let (status, created) =
            send(app(state.clone()), "POST", "/api/skills", Some(&cookie), Some(skill_go())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["name"], "Go");
        assert_eq!(created["level"], "expert");
        assert!(created["createdAt"].is_string());

        let (status, listed) = send(app(state.clone()), "GET", "/api/skills", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], id.as_str());

        let uri = format!("/api/skills/{id}");
        let (status, body) = send(app(state.clone()), "DELETE", &uri, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, _) = send(app(state), "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_project_round_trips_fields() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        let input = json!({
            "title": "Portfolio",
            "description": "A site that shows my work",
            "techStack": ["rust", "axum"],
            "image": "",
            "link_demo": "https://example.com/demo"
        });

        let (status, created) =
            send(app(state.clone()), "POST", "/api/projects", Some(&cookie), Some(input)).await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/projects/{}", created["id"].as_str().unwrap());
        let (status, fetched) = send(app(state), "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "Portfolio");
        assert_eq!(fetched["techStack"], json!(["rust", "axum"]));
        assert_eq!(fetched["link_demo"], "https://example.com/demo");
        assert!(fetched.get("image").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);

        let (first, _) = send(
            app(state.clone()),
            "POST",
            "/api/blog",
            Some(&cookie),
            Some(hello_post("Hello world")),
        )
        .await;
        let (second, body) = send(
            app(state.clone()),
            "POST",
            "/api/blog",
            Some(&cookie),
            Some(hello_post("A different title")),
        )
        .await;

        assert_eq!(first, StatusCode::CREATED);
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Slug already exists: hello-world");
        assert_eq!(state.blog.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blog_is_addressed_by_slug() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        send(app(state.clone()), "POST", "/api/blog", Some(&cookie), Some(hello_post("Hello world"))).await;

        let (status, post) = send(app(state.clone()), "GET", "/api/blog/hello-world", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post["title"], "Hello world");

        let (status, _) = send(app(state), "GET", "/api/blog/missing-post", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_patch_to_taken_slug_conflicts() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        send(app(state.clone()), "POST", "/api/blog", Some(&cookie), Some(hello_post("Hello world"))).await;
        let mut other = hello_post("Second post");
        other["slug"] = json!("second-post");
        send(app(state.clone()), "POST", "/api/blog", Some(&cookie), Some(other)).await;

        let (status, _) = send(
            app(state.clone()),
            "PATCH",
            "/api/blog/second-post",
            Some(&cookie),
            Some(json!({"slug": "hello-world"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, post) = send(app(state), "GET", "/api/blog/second-post", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post["title"], "Second post");
    }

    #[tokio::test]
    async fn test_writes_without_valid_cookie_change_nothing() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        let (_, created) =
            send(app(state.clone()), "POST", "/api/skills", Some(&cookie), Some(skill_go())).await;
        let id: Uuid = created["id"].as_str().unwrap().parse().unwrap();
        send(app(state.clone()), "POST", "/api/blog", Some(&cookie), Some(hello_post("Hello world"))).await;

        let skill_before = state.skills.get(&DocKey::Id(id)).await.unwrap().unwrap();
        let post_key = DocKey::Slug("hello-world".into());
        let post_before = state.blog.get(&post_key).await.unwrap().unwrap();

        let skill_uri = format!("/api/skills/{id}");
        for credentials in [None, Some("portfolio_session=forged.token.value")] {
            let attempts = [
                ("POST", "/api/skills", Some(json!({"name": "Rust", "level": "expert"}))),
                ("PATCH", skill_uri.as_str(), Some(json!({"name": "Golang"}))),
                ("DELETE", skill_uri.as_str(), None),
                ("PATCH", "/api/blog/hello-world", Some(json!({"title": "Defaced"}))),
                ("DELETE", "/api/blog/hello-world", None),
            ];
            for (method, uri, body) in attempts {
                let (status, _) = send(app(state.clone()), method, uri, credentials, body).await;
                assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri} with {credentials:?}");
            }
        }

        let skills = state.skills.list().await.unwrap();
        assert_eq!(skills.len(), 1);
        let skill_after = state.skills.get(&DocKey::Id(id)).await.unwrap().unwrap();
        assert_eq!(skill_after.data, skill_before.data);
        assert_eq!(skill_after.updated_at, skill_before.updated_at);

        let post_after = state.blog.get(&post_key).await.unwrap().unwrap();
        assert_eq!(post_after.data, post_before.data);
        assert_eq!(post_after.updated_at, post_before.updated_at);
    }

    #[tokio::test]
    async fn test_skill_round_trips_fields() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        let input = json!({"name": "Postgres", "level": "intermediate", "category": "database", "icon": "🐘"});

        let (status, created) =
            send(app(state.clone()), "POST", "/api/skills", Some(&cookie), Some(input)).await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/skills/{}", created["id"].as_str().unwrap());
        let (status, fetched) = send(app(state), "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "Postgres");
        assert_eq!(fetched["level"], "intermediate");
        assert_eq!(fetched["category"], "database");
        assert_eq!(fetched["icon"], "🐘");
        assert_eq!(fetched["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_experience_round_trips_fields() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        let input = json!({
            "company": "Acme",
            "role": "Engineer",
            "startDate": "2021-03",
            "endDate": "present",
            "description": "Built the billing platform",
            "highlights": ["Cut costs", "Led migration"]
        });

        let (status, created) =
            send(app(state.clone()), "POST", "/api/experience", Some(&cookie), Some(input)).await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/experience/{}", created["id"].as_str().unwrap());
        let (status, fetched) = send(app(state), "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["company"], "Acme");
        assert_eq!(fetched["role"], "Engineer");
        assert_eq!(fetched["startDate"], "2021-03");
        assert_eq!(fetched["endDate"], "present");
        assert_eq!(fetched["description"], "Built the billing platform");
        assert_eq!(fetched["highlights"], json!(["Cut costs", "Led migration"]));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        let (_, created) = send(
            app(state.clone()),
            "POST",
            "/api/experience",
            Some(&cookie),
            Some(json!({
                "company": "Acme",
                "role": "Engineer",
                "startDate": "2021-03",
                "description": "Built the billing platform",
                "highlights": ["Cut costs"]
            })),
        )
        .await;
        let uri = format!("/api/experience/{}", created["id"].as_str().unwrap());

        let (status, updated) = send(
            app(state),
            "PATCH",
            &uri,
            Some(&cookie),
            Some(json!({"role": "Lead Engineer"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["role"], "Lead Engineer");
        assert_eq!(updated["company"], "Acme");
        assert_eq!(updated["startDate"], "2021-03");
        assert_eq!(updated["highlights"], json!(["Cut costs"]));
    }

    #[tokio::test]
    async fn test_patch_missing_record_is_404() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        let uri = format!("/api/skills/{}", Uuid::new_v4());
        let (status, _) =
            send(app(state), "PATCH", &uri, Some(&cookie), Some(json!({"name": "Rust"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_record_still_succeeds() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        let uri = format!("/api/projects/{}", Uuid::new_v4());
        let (status, body) = send(app(state), "DELETE", &uri, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);

        let (status, body) = send(app(state.clone()), "GET", "/api/skills/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid ID");

        let (status, _) =
            send(app(state), "DELETE", "/api/experience/123", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validation_errors_are_reported_per_field() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);

        let (status, body) = send(
            app(state.clone()),
            "POST",
            "/api/skills",
            Some(&cookie),
            Some(json!({"name": "Go", "level": "guru"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["fieldErrors"]["level"].is_array());

        let (status, body) = send(
            app(state.clone()),
            "POST",
            "/api/blog",
            Some(&cookie),
            Some(json!({"title": "Hello world", "slug": "Bad Slug", "content": "This post has more than twenty characters."})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["fieldErrors"]["slug"].is_array());

        let (status, body) = send(
            app(state.clone()),
            "POST",
            "/api/experience",
            Some(&cookie),
            Some(json!({"company": "Acme", "role": "Engineer", "description": "Built the billing platform"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["fieldErrors"]["startDate"].is_array());

        assert!(state.skills.list().await.unwrap().is_empty());
        assert!(state.blog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_experience_is_listed_by_start_date() {
        let state = test_state(None).await;
        let cookie = admin_cookie(&state);
        for (company, start) in [("Older", "2019-01"), ("Newest", "2023-06"), ("Middle", "2021-02")] {
            send(
                app(state.clone()),
                "POST",
                "/api/experience",
                Some(&cookie),
                Some(json!({
                    "company": company,
                    "role": "Engineer",
                    "startDate": start,
                    "description": "Worked on many interesting things"
                })),
            )
            .await;
        }

        let (_, listed) = send(app(state), "GET", "/api/experience", None, None).await;
        let companies: Vec<_> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["company"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(companies, vec!["Newest", "Middle", "Older"]);
    }
}
