use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{Document, DocumentPatch};
use crate::validation::{blank_as_none, camel_case, required, FieldErrors, Payload, WireNames};

/// Portfolio project as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "link_demo", default, skip_serializing_if = "Option::is_none")]
    pub link_demo: Option<String>,
    #[serde(rename = "link_repo", default, skip_serializing_if = "Option::is_none")]
    pub link_repo: Option<String>,
}

impl Document for Project {
    const COLLECTION: &'static str = "projects";
    type Patch = ProjectPatch;
}

/// Body of `POST /api/projects`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[validate(
        required(message = "Required"),
        length(min = 3, message = "Title must be at least 3 characters")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 10, message = "Description must be at least 10 characters")
    )]
    pub description: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "Invalid url"))]
    pub image: Option<String>,
    #[serde(rename = "link_demo", default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "Invalid url"))]
    pub link_demo: Option<String>,
    #[serde(rename = "link_repo", default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "Invalid url"))]
    pub link_repo: Option<String>,
}

/// The link fields keep their snake_case keys on the wire.
fn project_wire_name(field: &str) -> String {
    match field {
        "link_demo" | "link_repo" => field.to_string(),
        other => camel_case(other),
    }
}

impl WireNames for ProjectInput {
    fn wire_name(field: &str) -> String {
        project_wire_name(field)
    }
}

impl Payload for ProjectInput {
    type Output = Project;

    fn into_output(self) -> Result<Project, FieldErrors> {
        Ok(Project {
            title: required(self.title, "title")?,
            description: required(self.description, "description")?,
            tech_stack: self.tech_stack,
            image: self.image,
            link_demo: self.link_demo,
            link_repo: self.link_repo,
        })
    }
}

/// Body of `PATCH /api/projects/{id}`: every field optional, same constraints.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid url"))]
    pub image: Option<String>,
    #[serde(
        rename = "link_demo",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(url(message = "Invalid url"))]
    pub link_demo: Option<String>,
    #[serde(
        rename = "link_repo",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(url(message = "Invalid url"))]
    pub link_repo: Option<String>,
}

impl WireNames for ProjectPatch {
    fn wire_name(field: &str) -> String {
        project_wire_name(field)
    }
}

impl DocumentPatch for ProjectPatch {}
