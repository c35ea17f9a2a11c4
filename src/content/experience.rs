use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{Document, DocumentPatch, SortOrder};
use crate::validation::{camel_case, required, FieldErrors, Payload, WireNames};

/// Work experience entry as stored. Dates are free-form strings; `endDate` may
/// be the literal `present`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl Document for Experience {
    const COLLECTION: &'static str = "experiences";
    const ORDER: SortOrder = SortOrder::FieldDesc("startDate");
    type Patch = ExperiencePatch;
}

/// Body of `POST /api/experience`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceInput {
    #[validate(
        required(message = "Required"),
        length(min = 2, message = "Company must be at least 2 characters")
    )]
    pub company: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 2, message = "Role must be at least 2 characters")
    )]
    pub role: Option<String>,
    #[validate(required(message = "Required"))]
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 10, message = "Description must be at least 10 characters")
    )]
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl WireNames for ExperienceInput {
    fn wire_name(field: &str) -> String {
        camel_case(field)
    }
}

impl Payload for ExperienceInput {
    type Output = Experience;

    fn into_output(self) -> Result<Experience, FieldErrors> {
        Ok(Experience {
            company: required(self.company, "company")?,
            role: required(self.role, "role")?,
            start_date: required(self.start_date, "startDate")?,
            end_date: self.end_date,
            description: required(self.description, "description")?,
            highlights: self.highlights,
        })
    }
}

/// Body of `PATCH /api/experience/{id}`.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Company must be at least 2 characters"))]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Role must be at least 2 characters"))]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
}

impl WireNames for ExperiencePatch {
    fn wire_name(field: &str) -> String {
        camel_case(field)
    }
}

impl DocumentPatch for ExperiencePatch {}
