use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{Document, DocumentPatch, KeyKind};
use crate::validation::{blank_as_none, camel_case, required, FieldErrors, Payload, WireNames};

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and hyphens
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9-]+$").expect("slug pattern is valid");
}

/// Blog post as stored. Addressed by its unique slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl Document for BlogPost {
    const COLLECTION: &'static str = "blog_posts";
    const KEY: KeyKind = KeyKind::Slug;
    type Patch = BlogPatch;

    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }
}

/// Body of `POST /api/blog`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlogInput {
    #[validate(
        required(message = "Required"),
        length(min = 5, message = "Title must be at least 5 characters")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 3, message = "Slug must be at least 3 characters"),
        regex(path = *SLUG_REGEX, message = "Slug must contain only lowercase letters, numbers, and hyphens")
    )]
    pub slug: Option<String>,
    #[validate(
        required(message = "Required"),
        length(min = 20, message = "Content must be at least 20 characters")
    )]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "Invalid url"))]
    pub cover_image: Option<String>,
}

impl WireNames for BlogInput {
    fn wire_name(field: &str) -> String {
        camel_case(field)
    }
}

impl Payload for BlogInput {
    type Output = BlogPost;

    fn into_output(self) -> Result<BlogPost, FieldErrors> {
        Ok(BlogPost {
            title: required(self.title, "title")?,
            slug: required(self.slug, "slug")?,
            content: required(self.content, "content")?,
            tags: self.tags,
            cover_image: self.cover_image,
        })
    }
}

/// Body of `PATCH /api/blog/{slug}`.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlogPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 5, message = "Title must be at least 5 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 3, message = "Slug must be at least 3 characters"),
        regex(path = *SLUG_REGEX, message = "Slug must contain only lowercase letters, numbers, and hyphens")
    )]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 20, message = "Content must be at least 20 characters"))]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid url"))]
    pub cover_image: Option<String>,
}

impl WireNames for BlogPatch {
    fn wire_name(field: &str) -> String {
        camel_case(field)
    }
}

impl DocumentPatch for BlogPatch {
    fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }
}
