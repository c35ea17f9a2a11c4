use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::store::{Document, DocumentPatch};
use crate::validation::{blank_as_none, required, FieldErrors, Payload, WireNames};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl FromStr for SkillLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "expert" => Ok(SkillLevel::Expert),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    #[default]
    Frontend,
    Backend,
    Jaringan,
    Database,
}

impl FromStr for SkillCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frontend" => Ok(SkillCategory::Frontend),
            "backend" => Ok(SkillCategory::Backend),
            "jaringan" => Ok(SkillCategory::Jaringan),
            "database" => Ok(SkillCategory::Database),
            _ => Err(()),
        }
    }
}

fn validate_level(value: &str) -> Result<(), ValidationError> {
    value.parse::<SkillLevel>().map(|_| ()).map_err(|_| {
        ValidationError::new("enum")
            .with_message("Level must be one of: beginner, intermediate, expert".into())
    })
}

fn validate_category(value: &str) -> Result<(), ValidationError> {
    value.parse::<SkillCategory>().map(|_| ()).map_err(|_| {
        ValidationError::new("enum")
            .with_message("Category must be one of: frontend, backend, jaringan, database".into())
    })
}

/// Skill as stored. `icon` is either an emoji or an image URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: SkillLevel,
    #[serde(default)]
    pub category: SkillCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Document for Skill {
    const COLLECTION: &'static str = "skills";
    type Patch = SkillPatch;
}

/// Body of `POST /api/skills`.
#[derive(Debug, Deserialize, Validate)]
pub struct SkillInput {
    #[validate(
        required(message = "Required"),
        length(min = 2, message = "Name must be at least 2 characters")
    )]
    pub name: Option<String>,
    #[validate(required(message = "Required"), custom(function = "validate_level"))]
    pub level: Option<String>,
    #[validate(custom(function = "validate_category"))]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub icon: Option<String>,
}

impl WireNames for SkillInput {}

impl Payload for SkillInput {
    type Output = Skill;

    fn into_output(self) -> Result<Skill, FieldErrors> {
        let level = required(self.level, "level")?
            .parse()
            .map_err(|_| FieldErrors::field("level", "Invalid level"))?;
        let category = match self.category {
            Some(raw) => raw
                .parse()
                .map_err(|_| FieldErrors::field("category", "Invalid category"))?,
            None => SkillCategory::default(),
        };
        Ok(Skill {
            name: required(self.name, "name")?,
            level,
            category,
            icon: self.icon,
        })
    }
}

/// Body of `PATCH /api/skills/{id}`. Enum fields stay strings here: they are
/// checked by the validators and merged as their serialized form.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct SkillPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_level"))]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_category"))]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl WireNames for SkillPatch {}

impl DocumentPatch for SkillPatch {}
