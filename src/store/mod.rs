//! Content repositories.
//!
//! Every content kind is stored as a document in its own collection. The
//! [`ContentRepository`] trait is the uniform CRUD contract; [`postgres`]
//! backs it with JSONB tables and [`memory`] with an in-process map.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Table names of all content collections, in creation order.
pub const CONTENT_COLLECTIONS: [&str; 4] = ["projects", "blog_posts", "skills", "experiences"];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// How a kind's documents are addressed in point lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Store-assigned UUID.
    Id,
    /// The document's unique `slug` field.
    Slug,
}

/// Ordering of `list()` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first.
    CreatedDesc,
    /// Descending by a string field of the document, newest first on ties.
    FieldDesc(&'static str),
}

/// A resolved lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocKey {
    Id(Uuid),
    Slug(String),
}

impl std::fmt::Display for DocKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocKey::Id(id) => write!(f, "{id}"),
            DocKey::Slug(slug) => f.write_str(slug),
        }
    }
}

/// A content kind that can live in a collection.
pub trait Document:
    Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    /// Collection (table) name.
    const COLLECTION: &'static str;
    const KEY: KeyKind = KeyKind::Id;
    const ORDER: SortOrder = SortOrder::CreatedDesc;

    /// Validated partial update for this kind.
    type Patch: DocumentPatch;

    /// Unique slug, for kinds keyed by slug.
    fn slug(&self) -> Option<&str> {
        None
    }
}

/// A validated partial update. Serializes to a JSON object holding only the
/// supplied fields, which is merged over the stored document.
pub trait DocumentPatch: Serialize + Send + Sync {
    /// New slug, when the patch changes it.
    fn slug(&self) -> Option<&str> {
        None
    }
}

/// A stored document with its store-assigned id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record<E> {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: E,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ContentRepository<E: Document>: Send + Sync {
    /// All documents of the collection in the kind's sort order.
    async fn list(&self) -> Result<Vec<Record<E>>, StoreError>;

    async fn get(&self, key: &DocKey) -> Result<Option<Record<E>>, StoreError>;

    /// Insert a new document. Slug-keyed kinds fail with
    /// [`StoreError::Conflict`] when the slug is taken.
    async fn create(&self, data: E) -> Result<Record<E>, StoreError>;

    /// Merge the supplied fields into the matching document. `Ok(None)` when
    /// nothing matches.
    async fn update(&self, key: &DocKey, patch: &E::Patch)
        -> Result<Option<Record<E>>, StoreError>;

    /// `Ok(true)` when a document was removed, `Ok(false)` when nothing matched.
    async fn delete(&self, key: &DocKey) -> Result<bool, StoreError>;
}

pub(crate) fn slug_conflict(slug: &str) -> StoreError {
    StoreError::Conflict(format!("Slug already exists: {slug}"))
}

/// Overlay the patch's fields on a document, the same way the SQL backend's
/// `doc || patch` does.
pub(crate) fn merge_patch<E: Document>(data: &E, patch: &E::Patch) -> Result<E, StoreError> {
    let mut doc = serde_json::to_value(data)?;
    if let (Value::Object(target), Value::Object(fields)) = (&mut doc, serde_json::to_value(patch)?) {
        target.extend(fields);
    }
    Ok(serde_json::from_value(doc)?)
}

/// String value of a top-level document field, used for field sort orders.
pub(crate) fn field_str<E: Document>(data: &E, field: &str) -> Option<String> {
    match serde_json::to_value(data).ok()?.get(field)? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
