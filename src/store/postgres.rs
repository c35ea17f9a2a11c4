//! JSONB-document collections on PostgreSQL.

use async_trait::async_trait;
use sqlx::types::Json;
use std::{marker::PhantomData, sync::Arc};

use super::{
    slug_conflict, ContentRepository, DocKey, Document, DocumentPatch, KeyKind, Record,
    SortOrder, StoreError,
};
use crate::db::{models::DocumentRow, Database};

const COLUMNS: &str = "id, doc, created_at, updated_at";

pub struct PgRepository<E> {
    db: Arc<Database>,
    _kind: PhantomData<fn() -> E>,
}

impl<E: Document> PgRepository<E> {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            _kind: PhantomData,
        }
    }

    fn order_by() -> String {
        match E::ORDER {
            SortOrder::CreatedDesc => "created_at DESC".to_string(),
            SortOrder::FieldDesc(field) => format!("doc->>'{field}' DESC, created_at DESC"),
        }
    }

    /// WHERE clause and bind value for a key. Ids are bound as text and cast so
    /// both key kinds share one code path.
    fn key_filter(key: &DocKey) -> (&'static str, String) {
        match key {
            DocKey::Id(id) => ("id = $1::uuid", id.to_string()),
            DocKey::Slug(slug) => ("doc->>'slug' = $1", slug.clone()),
        }
    }

    async fn slug_taken(&self, slug: &str) -> Result<bool, StoreError> {
        let pool = self.db.pool().await?;
        let (exists,): (bool,) = sqlx::query_as(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE doc->>'slug' = $1)",
            E::COLLECTION
        ))
        .bind(slug)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}

/// Unique-index violations on a slug-keyed collection are slug conflicts.
fn map_write_error(err: sqlx::Error, slug: Option<&str>) -> StoreError {
    match (&err, slug) {
        (sqlx::Error::Database(db_err), Some(slug)) if db_err.is_unique_violation() => {
            slug_conflict(slug)
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl<E: Document> ContentRepository<E> for PgRepository<E> {
    async fn list(&self) -> Result<Vec<Record<E>>, StoreError> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query_as::<_, DocumentRow<E>>(&format!(
            "SELECT {COLUMNS} FROM {} ORDER BY {}",
            E::COLLECTION,
            Self::order_by()
        ))
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn get(&self, key: &DocKey) -> Result<Option<Record<E>>, StoreError> {
        let pool = self.db.pool().await?;
        let (filter, value) = Self::key_filter(key);
        let row = sqlx::query_as::<_, DocumentRow<E>>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE {filter}",
            E::COLLECTION
        ))
        .bind(value)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(Record::from))
    }

    async fn create(&self, data: E) -> Result<Record<E>, StoreError> {
        if E::KEY == KeyKind::Slug {
            if let Some(slug) = data.slug() {
                if self.slug_taken(slug).await? {
                    return Err(slug_conflict(slug));
                }
            }
        }

        let pool = self.db.pool().await?;
        let slug = data.slug().map(str::to_owned);
        let row = sqlx::query_as::<_, DocumentRow<E>>(&format!(
            "INSERT INTO {} (doc) VALUES ($1) RETURNING {COLUMNS}",
            E::COLLECTION
        ))
        .bind(Json(&data))
        .fetch_one(pool)
        .await
        .map_err(|e| map_write_error(e, slug.as_deref()))?;
        Ok(row.into())
    }

    async fn update(
        &self,
        key: &DocKey,
        patch: &E::Patch,
    ) -> Result<Option<Record<E>>, StoreError> {
        let pool = self.db.pool().await?;
        let (filter, value) = Self::key_filter(key);
        let row = sqlx::query_as::<_, DocumentRow<E>>(&format!(
            "UPDATE {} SET doc = doc || $2, updated_at = now() WHERE {filter} RETURNING {COLUMNS}",
            E::COLLECTION
        ))
        .bind(value)
        .bind(Json(patch))
        .fetch_optional(pool)
        .await
        .map_err(|e| map_write_error(e, patch.slug()))?;
        Ok(row.map(Record::from))
    }

    async fn delete(&self, key: &DocKey) -> Result<bool, StoreError> {
        let pool = self.db.pool().await?;
        let (filter, value) = Self::key_filter(key);
        let result = sqlx::query(&format!("DELETE FROM {} WHERE {filter}", E::COLLECTION))
            .bind(value)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
