//! In-process backends. Used by the test-suite and for embedding the API
//! without a database server.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    field_str, merge_patch, slug_conflict, ContentRepository, DocKey, Document, DocumentPatch,
    Record, SortOrder, StoreError,
};

/// A collection kept in a vector, in insertion order.
pub struct MemoryRepository<E> {
    records: RwLock<Vec<Record<E>>>,
}

impl<E> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Document> MemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches<E: Document>(record: &Record<E>, key: &DocKey) -> bool {
    match key {
        DocKey::Id(id) => record.id == *id,
        DocKey::Slug(slug) => record.data.slug() == Some(slug.as_str()),
    }
}

#[async_trait]
impl<E: Document> ContentRepository<E> for MemoryRepository<E> {
    async fn list(&self) -> Result<Vec<Record<E>>, StoreError> {
        // Reverse first so that the stable sort keeps the newest insert ahead on ties.
        let mut items: Vec<Record<E>> = self.records.read().await.iter().rev().cloned().collect();
        match E::ORDER {
            SortOrder::CreatedDesc => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::FieldDesc(field) => {
                items.sort_by_cached_key(|r| std::cmp::Reverse(field_str(&r.data, field)))
            }
        }
        Ok(items)
    }

    async fn get(&self, key: &DocKey) -> Result<Option<Record<E>>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| matches(r, key)).cloned())
    }

    async fn create(&self, data: E) -> Result<Record<E>, StoreError> {
        let mut records = self.records.write().await;
        if let Some(slug) = data.slug() {
            if records.iter().any(|r| r.data.slug() == Some(slug)) {
                return Err(slug_conflict(slug));
            }
        }

        let now = Utc::now();
        let record = Record {
            id: Uuid::new_v4(),
            data,
            created_at: now,
            updated_at: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        key: &DocKey,
        patch: &E::Patch,
    ) -> Result<Option<Record<E>>, StoreError> {
        let mut records = self.records.write().await;
        let Some(index) = records.iter().position(|r| matches(r, key)) else {
            return Ok(None);
        };

        if let Some(new_slug) = patch.slug() {
            let taken = records
                .iter()
                .enumerate()
                .any(|(i, r)| i != index && r.data.slug() == Some(new_slug));
            if taken {
                return Err(slug_conflict(new_slug));
            }
        }

        let merged = merge_patch(&records[index].data, patch)?;
        let record = &mut records[index];
        record.data = merged;
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, key: &DocKey) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !matches(r, key));
        Ok(records.len() != before)
    }
}
