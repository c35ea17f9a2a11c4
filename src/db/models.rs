//! Database rows as sqlx reads them.

use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::store::Record;

/// Row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of any content collection table: one JSONB document plus bookkeeping columns.
#[derive(Debug, FromRow)]
pub struct DocumentRow<E> {
    pub id: Uuid,
    pub doc: Json<E>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<E> From<DocumentRow<E>> for Record<E> {
    fn from(row: DocumentRow<E>) -> Self {
        Record {
            id: row.id,
            data: row.doc.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
