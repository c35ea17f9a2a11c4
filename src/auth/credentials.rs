//! Admin identities.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::Role;
use crate::db::{models::UserRow, Database};
use crate::store::StoreError;

/// Admin account as stored. The email is kept lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for AdminUser {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse().map_err(|_| {
            StoreError::Database(sqlx::Error::Decode(
                format!("unknown role {:?} for user {}", row.role, row.id).into(),
            ))
        })?;
        Ok(Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up an admin by email; the email is normalized first.
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, StoreError>;

    /// Create the admin if no record exists for the email and return the
    /// stored record either way. Safe to call repeatedly and concurrently;
    /// duplicates are prevented by the email uniqueness constraint.
    async fn ensure_admin(&self, email: &str, password_hash: &str)
        -> Result<AdminUser, StoreError>;
}

pub struct PgCredentialStore {
    db: Arc<Database>,
}

impl PgCredentialStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, StoreError> {
        let pool = self.db.pool().await?;
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, email, password_hash, role, created_at, updated_at
               FROM users
               WHERE email = $1"#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
        row.map(AdminUser::try_from).transpose()
    }

    async fn ensure_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminUser, StoreError> {
        let pool = self.db.pool().await?;
        let email = normalize_email(email);

        sqlx::query(
            r#"INSERT INTO users (email, password_hash, role)
               VALUES ($1, $2, $3)
               ON CONFLICT (email) DO NOTHING"#,
        )
        .bind(&email)
        .bind(password_hash)
        .bind(Role::Admin.as_str())
        .execute(pool)
        .await?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, email, password_hash, role, created_at, updated_at
               FROM users
               WHERE email = $1"#,
        )
        .bind(&email)
        .fetch_one(pool)
        .await?;
        AdminUser::try_from(row)
    }
}

/// In-process credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<Vec<AdminUser>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, StoreError> {
        let email = normalize_email(email);
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn ensure_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminUser, StoreError> {
        let email = normalize_email(email);
        let mut users = self.users.lock().await;
        if let Some(existing) = users.iter().find(|u| u.email == email) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let user = AdminUser {
            id: Uuid::new_v4(),
            email,
            password_hash: password_hash.to_string(),
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}
