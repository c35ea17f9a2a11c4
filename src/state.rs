use std::sync::Arc;

use crate::auth::credentials::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
use crate::auth::session::SessionCodec;
use crate::auth::Authenticator;
use crate::config::AppConfig;
use crate::content::{BlogPost, Experience, Project, Skill};
use crate::db::Database;
use crate::media::{CloudinaryUploader, MediaUploader};
use crate::store::memory::MemoryRepository;
use crate::store::postgres::PgRepository;
use crate::store::ContentRepository;

/// Shared application state available to all handlers via axum's `State` extractor.
///
/// Cloning is cheap: every field is an `Arc` or a plain flag.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<dyn ContentRepository<Project>>,
    pub blog: Arc<dyn ContentRepository<BlogPost>>,
    pub skills: Arc<dyn ContentRepository<Skill>>,
    pub experience: Arc<dyn ContentRepository<Experience>>,
    pub auth: Arc<Authenticator>,
    pub codec: Arc<SessionCodec>,
    /// `None` until the image host is configured.
    pub media: Option<Arc<dyn MediaUploader>>,
    /// `None` when running on the in-process stores.
    pub database: Option<Arc<Database>>,
    /// Add `Secure` to session cookies.
    pub secure_cookies: bool,
}

impl AppState {
    /// State backed by PostgreSQL. The pool itself connects lazily on first use.
    pub fn from_config(config: &AppConfig, codec: Arc<SessionCodec>) -> Self {
        let db = Arc::new(Database::new(config.database.clone()));
        let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(db.clone()));
        let media = config
            .upload
            .clone()
            .map(|upload| Arc::new(CloudinaryUploader::new(upload)) as Arc<dyn MediaUploader>);

        Self {
            projects: Arc::new(PgRepository::<Project>::new(db.clone())),
            blog: Arc::new(PgRepository::<BlogPost>::new(db.clone())),
            skills: Arc::new(PgRepository::<Skill>::new(db.clone())),
            experience: Arc::new(PgRepository::<Experience>::new(db.clone())),
            auth: Arc::new(Authenticator::new(credentials, codec.clone())),
            codec,
            media,
            database: Some(db),
            secure_cookies: config.production,
        }
    }

    /// State backed entirely by in-process stores.
    pub fn in_memory(
        codec: Arc<SessionCodec>,
        credentials: Arc<MemoryCredentialStore>,
        media: Option<Arc<dyn MediaUploader>>,
    ) -> Self {
        Self {
            projects: Arc::new(MemoryRepository::<Project>::new()),
            blog: Arc::new(MemoryRepository::<BlogPost>::new()),
            skills: Arc::new(MemoryRepository::<Skill>::new()),
            experience: Arc::new(MemoryRepository::<Experience>::new()),
            auth: Arc::new(Authenticator::new(credentials, codec.clone())),
            codec,
            media,
            database: None,
            secure_cookies: false,
        }
    }
}
