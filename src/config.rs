//! Runtime configuration read from the environment.
//!
//! | Env Var                  | Required | Default      |
//! |--------------------------|----------|--------------|
//! | `DATABASE_URL`           | **yes**  | --           |
//! | `AUTH_SECRET`            | **yes**  | --           |
//! | `ADMIN_EMAIL`            | **yes**  | --           |
//! | `ADMIN_PASSWORD`         | no       | bootstrap skipped |
//! | `CLOUDINARY_CLOUD_NAME`  | no       | uploads disabled |
//! | `CLOUDINARY_API_KEY`     | no       | uploads disabled |
//! | `CLOUDINARY_API_SECRET`  | no       | uploads disabled |
//! | `CLOUDINARY_FOLDER`      | no       | `portfolio`  |
//! | `ENVIRONMENT`            | no       | `development` |
//! | `HOST` / `PORT`          | no       | `127.0.0.1` / `3001` |

use crate::db::DbConfig;

/// Folder used on the image host when `CLOUDINARY_FOLDER` is unset.
pub const DEFAULT_UPLOAD_FOLDER: &str = "portfolio";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("environment variable {0} must not be empty")]
    Empty(&'static str),

    #[error("incomplete upload configuration: {0} is set but {1} is not")]
    PartialUpload(&'static str, &'static str),

    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Credentials for the external image host.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

/// Credentials used by the one-shot admin bootstrap.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DbConfig,
    pub auth_secret: String,
    pub admin: AdminBootstrap,
    pub upload: Option<UploadConfig>,
    pub production: bool,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Read the whole configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. `from_env` is the
    /// production entry point; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            let value = lookup(key).ok_or(ConfigError::Missing(key))?;
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(key));
            }
            Ok(value)
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = required("DATABASE_URL")?;
        let auth_secret = required("AUTH_SECRET")?;
        let admin_email = required("ADMIN_EMAIL")?;
        let admin_password = optional("ADMIN_PASSWORD");

        let upload = match (
            optional("CLOUDINARY_CLOUD_NAME"),
            optional("CLOUDINARY_API_KEY"),
            optional("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(UploadConfig {
                cloud_name,
                api_key,
                api_secret,
                folder: optional("CLOUDINARY_FOLDER")
                    .unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.to_string()),
            }),
            (None, None, None) => None,
            (Some(_), None, _) | (None, Some(_), _) => {
                return Err(ConfigError::PartialUpload(
                    "CLOUDINARY_CLOUD_NAME",
                    "CLOUDINARY_API_KEY",
                ))
            }
            (Some(_), Some(_), None) => {
                return Err(ConfigError::PartialUpload(
                    "CLOUDINARY_API_KEY",
                    "CLOUDINARY_API_SECRET",
                ))
            }
            (None, None, Some(_)) => {
                return Err(ConfigError::PartialUpload(
                    "CLOUDINARY_API_SECRET",
                    "CLOUDINARY_API_KEY",
                ))
            }
        };

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw.clone()))?,
            None => 3001,
        };

        Ok(Self {
            database: DbConfig::from_lookup(database_url, &optional),
            auth_secret,
            admin: AdminBootstrap {
                email: admin_email,
                password: admin_password,
            },
            upload,
            production: optional("ENVIRONMENT").as_deref() == Some("production"),
            host: optional("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        })
    }
}
