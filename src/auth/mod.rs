/*!
 * Authentication
 * Admin credentials, session tokens and the cookie gate for write routes
 */
pub mod credentials;
pub mod gate;
pub mod password;
pub mod session;

use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};

use crate::config::AdminBootstrap;
use crate::error::AppError;
use credentials::{normalize_email, AdminUser, CredentialStore};
use session::{SessionCodec, SessionPayload};

/// Roles an identity can hold. Only `admin` exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: AdminUser,
    pub token: String,
}

/// Checks admin credentials and issues session tokens.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    codec: Arc<SessionCodec>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, codec: Arc<SessionCodec>) -> Self {
        Self { store, codec }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Verify email and password. `Ok(None)` for an unknown email and for a
    /// wrong password alike.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Authenticated>, AppError> {
        let email = normalize_email(email);
        let Some(user) = self.store.find_by_email(&email).await? else {
            tracing::warn!("Login attempt for unknown user: {}", email);
            return Ok(None);
        };

        if !password::verify_password(password, &user.password_hash).await? {
            tracing::warn!("Failed login attempt for: {}", email);
            return Ok(None);
        }

        let token = self.codec.sign(&SessionPayload {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            role: Role::Admin,
        })?;

        tracing::info!("Successful login for user: {}", user.email);
        Ok(Some(Authenticated { user, token }))
    }

    /// Create the admin account from the bootstrap credentials unless it
    /// already exists. Returns `None` when no bootstrap password is configured.
    pub async fn bootstrap(&self, admin: &AdminBootstrap) -> Result<Option<AdminUser>, AppError> {
        let Some(password) = admin.password.as_deref() else {
            tracing::warn!("ADMIN_PASSWORD is not set; skipping admin bootstrap");
            return Ok(None);
        };

        if let Some(existing) = self.store.find_by_email(&admin.email).await? {
            tracing::debug!("Admin user already exists for {}", existing.email);
            return Ok(Some(existing));
        }

        let password_hash = password::hash_password(password).await?;
        let user = self.store.ensure_admin(&admin.email, &password_hash).await?;
        tracing::info!("Admin user ensured for {}", user.email);
        Ok(Some(user))
    }
}
