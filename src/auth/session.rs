//! Signed session tokens.
//!
//! Sessions are stateless HS256 JWTs carrying the admin's id, email and role.
//! Nothing is stored server-side, so a token stays valid until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::Role;
use crate::config::ConfigError;

/// Session lifetime: 7 days.
pub const SESSION_TTL_SECONDS: i64 = 60 * 60 * 24 * 7;

/// Identity asserted by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
struct Claims {
    sub: String,
    email: String,
    role: Role,
    exp: i64,
    iat: i64,
}

pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}

impl SessionCodec {
    /// Build a codec from the signing secret. An empty secret is a configuration error.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::Empty("AUTH_SECRET"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn sign(&self, payload: &SessionPayload) -> Result<String, jsonwebtoken::errors::Error> {
        self.sign_at(payload, Utc::now())
    }

    /// Sign as if issued at `issued_at`.
    pub(crate) fn sign_at(
        &self,
        payload: &SessionPayload,
        issued_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = issued_at + Duration::seconds(SESSION_TTL_SECONDS);
        let claims = Claims {
            sub: payload.user_id.clone(),
            email: payload.email.clone(),
            role: payload.role,
            exp: exp.timestamp(),
            iat: issued_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Decode a token. Expired, tampered, malformed or foreign-key tokens all
    /// yield `None`.
    pub fn verify(&self, token: &str) -> Option<SessionPayload> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(SessionPayload {
                user_id: data.claims.sub,
                email: data.claims.email,
                role: data.claims.role,
            }),
            Err(e) => {
                tracing::debug!("Session verification failed: {}", e);
                None
            }
        }
    }
}
