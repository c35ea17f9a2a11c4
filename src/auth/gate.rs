//! Cookie-based authorization for mutating routes.

use axum::extract::FromRequestParts;
use axum::http::{header, header::InvalidHeaderValue, request::Parts, HeaderMap, HeaderValue};

use super::session::{SessionCodec, SessionPayload, SESSION_TTL_SECONDS};
use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "portfolio_session";

/// Value of the named cookie, looked up across every `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// The admin identity behind the request's session cookie, if there is a
/// valid one. Tokens are only taken from the cookie; `Authorization` headers
/// and query strings are ignored.
pub fn authorize(headers: &HeaderMap, codec: &SessionCodec) -> Option<SessionPayload> {
    let token = read_cookie(headers, SESSION_COOKIE)?;
    let session = codec.verify(&token)?;
    if !session.role.is_admin() {
        tracing::warn!(user_id = %session.user_id, role = %session.role, "Session without admin role");
        return None;
    }
    Some(session)
}

/// Extractor for handlers that require an admin session.
///
/// ```ignore
/// async fn create(_admin: AdminSession, State(state): State<AppState>) -> AppResult<..>
/// ```
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionPayload);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, &state.codec)
            .map(AdminSession)
            .ok_or(AppError::Unauthorized)
    }
}

fn cookie_attributes(secure: bool) -> &'static str {
    if secure {
        "HttpOnly; SameSite=Lax; Path=/; Secure"
    } else {
        "HttpOnly; SameSite=Lax; Path=/"
    }
}

/// `Set-Cookie` value carrying a fresh session token.
pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; Max-Age={SESSION_TTL_SECONDS}; {}",
        cookie_attributes(secure)
    ))
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("portfolio_session=; Max-Age=0; HttpOnly; SameSite=Lax; Path=/; Secure")
    } else {
        HeaderValue::from_static("portfolio_session=; Max-Age=0; HttpOnly; SameSite=Lax; Path=/")
    }
}
