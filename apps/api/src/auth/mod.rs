//! Authentication: users in PostgreSQL, sessions in Redis, an opaque session
//! token carried in the `sessionid` cookie.

pub mod handlers;
pub mod password;
pub mod session;
pub mod users;

use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use cookie::{Cookie, SameSite};
use thiserror::Error;
use tracing::warn;

use crate::state::AppState;

pub use session::{RedisSessionStore, SessionStore};
pub use users::{PgUserStore, UserStore};

pub const SESSION_COOKIE: &str = "sessionid";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session store error: {0}")]
    Session(#[from] redis::RedisError),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The username behind the request's session cookie, if any.
///
/// Never rejects: a missing, unknown or unreadable session is anonymous.
pub struct SessionUser(pub Option<String>);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(SessionUser(None));
        };

        match state.sessions.lookup(&token).await {
            Ok(user) => Ok(SessionUser(user)),
            Err(e) => {
                warn!("Session lookup failed, treating request as anonymous: {e}");
                Ok(SessionUser(None))
            }
        }
    }
}

/// Reads the session token from any `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

/// `Set-Cookie` value carrying a fresh session token.
pub fn session_cookie(token: &str, ttl_secs: u64) -> String {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(ttl_secs as i64))
        .build()
        .to_string()
}

/// `Set-Cookie` value that expires the session cookie.
pub fn expired_session_cookie() -> String {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string()
}
