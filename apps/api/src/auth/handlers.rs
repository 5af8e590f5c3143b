use axum::{
    body::Bytes,
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{expired_session_cookie, session_cookie, session_token};
use crate::errors::AppError;
use crate::models::user::NewUser;
use crate::reviews::is_truthy;
use crate::state::AppState;

/// Login fields; `userName` wins over `username` when both are set.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

impl LoginRequest {
    fn from_fields(data: &Map<String, Value>) -> Self {
        Self {
            user_name: text_field(data, &["userName", "username"]),
            password: text_field(data, &["password"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl RegisterRequest {
    fn from_fields(data: &Map<String, Value>) -> Self {
        Self {
            username: text_field(data, &["username", "userName"]),
            password: text_field(data, &["password"]),
            first_name: text_field(data, &["first_name", "firstName"]),
            last_name: text_field(data, &["last_name", "lastName"]),
            email: text_field(data, &["email"]),
        }
    }
}

/// An empty body reads as `{}`. Anything but a JSON object is rejected.
fn parse_body(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(AppError::Validation("Invalid JSON".to_string())),
    }
}

/// First truthy value among `keys`; null, `""` and missing keys fall through.
fn text_field(data: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find(|v| is_truthy(v))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req = LoginRequest::from_fields(&parse_body(&body)?);

    let user = if req.user_name.is_empty() {
        None
    } else {
        state.users.find_by_username(&req.user_name).await?
    };

    let authenticated = match user {
        Some(user) => verify_password(req.password, user.password_hash).await?,
        None => false,
    };

    if !authenticated {
        warn!("Failed login for '{}'", req.user_name);
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": "Unauthorized" })),
        )
            .into_response());
    }

    let token = state.sessions.create(&req.user_name).await?;
    info!("User {} logged in", req.user_name);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, session_cookie(&token, state.sessions.ttl_secs()))],
        Json(json!({ "userName": req.user_name, "status": "Authenticated" })),
    )
        .into_response())
}

/// GET|POST /logout
pub async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Err(e) = state.sessions.destroy(&token).await {
            warn!("Could not destroy session on logout: {e}");
        }
    }

    (
        [(SET_COOKIE, expired_session_cookie())],
        Json(json!({ "status": "logged out" })),
    )
        .into_response()
}

/// POST /register
///
/// Creates the account and logs the new user in.
pub async fn handle_register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let req = RegisterRequest::from_fields(&parse_body(&body)?);

    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let exists = || {
        (
            StatusCode::CONFLICT,
            Json(json!({ "status": "exists" })),
        )
            .into_response()
    };

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Ok(exists());
    }

    let created = state
        .users
        .create(NewUser {
            username: req.username.clone(),
            password_hash: hash_password(req.password).await?,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
        })
        .await?;
    if !created {
        return Ok(exists());
    }

    let token = state.sessions.create(&req.username).await?;

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, session_cookie(&token, state.sessions.ttl_secs()))],
        Json(json!({ "userName": req.username, "status": "Registered" })),
    )
        .into_response())
}
