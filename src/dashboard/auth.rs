//! Mock Session Authentication
//!
//! Any non-empty (ip, username, password) triple is accepted; there is no
//! identity provider behind it. A successful login creates a server-side
//! session record and hands the browser a signed token naming it.
//!
//! # Token
//!
//! HS256 JWT signed with the configured secret, carrying the session id. The
//! token alone is not enough: the id must still be present in the
//! [`SessionStore`], so logout takes effect immediately.
//!
//! # Endpoints
//!
//! - `POST /api/login` - Create a session
//! - `POST /api/logout` - Drop the session (idempotent)

use super::api::{AppState, ErrorResponse, OkResponse};
use axum::{
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "netinv_session";

/// Max accepted login body
const MAX_LOGIN_BODY_BYTES: usize = 64 * 1024;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("IP, username and password are required")]
    MissingCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::MissingCredentials | AuthError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let AuthError::Internal(ref detail) = self {
            tracing::error!("Session error: {}", detail);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Server-side record of a completed mock login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Device/management address the operator typed in
    pub address: String,
    pub username: String,
    /// Enable secret as supplied (may be empty)
    pub enable: String,
    pub created_at: DateTime<Utc>,
}

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Session id
    pub sid: String,
    /// Username
    pub sub: String,
    /// Issued at
    pub iat: i64,
}

/// Login form (JSON or urlencoded). Missing fields count as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub enable: Option<String>,
}

fn trimmed(field: &Option<String>) -> &str {
    field.as_deref().map(str::trim).unwrap_or("")
}

/// Session registry keyed by session id
pub struct SessionStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    sessions: RwLock<HashMap<String, Session>>,
    secure_cookies: bool,
}

impl SessionStore {
    pub fn new(secret: &str, secure_cookies: bool) -> Self {
        // Sessions never expire, so no exp claim is issued or required
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            sessions: RwLock::new(HashMap::new()),
            secure_cookies,
        }
    }

    /// Accept any non-empty credential triple; returns the signed token
    pub fn login(&self, request: &LoginRequest) -> Result<(String, Session), AuthError> {
        let address = trimmed(&request.ip);
        let username = trimmed(&request.username);
        let password = trimmed(&request.password);

        if address.is_empty() || username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let session = Session {
            address: address.to_string(),
            username: username.to_string(),
            enable: trimmed(&request.enable).to_string(),
            created_at: Utc::now(),
        };

        let claims = Claims {
            sid: Uuid::new_v4().to_string(),
            sub: session.username.clone(),
            iat: session.created_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign session token: {}", e)))?;

        self.sessions.write().insert(claims.sid, session.clone());
        Ok((token, session))
    }

    fn session_id(&self, token: &str) -> Option<String> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.sid),
            Err(e) => {
                debug!("Rejected session token: {}", e);
                None
            }
        }
    }

    /// Session named by a token, if the token is authentic and the session live
    pub fn resolve(&self, token: &str) -> Option<Session> {
        let sid = self.session_id(token)?;
        self.sessions.read().get(&sid).cloned()
    }

    /// Session attached to the request cookies
    pub fn current(&self, jar: &CookieJar) -> Option<Session> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| self.resolve(cookie.value()))
    }

    /// Drop the session behind a token; unknown tokens are ignored
    pub fn logout(&self, token: &str) -> Option<Session> {
        let sid = self.session_id(token)?;
        self.sessions.write().remove(&sid)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn build_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .build()
    }

    pub fn build_logout_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn read_login_request(req: Request) -> Result<LoginRequest, AuthError> {
    let is_form = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let Form(login) = Form::<LoginRequest>::from_request(req, &())
            .await
            .map_err(|e| AuthError::MalformedBody(e.body_text()))?;
        return Ok(login);
    }

    let bytes = axum::body::to_bytes(req.into_body(), MAX_LOGIN_BODY_BYTES)
        .await
        .map_err(|e| AuthError::MalformedBody(format!("Failed to read body: {}", e)))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(LoginRequest::default());
    }

    serde_json::from_slice(&bytes).map_err(|e| AuthError::MalformedBody(e.to_string()))
}

/// POST /api/login
pub async fn login_handler(
    State(sessions): State<Arc<SessionStore>>,
    jar: CookieJar,
    req: Request,
) -> Result<(CookieJar, Json<OkResponse>), AuthError> {
    let login = read_login_request(req).await?;
    let (token, session) = sessions.login(&login)?;

    info!("Session opened for {}@{}", session.username, session.address);

    Ok((jar.add(sessions.build_cookie(&token)), Json(OkResponse::new())))
}

/// POST /api/logout
pub async fn logout_handler(
    State(sessions): State<Arc<SessionStore>>,
    jar: CookieJar,
) -> (CookieJar, Json<OkResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(session) = sessions.logout(cookie.value()) {
            info!("Session closed for {}@{}", session.username, session.address);
        }
    }

    (jar.remove(sessions.build_logout_cookie()), Json(OkResponse::new()))
}

// ============================================================================
// Middleware
// ============================================================================

/// Reject requests without a live session before any handler runs.
///
/// The resolved [`Session`] is placed in the request extensions.
pub async fn require_session(
    State(sessions): State<Arc<SessionStore>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let session = sessions.current(&jar).ok_or(AuthError::Unauthorized)?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Login/logout routes; state is supplied by the enclosing router
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
}

// ============================================================================
// Tests
// ============================================================================
