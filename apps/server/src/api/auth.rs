//! Authentication API endpoints.

use auth::{Session, SessionToken};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    error::ServerResult, extract::ApiJson, middleware::CurrentSession, snapshot::PageSnapshot,
    state::AppState,
};

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    pub snapshot: PageSnapshot,
}

/// Checks credentials and opens a new session.
///
/// A rejected login leaves the caller's current session untouched.
pub async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ServerResult<Json<LoginResponse>> {
    let session = match state.gate.authenticate(&request.email, &request.password).await {
        Ok(session) => session,
        Err(e) => {
            if e.is_rejection() {
                tracing::warn!(email = %request.email, reason = e.code(), "Login failed");
            }
            return Err(e.into());
        }
    };

    // The previous session, if any, is replaced.
    if let Some(old_token) = current.token.as_deref() {
        state.sessions.remove(old_token).await?;
    }

    let token = SessionToken::generate();
    state.sessions.insert(&token, session.clone()).await?;

    tracing::info!(
        email = %session.user_email,
        is_admin = session.is_admin,
        "Session opened"
    );

    let snapshot = PageSnapshot::build(&state, &session).await?;
    Ok(Json(LoginResponse {
        token: token.token,
        snapshot,
    }))
}

/// Ends the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ServerResult<Json<PageSnapshot>> {
    if let Some(token) = current.token.as_deref() {
        if let Some(session) = state.sessions.remove(token).await? {
            tracing::info!(email = %session.user_email, "Session closed");
        }
    }

    let snapshot = PageSnapshot::build(&state, &Session::default()).await?;
    Ok(Json(snapshot))
}

/// Returns the caller's session flags.
pub async fn get_current_session(current: CurrentSession) -> ServerResult<Json<Session>> {
    let session = current.require_authenticated()?;
    Ok(Json(session.clone()))
}
