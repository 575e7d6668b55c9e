//! Admin panel endpoints.

use axum::{Json, extract::State};
use entities::UserRecord;
use serde::Deserialize;

use crate::{
    error::ServerResult, extract::ApiJson, middleware::CurrentSession, snapshot::PageSnapshot,
    state::AppState,
};

/// Request naming a user by email.
#[derive(Debug, Deserialize)]
pub struct UserEmailRequest {
    #[serde(default)]
    pub email: String,
}

/// Lists invited users.
pub async fn list_users(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ServerResult<Json<PageSnapshot>> {
    let session = current.require_admin()?;
    Ok(Json(PageSnapshot::build(&state, session).await?))
}

/// Invites a user, or re-enables one already invited.
pub async fn invite_user(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(request): ApiJson<UserEmailRequest>,
) -> ServerResult<Json<PageSnapshot>> {
    let session = current.require_admin()?;

    if request.email.is_empty() {
        tracing::debug!("Ignoring invite with empty email");
    } else {
        state
            .users
            .upsert_user(UserRecord::invited(&request.email))
            .await?;
        tracing::info!(email = %request.email, "User invited");
    }

    Ok(Json(PageSnapshot::build(&state, session).await?))
}

/// Enables a disabled user or disables an enabled one.
///
/// Sessions the user already holds are left open.
pub async fn toggle_user(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(request): ApiJson<UserEmailRequest>,
) -> ServerResult<Json<PageSnapshot>> {
    let session = current.require_admin()?;

    let user = state.users.toggle_user(&request.email).await?;
    tracing::info!(email = %user.email, is_enabled = user.is_enabled, "User toggled");

    Ok(Json(PageSnapshot::build(&state, session).await?))
}

/// Removes a user record. Their posts stay in the feed.
pub async fn remove_user(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(request): ApiJson<UserEmailRequest>,
) -> ServerResult<Json<PageSnapshot>> {
    let session = current.require_admin()?;

    state.users.delete_user(&request.email).await?;
    tracing::info!(email = %request.email, "User removed");

    Ok(Json(PageSnapshot::build(&state, session).await?))
}
