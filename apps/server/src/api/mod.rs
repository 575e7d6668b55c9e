//! API endpoints.

pub mod admin;
pub mod auth;
pub mod memory;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    error::ServerResult, middleware::CurrentSession, snapshot::PageSnapshot, state::AppState,
};

/// Creates the API router with all endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/page", get(get_page))
        // Auth endpoints
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::get_current_session))
        // Admin endpoints
        .route("/api/admin/user/list", post(admin::list_users))
        .route("/api/admin/user/invite", post(admin::invite_user))
        .route("/api/admin/user/toggle", post(admin::toggle_user))
        .route("/api/admin/user/remove", post(admin::remove_user))
        // Memory endpoints
        .route("/api/memory/list", post(memory::list_memories))
        .route("/api/memory/create", post(memory::create_memory))
        .route("/api/memory/update", post(memory::update_memory))
        .route("/api/memory/delete", post(memory::delete_memory))
        .route("/api/memory/upload", post(memory::upload_image))
        // Health check
        .route("/health", get(health_check))
}

/// Returns the caller's page without changing anything.
async fn get_page(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ServerResult<Json<PageSnapshot>> {
    Ok(Json(PageSnapshot::build(&state, &current.session).await?))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
