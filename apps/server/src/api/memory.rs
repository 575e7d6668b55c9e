//! Memory feed endpoints.

use axum::{
    Json,
    extract::{Multipart, State},
};
use chrono::{NaiveDate, Utc};
use entities::{MemoryPost, posted_on};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ServerError, ServerResult},
    extract::ApiJson,
    middleware::CurrentSession,
    snapshot::PageSnapshot,
    state::AppState,
    uploads::is_stored_name,
};

/// Multipart field carrying the photo.
const UPLOAD_FIELD: &str = "file";

/// Create memory request.
#[derive(Debug, Deserialize)]
pub struct CreateMemoryRequest {
    #[serde(default)]
    pub comment: String,
    /// Calendar day the memory is about; today when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Name returned by a previous upload.
    #[serde(default)]
    pub image_name: Option<String>,
}

/// Update memory request.
#[derive(Debug, Deserialize)]
pub struct UpdateMemoryRequest {
    pub memory_id: Uuid,
    #[serde(default)]
    pub comment: String,
}

/// Delete memory request.
#[derive(Debug, Deserialize)]
pub struct DeleteMemoryRequest {
    pub memory_id: Uuid,
}

/// Upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub image_name: String,
    pub image_url: String,
}

/// Lists the feed.
pub async fn list_memories(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ServerResult<Json<PageSnapshot>> {
    let session = current.require_authenticated()?;
    Ok(Json(PageSnapshot::build(&state, session).await?))
}

/// Posts a memory as the caller.
pub async fn create_memory(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(request): ApiJson<CreateMemoryRequest>,
) -> ServerResult<Json<PageSnapshot>> {
    let session = current.require_authenticated()?;

    if request.comment.is_empty() {
        tracing::debug!(email = %session.user_email, "Ignoring memory with empty comment");
        return Ok(Json(PageSnapshot::build(&state, session).await?));
    }

    let image_name = request.image_name.filter(|name| !name.is_empty());
    if let Some(name) = image_name.as_deref() {
        if !is_stored_name(name) {
            return Err(ServerError::InvalidRequest(format!(
                "Invalid image name: {}",
                name
            )));
        }
    }

    let day = request.date.unwrap_or_else(|| Utc::now().date_naive());
    let mut memory = MemoryPost::new(request.comment, posted_on(day), &session.user_email);
    if let Some(image_name) = image_name {
        memory = memory.with_image(image_name);
    }

    let memory = state.memories.create_memory(memory).await?;
    tracing::info!(
        memory_id = %memory.id,
        author = %memory.author,
        date = %memory.date_label(),
        "Memory created"
    );

    Ok(Json(PageSnapshot::build(&state, session).await?))
}

/// Replaces a memory's comment. Any authenticated caller may edit any post.
pub async fn update_memory(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(request): ApiJson<UpdateMemoryRequest>,
) -> ServerResult<Json<PageSnapshot>> {
    let session = current.require_authenticated()?;

    if request.comment.is_empty() {
        tracing::debug!(memory_id = %request.memory_id, "Ignoring update with empty comment");
    } else {
        state
            .memories
            .update_memory_comment(request.memory_id, &request.comment)
            .await?;
        tracing::info!(
            memory_id = %request.memory_id,
            editor = %session.user_email,
            "Memory updated"
        );
    }

    Ok(Json(PageSnapshot::build(&state, session).await?))
}

/// Deletes a memory. Any authenticated caller may delete any post.
pub async fn delete_memory(
    State(state): State<AppState>,
    current: CurrentSession,
    ApiJson(request): ApiJson<DeleteMemoryRequest>,
) -> ServerResult<Json<PageSnapshot>> {
    let session = current.require_authenticated()?;

    state.memories.delete_memory(request.memory_id).await?;
    tracing::info!(
        memory_id = %request.memory_id,
        deleted_by = %session.user_email,
        "Memory deleted"
    );

    Ok(Json(PageSnapshot::build(&state, session).await?))
}

/// Stores an uploaded photo for a later `create`.
pub async fn upload_image(
    State(state): State<AppState>,
    current: CurrentSession,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    current.require_authenticated()?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ServerError::InvalidRequest("Upload has no file name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;

        let image_name = state
            .uploads
            .save(&file_name, &bytes)
            .await?
            .ok_or_else(|| {
                ServerError::InvalidRequest(format!("Invalid file name: {}", file_name))
            })?;
        let image_url = state.uploads.url(&image_name);

        return Ok(Json(UploadResponse {
            image_name,
            image_url,
        }));
    }

    Err(ServerError::InvalidRequest(format!(
        "Missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}
