//! Page snapshots returned by every command.

use auth::Session;
use entities::{MemoryPost, UserRecord};
use serde::Serialize;

use crate::{error::ServerResult, state::AppState};

/// A feed entry ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryView {
    #[serde(flatten)]
    pub post: MemoryPost,
    /// `YYYY/MM/DD`
    pub date_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Set when the post names a photo that is no longer on disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_warning: Option<String>,
}

/// Everything the page shows for one caller.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub session: Session,
    /// Present only for authenticated callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memories: Option<Vec<MemoryView>>,
    /// Present only for admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserRecord>>,
}

impl PageSnapshot {
    /// Reads the collections visible to `session`.
    pub async fn build(state: &AppState, session: &Session) -> ServerResult<Self> {
        let memories = if session.authenticated {
            let posts = state.memories.list_memories().await?;
            let mut views = Vec::with_capacity(posts.len());
            for post in posts {
                views.push(memory_view(state, post).await);
            }
            Some(views)
        } else {
            None
        };

        let users = if session.can_admin() {
            Some(state.users.list_users().await?)
        } else {
            None
        };

        Ok(Self {
            session: session.clone(),
            memories,
            users,
        })
    }
}

async fn memory_view(state: &AppState, post: MemoryPost) -> MemoryView {
    let date_label = post.date_label();
    let (image_url, image_warning) = match post.image_name.as_deref() {
        Some(name) if state.uploads.exists(name).await => (Some(state.uploads.url(name)), None),
        Some(name) => {
            tracing::warn!(memory_id = %post.id, image_name = %name, "Image file missing");
            (None, Some(format!("Image {} could not be loaded", name)))
        }
        None => (None, None),
    };

    MemoryView {
        post,
        date_label,
        image_url,
        image_warning,
    }
}
