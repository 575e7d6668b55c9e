//! Application state

use std::sync::Arc;

use auth::{AuthError, MemorySessionStore, SessionGate, SessionStore};
use entities::UserRecord;
use memory_store::{MemoryRepository, MemoryStore, SqliteStore, StoreError, UserRepository};

use crate::{config::ServerConfig, uploads::UploadDir};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Invited users
    pub users: Arc<dyn UserRepository>,

    /// Memory feed
    pub memories: Arc<dyn MemoryRepository>,

    /// Live sessions, keyed by token digest
    pub sessions: Arc<dyn SessionStore>,

    /// Credential checks
    pub gate: SessionGate,

    /// Uploaded photos
    pub uploads: UploadDir,

    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state
    pub async fn new(config: ServerConfig) -> Result<Self, StateError> {
        match config.database_url.clone() {
            Some(url) => {
                let store = SqliteStore::connect(&url).await?;
                tracing::info!("Using SQLite store");
                Self::with_store(config, store).await
            }
            None => {
                tracing::warn!("DATABASE_URL not set, data will not survive a restart");
                Self::with_store(config, MemoryStore::new()).await
            }
        }
    }

    /// Create application state over an existing store
    pub async fn with_store<S>(config: ServerConfig, store: S) -> Result<Self, StateError>
    where
        S: UserRepository + MemoryRepository + Clone + 'static,
    {
        let users: Arc<dyn UserRepository> = Arc::new(store.clone());
        let memories: Arc<dyn MemoryRepository> = Arc::new(store);

        seed_allowed_users(users.as_ref(), &config.auth.allowed_users).await?;

        let uploads = UploadDir::new(&config.upload_dir);
        uploads.ensure().await?;

        let sessions: Arc<dyn SessionStore> =
            Arc::new(MemorySessionStore::new(config.session_ttl_hours)?);
        let gate = SessionGate::new(config.auth.clone(), users.clone());

        Ok(Self {
            users,
            memories,
            sessions,
            gate,
            uploads,
            config: Arc::new(config),
        })
    }
}

/// Adds each configured user that has no record yet.
///
/// Existing records are left alone so a disabled user stays disabled.
async fn seed_allowed_users(
    users: &dyn UserRepository,
    allowed_users: &[String],
) -> Result<(), StoreError> {
    for email in allowed_users {
        if users.get_user(email).await?.is_none() {
            users.upsert_user(UserRecord::invited(email)).await?;
            tracing::info!(email = %email, "Seeded allowed user");
        }
    }
    Ok(())
}

/// State initialization errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Store initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("Upload directory unavailable: {0}")]
    Uploads(#[from] std::io::Error),

    #[error("Session store initialization failed: {0}")]
    Sessions(#[from] AuthError),
}
