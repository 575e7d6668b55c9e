//! Repository trait definitions.

use async_trait::async_trait;
use entities::{MemoryPost, UserRecord};
use uuid::Uuid;

use crate::StoreResult;

/// Storage for invited users, keyed by email.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by email.
    async fn get_user(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Lists all users ordered by email.
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>>;

    /// Creates or replaces the user with the same email.
    async fn upsert_user(&self, user: UserRecord) -> StoreResult<UserRecord>;

    /// Flips a user's enabled flag and returns the updated record.
    async fn toggle_user(&self, email: &str) -> StoreResult<UserRecord>;

    /// Deletes a user.
    async fn delete_user(&self, email: &str) -> StoreResult<()>;
}

/// Storage for memory posts.
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    /// Creates a new memory post.
    async fn create_memory(&self, memory: MemoryPost) -> StoreResult<MemoryPost>;

    /// Gets a memory post by ID.
    async fn get_memory(&self, id: Uuid) -> StoreResult<Option<MemoryPost>>;

    /// Lists all memory posts, newest `date` first.
    async fn list_memories(&self) -> StoreResult<Vec<MemoryPost>>;

    /// Replaces the comment of a memory post.
    async fn update_memory_comment(&self, id: Uuid, comment: &str) -> StoreResult<MemoryPost>;

    /// Deletes a memory post.
    async fn delete_memory(&self, id: Uuid) -> StoreResult<()>;
}
