//! In-memory store implementation.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use entities::{MemoryPost, UserRecord};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{MemoryRepository, StoreError, StoreResult, UserRepository};

/// In-memory store for tests and deployments that don't need persistence.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: Arc<RwLock<BTreeMap<String, UserRecord>>>,
    memories: Arc<RwLock<HashMap<Uuid, MemoryPost>>>,
}

impl MemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn upsert_user(&self, user: UserRecord) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn toggle_user(&self, email: &str) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(email)
            .ok_or_else(|| StoreError::not_found("User", email))?;
        user.is_enabled = !user.is_enabled;
        Ok(user.clone())
    }

    async fn delete_user(&self, email: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.remove(email).is_none() {
            return Err(StoreError::not_found("User", email));
        }
        Ok(())
    }
}

#[async_trait]
impl MemoryRepository for MemoryStore {
    async fn create_memory(&self, memory: MemoryPost) -> StoreResult<MemoryPost> {
        let mut memories = self.memories.write().await;
        memories.insert(memory.id, memory.clone());
        Ok(memory)
    }

    async fn get_memory(&self, id: Uuid) -> StoreResult<Option<MemoryPost>> {
        let memories = self.memories.read().await;
        Ok(memories.get(&id).cloned())
    }

    async fn list_memories(&self) -> StoreResult<Vec<MemoryPost>> {
        let memories = self.memories.read().await;
        let mut result: Vec<MemoryPost> = memories.values().cloned().collect();
        result.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn update_memory_comment(&self, id: Uuid, comment: &str) -> StoreResult<MemoryPost> {
        let mut memories = self.memories.write().await;
        let memory = memories
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Memory", id.to_string()))?;
        memory.comment = comment.to_string();
        Ok(memory.clone())
    }

    async fn delete_memory(&self, id: Uuid) -> StoreResult<()> {
        let mut memories = self.memories.write().await;
        if memories.remove(&id).is_none() {
            return Err(StoreError::not_found("Memory", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use entities::posted_on;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_user_crud() {
        let store = MemoryStore::new();

        // Create
        store.upsert_user(UserRecord::invited("bob@x.com")).await.unwrap();
        let fetched = store.get_user("bob@x.com").await.unwrap().unwrap();
        assert!(fetched.is_enabled);

        // Toggle
        let toggled = store.toggle_user("bob@x.com").await.unwrap();
        assert!(!toggled.is_enabled);

        // Re-invite resets to enabled
        store.upsert_user(UserRecord::invited("bob@x.com")).await.unwrap();
        assert!(store.get_user("bob@x.com").await.unwrap().unwrap().is_enabled);
        assert_eq!(store.list_users().await.unwrap().len(), 1);

        // Delete
        store.delete_user("bob@x.com").await.unwrap();
        assert!(store.get_user("bob@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_flag() {
        let store = MemoryStore::new();
        store.upsert_user(UserRecord::invited("bob@x.com")).await.unwrap();

        store.toggle_user("bob@x.com").await.unwrap();
        let user = store.toggle_user("bob@x.com").await.unwrap();
        assert!(user.is_enabled);
    }

    #[tokio::test]
    async fn test_missing_user_errors() {
        let store = MemoryStore::new();

        assert!(store.toggle_user("ghost@x.com").await.unwrap_err().is_not_found());
        assert!(store.delete_user("ghost@x.com").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_users_listed_by_email() {
        let store = MemoryStore::new();
        for email in ["carol@x.com", "alice@x.com", "bob@x.com"] {
            store.upsert_user(UserRecord::invited(email)).await.unwrap();
        }

        let emails: Vec<String> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, ["alice@x.com", "bob@x.com", "carol@x.com"]);
    }

    #[tokio::test]
    async fn test_memories_listed_newest_first() {
        let store = MemoryStore::new();
        let old = MemoryPost::new("old", posted_on(day(2023, 5, 1)), "bob@x.com");
        let new = MemoryPost::new("new", posted_on(day(2024, 1, 1)), "bob@x.com");
        let mid = MemoryPost::new("mid", posted_on(day(2023, 12, 24)), "alice@x.com");
        for memory in [old, new, mid] {
            store.create_memory(memory).await.unwrap();
        }

        let listed = store.list_memories().await.unwrap();
        let comments: Vec<&str> = listed.iter().map(|m| m.comment.as_str()).collect();
        assert_eq!(comments, ["new", "mid", "old"]);
        assert!(listed.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[tokio::test]
    async fn test_memory_update_and_delete() {
        let store = MemoryStore::new();
        let memory = MemoryPost::new("trip", posted_on(day(2024, 1, 1)), "bob@x.com");
        let created = store.create_memory(memory).await.unwrap();

        let updated = store
            .update_memory_comment(created.id, "trip to the sea")
            .await
            .unwrap();
        assert_eq!(updated.comment, "trip to the sea");
        assert_eq!(updated.date, created.date);

        store.delete_memory(created.id).await.unwrap();
        assert!(store.get_memory(created.id).await.unwrap().is_none());
        assert!(store.delete_memory(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_same_day_posts_keep_time_order() {
        let store = MemoryStore::new();
        let base = posted_on(day(2024, 1, 1));
        let first = MemoryPost::new("morning", base, "bob@x.com");
        let second = MemoryPost::new("evening", base + Duration::hours(1), "bob@x.com");
        store.create_memory(first).await.unwrap();
        store.create_memory(second).await.unwrap();

        let listed = store.list_memories().await.unwrap();
        assert_eq!(listed[0].comment, "evening");
    }
}
