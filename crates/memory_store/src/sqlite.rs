//! SQLite store implementation.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use entities::{MemoryPost, UserRecord};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, Pool, Sqlite,
};
use uuid::Uuid;

use crate::{MemoryRepository, StoreError, StoreResult, UserRepository};

/// Schema statements, applied in order on startup.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        email TEXT PRIMARY KEY,
        is_enabled INTEGER NOT NULL DEFAULT 1,
        added_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS memories (
        id TEXT PRIMARY KEY,
        comment TEXT NOT NULL,
        date TEXT NOT NULL,
        author TEXT NOT NULL,
        image_name TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_memories_date
    ON memories (date DESC)
    "#,
];

/// Timestamps are stored as fixed-width RFC 3339 UTC text so that text order
/// matches time order.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(entity_type: &'static str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::corrupt_row(entity_type, format!("bad timestamp {raw:?}: {e}")))
}

/// Database row for UserRecord
#[derive(Debug, FromRow)]
struct UserRow {
    email: String,
    is_enabled: bool,
    added_at: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserRecord {
            email: row.email,
            is_enabled: row.is_enabled,
            added_at: decode_timestamp("User", &row.added_at)?,
        })
    }
}

/// Database row for MemoryPost
#[derive(Debug, FromRow)]
struct MemoryRow {
    id: String,
    comment: String,
    date: String,
    author: String,
    image_name: Option<String>,
}

impl TryFrom<MemoryRow> for MemoryPost {
    type Error = StoreError;

    fn try_from(row: MemoryRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::corrupt_row("Memory", format!("bad id {:?}: {e}", row.id)))?;
        Ok(MemoryPost {
            id,
            comment: row.comment,
            date: decode_timestamp("Memory", &row.date)?,
            author: row.author,
            image_name: row.image_name,
        })
    }
}

/// SQLite-backed store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Connects to the database at `url` and applies the schema.
    ///
    /// In-memory URLs are held on a single connection that is never recycled,
    /// since every new SQLite connection would see an empty database.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("SQLite schema ready");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn get_user(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT email, is_enabled, added_at FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT email, is_enabled, added_at FROM users ORDER BY email")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(UserRecord::try_from).collect()
    }

    async fn upsert_user(&self, user: UserRecord) -> StoreResult<UserRecord> {
        sqlx::query(
            r#"
            INSERT INTO users (email, is_enabled, added_at)
            VALUES (?, ?, ?)
            ON CONFLICT (email) DO UPDATE SET
                is_enabled = excluded.is_enabled,
                added_at = excluded.added_at
            "#,
        )
        .bind(&user.email)
        .bind(user.is_enabled)
        .bind(encode_timestamp(&user.added_at))
        .execute(&self.pool)
        .await?;
        Ok(user)
    }

    async fn toggle_user(&self, email: &str) -> StoreResult<UserRecord> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            UPDATE users SET is_enabled = NOT is_enabled
            WHERE email = ?
            RETURNING email, is_enabled, added_at
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StoreError::not_found("User", email))?
            .try_into()
    }

    async fn delete_user(&self, email: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("User", email));
        }
        Ok(())
    }
}

#[async_trait]
impl MemoryRepository for SqliteStore {
    async fn create_memory(&self, memory: MemoryPost) -> StoreResult<MemoryPost> {
        sqlx::query(
            r#"
            INSERT INTO memories (id, comment, date, author, image_name)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(memory.id.to_string())
        .bind(&memory.comment)
        .bind(encode_timestamp(&memory.date))
        .bind(&memory.author)
        .bind(&memory.image_name)
        .execute(&self.pool)
        .await?;
        Ok(memory)
    }

    async fn get_memory(&self, id: Uuid) -> StoreResult<Option<MemoryPost>> {
        let row: Option<MemoryRow> = sqlx::query_as(
            "SELECT id, comment, date, author, image_name FROM memories WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(MemoryPost::try_from).transpose()
    }

    async fn list_memories(&self) -> StoreResult<Vec<MemoryPost>> {
        let rows: Vec<MemoryRow> = sqlx::query_as(
            "SELECT id, comment, date, author, image_name FROM memories ORDER BY date DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MemoryPost::try_from).collect()
    }

    async fn update_memory_comment(&self, id: Uuid, comment: &str) -> StoreResult<MemoryPost> {
        let row: Option<MemoryRow> = sqlx::query_as(
            r#"
            UPDATE memories SET comment = ?
            WHERE id = ?
            RETURNING id, comment, date, author, image_name
            "#,
        )
        .bind(comment)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StoreError::not_found("Memory", id.to_string()))?
            .try_into()
    }

    async fn delete_memory(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM memories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Memory", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use entities::posted_on;

    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[test]
    fn test_timestamp_text_order_matches_time_order() {
        let early = DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let late = early + chrono::Duration::milliseconds(1500);

        let (a, b) = (encode_timestamp(&early), encode_timestamp(&late));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(decode_timestamp("Test", &b).unwrap(), late);
    }

    #[tokio::test]
    async fn test_sqlite_user_crud() {
        let store = store().await;

        store.upsert_user(UserRecord::invited("bob@x.com")).await.unwrap();
        let user = store.get_user("bob@x.com").await.unwrap().unwrap();
        assert!(user.is_enabled);

        let user = store.toggle_user("bob@x.com").await.unwrap();
        assert!(!user.is_enabled);
        let user = store.toggle_user("bob@x.com").await.unwrap();
        assert!(user.is_enabled);

        store
            .upsert_user(UserRecord::invited("alice@x.com").with_enabled(false))
            .await
            .unwrap();
        let emails: Vec<String> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, ["alice@x.com", "bob@x.com"]);

        store.delete_user("bob@x.com").await.unwrap();
        assert!(store.get_user("bob@x.com").await.unwrap().is_none());
        assert!(store.delete_user("bob@x.com").await.unwrap_err().is_not_found());
        assert!(store.toggle_user("bob@x.com").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_sqlite_memory_crud() {
        let store = store().await;
        let old_day = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let new_day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let old = MemoryPost::new("picnic", posted_on(old_day), "alice@x.com")
            .with_image("park.jpg");
        let new = MemoryPost::new("trip", posted_on(new_day), "bob@x.com");
        store.create_memory(old.clone()).await.unwrap();
        store.create_memory(new.clone()).await.unwrap();

        let listed = store.list_memories().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, new.id);
        assert_eq!(listed[1].image_name.as_deref(), Some("park.jpg"));

        let updated = store.update_memory_comment(old.id, "picnic!").await.unwrap();
        assert_eq!(updated.comment, "picnic!");
        assert_eq!(updated.date, old.date);

        store.delete_memory(new.id).await.unwrap();
        assert!(store.get_memory(new.id).await.unwrap().is_none());
        assert!(store.delete_memory(new.id).await.unwrap_err().is_not_found());
    }
}
