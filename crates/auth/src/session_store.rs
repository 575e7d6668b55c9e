//! Session storage
//!
//! Sessions are keyed by the digest of their bearer token, so the store never
//! holds a token that could be replayed.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{AuthError, AuthResult, Session, SessionToken, token_digest};

/// Trait for session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a session under a freshly issued token
    async fn insert(&self, token: &SessionToken, session: Session) -> AuthResult<()>;

    /// Look up the live session for a bearer token
    async fn get(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Remove the session for a bearer token, returning it if it was live
    async fn remove(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Remove expired sessions (cleanup task)
    ///
    /// Returns the number of sessions removed.
    async fn cleanup_expired(&self) -> AuthResult<usize>;
}

#[derive(Debug, Clone)]
struct StoredSession {
    session: Session,
    created_at: DateTime<Utc>,
}

impl StoredSession {
    fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.created_at > ttl
    }
}

/// In-memory session store
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, StoredSession>>,
    ttl: Duration,
}

impl MemorySessionStore {
    /// Create a store whose sessions live for `ttl_hours`
    ///
    /// Fails if the lifetime does not fit in a [`Duration`].
    pub fn new(ttl_hours: u64) -> AuthResult<Self> {
        let ttl = i64::try_from(ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or(AuthError::InvalidSessionTtl(ttl_hours))?;
        Ok(Self::with_ttl(ttl))
    }

    /// Create a store with an explicit session lifetime
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(crate::DEFAULT_SESSION_TTL_HOURS as i64))
    }
}

fn poisoned(e: impl std::fmt::Display) -> AuthError {
    AuthError::SessionStore(format!("Lock poisoned: {}", e))
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, token: &SessionToken, session: Session) -> AuthResult<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(
            token.digest.clone(),
            StoredSession {
                session,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, token: &str) -> AuthResult<Option<Session>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions
            .get(&token_digest(token))
            .filter(|stored| !stored.is_expired(self.ttl))
            .map(|stored| stored.session.clone()))
    }

    async fn remove(&self, token: &str) -> AuthResult<Option<Session>> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        Ok(sessions
            .remove(&token_digest(token))
            .filter(|stored| !stored.is_expired(self.ttl))
            .map(|stored| stored.session))
    }

    async fn cleanup_expired(&self) -> AuthResult<usize> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let before_count = sessions.len();
        sessions.retain(|_, stored| !stored.is_expired(self.ttl));
        Ok(before_count - sessions.len())
    }
}
