//! Credential checks.

use std::sync::Arc;

use memory_store::UserRepository;
use tracing::{debug, info};

use crate::{AuthCredentials, AuthError, AuthResult, Session};

/// Validates submitted credentials and produces a session.
#[derive(Clone)]
pub struct SessionGate {
    credentials: Arc<AuthCredentials>,
    users: Arc<dyn UserRepository>,
}

impl SessionGate {
    /// Creates a gate over the configured secrets and the user store.
    pub fn new(credentials: AuthCredentials, users: Arc<dyn UserRepository>) -> Self {
        Self {
            credentials: Arc::new(credentials),
            users,
        }
    }

    /// Returns the configured secrets.
    pub fn credentials(&self) -> &AuthCredentials {
        &self.credentials
    }

    /// Checks `email`/`password` and returns the session they grant.
    ///
    /// The admin pair wins regardless of the user store. Anyone else must
    /// have a user record; a disabled record is rejected before the password
    /// is looked at.
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<Session> {
        if self.credentials.is_admin(email, password) {
            info!(email = %email, "Admin authenticated");
            return Ok(Session::admin(email));
        }

        let user = self
            .users
            .get_user(email)
            .await?
            .ok_or(AuthError::AccessDenied)?;

        if !user.is_enabled {
            debug!(email = %email, "Login rejected for disabled account");
            return Err(AuthError::AccountDisabled);
        }

        if !self.credentials.matches_shared_password(password) {
            debug!(email = %email, "Login rejected for wrong password");
            return Err(AuthError::WrongPassword);
        }

        info!(email = %email, "User authenticated");
        Ok(Session::user(email))
    }
}

#[cfg(test)]
mod tests {
    use entities::UserRecord;
    use memory_store::MemoryStore;

    use super::*;

    fn gate_with(store: MemoryStore) -> SessionGate {
        SessionGate::new(
            AuthCredentials::new("admin@x.com", "secret"),
            Arc::new(store),
        )
    }

    #[tokio::test]
    async fn test_admin_succeeds_regardless_of_store() {
        let store = MemoryStore::new();
        let gate = gate_with(store.clone());

        let session = gate.authenticate("admin@x.com", "secret").await.unwrap();
        assert_eq!(session, Session::admin("admin@x.com"));

        // Even a disabled record under the admin email doesn't matter.
        store
            .upsert_user(UserRecord::invited("admin@x.com").with_enabled(false))
            .await
            .unwrap();
        let session = gate.authenticate("admin@x.com", "secret").await.unwrap();
        assert!(session.is_admin);
    }

    #[tokio::test]
    async fn test_unknown_email_is_denied() {
        let gate = gate_with(MemoryStore::new());

        for email in ["bob@x.com", "", "ADMIN@x.com"] {
            let err = gate.authenticate(email, "secret").await.unwrap_err();
            assert!(matches!(err, AuthError::AccessDenied), "{email}: {err}");
        }
    }

    #[tokio::test]
    async fn test_admin_email_with_wrong_password_falls_through() {
        let gate = gate_with(MemoryStore::new());

        let err = gate.authenticate("admin@x.com", "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::AccessDenied));
    }

    #[tokio::test]
    async fn test_invited_user_logs_in_with_shared_password() {
        let store = MemoryStore::new();
        store.upsert_user(UserRecord::invited("bob@x.com")).await.unwrap();
        let gate = gate_with(store);

        let session = gate.authenticate("bob@x.com", "secret").await.unwrap();
        assert!(session.authenticated);
        assert!(!session.is_admin);
        assert_eq!(session.user_email, "bob@x.com");

        let err = gate.authenticate("bob@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::WrongPassword));
        assert_eq!(err.code(), "wrong_password");
    }

    #[tokio::test]
    async fn test_disabled_user_is_rejected_even_with_correct_password() {
        let store = MemoryStore::new();
        store
            .upsert_user(UserRecord::invited("bob@x.com").with_enabled(false))
            .await
            .unwrap();
        let gate = gate_with(store);

        for password in ["secret", "wrong"] {
            let err = gate.authenticate("bob@x.com", password).await.unwrap_err();
            assert!(matches!(err, AuthError::AccountDisabled));
        }
    }
}
