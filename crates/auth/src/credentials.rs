//! Configured login secrets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Secrets the gate compares submitted credentials against.
///
/// `password` is shared: the admin uses it together with `admin_user`, and
/// every invited user logs in with it as well.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthCredentials {
    /// Email that logs in as administrator.
    #[serde(default)]
    pub admin_user: String,

    /// Shared password.
    #[serde(default)]
    pub password: String,

    /// Emails seeded into the user store at startup.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

impl AuthCredentials {
    /// Creates credentials for the given admin email and shared password.
    pub fn new(admin_user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            admin_user: admin_user.into(),
            password: password.into(),
            allowed_users: Vec::new(),
        }
    }

    /// Sets the users seeded at startup.
    pub fn with_allowed_users(mut self, allowed_users: Vec<String>) -> Self {
        self.allowed_users = allowed_users;
        self
    }

    /// Returns true if the pair matches the configured admin exactly.
    pub fn is_admin(&self, email: &str, password: &str) -> bool {
        email == self.admin_user && password == self.password
    }

    /// Returns true if the password matches the shared password.
    pub fn matches_shared_password(&self, password: &str) -> bool {
        password == self.password
    }

    /// Returns true if both the admin email and password are set.
    pub fn is_complete(&self) -> bool {
        !self.admin_user.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for AuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredentials")
            .field("admin_user", &self.admin_user)
            .field("password", &"<redacted>")
            .field("allowed_users", &self.allowed_users)
            .finish()
    }
}
