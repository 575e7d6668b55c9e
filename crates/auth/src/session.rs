//! Per-client session state.

use serde::{Deserialize, Serialize};

/// The three flags that decide what a client may see and do.
///
/// A client that has not logged in holds the default session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Whether the client has logged in.
    pub authenticated: bool,
    /// Whether the client logged in with the admin credentials.
    pub is_admin: bool,
    /// Email the client logged in with; empty when not authenticated.
    pub user_email: String,
}

impl Session {
    /// Creates an authenticated admin session.
    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            is_admin: true,
            user_email: email.into(),
        }
    }

    /// Creates an authenticated session for an invited user.
    pub fn user(email: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            is_admin: false,
            user_email: email.into(),
        }
    }

    /// Returns true if the session may use the admin panel.
    pub fn can_admin(&self) -> bool {
        self.authenticated && self.is_admin
    }
}
