//! User-related entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An invited user, keyed by email address.
///
/// Invited users all share one configured password; the record only decides
/// whether the email is known and whether it may currently log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Email address (primary key).
    pub email: String,
    /// Whether the user may log in.
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    /// When the user was (last) invited.
    pub added_at: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

impl UserRecord {
    /// Creates a freshly invited, enabled user.
    pub fn invited(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_enabled: true,
            added_at: Utc::now(),
        }
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, is_enabled: bool) -> Self {
        self.is_enabled = is_enabled;
        self
    }

    /// Returns the record with `is_enabled` flipped.
    pub fn toggled(mut self) -> Self {
        self.is_enabled = !self.is_enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invited_user_is_enabled() {
        let user = UserRecord::invited("bob@x.com");

        assert_eq!(user.email, "bob@x.com");
        assert!(user.is_enabled);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        for enabled in [true, false] {
            let user = UserRecord::invited("bob@x.com").with_enabled(enabled);
            assert_eq!(user.clone().toggled().toggled(), user);
            assert_eq!(user.toggled().is_enabled, !enabled);
        }
    }

    #[test]
    fn test_missing_enabled_flag_defaults_to_true() {
        let user: UserRecord = serde_json::from_str(
            r#"{"email":"bob@x.com","added_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(user.is_enabled);
    }
}
