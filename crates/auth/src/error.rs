//! Authentication error types.

use memory_store::StoreError;
use thiserror::Error;

/// Errors that can occur while authenticating.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email is neither the admin nor an invited user.
    #[error("Access denied")]
    AccessDenied,

    /// The invited user has been disabled by the admin.
    #[error("Account is disabled")]
    AccountDisabled,

    /// The password does not match.
    #[error("Wrong password")]
    WrongPassword,

    /// The user store could not be read.
    #[error("User store error: {0}")]
    Store(#[from] StoreError),

    /// The session store failed.
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// The configured session lifetime is out of range.
    #[error("Session lifetime of {0} hours is out of range")]
    InvalidSessionTtl(u64),
}

impl AuthError {
    /// Returns a stable machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::AccountDisabled => "account_disabled",
            Self::WrongPassword => "wrong_password",
            Self::Store(_) | Self::SessionStore(_) | Self::InvalidSessionTtl(_) => {
                "internal_error"
            }
        }
    }

    /// Returns true if the error is a credential rejection rather than a
    /// backend failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::AccountDisabled | Self::WrongPassword
        )
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
