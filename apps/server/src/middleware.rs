//! Session resolution middleware.

use std::convert::Infallible;

use auth::Session;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{
    error::{ServerError, ServerResult},
    state::AppState,
};

/// The caller's session, resolved from the bearer token.
///
/// Requests without a token, or with an unknown or expired one, carry the
/// default (anonymous) session.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    /// Bearer token the session was found under.
    pub token: Option<String>,
    pub session: Session,
}

impl CurrentSession {
    /// Fails unless the caller has logged in.
    pub fn require_authenticated(&self) -> ServerResult<&Session> {
        if self.session.authenticated {
            Ok(&self.session)
        } else {
            Err(ServerError::AuthenticationRequired)
        }
    }

    /// Fails unless the caller logged in as admin.
    pub fn require_admin(&self) -> ServerResult<&Session> {
        let session = self.require_authenticated()?;
        if session.can_admin() {
            Ok(session)
        } else {
            Err(ServerError::PermissionDenied(
                "Admin access required".to_string(),
            ))
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Extracts the bearer token from the Authorization header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Session middleware.
///
/// Looks up the bearer token in the session store and stores the resulting
/// [`CurrentSession`] in the request extensions.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let current = match extract_token(request.headers()) {
        Some(token) => match state.sessions.get(&token).await {
            Ok(Some(session)) => CurrentSession {
                token: Some(token),
                session,
            },
            Ok(None) => {
                tracing::debug!("Unknown or expired session token");
                CurrentSession::default()
            }
            Err(e) => return ServerError::from(e).into_response(),
        },
        None => CurrentSession::default(),
    };

    request.extensions_mut().insert(current);
    next.run(request).await
}
