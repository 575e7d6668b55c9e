//! Request extractors.

use axum::extract::FromRequest;

use crate::error::ServerError;

/// `Json` body whose rejections use the server's error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);
