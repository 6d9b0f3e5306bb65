use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::error::AppError;
use crate::core::session::Session;

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session middleware is not installed".to_string()))
    }
}
