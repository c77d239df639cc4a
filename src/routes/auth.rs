//! Authenticated identity extractor.
//!
//! Credential checks happen upstream; the auth layer forwards the verified user id
//! in the `x-user-id` header. Handlers that take `AuthUser` reject requests without it.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
  S: Send + Sync,
{
  type Rejection = AppError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .map(|v| AuthUser(v.to_string()))
      .ok_or(AppError::Unauthorized)
  }
}
