//! Error taxonomy shared by the core and the HTTP layer.
//!
//! Core operations return `AppError`; only handlers turn it into a response.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;

use crate::protocol::ErrorOut;

#[derive(Debug, Error, PartialEq)]
pub enum AppError {
  /// Mission or user id does not resolve.
  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },

  /// Submitted data is malformed (wrong answer count, blank answers, bad filters).
  #[error("validation failed: {0}")]
  Validation(String),

  /// A mission whose answer key is empty. Data-integrity fault on our side.
  #[error("invalid mission: {0}")]
  InvalidMission(String),

  /// The conditional ledger commit lost a race with another submission.
  #[error("concurrent update conflict")]
  ConcurrentUpdateConflict,

  #[error("email already registered")]
  DuplicateEmail,

  /// No authenticated identity on the request.
  #[error("unauthorized")]
  Unauthorized,
}

impl AppError {
  pub fn mission_not_found(id: &str) -> Self {
    AppError::NotFound { kind: "mission", id: id.to_string() }
  }

  pub fn user_not_found(id: &str) -> Self {
    AppError::NotFound { kind: "user", id: id.to_string() }
  }

  pub const fn status_code(&self) -> StatusCode {
    match self {
      Self::NotFound { .. } => StatusCode::NOT_FOUND,
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::InvalidMission(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Self::ConcurrentUpdateConflict | Self::DuplicateEmail => StatusCode::CONFLICT,
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
    }
  }

  /// Message safe to show to the client.
  pub fn client_message(&self) -> String {
    match self {
      Self::NotFound { kind: "mission", .. } => "Mission not found".into(),
      Self::NotFound { kind: "user", .. } => "User not found".into(),
      Self::NotFound { .. } => "Not found".into(),
      Self::Validation(msg) => msg.clone(),
      // Never expose which mission is broken or why.
      Self::InvalidMission(_) => "Internal server error".into(),
      Self::ConcurrentUpdateConflict => "Submission conflicted with another request; please retry".into(),
      Self::DuplicateEmail => "Email already registered".into(),
      Self::Unauthorized => "Not authorized".into(),
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    (self.status_code(), Json(ErrorOut { error: self.client_message() })).into_response()
  }
}
