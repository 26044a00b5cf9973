//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::{Classify, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("database connection has not been initialised")]
  Uninitialized,

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Convert a storage or validation error by its [`ErrorKind`].
  pub fn from_store<E>(e: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match e.kind() {
      ErrorKind::NotFound => ApiError::NotFound(e.to_string()),
      ErrorKind::Conflict => ApiError::Conflict(e.to_string()),
      ErrorKind::BadRequest => ApiError::BadRequest(e.to_string()),
      ErrorKind::Uninitialized => ApiError::Uninitialized,
      ErrorKind::Internal => ApiError::Internal(Box::new(e)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self.kind() {
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Conflict => StatusCode::CONFLICT,
      ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
      ErrorKind::Uninitialized | ErrorKind::Internal => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl Classify for ApiError {
  fn kind(&self) -> ErrorKind {
    match self {
      ApiError::NotFound(_) => ErrorKind::NotFound,
      ApiError::Conflict(_) => ErrorKind::Conflict,
      ApiError::BadRequest(_) => ErrorKind::BadRequest,
      ApiError::Uninitialized => ErrorKind::Uninitialized,
      ApiError::Internal(_) => ErrorKind::Internal,
    }
  }
}

// ─── Extractor rejections ────────────────────────────────────────────────────

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Internal(e) => {
        tracing::error!(error = ?e, "internal error while handling request");
        "internal server error".to_owned()
      }
      ApiError::Uninitialized => {
        tracing::error!("request received before the database was initialised");
        self.to_string()
      }
      other => other.to_string(),
    };
    let body = json!({ "kind": self.kind(), "message": message });
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  #[error("disk on fire: SELECT * FROM users")]
  struct Boom;

  impl Classify for Boom {
    fn kind(&self) -> ErrorKind { ErrorKind::Internal }
  }

  async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn internal_errors_hide_details() {
    let (status, body) = body_of(ApiError::from_store(Boom)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "internal");
    assert_eq!(body["message"], "internal server error");
  }

  #[tokio::test]
  async fn validation_errors_are_bad_request() {
    let err = ApiError::from_store(roster_core::Error::EmptyField("name"));
    let (status, body) = body_of(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
    assert_eq!(body["message"], "name must not be empty");
  }

  #[test]
  fn every_kind_has_a_status() {
    assert_eq!(ApiError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::Conflict(String::new()).status(), StatusCode::CONFLICT);
    assert_eq!(
      ApiError::Uninitialized.status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }
}
