//! Error types for `roster-core`.

use serde::Serialize;
use thiserror::Error;

/// The machine-readable category of a failure, shared by every layer.
///
/// Storage backends classify their errors into one of these kinds and the
/// HTTP layer maps each kind onto a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  Conflict,
  BadRequest,
  /// A session was requested before the connection pool was initialised.
  Uninitialized,
  Internal,
}

impl ErrorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::NotFound => "not_found",
      Self::Conflict => "conflict",
      Self::BadRequest => "bad_request",
      Self::Uninitialized => "uninitialized",
      Self::Internal => "internal",
    }
  }
}

/// Implemented by every error type that crosses a layer boundary.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("`extra` must not contain the reserved key {0:?}")]
  ReservedAttribute(String),

  #[error("credential hashing failed: {0}")]
  Credential(String),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::EmptyField(_) | Self::ReservedAttribute(_) => ErrorKind::BadRequest,
      Self::Credential(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
