//! Error type for `roster-store-sqlite`.

use roster_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] roster_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored value could not be decoded (timestamp, enum tag, …).
  #[error("decode error: {0}")]
  Decode(String),

  #[error("background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),

  #[error("invalid database uri: {0}")]
  InvalidUri(String),

  #[error("{resource} not found: {id}")]
  NotFound {
    resource: &'static str,
    id:       uuid::Uuid,
  },

  /// A UNIQUE, FOREIGN KEY or CHECK constraint rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("database connection has not been initialised")]
  Uninitialized,

  #[error("database connection has been closed")]
  Closed,
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    if let Some(description) = constraint_violation(&e) {
      tracing::debug!(error = %e, "write rejected by constraint");
      return Error::Conflict(description.to_owned());
    }
    match e {
      tokio_rusqlite::Error::ConnectionClosed => Error::Closed,
      other => Error::Database(other),
    }
  }
}

/// Describe a `SQLITE_CONSTRAINT` failure without echoing table or column
/// names back to the caller.
fn constraint_violation(e: &tokio_rusqlite::Error) -> Option<&'static str> {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, msg)) = e
  else {
    return None;
  };
  if err.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }
  let msg = msg.as_deref().unwrap_or_default();
  Some(if msg.starts_with("UNIQUE") {
    "a record with the same unique value already exists"
  } else if msg.starts_with("FOREIGN KEY") {
    "a referenced record does not exist or is still referenced"
  } else if msg.starts_with("CHECK") {
    "a value violates a check constraint"
  } else {
    "the write violates a constraint"
  })
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::NotFound { .. } => ErrorKind::NotFound,
      Error::Conflict(_) => ErrorKind::Conflict,
      Error::Uninitialized => ErrorKind::Uninitialized,
      Error::Database(_)
      | Error::Json(_)
      | Error::Uuid(_)
      | Error::Decode(_)
      | Error::Task(_)
      | Error::InvalidUri(_)
      | Error::Closed => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
