//! Pagination parameters and handler settings.

use axum::http::StatusCode;
use roster_core::resource::{DEFAULT_LIMIT, MAX_LIMIT, Page};
use serde::Deserialize;

use crate::error::ApiError;

/// Per-deployment handler behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiSettings {
  /// `limit` used when a list request omits it.
  pub default_limit: u32,
  /// Largest accepted `limit`; anything above is rejected.
  pub max_limit:     u32,
  /// Status returned by a successful create.
  pub create_status: StatusCode,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      default_limit: DEFAULT_LIMIT,
      max_limit:     MAX_LIMIT,
      create_status: StatusCode::CREATED,
    }
  }
}

/// `?limit=&offset=` as received. Negative or non-numeric values fail
/// extraction.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
  pub limit:  Option<u32>,
  pub offset: Option<u32>,
}

impl PageParams {
  pub fn resolve(self, settings: &ApiSettings) -> Result<Page, ApiError> {
    let limit = self.limit.unwrap_or(settings.default_limit);
    if limit > settings.max_limit {
      return Err(ApiError::BadRequest(format!(
        "limit must not exceed {}",
        settings.max_limit
      )));
    }
    Ok(Page::new(limit, self.offset.unwrap_or(0)))
  }
}
