//! HTTP server for Roster.
//!
//! Wires the SQLite-backed [`Database`] into the generic API router and adds
//! request tracing. The binary in `main.rs` owns configuration loading and
//! the process lifecycle.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, http::StatusCode};
use roster_api::ApiSettings;
use roster_core::resource::{DEFAULT_LIMIT, MAX_LIMIT};
use roster_store_sqlite::{Database, DatabaseConfig, Location};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  /// e.g. `sqlite://~/roster.db` or `sqlite::memory:`.
  pub database_uri:       String,
  #[serde(default = "default_pool_size")]
  pub pool_size:          usize,
  #[serde(default = "default_page_limit")]
  pub default_page_limit: u32,
  #[serde(default = "max_page_limit")]
  pub max_page_limit:     u32,
  /// Answer successful creates with `200 OK` instead of `201 Created`.
  #[serde(default)]
  pub create_status_ok:   bool,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_pool_size() -> usize { roster_store_sqlite::config::DEFAULT_POOL_SIZE }
fn default_page_limit() -> u32 { DEFAULT_LIMIT }
fn max_page_limit() -> u32 { MAX_LIMIT }

impl ServerConfig {
  /// Configuration for `database_uri`, with defaults everywhere else.
  pub fn new(database_uri: impl Into<String>) -> Self {
    Self {
      host:               default_host(),
      port:               default_port(),
      database_uri:       database_uri.into(),
      pool_size:          default_pool_size(),
      default_page_limit: default_page_limit(),
      max_page_limit:     max_page_limit(),
      create_status_ok:   false,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Parse `database_uri`, expanding a leading `~/` in file paths.
  pub fn database_config(&self) -> roster_store_sqlite::Result<DatabaseConfig> {
    let mut config =
      DatabaseConfig::from_uri(&self.database_uri)?.with_pool_size(self.pool_size);
    if let Location::File(path) = &config.location {
      config.location = Location::File(expand_tilde(path));
    }
    Ok(config)
  }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      default_limit: self.default_page_limit.min(self.max_page_limit),
      max_limit:     self.max_page_limit,
      create_status: if self.create_status_ok {
        StatusCode::OK
      } else {
        StatusCode::CREATED
      },
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `db`.
pub fn router(db: Arc<Database>, config: &ServerConfig) -> Router {
  roster_api::api_router(db, config.api_settings())
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
