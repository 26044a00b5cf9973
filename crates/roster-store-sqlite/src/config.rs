//! Database connection configuration.

use std::path::PathBuf;

use crate::{Error, Result};

/// Default number of pooled connections for file-backed databases.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
  /// A private in-memory database; lost when the engine is disposed.
  Memory,
  File(PathBuf),
}

/// How to build the connection pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
  pub location:  Location,
  /// Requested number of pooled connections. In-memory databases always use
  /// one, since separate in-memory connections do not share data.
  pub pool_size: usize,
}

impl DatabaseConfig {
  /// Parse a connection URI.
  ///
  /// Accepted forms: `sqlite::memory:`, `:memory:`, `sqlite://<path>`,
  /// `sqlite:<path>`, or a bare filesystem path.
  pub fn from_uri(uri: &str) -> Result<Self> {
    let uri = uri.trim();
    if uri.is_empty() {
      return Err(Error::InvalidUri("empty database uri".to_owned()));
    }

    let rest = uri
      .strip_prefix("sqlite://")
      .or_else(|| uri.strip_prefix("sqlite:"))
      .unwrap_or(uri);

    if rest.contains("://") {
      return Err(Error::InvalidUri(format!("unsupported scheme in {uri:?}")));
    }

    let location = match rest {
      ":memory:" => Location::Memory,
      "" => {
        return Err(Error::InvalidUri(format!("missing path in {uri:?}")));
      }
      path => Location::File(PathBuf::from(path)),
    };

    Ok(Self { location, pool_size: DEFAULT_POOL_SIZE })
  }

  /// A fresh in-memory database, mostly for tests.
  pub fn in_memory() -> Self {
    Self { location: Location::Memory, pool_size: 1 }
  }

  pub fn with_pool_size(mut self, pool_size: usize) -> Self {
    self.pool_size = pool_size;
    self
  }

  /// The number of connections the engine will actually open.
  pub fn effective_pool_size(&self) -> usize {
    match self.location {
      Location::Memory => 1,
      Location::File(_) => self.pool_size.max(1),
    }
  }
}
