//! [`Database`]: the process-wide connection manager and session factory.

use std::{
  sync::atomic::{AtomicBool, AtomicUsize, Ordering, fence},
  time::Duration,
};

use roster_core::repository::SessionFactory;
use tokio::sync::OnceCell;

use crate::{
  Error, Result, Session,
  config::{DatabaseConfig, Location},
  schema::{CONNECTION_PRAGMAS, SCHEMA},
};

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Engine ──────────────────────────────────────────────────────────────────

/// A fixed-size pool of SQLite connections.
///
/// Each connection owns a dedicated thread; work sent to one connection is
/// serialised there. Checkout is round-robin and never blocks.
pub struct Engine {
  conns: Vec<tokio_rusqlite::Connection>,
  next:  AtomicUsize,
}

impl Engine {
  /// Open every pooled connection and apply the schema on the first.
  pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
    let size = config.effective_pool_size();
    let mut conns = Vec::with_capacity(size);

    for index in 0..size {
      let conn = match &config.location {
        Location::Memory => tokio_rusqlite::Connection::open_in_memory().await?,
        Location::File(path) => tokio_rusqlite::Connection::open(path).await?,
      };
      conn
        .call(move |conn| {
          conn.busy_timeout(BUSY_TIMEOUT)?;
          conn.execute_batch(if index == 0 { SCHEMA } else { CONNECTION_PRAGMAS })?;
          Ok(())
        })
        .await?;
      conns.push(conn);
    }

    tracing::info!(location = ?config.location, size, "database pool ready");
    Ok(Self { conns, next: AtomicUsize::new(0) })
  }

  pub fn size(&self) -> usize { self.conns.len() }

  /// Borrow a connection handle for the lifetime of one session.
  fn checkout(&self) -> tokio_rusqlite::Connection {
    let index = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
    self.conns[index].clone()
  }

  /// Close every pooled connection. Handles still held by live sessions
  /// fail with [`Error::Closed`] from then on.
  ///
  /// A failure on one connection does not stop the others from closing;
  /// the first error is returned once all have been tried.
  async fn dispose(&self) -> Result<()> {
    let mut first_error = None;
    for conn in &self.conns {
      if let Err(e) = conn.clone().close().await {
        tracing::warn!(error = %e, "failed to close pooled connection");
        first_error.get_or_insert(e);
      }
    }
    tracing::info!(size = self.conns.len(), "database pool disposed");
    first_error.map_or(Ok(()), |e| Err(e.into()))
  }
}

// ─── Database ────────────────────────────────────────────────────────────────

/// Shared application state owning the connection pool.
///
/// The pool is built at most once, by [`get_connection`](Self::get_connection),
/// which the server calls during startup. Sessions can only be created after
/// that and before [`close_connection`](Self::close_connection).
pub struct Database {
  config: DatabaseConfig,
  engine: OnceCell<Engine>,
  closed: AtomicBool,
}

impl Database {
  pub fn new(config: DatabaseConfig) -> Self {
    Self {
      config,
      engine: OnceCell::new(),
      closed: AtomicBool::new(false),
    }
  }

  /// Return the pool, building it on the first call.
  ///
  /// Concurrent first calls initialise exactly one engine and every caller
  /// receives it. A failed initialisation is not stored, so a later call
  /// retries. If `close_connection` ran while the engine was being built,
  /// the engine is disposed here and the call fails with [`Error::Closed`].
  pub async fn get_connection(&self) -> Result<&Engine> {
    if self.closed.load(Ordering::Acquire) {
      return Err(Error::Closed);
    }
    let engine = self
      .engine
      .get_or_try_init(|| Engine::connect(&self.config))
      .await?;
    // Pairs with the fence in `close_connection`: at least one side sees
    // the other's write, so the engine is always disposed.
    fence(Ordering::SeqCst);
    if self.closed.load(Ordering::SeqCst) {
      engine.dispose().await?;
      return Err(Error::Closed);
    }
    Ok(engine)
  }

  /// Dispose of the pool if it was ever built. Calling this more than once
  /// is a no-op.
  pub async fn close_connection(&self) -> Result<()> {
    if self.closed.swap(true, Ordering::SeqCst) {
      return Ok(());
    }
    fence(Ordering::SeqCst);
    match self.engine.get() {
      Some(engine) => engine.dispose().await,
      None => Ok(()),
    }
  }

  pub fn is_initialized(&self) -> bool { self.engine.initialized() }

  /// A new session on one pooled connection.
  ///
  /// Fails with [`Error::Uninitialized`] until `get_connection` has
  /// succeeded, and with [`Error::Closed`] after `close_connection`.
  pub fn create_session(&self) -> Result<Session> {
    if self.closed.load(Ordering::Acquire) {
      return Err(Error::Closed);
    }
    let engine = self.engine.get().ok_or(Error::Uninitialized)?;
    Ok(Session::new(engine.checkout()))
  }
}

impl SessionFactory for Database {
  type Error = Error;
  type Session = Session;

  fn create_session(&self) -> Result<Session> { Database::create_session(self) }
}
