//! The `Repository` and `SessionFactory` traits.
//!
//! Storage backends (e.g. `roster-store-sqlite`) implement both. The HTTP
//! layer asks a [`SessionFactory`] for a fresh session at the start of every
//! request and runs [`Repository`] operations through it; sessions are never
//! shared between requests.

use std::future::Future;

use uuid::Uuid;

use crate::{
  error::Classify,
  resource::{Page, Resource},
};

// ─── Repository ──────────────────────────────────────────────────────────────

/// Create/read/update/delete over one resource type.
///
/// Every write is atomic: either all of its changes are committed or none
/// are, and a failed write is rolled back before the error is returned.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Repository<R: Resource>: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// Validate and persist a new record. The id and both timestamps are
  /// assigned here; `created_at == updated_at` on the returned record.
  fn create(
    &self,
    data: R::Create,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + '_;

  /// Fetch one record. Fails with a not-found error if `id` is unknown.
  fn get_one(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + '_;

  /// Records matching `filter`, oldest first, then paginated by `page`.
  /// An offset past the end yields an empty list.
  fn get_many<'a>(
    &'a self,
    filter: &'a R::Filter,
    page: Page,
  ) -> impl Future<Output = Result<Vec<R>, Self::Error>> + Send + 'a;

  /// Apply only the fields present in `data`. `updated_at` always moves
  /// forward, even when `data` changes nothing.
  fn partial_update(
    &self,
    id: Uuid,
    data: R::Update,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + '_;

  /// Remove a record and return it as it was just before deletion.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + '_;
}

// ─── SessionFactory ──────────────────────────────────────────────────────────

/// Produces one unit-of-work per logical operation.
pub trait SessionFactory: Send + Sync + 'static {
  type Session: Send + Sync;
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// A new session bound to the shared connection pool. Fails with an
  /// [`Uninitialized`](crate::ErrorKind::Uninitialized) error if the pool
  /// has not been set up yet.
  fn create_session(&self) -> Result<Self::Session, Self::Error>;
}
