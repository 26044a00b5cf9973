//! Generic CRUD handlers, mounted once per resource.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `GET`    | `/<base>`      | `?limit&offset` plus the resource's filter keys |
//! | `POST`   | `/<base>`      | Body: create payload; 201 (or configured status) |
//! | `GET`    | `/<base>/{id}` | 404 if not found |
//! | `PUT`    | `/<base>/{id}` | Partial update; body `id` must equal the path id |
//! | `DELETE` | `/<base>/{id}` | Returns the deleted record |
//!
//! Every handler opens its own session from the shared [`SessionFactory`]
//! and drops it before returning.

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
};
use roster_core::{
  repository::{Repository, SessionFactory},
  resource::Resource,
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  guard::check_payload_mismatch,
  params::{ApiSettings, PageParams},
};

/// Router state shared by every handler.
pub struct ApiState<D> {
  pub db:       Arc<D>,
  pub settings: ApiSettings,
}

// `D` itself need not be `Clone`.
impl<D> Clone for ApiState<D> {
  fn clone(&self) -> Self {
    Self {
      db:       Arc::clone(&self.db),
      settings: self.settings,
    }
  }
}

fn open_session<D: SessionFactory>(db: &D) -> Result<D::Session, ApiError> {
  db.create_session().map_err(ApiError::from_store)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /<base>[?limit=&offset=&<filter>...]`
pub async fn list<R, D>(
  State(state): State<ApiState<D>>,
  page: Result<Query<PageParams>, QueryRejection>,
  filter: Result<Query<R::Filter>, QueryRejection>,
) -> Result<Json<Vec<R>>, ApiError>
where
  R: Resource,
  D: SessionFactory,
  D::Session: Repository<R>,
{
  let Query(page) = page?;
  let Query(filter) = filter?;
  let page = page.resolve(&state.settings)?;

  let session = open_session(&*state.db)?;
  let records = session
    .get_many(&filter, page)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /<base>/{id}`
pub async fn get_one<R, D>(
  State(state): State<ApiState<D>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<R>, ApiError>
where
  R: Resource,
  D: SessionFactory,
  D::Session: Repository<R>,
{
  let Path(id) = id?;
  let session = open_session(&*state.db)?;
  let record = session.get_one(id).await.map_err(ApiError::from_store)?;
  Ok(Json(record))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /<base>`
pub async fn create<R, D>(
  State(state): State<ApiState<D>>,
  body: Result<Json<R::Create>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
  R: Resource,
  D: SessionFactory,
  D::Session: Repository<R>,
{
  let Json(body) = body?;
  let session = open_session(&*state.db)?;
  let record = session.create(body).await.map_err(ApiError::from_store)?;
  tracing::info!(resource = R::NAME, id = %record.id(), "created");
  Ok((state.settings.create_status, Json(record)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /<base>/{id}`
///
/// The body's `id` is checked against the path before a session exists, so
/// a mismatched request cannot touch the database.
pub async fn update<R, D>(
  State(state): State<ApiState<D>>,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<R::Update>, JsonRejection>,
) -> Result<Json<R>, ApiError>
where
  R: Resource,
  D: SessionFactory,
  D::Session: Repository<R>,
{
  let Path(id) = id?;
  let Json(body) = body?;
  check_payload_mismatch(id, R::payload_id(&body))?;

  let session = open_session(&*state.db)?;
  let record = session
    .partial_update(id, body)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(resource = R::NAME, %id, "updated");
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /<base>/{id}`
pub async fn delete<R, D>(
  State(state): State<ApiState<D>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<R>, ApiError>
where
  R: Resource,
  D: SessionFactory,
  D::Session: Repository<R>,
{
  let Path(id) = id?;
  let session = open_session(&*state.db)?;
  let record = session.delete(id).await.map_err(ApiError::from_store)?;
  tracing::info!(resource = R::NAME, %id, "deleted");
  Ok(Json(record))
}
