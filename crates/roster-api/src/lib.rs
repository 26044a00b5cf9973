//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any
//! [`roster_core::repository::SessionFactory`] whose sessions can store
//! users and entities. TLS, auth and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(roster_api::api_router(db.clone(), ApiSettings::default()))
//! ```

pub mod error;
pub mod guard;
pub mod params;
pub mod resources;

use std::sync::Arc;

use axum::{Router, routing::get};
use roster_core::{
  entity::Entity,
  repository::{Repository, SessionFactory},
  resource::Resource,
  user::User,
};

pub use error::ApiError;
pub use params::{ApiSettings, PageParams};
pub use resources::ApiState;

/// Build the API router for `db`.
///
/// The returned `Router<()>` can be merged or nested into any parent router
/// regardless of its own state type.
pub fn api_router<D>(db: Arc<D>, settings: ApiSettings) -> Router<()>
where
  D: SessionFactory,
  D::Session: Repository<User> + Repository<Entity>,
{
  Router::new()
    .merge(resource_routes::<User, D>("/users"))
    .merge(resource_routes::<Entity, D>("/entities"))
    .with_state(ApiState { db, settings })
}

fn resource_routes<R, D>(base: &str) -> Router<ApiState<D>>
where
  R: Resource,
  D: SessionFactory,
  D::Session: Repository<R>,
{
  use resources::{create, delete, get_one, list, update};

  Router::new()
    .route(base, get(list::<R, D>).post(create::<R, D>))
    .route(
      &format!("{base}/{{id}}"),
      get(get_one::<R, D>)
        .put(update::<R, D>)
        .delete(delete::<R, D>),
    )
}
