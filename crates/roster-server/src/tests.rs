//! End-to-end tests driving the full router over an in-memory database.

use std::{path::Path, sync::Arc};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use roster_core::{
  entity::{Entity, EntityKind, NewEntity},
  repository::Repository,
};
use roster_store_sqlite::{Database, DatabaseConfig, Location};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use super::*;

async fn make_app(config: &ServerConfig) -> (Router, Arc<Database>) {
  let db = Arc::new(Database::new(DatabaseConfig::in_memory()));
  db.get_connection().await.unwrap();
  (router(Arc::clone(&db), config), db)
}

async fn app() -> Router {
  make_app(&ServerConfig::new("sqlite::memory:")).await.0
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string())),
    None => builder.body(Body::empty()),
  }
  .unwrap();

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn create_user(app: &Router, username: &str) -> Value {
  let (status, body) = send(
    app,
    "POST",
    "/users",
    Some(json!({ "username": username, "password": "hunter2" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "body: {body}");
  body
}

// ── Create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_user_returns_201_without_password() {
  let app = app().await;
  let body = create_user(&app, "alice").await;

  assert_eq!(body["username"], "alice");
  assert_eq!(body["is_active"], true);
  assert_eq!(body["created_at"], body["updated_at"]);
  let text = body.to_string();
  assert!(!text.contains("hunter2"));
  assert!(!text.contains("password"));
  assert!(!text.contains("argon2"));
}

#[tokio::test]
async fn create_status_can_be_200() {
  let mut config = ServerConfig::new("sqlite::memory:");
  config.create_status_ok = true;
  let (app, _db) = make_app(&config).await;

  let (status, _) = send(
    &app,
    "POST",
    "/entities",
    Some(json!({ "name": "Acme", "type": "organization" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_username_is_409() {
  let app = app().await;
  create_user(&app, "alice").await;

  let (status, body) = send(
    &app,
    "POST",
    "/users",
    Some(json!({ "username": "alice", "password": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn malformed_bodies_are_400() {
  let app = app().await;

  let (status, body) = send(&app, "POST", "/users", Some(json!({ "username": "x" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "bad_request");

  let (status, _) = send(
    &app,
    "POST",
    "/entities",
    Some(json!({ "name": "x", "type": "planet" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &app,
    "POST",
    "/users",
    Some(json!({ "username": "  ", "password": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reserved_extra_key_is_400() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/entities",
    Some(json!({ "name": "x", "type": "person", "extra": { "external_ref": 1 } })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
}

#[tokio::test]
async fn missing_owner_is_409() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/entities",
    Some(json!({ "name": "x", "type": "person", "owner_id": Uuid::new_v4() })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(!body["message"].as_str().unwrap().contains("entities"));
}

// ── Read ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_one_round_trips() {
  let app = app().await;
  let created = create_user(&app, "alice").await;
  let id = created["id"].as_str().unwrap();

  let (status, fetched) = send(&app, "GET", &format!("/users/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn unknown_id_is_404() {
  let app = app().await;
  let (status, body) =
    send(&app, "GET", &format!("/entities/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn malformed_id_is_400() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/users/not-a-uuid", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "bad_request");
}

#[tokio::test]
async fn list_paginates_in_creation_order() {
  let app = app().await;
  for name in ["a", "b", "c", "d", "e"] {
    create_user(&app, name).await;
  }

  let (status, first) = send(&app, "GET", "/users?limit=2", None).await;
  assert_eq!(status, StatusCode::OK);
  let (_, second) = send(&app, "GET", "/users?limit=2&offset=2", None).await;
  let (_, third) = send(&app, "GET", "/users?limit=2&offset=4", None).await;
  let (_, past) = send(&app, "GET", "/users?limit=2&offset=10", None).await;

  let names: Vec<_> = [first, second, third]
    .iter()
    .flat_map(|page| page.as_array().unwrap().clone())
    .map(|user| user["username"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, ["a", "b", "c", "d", "e"]);
  assert_eq!(past, json!([]));
}

#[tokio::test]
async fn invalid_pagination_is_400() {
  let app = app().await;
  for uri in ["/users?limit=1001", "/users?limit=-1", "/users?offset=-5", "/users?limit=abc"] {
    let (status, body) = send(&app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
    assert_eq!(body["kind"], "bad_request");
  }
}

#[tokio::test]
async fn list_filters_apply() {
  let app = app().await;
  create_user(&app, "alice").await;
  let (_, bob) = send(
    &app,
    "POST",
    "/users",
    Some(json!({ "username": "bob", "password": "x", "is_active": false })),
  )
  .await;

  let (_, active) = send(&app, "GET", "/users", None).await;
  assert_eq!(active.as_array().unwrap().len(), 1);

  let (_, inactive) = send(&app, "GET", "/users?is-active=false", None).await;
  assert_eq!(inactive, json!([bob]));

  send(
    &app,
    "POST",
    "/entities",
    Some(json!({ "name": "Acme", "type": "organization" })),
  )
  .await;
  send(&app, "POST", "/entities", Some(json!({ "name": "Ada", "type": "person" }))).await;
  let (status, people) = send(&app, "GET", "/entities?type=person", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(people.as_array().unwrap().len(), 1);
  assert_eq!(people[0]["name"], "Ada");

  let (status, _) = send(&app, "GET", "/entities?type=planet", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Update ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_applies_present_fields() {
  let app = app().await;
  let created = create_user(&app, "alice").await;
  let id = created["id"].as_str().unwrap();

  let (status, updated) = send(
    &app,
    "PUT",
    &format!("/users/{id}"),
    Some(json!({ "id": id, "username": "alicia" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "body: {updated}");
  assert_eq!(updated["username"], "alicia");
  assert_eq!(updated["is_active"], true);
  assert_eq!(updated["created_at"], created["created_at"]);
  assert_ne!(updated["updated_at"], created["updated_at"]);
}

#[tokio::test]
async fn mismatched_payload_id_is_400_and_mutates_nothing() {
  let app = app().await;
  let created = create_user(&app, "alice").await;
  let id = created["id"].as_str().unwrap();
  let uri = format!("/users/{id}");

  let (status, body) = send(
    &app,
    "PUT",
    &uri,
    Some(json!({ "id": Uuid::new_v4(), "username": "mallory" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "bad_request");

  let (status, _) =
    send(&app, "PUT", &uri, Some(json!({ "username": "mallory" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, fetched) = send(&app, "GET", &uri, None).await;
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_unknown_id_is_404() {
  let app = app().await;
  let id = Uuid::new_v4();
  let (status, _) = send(
    &app,
    "PUT",
    &format!("/entities/{id}"),
    Some(json!({ "id": id, "name": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_can_be_set_and_cleared() {
  let app = app().await;
  let (_, org) = send(
    &app,
    "POST",
    "/entities",
    Some(json!({ "name": "Acme", "type": "organization" })),
  )
  .await;
  let (_, ada) = send(
    &app,
    "POST",
    "/entities",
    Some(json!({ "name": "Ada", "type": "person", "owner_id": org["id"] })),
  )
  .await;
  assert_eq!(ada["owner_id"], org["id"]);
  let uri = format!("/entities/{}", ada["id"].as_str().unwrap());

  let (_, kept) = send(&app, "PUT", &uri, Some(json!({ "id": ada["id"], "name": "Ada L." }))).await;
  assert_eq!(kept["owner_id"], org["id"]);

  let (_, cleared) =
    send(&app, "PUT", &uri, Some(json!({ "id": ada["id"], "owner_id": null }))).await;
  assert_eq!(cleared["owner_id"], Value::Null);
}

// ── Delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_returns_record_then_404() {
  let app = app().await;
  let created = create_user(&app, "alice").await;
  let uri = format!("/users/{}", created["id"].as_str().unwrap());

  let (status, deleted) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(deleted, created);

  let (status, _) = send(&app, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_owner_is_409() {
  let app = app().await;
  let (_, org) = send(
    &app,
    "POST",
    "/entities",
    Some(json!({ "name": "Acme", "type": "organization" })),
  )
  .await;
  send(
    &app,
    "POST",
    "/entities",
    Some(json!({ "name": "Ada", "type": "person", "owner_id": org["id"] })),
  )
  .await;

  let uri = format!("/entities/{}", org["id"].as_str().unwrap());
  let (status, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

// ── Internal fields ──────────────────────────────────────────────────────────

#[tokio::test]
async fn external_ref_never_appears_in_responses() {
  let (app, db) = make_app(&ServerConfig::new("sqlite::memory:")).await;
  let session = db.create_session().unwrap();
  let entity = Repository::<Entity>::create(
    &session,
    NewEntity::new("Ada", EntityKind::Person),
  )
  .await
  .unwrap();
  session.link_external_ref(entity.id, Some(987_654)).await.unwrap();

  let uri = format!("/entities/{}", entity.id);
  let (_, one) = send(&app, "GET", &uri, None).await;
  let (_, many) = send(&app, "GET", "/entities", None).await;
  let (_, updated) = send(&app, "PUT", &uri, Some(json!({ "id": entity.id }))).await;
  let (_, deleted) = send(&app, "DELETE", &uri, None).await;

  for body in [one, many, updated, deleted] {
    let text = body.to_string();
    assert!(!text.contains("external_ref"), "leaked: {text}");
    assert!(!text.contains("987654"), "leaked: {text}");
  }
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn requests_before_init_are_500_uninitialized() {
  let db = Arc::new(Database::new(DatabaseConfig::in_memory()));
  let app = router(db, &ServerConfig::new("sqlite::memory:"));

  for _ in 0..2 {
    let (status, body) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "uninitialized");
  }
}

#[tokio::test]
async fn requests_after_close_are_500_internal() {
  let (app, db) = make_app(&ServerConfig::new("sqlite::memory:")).await;
  db.close_connection().await.unwrap();

  let (status, body) = send(&app, "GET", "/users", None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["kind"], "internal");
  assert_eq!(body["message"], "internal server error");
}

// ── Configuration ────────────────────────────────────────────────────────────

#[test]
fn config_defaults_fill_missing_keys() {
  let config: ServerConfig =
    serde_json::from_value(json!({ "database_uri": "sqlite::memory:" })).unwrap();
  assert_eq!(config.address(), "127.0.0.1:8000");
  assert_eq!(config.pool_size, 4);
  assert_eq!(config.api_settings(), ApiSettings::default());
}

#[test]
fn database_uri_expands_home() {
  let Ok(home) = std::env::var("HOME") else { return };
  let config = ServerConfig::new("sqlite://~/roster.db").database_config().unwrap();
  assert_eq!(
    config.location,
    Location::File(Path::new(&home).join("roster.db"))
  );
}

#[test]
fn bad_database_uri_is_rejected() {
  assert!(ServerConfig::new("").database_config().is_err());
  assert!(ServerConfig::new("postgres://db/roster").database_config().is_err());
}
