//! Persistence mapping between resources and their SQLite tables.
//!
//! The CRUD logic in [`Session`](crate::Session) is written once over this
//! trait. Each resource states which table it lives in, which columns make
//! up its public representation, and how payloads and filters turn into
//! column values and predicates.

use rusqlite::types::Value;
use roster_core::{
  credential::Credential,
  entity::{Entity, EntityFilter, EntityUpdate, NewEntity},
  resource::Resource,
  user::{NewUser, User, UserFilter, UserUpdate},
};

use crate::{
  Result,
  encode::{
    RawEntity, RawUser, encode_dt, encode_entity_kind, encode_extra,
    encode_upper_bound, encode_uuid,
  },
};

/// A column name paired with the value to bind for it.
pub type Column = (&'static str, Value);

/// A resource stored as one row of one table.
///
/// The base columns `id`, `created_at` and `updated_at` are written by the
/// session; the mapping supplies everything else.
pub trait Table: Resource {
  const TABLE: &'static str;

  /// Comma-separated public columns, in the order [`read_row`](Self::read_row)
  /// expects. Internal columns must never appear here.
  const COLUMNS: &'static str;

  /// Undecoded column values, moved off the connection thread.
  type Raw: Send + 'static;

  fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self::Raw>;

  fn decode(raw: Self::Raw) -> Result<Self>;

  /// Validate a create payload and produce its non-base columns.
  fn insert_values(data: Self::Create) -> Result<Vec<Column>>;

  /// Validate an update payload and produce the columns it changes. An
  /// empty list is a valid change set.
  fn update_values(data: Self::Update) -> Result<Vec<Column>>;

  /// `WHERE` clauses, each with a single `?` placeholder, joined with `AND`.
  fn predicates(filter: &Self::Filter) -> Vec<Column>;
}

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

// ─── User ────────────────────────────────────────────────────────────────────

impl Table for User {
  type Raw = RawUser;

  const COLUMNS: &'static str = "id, username, is_active, created_at, updated_at";
  const TABLE: &'static str = "users";

  fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
      id:         row.get(0)?,
      username:   row.get(1)?,
      is_active:  row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  fn decode(raw: RawUser) -> Result<User> { raw.into_user() }

  fn insert_values(data: NewUser) -> Result<Vec<Column>> {
    data.validate()?;
    let credential = Credential::hash(&data.password)?;
    Ok(vec![
      ("username", text(data.username)),
      ("password_hash", text(credential.as_phc())),
      ("is_active", Value::Integer(data.is_active.into())),
    ])
  }

  fn update_values(data: UserUpdate) -> Result<Vec<Column>> {
    data.validate()?;
    let mut columns = Vec::new();
    if let Some(username) = data.username {
      columns.push(("username", text(username)));
    }
    if let Some(password) = data.password {
      let credential = Credential::hash(&password)?;
      columns.push(("password_hash", text(credential.as_phc())));
    }
    if let Some(is_active) = data.is_active {
      columns.push(("is_active", Value::Integer(is_active.into())));
    }
    Ok(columns)
  }

  fn predicates(filter: &UserFilter) -> Vec<Column> {
    let mut clauses = vec![("is_active = ?", Value::Integer(filter.is_active.into()))];
    if let Some(after) = filter.updated_after {
      clauses.push(("updated_at > ?", text(encode_dt(after))));
    }
    if let Some(before) = filter.updated_before {
      clauses.push(("updated_at < ?", text(encode_upper_bound(before))));
    }
    clauses
  }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

impl Table for Entity {
  type Raw = RawEntity;

  const COLUMNS: &'static str =
    "id, name, kind, owner_id, extra, created_at, updated_at";
  const TABLE: &'static str = "entities";

  fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntity> {
    Ok(RawEntity {
      id:         row.get(0)?,
      name:       row.get(1)?,
      kind:       row.get(2)?,
      owner_id:   row.get(3)?,
      extra:      row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  fn decode(raw: RawEntity) -> Result<Entity> { raw.into_entity() }

  fn insert_values(data: NewEntity) -> Result<Vec<Column>> {
    data.validate()?;
    Ok(vec![
      ("name", text(data.name)),
      ("kind", text(encode_entity_kind(data.kind))),
      ("owner_id", owner_value(data.owner_id)),
      ("extra", text(encode_extra(&data.extra)?)),
    ])
  }

  fn update_values(data: EntityUpdate) -> Result<Vec<Column>> {
    data.validate()?;
    let mut columns = Vec::new();
    if let Some(name) = data.name {
      columns.push(("name", text(name)));
    }
    if let Some(kind) = data.kind {
      columns.push(("kind", text(encode_entity_kind(kind))));
    }
    if let Some(owner_id) = data.owner_id {
      columns.push(("owner_id", owner_value(owner_id)));
    }
    if let Some(extra) = &data.extra {
      columns.push(("extra", text(encode_extra(extra)?)));
    }
    Ok(columns)
  }

  fn predicates(filter: &EntityFilter) -> Vec<Column> {
    let mut clauses = Vec::new();
    if let Some(kind) = filter.kind {
      clauses.push(("kind = ?", text(encode_entity_kind(kind))));
    }
    if let Some(owner_id) = filter.owner_id {
      clauses.push(("owner_id = ?", text(encode_uuid(owner_id))));
    }
    if let Some(after) = filter.updated_after {
      clauses.push(("updated_at > ?", text(encode_dt(after))));
    }
    if let Some(before) = filter.updated_before {
      clauses.push(("updated_at < ?", text(encode_upper_bound(before))));
    }
    clauses
  }
}

fn owner_value(owner_id: Option<uuid::Uuid>) -> Value {
  owner_id.map_or(Value::Null, |id| text(encode_uuid(id)))
}
