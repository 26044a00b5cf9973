//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with microsecond
//! precision and a `Z` suffix, so lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings; `extra` as compact JSON.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound as _, Utc};
use roster_core::{
  entity::{Entity, EntityKind, Extra},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

/// Encode an exclusive upper bound. Sub-microsecond precision rounds up, so
/// a stored value strictly before `dt` still compares below the bound.
pub fn encode_upper_bound(dt: DateTime<Utc>) -> String {
  let floor = dt.trunc_subsecs(6);
  if floor < dt {
    encode_dt(floor + Duration::microseconds(1))
  } else {
    encode_dt(floor)
  }
}

/// The current instant at storage precision, so a value read back compares
/// equal to the one returned by the write.
pub fn timestamp_now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// The `updated_at` to write over `previous`: now, or one microsecond past
/// `previous` if the clock has not moved on.
pub fn bump_timestamp(previous: &str) -> Result<String, chrono::ParseError> {
  let previous = DateTime::parse_from_rfc3339(previous)?.with_timezone(&Utc);
  let floor = previous + Duration::microseconds(1);
  Ok(encode_dt(timestamp_now().max(floor)))
}

// ─── EntityKind ──────────────────────────────────────────────────────────────

pub fn encode_entity_kind(k: EntityKind) -> &'static str {
  match k {
    EntityKind::Person => "person",
    EntityKind::Organization => "organization",
    EntityKind::Group => "group",
  }
}

pub fn decode_entity_kind(s: &str) -> Result<EntityKind> {
  match s {
    "person" => Ok(EntityKind::Person),
    "organization" => Ok(EntityKind::Organization),
    "group" => Ok(EntityKind::Group),
    other => Err(Error::Decode(format!("unknown entity kind: {other:?}"))),
  }
}

// ─── Extra ───────────────────────────────────────────────────────────────────

pub fn encode_extra(extra: &Extra) -> Result<String> {
  Ok(serde_json::to_string(extra)?)
}

pub fn decode_extra(s: &str) -> Result<Extra> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from the public columns of a `users` row.
pub struct RawUser {
  pub id:         String,
  pub username:   String,
  pub is_active:  bool,
  pub created_at: String,
  pub updated_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         decode_uuid(&self.id)?,
      username:   self.username,
      is_active:  self.is_active,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read from the public columns of an `entities` row.
pub struct RawEntity {
  pub id:         String,
  pub name:       String,
  pub kind:       String,
  pub owner_id:   Option<String>,
  pub extra:      String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawEntity {
  pub fn into_entity(self) -> Result<Entity> {
    Ok(Entity {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      kind:       decode_entity_kind(&self.kind)?,
      owner_id:   self.owner_id.as_deref().map(decode_uuid).transpose()?,
      extra:      decode_extra(&self.extra)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
