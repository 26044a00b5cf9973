//! Entity: a named, typed record that may be owned by another entity.
//!
//! Ownership forms a hierarchy: `owner_id` points at another entity in the
//! same collection. Arbitrary additional attributes live in `extra`, so new
//! attributes need no schema migration.
//!
//! Stored entities also carry a numeric reference used when integrating with
//! an external system. That reference is a storage detail: it has no field on
//! any type in this module and is never part of the API contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  resource::{Resource, deserialize_some},
};

/// Keys `extra` may not use because they name internal storage fields.
pub const RESERVED_EXTRA_KEYS: &[&str] = &["external_ref"];

pub type Extra = serde_json::Map<String, serde_json::Value>;

/// The closed set of entity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
  Person,
  Organization,
  Group,
}

/// The public representation of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
  pub id:         Uuid,
  pub name:       String,
  #[serde(rename = "type")]
  pub kind:       EntityKind,
  pub owner_id:   Option<Uuid>,
  pub extra:      Extra,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to `create`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntity {
  pub name:     String,
  #[serde(rename = "type")]
  pub kind:     EntityKind,
  #[serde(default)]
  pub owner_id: Option<Uuid>,
  #[serde(default)]
  pub extra:    Extra,
}

impl NewEntity {
  pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
    Self {
      name: name.into(),
      kind,
      owner_id: None,
      extra: Extra::new(),
    }
  }

  pub fn owned_by(mut self, owner_id: Uuid) -> Self {
    self.owner_id = Some(owner_id);
    self
  }

  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyField("name"));
    }
    check_extra(&self.extra)
  }
}

/// Input to `partial_update`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityUpdate {
  /// Must match the identifier in the request path.
  pub id:       Option<Uuid>,
  pub name:     Option<String>,
  #[serde(rename = "type")]
  pub kind:     Option<EntityKind>,
  /// `None`: unchanged. `Some(None)`: clear the owner.
  #[serde(default, deserialize_with = "deserialize_some")]
  pub owner_id: Option<Option<Uuid>>,
  /// Replaces the whole map when present.
  pub extra:    Option<Extra>,
}

impl EntityUpdate {
  pub fn validate(&self) -> Result<()> {
    if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::EmptyField("name"));
    }
    match &self.extra {
      Some(extra) => check_extra(extra),
      None => Ok(()),
    }
  }
}

/// Reject `extra` maps that use an internal field name as a key, at any
/// depth, so the name can never show up in a response body.
pub fn check_extra(extra: &Extra) -> Result<()> {
  for (key, value) in extra {
    if RESERVED_EXTRA_KEYS.contains(&key.as_str()) {
      return Err(Error::ReservedAttribute(key.clone()));
    }
    check_value(value)?;
  }
  Ok(())
}

fn check_value(value: &serde_json::Value) -> Result<()> {
  match value {
    serde_json::Value::Object(map) => check_extra(map),
    serde_json::Value::Array(items) => items.iter().try_for_each(check_value),
    _ => Ok(()),
  }
}

/// Query filter for listing entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntityFilter {
  #[serde(rename = "type")]
  pub kind:           Option<EntityKind>,
  pub owner_id:       Option<Uuid>,
  #[serde(alias = "updated-since")]
  pub updated_after:  Option<DateTime<Utc>>,
  pub updated_before: Option<DateTime<Utc>>,
}

impl Resource for Entity {
  type Create = NewEntity;
  type Filter = EntityFilter;
  type Update = EntityUpdate;

  const NAME: &'static str = "entity";

  fn id(&self) -> Uuid { self.id }

  fn payload_id(update: &EntityUpdate) -> Option<Uuid> { update.id }
}
