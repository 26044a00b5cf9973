//! User: an identity record with a login credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, resource::Resource};

/// The public representation of a user. The stored credential has no field
/// here, so it cannot be serialised by accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         Uuid,
  pub username:   String,
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool { true }

/// Input to `create`. The password is hashed by the store before insert.
#[derive(Clone, Deserialize)]
pub struct NewUser {
  pub username:  String,
  pub password:  String,
  #[serde(default = "default_active")]
  pub is_active: bool,
}

impl NewUser {
  pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
    Self {
      username:  username.into(),
      password:  password.into(),
      is_active: true,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.username.trim().is_empty() {
      return Err(Error::EmptyField("username"));
    }
    if self.password.is_empty() {
      return Err(Error::EmptyField("password"));
    }
    Ok(())
  }
}

impl std::fmt::Debug for NewUser {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("NewUser")
      .field("username", &self.username)
      .field("is_active", &self.is_active)
      .finish_non_exhaustive()
  }
}

/// Input to `partial_update`. Absent fields are left untouched.
#[derive(Clone, Default, Deserialize)]
pub struct UserUpdate {
  /// Must match the identifier in the request path.
  pub id:        Option<Uuid>,
  pub username:  Option<String>,
  pub password:  Option<String>,
  pub is_active: Option<bool>,
}

impl UserUpdate {
  pub fn validate(&self) -> Result<()> {
    if self.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
      return Err(Error::EmptyField("username"));
    }
    if self.password.as_deref().is_some_and(str::is_empty) {
      return Err(Error::EmptyField("password"));
    }
    Ok(())
  }
}

impl std::fmt::Debug for UserUpdate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("UserUpdate")
      .field("id", &self.id)
      .field("username", &self.username)
      .field("password", &self.password.as_ref().map(|_| ".."))
      .field("is_active", &self.is_active)
      .finish()
  }
}

/// Query filter for listing users.
///
/// `is-active` defaults to `true`, so inactive users are listed only when
/// asked for explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserFilter {
  #[serde(default = "default_active")]
  pub is_active:      bool,
  /// Only users updated strictly after this instant.
  #[serde(alias = "updated-since")]
  pub updated_after:  Option<DateTime<Utc>>,
  /// Only users updated strictly before this instant.
  pub updated_before: Option<DateTime<Utc>>,
}

impl Default for UserFilter {
  fn default() -> Self {
    Self {
      is_active:      true,
      updated_after:  None,
      updated_before: None,
    }
  }
}

impl Resource for User {
  type Create = NewUser;
  type Filter = UserFilter;
  type Update = UserUpdate;

  const NAME: &'static str = "user";

  fn id(&self) -> Uuid { self.id }

  fn payload_id(update: &UserUpdate) -> Option<Uuid> { update.id }
}
