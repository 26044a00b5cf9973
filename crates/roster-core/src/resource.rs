//! The [`Resource`] trait and pagination.
//!
//! A resource is a persisted record exposed over the API. Every resource
//! shares the same base attributes (`id`, `created_at`, `updated_at`), which
//! are assigned by the store and never accepted from clients.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Default number of records returned by a list operation.
pub const DEFAULT_LIMIT: u32 = 100;

/// Upper bound accepted for `limit`.
pub const MAX_LIMIT: u32 = 1000;

// ─── Resource ────────────────────────────────────────────────────────────────

/// A record type the repository layer can create, read, update and delete.
///
/// The associated types describe the shapes the schema layer accepts for
/// each operation; the implementing type itself is the public (response)
/// representation and must carry only fields that are safe to expose.
pub trait Resource: Serialize + Clone + Send + Sync + 'static {
  /// Payload accepted by `create`.
  type Create: DeserializeOwned + Send + 'static;
  /// Payload accepted by `partial_update`; every field is optional.
  type Update: DeserializeOwned + Send + 'static;
  /// Query-string filter accepted by `get_many`.
  type Filter: DeserializeOwned + Default + Send + Sync + 'static;

  /// Singular, lowercase name used in messages and logs.
  const NAME: &'static str;

  fn id(&self) -> Uuid;

  /// The identifier carried inside an update payload, if any. Compared
  /// against the path identifier before an update is applied.
  fn payload_id(update: &Self::Update) -> Option<Uuid>;
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// `LIMIT` / `OFFSET` pagination. Both values are unsigned, so negative input
/// is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
  pub limit:  u32,
  pub offset: u32,
}

impl Page {
  pub fn new(limit: u32, offset: u32) -> Self { Self { limit, offset } }

  /// The page immediately following this one at the same `limit`.
  pub fn next(self) -> Self {
    Self {
      limit:  self.limit,
      offset: self.offset.saturating_add(self.limit),
    }
  }
}

impl Default for Page {
  fn default() -> Self { Self { limit: DEFAULT_LIMIT, offset: 0 } }
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

/// Distinguishes an explicit `null` from an absent key.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>` field: absent → `None`, `null` → `Some(None)`,
/// value → `Some(Some(value))`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Deserialize::deserialize(deserializer).map(Some)
}
