//! [`Session`]: one request's unit of work against the pool.

use rusqlite::{
  OptionalExtension as _, TransactionBehavior, params_from_iter, types::Value,
};
use uuid::Uuid;

use roster_core::{
  entity::Entity,
  repository::Repository,
  resource::{Page, Resource as _},
};

use crate::{
  Error, Result,
  encode::{bump_timestamp, encode_dt, encode_uuid, timestamp_now},
  table::Table,
};

// ─── Session ─────────────────────────────────────────────────────────────────

/// A borrowed pooled connection.
///
/// Every write runs inside its own `BEGIN IMMEDIATE` transaction on the
/// connection thread and is committed only once all of its statements have
/// succeeded. A transaction dropped on an error path rolls back.
pub struct Session {
  conn: tokio_rusqlite::Connection,
}

impl Session {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self { Self { conn } }

  // ── External references ───────────────────────────────────────────────

  /// Attach (or with `None`, detach) an external-system reference to an
  /// entity. The reference is not part of the entity's public state, so
  /// `updated_at` is left alone.
  pub async fn link_external_ref(
    &self,
    id: Uuid,
    external_ref: Option<i64>,
  ) -> Result<()> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE entities SET external_ref = ?1 WHERE id = ?2",
          rusqlite::params![external_ref, id_str],
        )?;
        Ok(changed)
      })
      .await?;

    if changed == 0 {
      return Err(Error::NotFound { resource: Entity::NAME, id });
    }
    Ok(())
  }

  /// The entity carrying `external_ref`, if any. When several entities
  /// share a reference the oldest is returned.
  pub async fn find_by_external_ref(
    &self,
    external_ref: i64,
  ) -> Result<Option<Entity>> {
    let sql = format!(
      "SELECT {} FROM entities WHERE external_ref = ?1
       ORDER BY created_at ASC, rowid ASC LIMIT 1",
      Entity::COLUMNS
    );
    let raw = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(&sql, [external_ref], Entity::read_row)
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(Entity::decode).transpose()
  }
}

/// The public columns of one row, if it exists.
fn select_by_id<R: Table>(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<R::Raw>> {
  let sql = format!("SELECT {} FROM {} WHERE id = ?1", R::COLUMNS, R::TABLE);
  conn.query_row(&sql, [id], R::read_row).optional()
}

fn not_found<R: Table>(id: Uuid) -> Error {
  Error::NotFound { resource: R::NAME, id }
}

/// Run a payload mapping on the blocking pool. User mappings hash passwords
/// with argon2, which must not stall a runtime worker.
async fn off_runtime<T, F>(f: F) -> Result<T>
where
  F: FnOnce() -> Result<T> + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f).await?
}

// ─── Repository impl ─────────────────────────────────────────────────────────

impl<R: Table> Repository<R> for Session {
  type Error = Error;

  async fn create(&self, data: R::Create) -> Result<R> {
    let id = encode_uuid(Uuid::new_v4());
    let now = encode_dt(timestamp_now());

    let mut columns = vec![
      ("id", Value::Text(id.clone())),
      ("created_at", Value::Text(now.clone())),
      ("updated_at", Value::Text(now)),
    ];
    columns.extend(off_runtime(move || R::insert_values(data)).await?);

    let (names, values): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
    let placeholders = (1..=names.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "INSERT INTO {} ({}) VALUES ({placeholders})",
      R::TABLE,
      names.join(", ")
    );

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(&sql, params_from_iter(values))?;
        let raw = select_by_id::<R>(&tx, &id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    let record = R::decode(raw)?;
    tracing::debug!(resource = R::NAME, id = %record.id(), "created");
    Ok(record)
  }

  async fn get_one(&self, id: Uuid) -> Result<R> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_by_id::<R>(conn, &id_str)?))
      .await?;

    match raw {
      Some(raw) => R::decode(raw),
      None => Err(not_found::<R>(id)),
    }
  }

  async fn get_many<'a>(
    &'a self,
    filter: &'a R::Filter,
    page: Page,
  ) -> Result<Vec<R>> {
    let (clauses, mut values): (Vec<_>, Vec<_>) =
      R::predicates(filter).into_iter().unzip();

    let mut sql = format!("SELECT {} FROM {}", R::COLUMNS, R::TABLE);
    if !clauses.is_empty() {
      sql.push_str(" WHERE ");
      sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at ASC, rowid ASC LIMIT ? OFFSET ?");
    values.push(Value::Integer(page.limit.into()));
    values.push(Value::Integer(page.offset.into()));

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(values), R::read_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(R::decode).collect()
  }

  async fn partial_update(&self, id: Uuid, data: R::Update) -> Result<R> {
    let (mut names, mut values): (Vec<_>, Vec<_>) =
      off_runtime(move || R::update_values(data)).await?.into_iter().unzip();
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous: Option<String> = tx
          .query_row(
            &format!("SELECT updated_at FROM {} WHERE id = ?1", R::TABLE),
            [&id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(previous) = previous else {
          return Ok(None);
        };

        let updated_at = bump_timestamp(&previous)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        names.push("updated_at");
        values.push(Value::Text(updated_at));

        let assignments = names
          .iter()
          .enumerate()
          .map(|(i, name)| format!("{name} = ?{}", i + 1))
          .collect::<Vec<_>>()
          .join(", ");
        values.push(Value::Text(id_str.clone()));
        let sql = format!(
          "UPDATE {} SET {assignments} WHERE id = ?{}",
          R::TABLE,
          values.len()
        );

        tx.execute(&sql, params_from_iter(values))?;
        let raw = select_by_id::<R>(&tx, &id_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    match raw {
      Some(raw) => R::decode(raw),
      None => Err(not_found::<R>(id)),
    }
  }

  async fn delete(&self, id: Uuid) -> Result<R> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(raw) = select_by_id::<R>(&tx, &id_str)? else {
          return Ok(None);
        };
        tx.execute(
          &format!("DELETE FROM {} WHERE id = ?1", R::TABLE),
          [&id_str],
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    match raw {
      Some(raw) => R::decode(raw),
      None => Err(not_found::<R>(id)),
    }
  }
}
