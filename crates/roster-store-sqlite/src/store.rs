//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::{
  OptionalExtension as _, TransactionBehavior, params, params_from_iter, types::Value,
};

use roster_core::{
  category::Country,
  person::{Coordinates, Location, NewPerson, Person, PersonId, RowId, to_reference_time},
  query::{Page, PageRequest, PersonFilter, SortDirection, SortField},
  store::PersonStore,
};

use crate::{
  Error, Result,
  encode::{PERSON_COLUMNS, PERSON_FROM, RawPerson, encode_date, encode_dt},
  schema::SCHEMA,
};

/// How long a writer waits for a competing transaction before giving up with
/// `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster person store backed by a single SQLite file.
///
/// Clones share one connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SQL helpers (run on the connection thread) ──────────────────────────────

/// Translate a filter into a `WHERE` clause over `persons p` plus its
/// positional parameters. Values are always bound, never interpolated.
fn filter_clause(filter: Option<&PersonFilter>) -> (String, Vec<Value>) {
  let Some(filter) = filter else {
    return (String::new(), Vec::new());
  };

  let (condition, values) = match filter {
    PersonFilter::Name(name) => ("p.name = ?", vec![Value::Text(name.clone())]),
    PersonFilter::EyeColor(color) => {
      ("p.eye_color = ?", vec![Value::Text(color.as_str().to_owned())])
    }
    PersonFilter::HairColor(color) => {
      ("p.hair_color = ?", vec![Value::Text(color.as_str().to_owned())])
    }
    PersonFilter::Nationality(country) => {
      ("p.nationality = ?", vec![Value::Text(country.as_str().to_owned())])
    }
    PersonFilter::HeightGreaterThan(height) => {
      ("p.height > ?", vec![Value::Integer(i64::from(*height))])
    }
    PersonFilter::HairColorInLocation { hair_color, location_id } => (
      "p.hair_color = ? AND p.location_id = ?",
      vec![
        Value::Text(hair_color.as_str().to_owned()),
        Value::Integer(*location_id),
      ],
    ),
  };

  (format!("WHERE {condition}"), values)
}

fn sort_column(field: SortField) -> &'static str {
  match field {
    SortField::Id => "p.id",
    SortField::Name => "p.name",
    SortField::CreationDate => "p.creation_date",
    SortField::EyeColor => "p.eye_color",
    SortField::HairColor => "p.hair_color",
    SortField::Height => "p.height",
    SortField::Birthday => "p.birthday",
    SortField::Nationality => "p.nationality",
    SortField::CoordinatesX => "c.x",
    SortField::CoordinatesY => "c.y",
  }
}

fn sort_keyword(direction: SortDirection) -> &'static str {
  match direction {
    SortDirection::Asc => "ASC",
    SortDirection::Desc => "DESC",
  }
}

fn load_raw(conn: &rusqlite::Connection, id: PersonId) -> rusqlite::Result<Option<RawPerson>> {
  conn
    .query_row(
      &format!("SELECT {PERSON_COLUMNS} {PERSON_FROM} WHERE p.id = ?1"),
      params![id],
      RawPerson::from_row,
    )
    .optional()
}

fn insert_coordinates(conn: &rusqlite::Connection, c: &Coordinates) -> rusqlite::Result<RowId> {
  conn.execute(
    "INSERT INTO coordinates (x, y) VALUES (?1, ?2)",
    params![f64::from(c.x), f64::from(c.y)],
  )?;
  Ok(conn.last_insert_rowid())
}

fn insert_location(conn: &rusqlite::Connection, l: &Location) -> rusqlite::Result<RowId> {
  conn.execute(
    "INSERT INTO locations (x, y, z) VALUES (?1, ?2, ?3)",
    params![l.x, l.y, l.z],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Persist the difference between the loaded aggregate `before` and the
/// mutated aggregate `after`.
///
/// Owned rows keeping their id are updated in place; anything else is
/// inserted, and the row it replaced is deleted once the person no longer
/// references it.
fn write_back(
  conn: &rusqlite::Connection,
  before: &Person,
  after: &Person,
) -> rusqlite::Result<()> {
  let coordinates_id = match (after.coordinates.id, before.coordinates.id) {
    (Some(id), Some(prev)) if id == prev => {
      conn.execute(
        "UPDATE coordinates SET x = ?1, y = ?2 WHERE id = ?3",
        params![f64::from(after.coordinates.x), f64::from(after.coordinates.y), id],
      )?;
      id
    }
    _ => insert_coordinates(conn, &after.coordinates)?,
  };

  let previous_location = before.location.as_ref().and_then(|l| l.id);
  let location_id = match &after.location {
    Some(loc) => match (loc.id, previous_location) {
      (Some(id), Some(prev)) if id == prev => {
        conn.execute(
          "UPDATE locations SET x = ?1, y = ?2, z = ?3 WHERE id = ?4",
          params![loc.x, loc.y, loc.z, id],
        )?;
        Some(id)
      }
      _ => Some(insert_location(conn, loc)?),
    },
    None => None,
  };

  conn.execute(
    "UPDATE persons SET
       name = ?1, coordinates_id = ?2, eye_color = ?3, hair_color = ?4,
       location_id = ?5, height = ?6, birthday = ?7, nationality = ?8
     WHERE id = ?9",
    params![
      after.name,
      coordinates_id,
      after.eye_color.as_str(),
      after.hair_color.as_str(),
      location_id,
      after.height,
      after.birthday.map(encode_date),
      after.nationality.as_str(),
      before.id,
    ],
  )?;

  // Orphan cleanup, after the person stopped referencing the old rows.
  if let Some(prev) = before.coordinates.id
    && prev != coordinates_id
  {
    tracing::debug!(person_id = before.id, coordinates_id = prev, "deleting orphaned coordinates");
    conn.execute("DELETE FROM coordinates WHERE id = ?1", params![prev])?;
  }
  if let Some(prev) = previous_location
    && location_id != Some(prev)
  {
    tracing::debug!(person_id = before.id, location_id = prev, "deleting orphaned location");
    conn.execute("DELETE FROM locations WHERE id = ?1", params![prev])?;
  }

  Ok(())
}

fn decode_in_call(raw: RawPerson) -> tokio_rusqlite::Result<Person> {
  raw
    .into_person()
    .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  // ── Single aggregate ──────────────────────────────────────────────────────

  async fn get(&self, id: PersonId) -> Result<Option<Person>> {
    let raw = self.conn.call(move |conn| Ok(load_raw(conn, id)?)).await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn insert(&self, person: NewPerson) -> Result<Person> {
    let created_at = encode_dt(to_reference_time(&Utc::now()));
    let birthday = person.birthday.map(encode_date);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let coordinates_id = insert_coordinates(&tx, &person.coordinates)?;
        let location_id = person
          .location
          .as_ref()
          .map(|l| insert_location(&tx, l))
          .transpose()?;

        tx.execute(
          "INSERT INTO persons (
             name, coordinates_id, creation_date, eye_color, hair_color,
             location_id, height, birthday, nationality
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          params![
            person.name,
            coordinates_id,
            created_at,
            person.eye_color.as_str(),
            person.hair_color.as_str(),
            location_id,
            person.height,
            birthday,
            person.nationality.as_str(),
          ],
        )?;
        let id = tx.last_insert_rowid();

        let raw = tx
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} {PERSON_FROM} WHERE p.id = ?1"),
            params![id],
            RawPerson::from_row,
          )
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw
      .ok_or_else(|| Error::MissingRow("freshly inserted person".into()))?
      .into_person()
  }

  async fn modify<F>(&self, id: PersonId, apply: F) -> Result<Option<Person>>
  where
    F: FnOnce(&mut Person) + Send + 'static,
  {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock up front so the read below cannot be
        // invalidated by a concurrent writer before we write back.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(raw) = load_raw(&tx, id)? else {
          return Ok(None);
        };
        let before = decode_in_call(raw)?;
        let mut after = before.clone();
        apply(&mut after);

        write_back(&tx, &before, &after)?;

        let raw = load_raw(&tx, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn delete(&self, id: PersonId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let owned: Option<(RowId, Option<RowId>)> = tx
          .query_row(
            "SELECT coordinates_id, location_id FROM persons WHERE id = ?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        let Some((coordinates_id, location_id)) = owned else {
          return Ok(false);
        };

        tx.execute("DELETE FROM persons WHERE id = ?1", params![id])?;
        tx.execute("DELETE FROM coordinates WHERE id = ?1", params![coordinates_id])?;
        if let Some(location_id) = location_id {
          tx.execute("DELETE FROM locations WHERE id = ?1", params![location_id])?;
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;
    Ok(deleted)
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  async fn find_page(
    &self,
    filter:  Option<&PersonFilter>,
    request: &PageRequest,
  ) -> Result<Page<Person>> {
    let (where_clause, filter_values) = filter_clause(filter);
    let column = sort_column(request.sort.field);
    let dir = sort_keyword(request.sort.direction);

    let count_sql = format!("SELECT COUNT(*) FROM persons p {where_clause}");
    let page_sql = format!(
      "SELECT {PERSON_COLUMNS} {PERSON_FROM} {where_clause}
       ORDER BY {column} {dir}, p.id {dir}
       LIMIT ? OFFSET ?"
    );

    let mut page_values = filter_values.clone();
    page_values.push(Value::Integer(i64::from(request.size)));
    page_values.push(Value::Integer(
      i64::try_from(request.offset()).unwrap_or(i64::MAX),
    ));

    let (total, raws): (i64, Vec<RawPerson>) = self
      .conn
      .call(move |conn| {
        // One read transaction so the total and the rows agree.
        let tx = conn.transaction()?;
        let total: i64 =
          tx.query_row(&count_sql, params_from_iter(filter_values.iter()), |r| r.get(0))?;
        let rows = {
          let mut stmt = tx.prepare(&page_sql)?;
          stmt
            .query_map(params_from_iter(page_values.iter()), RawPerson::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawPerson::into_person)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page {
      items,
      total_elements: u64::try_from(total).unwrap_or_default(),
      page: request.page,
      size: request.size,
    })
  }

  async fn find_all(&self, filter: Option<&PersonFilter>) -> Result<Vec<Person>> {
    let (where_clause, values) = filter_clause(filter);
    let sql = format!("SELECT {PERSON_COLUMNS} {PERSON_FROM} {where_clause} ORDER BY p.id");

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(values.iter()), RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn count(&self, filter: Option<&PersonFilter>) -> Result<u64> {
    let (where_clause, values) = filter_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM persons p {where_clause}");

    let total: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, params_from_iter(values.iter()), |r| r.get(0))?))
      .await?;
    Ok(u64::try_from(total).unwrap_or_default())
  }

  async fn distinct_heights(&self) -> Result<Vec<i32>> {
    let heights = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT DISTINCT height FROM persons ORDER BY height ASC")?;
        let rows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i32>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(heights)
  }

  // ── Bulk writes ───────────────────────────────────────────────────────────

  async fn delete_by_nationality(&self, nationality: Country) -> Result<u64> {
    let nationality = nationality.as_str();

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let deleted = tx.execute(
          "DELETE FROM persons WHERE nationality = ?1",
          params![nationality],
        )?;
        tx.execute(
          "DELETE FROM coordinates
           WHERE id NOT IN (SELECT coordinates_id FROM persons)",
          [],
        )?;
        tx.execute(
          "DELETE FROM locations
           WHERE id NOT IN (SELECT location_id FROM persons WHERE location_id IS NOT NULL)",
          [],
        )?;
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    Ok(deleted as u64)
  }
}
