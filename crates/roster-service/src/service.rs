//! [`PersonService`] — listing, mutation and aggregate operations.

use std::sync::Arc;

use roster_core::{
  category::{Color, Country},
  person::{Location, NewPerson, Person, PersonDraft, PersonId, RowId},
  query::{Page, PageRequest, PersonFilter, Sort, SortDirection, SortField},
  store::PersonStore,
};
use serde::Deserialize;

use crate::{Result, ServiceError, notify::ChangeNotifier, validate::validate_draft};

/// Upper bound applied to the requested page size.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

// ─── Listing parameters ──────────────────────────────────────────────────────

/// Loosely-typed listing parameters as they arrive from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRequest {
  /// One of `name`, `eyeColor`, `hairColor`, `nationality`. Any other value
  /// disables filtering.
  pub filter_field: Option<String>,
  pub filter_value: Option<String>,
  /// Sort field name; defaults to `id`.
  pub sort:         Option<String>,
  /// `desc` for descending; anything else is ascending.
  pub dir:          Option<String>,
  #[serde(default)]
  pub page:         i64,
  #[serde(default = "default_page_size")]
  pub size:         i64,
}

fn default_page_size() -> i64 { 10 }

fn non_blank(s: Option<&str>) -> Option<&str> { s.filter(|s| !s.trim().is_empty()) }

/// Map a filter field name and its textual value onto a typed filter.
///
/// Unsupported field names yield `None` (no filtering) while enum values
/// that do not parse are rejected, so storage never sees an invalid value.
fn parse_filter(field: Option<&str>, value: Option<&str>) -> Result<Option<PersonFilter>> {
  let (Some(field), Some(value)) = (non_blank(field), non_blank(value)) else {
    return Ok(None);
  };

  let filter = match field {
    "name" => PersonFilter::Name(value.to_owned()),
    "eyeColor" => PersonFilter::EyeColor(Color::parse(value)?),
    "hairColor" => PersonFilter::HairColor(Color::parse(value)?),
    "nationality" => PersonFilter::Nationality(Country::parse(value)?),
    other => {
      tracing::debug!(field = other, "ignoring unsupported filter field");
      return Ok(None);
    }
  };
  Ok(Some(filter))
}

// ─── Update rule ─────────────────────────────────────────────────────────────

/// Copy the caller-controlled fields of `incoming` onto `existing`.
///
/// Identity and creation date stay untouched. Owned rows are mutated in
/// place so they keep their ids; a location is created only when none
/// existed, and dropped (then deleted by the store) when `incoming` has none.
pub(crate) fn apply_update(existing: &mut Person, incoming: NewPerson) {
  existing.name = incoming.name;
  existing.eye_color = incoming.eye_color;
  existing.hair_color = incoming.hair_color;
  existing.height = incoming.height;
  existing.birthday = incoming.birthday;
  existing.nationality = incoming.nationality;

  existing.coordinates.x = incoming.coordinates.x;
  existing.coordinates.y = incoming.coordinates.y;

  existing.location = match (existing.location.take(), incoming.location) {
    (_, None) => None,
    (Some(mut current), Some(next)) => {
      current.x = next.x;
      current.y = next.y;
      current.z = next.z;
      Some(current)
    }
    (None, Some(next)) => Some(Location { id: None, ..next }),
  };
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Business operations over persons, backed by any [`PersonStore`].
///
/// Holds only immutable wiring, so one instance can be shared across
/// concurrent requests behind an `Arc`.
pub struct PersonService<S> {
  store:         Arc<S>,
  notifier:      Arc<dyn ChangeNotifier>,
  max_page_size: u32,
}

impl<S: PersonStore> PersonService<S> {
  pub fn new(store: Arc<S>, notifier: Arc<dyn ChangeNotifier>) -> Self {
    Self { store, notifier, max_page_size: DEFAULT_MAX_PAGE_SIZE }
  }

  pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
    self.max_page_size = max_page_size.max(1);
    self
  }

  // ── Listing ───────────────────────────────────────────────────────────

  /// One page of persons, optionally filtered by a single field.
  pub async fn list(&self, request: &ListRequest) -> Result<Page<Person>> {
    let sort = Sort {
      field:     SortField::parse(request.sort.as_deref())?,
      direction: SortDirection::from_token(request.dir.as_deref()),
    };
    let page = PageRequest::clamped(request.page, request.size, self.max_page_size, sort);
    let filter = parse_filter(request.filter_field.as_deref(), request.filter_value.as_deref())?;

    self
      .store
      .find_page(filter.as_ref(), &page)
      .await
      .map_err(ServiceError::from_store)
  }

  pub async fn get(&self, id: PersonId) -> Result<Option<Person>> {
    self.store.get(id).await.map_err(ServiceError::from_store)
  }

  /// Like [`get`](Self::get), but a missing person is an error.
  pub async fn require(&self, id: PersonId) -> Result<Person> {
    self.get(id).await?.ok_or(ServiceError::NotFound(id))
  }

  // ── Mutation ──────────────────────────────────────────────────────────

  pub async fn create(&self, draft: PersonDraft) -> Result<Person> {
    let person = validate_draft(draft)?;
    let saved = self
      .store
      .insert(person)
      .await
      .map_err(ServiceError::from_store)?;

    tracing::info!(
      id = saved.id,
      name = %saved.name,
      height = saved.height,
      nationality = %saved.nationality,
      "created person"
    );
    self.notifier.notify_changed();
    Ok(saved)
  }

  /// Overwrite a person's fields from `draft`, upserting its owned rows.
  ///
  /// Coordinates are mandatory here. The load, the rule application and the
  /// write happen in one store transaction.
  pub async fn update(&self, id: PersonId, draft: PersonDraft) -> Result<Person> {
    let incoming = validate_draft(draft)?;
    let updated = self
      .store
      .modify(id, move |existing| apply_update(existing, incoming))
      .await
      .map_err(ServiceError::from_store)?
      .ok_or(ServiceError::NotFound(id))?;

    tracing::info!(
      id = updated.id,
      name = %updated.name,
      height = updated.height,
      nationality = %updated.nationality,
      "updated person"
    );
    self.notifier.notify_changed();
    Ok(updated)
  }

  /// Delete a person and its owned rows. Deleting an unknown id is a no-op.
  pub async fn delete(&self, id: PersonId) -> Result<()> {
    let existed = self
      .store
      .delete(id)
      .await
      .map_err(ServiceError::from_store)?;

    tracing::info!(id, existed, "deleted person");
    self.notifier.notify_changed();
    Ok(())
  }

  /// Remove every person of `nationality` in one transaction.
  pub async fn delete_by_nationality(&self, nationality: Country) -> Result<u64> {
    let deleted = self
      .store
      .delete_by_nationality(nationality)
      .await
      .map_err(ServiceError::from_store)?;

    tracing::info!(%nationality, deleted, "bulk delete by nationality");
    if deleted > 0 {
      self.notifier.notify_changed();
    }
    Ok(deleted)
  }

  // ── Aggregates ────────────────────────────────────────────────────────

  pub async fn find_height_greater_than(&self, height: i32) -> Result<Vec<Person>> {
    self
      .store
      .find_all(Some(&PersonFilter::HeightGreaterThan(height)))
      .await
      .map_err(ServiceError::from_store)
  }

  pub async fn unique_heights(&self) -> Result<Vec<i32>> {
    self
      .store
      .distinct_heights()
      .await
      .map_err(ServiceError::from_store)
  }

  /// Percentage (0–100) of persons with the given hair colour; 0 when there
  /// are no persons at all.
  pub async fn hair_color_share(&self, hair_color: Color) -> Result<f64> {
    let total = self.store.count(None).await.map_err(ServiceError::from_store)?;
    if total == 0 {
      return Ok(0.0);
    }
    let matching = self
      .store
      .count(Some(&PersonFilter::HairColor(hair_color)))
      .await
      .map_err(ServiceError::from_store)?;
    Ok(matching as f64 * 100.0 / total as f64)
  }

  /// Persons with `hair_color` living in location `location_id`; 0 without
  /// querying storage when no location is given.
  pub async fn count_hair_color_in_location(
    &self,
    hair_color:  Color,
    location_id: Option<RowId>,
  ) -> Result<u64> {
    let Some(location_id) = location_id else {
      return Ok(0);
    };
    self
      .store
      .count(Some(&PersonFilter::HairColorInLocation { hair_color, location_id }))
      .await
      .map_err(ServiceError::from_store)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone as _, Utc};
  use roster_core::person::{Coordinates, to_reference_time};

  use super::*;

  fn existing() -> Person {
    Person {
      id:            7,
      name:          "Ann".into(),
      coordinates:   Coordinates { id: Some(11), x: 1.0, y: 2.0 },
      creation_date: to_reference_time(&Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
      eye_color:     Color::Green,
      hair_color:    Color::Black,
      location:      Some(Location { id: Some(5), x: 1.0, y: 1, z: 1 }),
      height:        170,
      birthday:      None,
      nationality:   Country::Russia,
    }
  }

  fn incoming(location: Option<Location>) -> NewPerson {
    NewPerson {
      name: "Anna".into(),
      coordinates: Coordinates { id: None, x: -3.0, y: 4.0 },
      eye_color: Color::Blue,
      hair_color: Color::Red,
      location,
      height: 171,
      birthday: None,
      nationality: Country::Italy,
    }
  }

  #[test]
  fn apply_update_keeps_identity_and_owned_row_ids() {
    let mut person = existing();
    let created = person.creation_date;

    apply_update(
      &mut person,
      incoming(Some(Location { id: None, x: 9.0, y: 8, z: 7 })),
    );

    assert_eq!(person.id, 7);
    assert_eq!(person.creation_date, created);
    assert_eq!(person.name, "Anna");
    assert_eq!(person.coordinates, Coordinates { id: Some(11), x: -3.0, y: 4.0 });
    assert_eq!(
      person.location,
      Some(Location { id: Some(5), x: 9.0, y: 8, z: 7 })
    );
  }

  #[test]
  fn apply_update_clears_location() {
    let mut person = existing();
    apply_update(&mut person, incoming(None));
    assert!(person.location.is_none());
  }

  #[test]
  fn apply_update_creates_location_when_absent() {
    let mut person = existing();
    person.location = None;
    apply_update(
      &mut person,
      incoming(Some(Location { id: Some(99), x: 1.0, y: 2, z: 3 })),
    );
    assert_eq!(person.location, Some(Location { id: None, x: 1.0, y: 2, z: 3 }));
  }

  #[test]
  fn parse_filter_dispatch() {
    assert_eq!(parse_filter(None, Some("x")).unwrap(), None);
    assert_eq!(parse_filter(Some("name"), Some("  ")).unwrap(), None);
    assert_eq!(
      parse_filter(Some("name"), Some("Ann")).unwrap(),
      Some(PersonFilter::Name("Ann".into()))
    );
    assert_eq!(
      parse_filter(Some("hairColor"), Some("red")).unwrap(),
      Some(PersonFilter::HairColor(Color::Red))
    );
    assert_eq!(
      parse_filter(Some("nationality"), Some("Germany")).unwrap(),
      Some(PersonFilter::Nationality(Country::Germany))
    );
    assert_eq!(parse_filter(Some("bogusField"), Some("x")).unwrap(), None);
    assert_eq!(parse_filter(Some("eye_color"), Some("plaid")).unwrap(), None);
    assert_eq!(parse_filter(Some("hair_color"), Some("red")).unwrap(), None);
    assert!(matches!(
      parse_filter(Some("eyeColor"), Some("not-a-color")),
      Err(ServiceError::InvalidArgument(_))
    ));
  }
}
