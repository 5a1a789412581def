//! The person aggregate and the value entities it owns.
//!
//! A [`Person`] owns exactly one [`Coordinates`] row and at most one
//! [`Location`] row. Owned rows never outlive their owner and are never shared
//! between two persons. An owned row with `id: None` has not been persisted
//! yet; the store inserts it on the next write.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset as _, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{Color, Country};

/// Server-generated sequential person identity.
pub type PersonId = i32;

/// Row identity of an owned [`Coordinates`] or [`Location`].
pub type RowId = i64;

pub const NAME_MAX_LENGTH: usize = 255;
pub const HEIGHT_MIN: i32 = 1;
pub const HEIGHT_MAX: i32 = 1_000_000;
pub const COORDINATE_LIMIT: f32 = 1_000_000.0;

// ─── Reference timezone ──────────────────────────────────────────────────────

/// UTC offset of the reference timezone (Europe/Moscow, which has had no DST
/// since 2014).
pub const REFERENCE_OFFSET_SECS: i32 = 3 * 3600;

/// The fixed offset every creation timestamp is expressed in.
pub fn reference_offset() -> FixedOffset {
  FixedOffset::east_opt(REFERENCE_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Re-express `dt` in the reference timezone. The instant is unchanged.
pub fn to_reference_time<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateTime<FixedOffset> {
  dt.with_timezone(&reference_offset())
}

// ─── Owned value entities ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub id: Option<RowId>,
  pub x:  f32,
  pub y:  f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub id: Option<RowId>,
  pub x:  f64,
  pub y:  i32,
  pub z:  i32,
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// A persisted person together with its owned rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub id:            PersonId,
  pub name:          String,
  pub coordinates:   Coordinates,
  /// Stamped by the store on first insert; always in the reference timezone.
  pub creation_date: DateTime<FixedOffset>,
  pub eye_color:     Color,
  pub hair_color:    Color,
  pub location:      Option<Location>,
  pub height:        i32,
  pub birthday:      Option<NaiveDate>,
  pub nationality:   Country,
}

/// A validated person that has not been persisted yet.
///
/// Owned-row ids are ignored on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
  pub name:        String,
  pub coordinates: Coordinates,
  pub eye_color:   Color,
  pub hair_color:  Color,
  pub location:    Option<Location>,
  pub height:      i32,
  pub birthday:    Option<NaiveDate>,
  pub nationality: Country,
}

// ─── Caller input ────────────────────────────────────────────────────────────

/// Coordinates as submitted by a caller; `y` may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesDraft {
  #[serde(default)]
  pub x: f32,
  pub y: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDraft {
  pub x: f64,
  #[serde(default)]
  pub y: i32,
  #[serde(default)]
  pub z: i32,
}

/// Unvalidated input for create and update.
///
/// Identity and creation date are not part of the draft; they are always
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDraft {
  pub name:        String,
  pub coordinates: Option<CoordinatesDraft>,
  pub eye_color:   Color,
  pub hair_color:  Color,
  #[serde(default)]
  pub location:    Option<LocationDraft>,
  pub height:      i32,
  #[serde(default)]
  pub birthday:    Option<NaiveDate>,
  pub nationality: Country,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reference_time_keeps_the_instant() {
    let utc = Utc.with_ymd_and_hms(2024, 3, 1, 21, 30, 0).unwrap();
    let local = to_reference_time(&utc);

    assert_eq!(local, utc);
    assert_eq!(local.offset().local_minus_utc(), REFERENCE_OFFSET_SECS);
    assert_eq!(local.to_rfc3339(), "2024-03-02T00:30:00+03:00");
  }

  #[test]
  fn reference_time_from_other_offset() {
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let dt = tokyo.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    assert_eq!(to_reference_time(&dt).to_rfc3339(), "2024-01-01T03:00:00+03:00");
  }

  #[test]
  fn draft_deserialises_without_optional_parts() {
    let draft: PersonDraft = serde_json::from_str(
      r#"{
        "name": "Ann",
        "coordinates": { "y": 2.0 },
        "eye_color": "GREEN",
        "hair_color": "BLACK",
        "height": 170,
        "nationality": "RUSSIA"
      }"#,
    )
    .unwrap();

    assert_eq!(draft.coordinates, Some(CoordinatesDraft { x: 0.0, y: Some(2.0) }));
    assert!(draft.location.is_none());
    assert!(draft.birthday.is_none());
  }
}
