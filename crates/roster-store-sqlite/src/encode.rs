//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings in the reference offset with a
//! fixed microsecond precision, so lexical order matches chronological order.
//! Calendar dates are stored as `YYYY-MM-DD`. Enum values are stored as their
//! member name.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use roster_core::{
  category::{Color, Country},
  person::{Coordinates, Location, Person, to_reference_time},
};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<FixedOffset>) -> String {
  to_reference_time(&dt).to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Parse a stored timestamp and re-express it in the reference timezone,
/// whatever offset it was written with.
pub fn decode_dt(s: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| to_reference_time(&dt))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Calendar dates ──────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn decode_color(s: &str) -> Result<Color> {
  Color::parse(s).map_err(|e| Error::Decode(e.to_string()))
}

pub fn decode_country(s: &str) -> Result<Country> {
  Country::parse(s).map_err(|e| Error::Decode(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::from_row`]; the query must alias the
/// tables as `p` (persons), `c` (coordinates) and `l` (locations).
pub const PERSON_COLUMNS: &str = "
  p.id, p.name, p.creation_date, p.eye_color, p.hair_color,
  p.height, p.birthday, p.nationality,
  c.id, c.x, c.y,
  l.id, l.x, l.y, l.z";

/// The `FROM` clause joining a person to its owned rows.
pub const PERSON_FROM: &str = "
  FROM persons p
  JOIN coordinates    c ON c.id = p.coordinates_id
  LEFT JOIN locations l ON l.id = p.location_id";

/// Raw values read directly from a `persons` row joined with its owned rows.
pub struct RawPerson {
  pub id:            i32,
  pub name:          String,
  pub creation_date: String,
  pub eye_color:     String,
  pub hair_color:    String,
  pub height:        i32,
  pub birthday:      Option<String>,
  pub nationality:   String,
  // coordinates join
  pub coordinates_id: i64,
  pub coordinates_x:  f64,
  pub coordinates_y:  f64,
  // locations join
  pub location_id:    Option<i64>,
  pub location_x:     Option<f64>,
  pub location_y:     Option<i32>,
  pub location_z:     Option<i32>,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPerson {
      id:             row.get(0)?,
      name:           row.get(1)?,
      creation_date:  row.get(2)?,
      eye_color:      row.get(3)?,
      hair_color:     row.get(4)?,
      height:         row.get(5)?,
      birthday:       row.get(6)?,
      nationality:    row.get(7)?,
      coordinates_id: row.get(8)?,
      coordinates_x:  row.get(9)?,
      coordinates_y:  row.get(10)?,
      location_id:    row.get(11)?,
      location_x:     row.get(12)?,
      location_y:     row.get(13)?,
      location_z:     row.get(14)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    let location = match (self.location_id, self.location_x) {
      (Some(id), Some(x)) => Some(Location {
        id: Some(id),
        x,
        y: self.location_y.unwrap_or_default(),
        z: self.location_z.unwrap_or_default(),
      }),
      (Some(id), None) => {
        return Err(Error::MissingRow(format!("location {id} of person {}", self.id)));
      }
      (None, _) => None,
    };

    Ok(Person {
      id: self.id,
      name: self.name,
      coordinates: Coordinates {
        id: Some(self.coordinates_id),
        x:  self.coordinates_x as f32,
        y:  self.coordinates_y as f32,
      },
      creation_date: decode_dt(&self.creation_date)?,
      eye_color: decode_color(&self.eye_color)?,
      hair_color: decode_color(&self.hair_color)?,
      location,
      height: self.height,
      birthday: self.birthday.as_deref().map(decode_date).transpose()?,
      nationality: decode_country(&self.nationality)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone as _, Utc};

  use super::*;

  #[test]
  fn timestamps_are_normalised_on_decode() {
    let dt = decode_dt("2024-05-01T12:00:00Z").unwrap();
    assert_eq!(dt.to_rfc3339(), "2024-05-01T15:00:00+03:00");
  }

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let offset = FixedOffset::east_opt(0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap().with_timezone(&offset);
    let later = earlier + chrono::Duration::milliseconds(1500);

    let (a, b) = (encode_dt(earlier), encode_dt(later));
    assert!(a < b, "{a} should sort before {b}");
    assert_eq!(a, "2024-05-01T15:00:00.000000+03:00");
  }

  #[test]
  fn unknown_enum_text_is_a_decode_error() {
    assert!(matches!(decode_color("PURPLE"), Err(Error::Decode(_))));
    assert!(matches!(decode_country("NARNIA"), Err(Error::Decode(_))));
  }
}
