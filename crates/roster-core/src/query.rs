//! Query types consumed by [`PersonStore`](crate::store::PersonStore).
//!
//! Filters and sort keys are closed enums rather than free-form field names so
//! a store can map each variant onto a fixed column and bind every value as a
//! parameter.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  Error, Result,
  category::{Color, Country},
  person::RowId,
};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// A single predicate over persons.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonFilter {
  /// Exact name match.
  Name(String),
  EyeColor(Color),
  HairColor(Color),
  Nationality(Country),
  /// `height` strictly greater than the value.
  HeightGreaterThan(i32),
  /// Persons with the given hair colour whose owned location has this id.
  HairColorInLocation {
    hair_color:  Color,
    location_id: RowId,
  },
}

// ─── Sort ────────────────────────────────────────────────────────────────────

/// The fields a page can be ordered by.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum SortField {
  #[default]
  #[strum(serialize = "id")]
  Id,
  #[strum(serialize = "name")]
  Name,
  #[strum(serialize = "creationDate", serialize = "creation_date")]
  CreationDate,
  #[strum(serialize = "eyeColor", serialize = "eye_color")]
  EyeColor,
  #[strum(serialize = "hairColor", serialize = "hair_color")]
  HairColor,
  #[strum(serialize = "height")]
  Height,
  #[strum(serialize = "birthday")]
  Birthday,
  #[strum(serialize = "nationality")]
  Nationality,
  #[strum(serialize = "coordinates.x")]
  CoordinatesX,
  #[strum(serialize = "coordinates.y")]
  CoordinatesY,
}

impl SortField {
  /// Parse a field name; blank input selects [`SortField::Id`].
  pub fn parse(s: Option<&str>) -> Result<Self> {
    match s.map(str::trim) {
      None | Some("") => Ok(Self::Id),
      Some(name) => name
        .parse()
        .map_err(|_| Error::UnknownSortField(name.to_owned())),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl SortDirection {
  /// Descending only for an explicit `desc` token, in any case.
  pub fn from_token(token: Option<&str>) -> Self {
    match token {
      Some(t) if t.trim().eq_ignore_ascii_case("desc") => Self::Desc,
      _ => Self::Asc,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort {
  pub field:     SortField,
  pub direction: SortDirection,
}

// ─── Paging ──────────────────────────────────────────────────────────────────

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
  pub page: u32,
  pub size: u32,
  pub sort: Sort,
}

impl PageRequest {
  /// Build a request from raw caller input, clamping `page` to at least 0 and
  /// `size` to `1..=max_size`.
  pub fn clamped(page: i64, size: i64, max_size: u32, sort: Sort) -> Self {
    let max_size = max_size.max(1);
    Self {
      page: page.clamp(0, i64::from(u32::MAX)) as u32,
      size: size.clamp(1, i64::from(max_size)) as u32,
      sort,
    }
  }

  pub fn offset(&self) -> u64 { u64::from(self.page) * u64::from(self.size) }
}

/// One page of results plus the metadata needed to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:          Vec<T>,
  pub total_elements: u64,
  pub page:           u32,
  pub size:           u32,
}

impl<T> Page<T> {
  pub fn total_pages(&self) -> u64 {
    if self.size == 0 {
      return 0;
    }
    self.total_elements.div_ceil(u64::from(self.size))
  }

  pub fn is_last(&self) -> bool { u64::from(self.page) + 1 >= self.total_pages() }
}
