//! Closed enumerations used as categorical person attributes.
//!
//! Both enums are stored and serialised as their SCREAMING_SNAKE_CASE member
//! name. Parsing from text is case-insensitive; anything outside the set is a
//! client error ([`Error::UnknownColor`] / [`Error::UnknownCountry`]).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Eye and hair colours.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Color {
  Green,
  Red,
  Black,
  Blue,
  Yellow,
  Orange,
  White,
  Brown,
}

impl Color {
  /// Parse a colour name, ignoring case and surrounding whitespace.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::UnknownColor(s.to_owned()))
  }

  pub fn as_str(&self) -> &'static str { self.into() }
}

/// Nationalities.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Country {
  Russia,
  Germany,
  China,
  Vatican,
  Italy,
  Thailand,
}

impl Country {
  /// Parse a country name, ignoring case and surrounding whitespace.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::UnknownCountry(s.to_owned()))
  }

  pub fn as_str(&self) -> &'static str { self.into() }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn color_parse_is_case_insensitive() {
    assert_eq!(Color::parse("green").unwrap(), Color::Green);
    assert_eq!(Color::parse("GrEeN").unwrap(), Color::Green);
    assert_eq!(Color::parse(" BLUE ").unwrap(), Color::Blue);
  }

  #[test]
  fn color_parse_rejects_unknown_text() {
    let err = Color::parse("not-a-color").unwrap_err();
    assert_eq!(err, Error::UnknownColor("not-a-color".into()));
  }

  #[test]
  fn country_parse_rejects_unknown_text() {
    assert_eq!(Country::parse("russia").unwrap(), Country::Russia);
    assert!(matches!(
      Country::parse("atlantis"),
      Err(Error::UnknownCountry(_))
    ));
  }

  #[test]
  fn as_str_is_the_upper_case_member_name() {
    assert_eq!(Color::Green.as_str(), "GREEN");
    assert_eq!(Color::Brown.as_str(), "BROWN");
    assert_eq!(Country::Vatican.as_str(), "VATICAN");
    assert_eq!(Country::Thailand.as_str(), "THAILAND");
  }

  #[test]
  fn as_str_matches_display_and_serde() {
    for color in Color::iter() {
      assert_eq!(color.as_str(), color.to_string());
      assert_eq!(
        serde_json::to_string(&color).unwrap(),
        format!("\"{}\"", color.as_str())
      );
    }
    for country in Country::iter() {
      assert_eq!(country.as_str(), country.to_string());
      assert_eq!(Country::parse(country.as_str()).unwrap(), country);
    }
  }
}
