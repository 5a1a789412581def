//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("unknown color: {0:?}")]
  UnknownColor(String),

  #[error("unknown country: {0:?}")]
  UnknownCountry(String),

  #[error("unknown sort field: {0:?}")]
  UnknownSortField(String),

  #[error("{0}")]
  Validation(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
