//! Error type for `roster-store-sqlite`.

use roster_core::store::StoreError;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value that does not map onto the domain type.
  #[error("decode error: {0}")]
  Decode(String),

  /// A row that must exist (e.g. a person's coordinates) was missing.
  #[error("missing row: {0}")]
  MissingRow(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  fn sqlite_code(&self) -> Option<ErrorCode> {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _),
      )) => Some(e.code),
      _ => None,
    }
  }
}

impl StoreError for Error {
  fn is_constraint_violation(&self) -> bool {
    self.sqlite_code() == Some(ErrorCode::ConstraintViolation)
  }

  fn is_unavailable(&self) -> bool {
    match self {
      Error::Database(
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_),
      ) => true,
      _ => matches!(
        self.sqlite_code(),
        Some(
          ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
        )
      ),
    }
  }
}
