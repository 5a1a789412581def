//! Error type for `roster-service`.

use roster_core::{person::PersonId, store::StoreError};
use thiserror::Error;

/// Failure of a service operation.
///
/// Callers are expected to match on the variant: the first two are client
/// errors, the last two originate in storage.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("person not found: {0}")]
  NotFound(PersonId),

  #[error("could not save due to constraint conflict: {0}")]
  Constraint(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ServiceError {
  pub fn invalid(reason: impl Into<String>) -> Self { Self::InvalidArgument(reason.into()) }

  /// Classify a backend error. Unavailability is logged here and otherwise
  /// reported as a generic storage failure.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    if e.is_constraint_violation() {
      return Self::Constraint(Box::new(e));
    }
    if e.is_unavailable() {
      tracing::warn!(error = %e, "storage unavailable");
    }
    Self::Storage(Box::new(e))
  }
}

impl From<roster_core::Error> for ServiceError {
  fn from(e: roster_core::Error) -> Self { Self::InvalidArgument(e.to_string()) }
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
