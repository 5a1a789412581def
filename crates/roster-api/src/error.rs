//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_service::ServiceError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ServiceError> for ApiError {
  fn from(e: ServiceError) -> Self {
    match e {
      ServiceError::InvalidArgument(reason) => ApiError::BadRequest(reason),
      ServiceError::NotFound(id) => ApiError::NotFound(format!("person {id} not found")),
      ServiceError::Constraint(source) => {
        tracing::warn!(error = %source, "write rejected by constraint");
        ApiError::Conflict("could not save: data conflicts with constraints".into())
      }
      ServiceError::Storage(source) => ApiError::Internal(source),
    }
  }
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::Internal(e) => {
        // Correlates the log line with what the client sees.
        let error_id = Uuid::new_v4();
        tracing::error!(%error_id, error = %e, "unexpected error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": "internal error", "error_id": error_id }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}
