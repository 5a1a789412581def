//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/persons` | `?filter_field&filter_value&sort&dir&page&size` |
//! | `POST`   | `/persons` | Body: [`PersonDraft`]; returns 201 + stored person |
//! | `GET`    | `/persons/{id}` | 404 if not found |
//! | `PUT`    | `/persons/{id}` | Body: [`PersonDraft`]; coordinates required |
//! | `DELETE` | `/persons/{id}` | 204 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  person::{Person, PersonDraft, PersonId},
  query::Page,
  store::PersonStore,
};
use roster_service::ListRequest;

use crate::{AppState, error::ApiError};

/// `GET /persons`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListRequest>,
) -> Result<Json<Page<Person>>, ApiError>
where
  S: PersonStore + 'static,
{
  Ok(Json(state.service.list(&params).await?))
}

/// `POST /persons`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(draft): Json<PersonDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + 'static,
{
  let person = state.service.create(draft).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /persons/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + 'static,
{
  Ok(Json(state.service.require(id).await?))
}

/// `PUT /persons/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PersonId>,
  Json(draft): Json<PersonDraft>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore + 'static,
{
  Ok(Json(state.service.update(id, draft).await?))
}

/// `DELETE /persons/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PersonId>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore + 'static,
{
  state.service.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
