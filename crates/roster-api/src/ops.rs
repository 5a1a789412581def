//! Handlers for the bulk and aggregate operations under `/ops`.
//!
//! Colour and country parameters are matched case-insensitively.

use axum::{
  Json,
  extract::{Query, State},
};
use roster_core::{
  category::{Color, Country},
  person::{Person, RowId},
  store::PersonStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

// ─── Bulk delete ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteByNationalityBody {
  pub nationality: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub deleted: u64,
}

/// `POST /ops/delete-by-nationality` — body: `{"nationality":"RUSSIA"}`
pub async fn delete_by_nationality<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<DeleteByNationalityBody>,
) -> Result<Json<Deleted>, ApiError>
where
  S: PersonStore + 'static,
{
  let nationality = Country::parse(&body.nationality)?;
  let deleted = state.service.delete_by_nationality(nationality).await?;
  Ok(Json(Deleted { deleted }))
}

// ─── Aggregates ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HeightParams {
  pub height: i32,
}

/// `GET /ops/height-greater?height=<n>`
pub async fn height_greater<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<HeightParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PersonStore + 'static,
{
  Ok(Json(state.service.find_height_greater_than(params.height).await?))
}

/// `GET /ops/unique-heights`
pub async fn unique_heights<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<i32>>, ApiError>
where
  S: PersonStore + 'static,
{
  Ok(Json(state.service.unique_heights().await?))
}

#[derive(Debug, Deserialize)]
pub struct HairShareParams {
  pub hair_color: String,
}

#[derive(Debug, Serialize)]
pub struct HairShare {
  pub hair_color: Color,
  /// Percentage in `0.0..=100.0`.
  pub share:      f64,
}

/// `GET /ops/hair-share?hair_color=<color>`
pub async fn hair_share<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<HairShareParams>,
) -> Result<Json<HairShare>, ApiError>
where
  S: PersonStore + 'static,
{
  let hair_color = Color::parse(&params.hair_color)?;
  let share = state.service.hair_color_share(hair_color).await?;
  Ok(Json(HairShare { hair_color, share }))
}

#[derive(Debug, Deserialize)]
pub struct HairCountParams {
  pub hair_color:  String,
  pub location_id: Option<RowId>,
}

#[derive(Debug, Serialize)]
pub struct HairCount {
  pub hair_color:  Color,
  pub location_id: Option<RowId>,
  pub count:       u64,
}

/// `GET /ops/hair-count-in-location?hair_color=<color>[&location_id=<id>]`
pub async fn hair_count_in_location<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<HairCountParams>,
) -> Result<Json<HairCount>, ApiError>
where
  S: PersonStore + 'static,
{
  let hair_color = Color::parse(&params.hair_color)?;
  let count = state
    .service
    .count_hair_color_in_location(hair_color, params.location_id)
    .await?;
  Ok(Json(HairCount { hair_color, location_id: params.location_id, count }))
}
