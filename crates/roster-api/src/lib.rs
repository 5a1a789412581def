//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] over a [`PersonService`] backed by any
//! [`PersonStore`]. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(state))
//! ```

pub mod error;
pub mod events;
pub mod ops;
pub mod persons;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::store::PersonStore;
use roster_service::{BroadcastNotifier, PersonService};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub service: Arc<PersonService<S>>,
  /// The notifier the service signals; `/events` subscribes to it.
  pub changes: BroadcastNotifier,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { service: self.service.clone(), changes: self.changes.clone() }
  }
}

impl<S: PersonStore> AppState<S> {
  /// Wire a service over `store` that broadcasts through `changes`.
  pub fn new(store: Arc<S>, changes: BroadcastNotifier, max_page_size: u32) -> Self {
    let service = PersonService::new(store, Arc::new(changes.clone()))
      .with_max_page_size(max_page_size);
    Self { service: Arc::new(service), changes }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: PersonStore + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S>)
        .put(persons::update::<S>)
        .delete(persons::delete_one::<S>),
    )
    // Operations
    .route("/ops/delete-by-nationality", post(ops::delete_by_nationality::<S>))
    .route("/ops/height-greater", get(ops::height_greater::<S>))
    .route("/ops/unique-heights", get(ops::unique_heights::<S>))
    .route("/ops/hair-share", get(ops::hair_share::<S>))
    .route("/ops/hair-count-in-location", get(ops::hair_count_in_location::<S>))
    // Change notifications
    .route("/events", get(events::stream::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use roster_core::{
    category::Country,
    person::{NewPerson, Person, PersonId},
    query::{Page, PageRequest, PersonFilter},
    store::StoreError,
  };
  use roster_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(Arc::new(store), BroadcastNotifier::default(), 100)
  }

  async fn call(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn ann() -> Value {
    json!({
      "name": "Ann",
      "coordinates": { "x": 1.0, "y": 2.0 },
      "eye_color": "GREEN",
      "hair_color": "BLACK",
      "height": 170,
      "nationality": "RUSSIA"
    })
  }

  // ── Persons ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_get() {
    let state = make_state().await;

    let (status, created) = call(state.clone(), "POST", "/persons", Some(ann())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert!(created["creation_date"].as_str().unwrap().ends_with("+03:00"));

    let (status, fetched) = call(state, "GET", &format!("/persons/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Ann");
  }

  #[tokio::test]
  async fn create_without_y_is_400() {
    let state = make_state().await;
    let mut body = ann();
    body["coordinates"] = json!({ "x": 1.0 });

    let (status, error) = call(state, "POST", "/persons", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().unwrap().contains("coordinates.y"));
  }

  #[tokio::test]
  async fn get_missing_is_404() {
    let state = make_state().await;
    let (status, _) = call(state, "GET", "/persons/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn update_and_delete() {
    let state = make_state().await;
    let (_, created) = call(state.clone(), "POST", "/persons", Some(ann())).await;
    let uri = format!("/persons/{}", created["id"]);

    let mut body = ann();
    body["height"] = json!(171);
    let (status, updated) = call(state.clone(), "PUT", &uri, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["height"], 171);
    assert_eq!(updated["creation_date"], created["creation_date"]);

    let (status, _) = call(state.clone(), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(state, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn list_with_bad_enum_filter_is_400() {
    let state = make_state().await;
    let (status, _) = call(
      state,
      "GET",
      "/persons?filter_field=eyeColor&filter_value=plaid",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn list_returns_page_metadata() {
    let state = make_state().await;
    call(state.clone(), "POST", "/persons", Some(ann())).await;

    let (status, page) = call(state, "GET", "/persons?page=0&size=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_elements"], 1);
    assert_eq!(page["size"], 5);
    assert_eq!(page["items"][0]["name"], "Ann");
  }

  // ── Operations ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn aggregate_operations() {
    let state = make_state().await;
    call(state.clone(), "POST", "/persons", Some(ann())).await;
    let mut bob = ann();
    bob["name"] = json!("Bob");
    bob["height"] = json!(180);
    bob["hair_color"] = json!("BROWN");
    bob["nationality"] = json!("GERMANY");
    call(state.clone(), "POST", "/persons", Some(bob)).await;

    let (_, heights) = call(state.clone(), "GET", "/ops/unique-heights", None).await;
    assert_eq!(heights, json!([170, 180]));

    let (_, share) =
      call(state.clone(), "GET", "/ops/hair-share?hair_color=black", None).await;
    assert_eq!(share["share"], 50.0);

    let (_, taller) =
      call(state.clone(), "GET", "/ops/height-greater?height=170", None).await;
    assert_eq!(taller.as_array().unwrap().len(), 1);

    let (_, count) = call(
      state.clone(),
      "GET",
      "/ops/hair-count-in-location?hair_color=BLACK",
      None,
    )
    .await;
    assert_eq!(count["count"], 0);

    let (status, deleted) = call(
      state,
      "POST",
      "/ops/delete-by-nationality",
      Some(json!({ "nationality": "russia" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], 1);
  }

  // ── Storage failures ────────────────────────────────────────────────────────

  #[derive(Debug, Clone, Copy, thiserror::Error)]
  enum StubError {
    #[error("UNIQUE constraint failed")]
    Constraint,
    #[error("disk I/O error")]
    Io,
  }

  impl StoreError for StubError {
    fn is_constraint_violation(&self) -> bool { matches!(self, Self::Constraint) }

    fn is_unavailable(&self) -> bool { false }
  }

  /// Accepts reads of an empty registry and rejects every write.
  struct RejectingStore(StubError);

  impl PersonStore for RejectingStore {
    type Error = StubError;

    async fn get(&self, _id: PersonId) -> Result<Option<Person>, StubError> { Ok(None) }

    async fn insert(&self, _person: NewPerson) -> Result<Person, StubError> { Err(self.0) }

    async fn modify<F>(&self, _id: PersonId, _apply: F) -> Result<Option<Person>, StubError>
    where
      F: FnOnce(&mut Person) + Send + 'static,
    {
      Err(self.0)
    }

    async fn delete(&self, _id: PersonId) -> Result<bool, StubError> { Err(self.0) }

    async fn find_page(
      &self,
      _filter: Option<&PersonFilter>,
      request: &PageRequest,
    ) -> Result<Page<Person>, StubError> {
      Ok(Page { items: vec![], total_elements: 0, page: request.page, size: request.size })
    }

    async fn find_all(&self, _filter: Option<&PersonFilter>) -> Result<Vec<Person>, StubError> {
      Ok(vec![])
    }

    async fn count(&self, _filter: Option<&PersonFilter>) -> Result<u64, StubError> { Ok(0) }

    async fn distinct_heights(&self) -> Result<Vec<i32>, StubError> { Ok(vec![]) }

    async fn delete_by_nationality(&self, _nationality: Country) -> Result<u64, StubError> {
      Err(self.0)
    }
  }

  async fn post_rejected(error: StubError) -> (StatusCode, Value) {
    let state = AppState::new(
      Arc::new(RejectingStore(error)),
      BroadcastNotifier::default(),
      100,
    );
    let req = Request::builder()
      .method("POST")
      .uri("/persons")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(ann().to_string()))
      .unwrap();
    let resp = api_router(state).oneshot(req).await.unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn constraint_violation_is_409() {
    let (status, body) = post_rejected(StubError::Constraint).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn other_storage_failure_is_500_with_error_id() {
    let (status, body) = post_rejected(StubError::Io).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal error");
    let error_id = body["error_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(error_id).is_ok());
  }

  #[tokio::test]
  async fn unknown_color_parameter_is_400() {
    let state = make_state().await;
    let (status, _) = call(state, "GET", "/ops/hair-share?hair_color=plaid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Events ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn events_endpoint_is_an_event_stream() {
    let state = make_state().await;
    let resp = api_router(state)
      .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
      .await
      .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
  }

  #[tokio::test]
  async fn mutations_reach_event_subscribers() {
    let state = make_state().await;
    let mut rx = state.changes.subscribe();

    call(state, "POST", "/persons", Some(ann())).await;

    assert!(rx.try_recv().is_ok());
  }
}
