//! `GET /events` — server-sent "persons changed" notifications.
//!
//! Each mutation produces one `persons` event with the data `changed`.
//! Clients are expected to re-fetch whatever they display. A subscriber that
//! lagged behind still receives a single `changed` event for the missed ones.

use std::convert::Infallible;

use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use roster_core::store::PersonStore;
use tokio_stream::{Stream, StreamExt as _, wrappers::BroadcastStream};

use crate::AppState;

pub async fn stream<S>(
  State(state): State<AppState<S>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
  S: PersonStore + 'static,
{
  let changes = BroadcastStream::new(state.changes.subscribe())
    .map(|_| Ok::<_, Infallible>(Event::default().event("persons").data("changed")));
  Sse::new(changes).keep_alive(KeepAlive::default())
}
