//! The `PersonStore` trait — the storage gateway.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! The service layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  category::Country,
  person::{NewPerson, Person, PersonId},
  query::{Page, PageRequest, PersonFilter},
};

/// Failure classification a backend error must expose so callers can tell
/// constraint conflicts and infrastructure outages apart from other failures
/// without inspecting message text.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// A uniqueness, foreign-key, not-null or check constraint rejected a write.
  fn is_constraint_violation(&self) -> bool;

  /// The backend could not be reached or a connection/lock could not be
  /// acquired in time.
  fn is_unavailable(&self) -> bool;
}

/// Abstraction over durable person storage.
///
/// Every write runs in its own transaction: either the person and all of its
/// owned rows are written, or nothing is.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: StoreError;

  // ── Single aggregate ──────────────────────────────────────────────────

  /// Retrieve a person with its owned rows. Returns `None` if not found.
  fn get(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Persist a new person together with its coordinates and optional
  /// location. The store assigns the id and stamps the creation date.
  fn insert(
    &self,
    person: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Load the person `id`, run `apply` against it and write the result back,
  /// all within a single transaction.
  ///
  /// Owned rows that keep their id are updated in place, owned rows without
  /// an id are inserted, and a previously owned row that is no longer
  /// referenced is deleted. The person's id and creation date are never
  /// written. Returns `None` (and writes nothing) if the person does not
  /// exist.
  fn modify<F>(
    &self,
    id: PersonId,
    apply: F,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut Person) + Send + 'static;

  /// Delete a person and its owned rows. Returns `false` if there was no
  /// such person.
  fn delete(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Queries ───────────────────────────────────────────────────────────

  /// One page of persons matching `filter` (all persons when `None`).
  fn find_page<'a>(
    &'a self,
    filter: Option<&'a PersonFilter>,
    request: &'a PageRequest,
  ) -> impl Future<Output = Result<Page<Person>, Self::Error>> + Send + 'a;

  /// Every person matching `filter`, ordered by id.
  fn find_all<'a>(
    &'a self,
    filter: Option<&'a PersonFilter>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Number of persons matching `filter` (all persons when `None`).
  fn count<'a>(
    &'a self,
    filter: Option<&'a PersonFilter>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Distinct heights across all persons, ascending.
  fn distinct_heights(
    &self,
  ) -> impl Future<Output = Result<Vec<i32>, Self::Error>> + Send + '_;

  // ── Bulk writes ───────────────────────────────────────────────────────

  /// Atomically delete every person of the given nationality and their owned
  /// rows. Returns the number of persons removed.
  fn delete_by_nationality(
    &self,
    nationality: Country,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
