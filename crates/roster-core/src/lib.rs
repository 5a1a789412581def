//! Domain types for the Roster person registry.
//!
//! Persons and their owned rows, the categorical enums, query shapes and the
//! [`PersonStore`](store::PersonStore) gateway. No HTTP or database code lives
//! here.

// Store methods are native `async fn`-style trait methods with explicit
// `Send` futures.
#![allow(async_fn_in_trait)]

pub mod category;
pub mod error;
pub mod person;
pub mod query;
pub mod store;

pub use error::{Error, Result};
