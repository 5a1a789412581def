//! The person service: business rules on top of a [`PersonStore`].
//!
//! [`PersonService`] is the single entry point for callers. It validates
//! input, enforces the aggregate's ownership rules, builds store queries from
//! loosely-typed listing parameters, computes aggregates, and signals a
//! [`ChangeNotifier`] after every successful mutation.
//!
//! [`PersonStore`]: roster_core::store::PersonStore

pub mod error;
pub mod notify;
pub mod service;

mod validate;

pub use error::{Result, ServiceError};
pub use notify::{BroadcastNotifier, ChangeNotifier, NoopNotifier, PersonsChanged};
pub use service::{ListRequest, PersonService};
