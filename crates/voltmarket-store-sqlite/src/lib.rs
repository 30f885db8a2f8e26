//! SQLite backend for the voltmarket store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Derived values that must agree with
//! the rows they summarise (store ratings, fired stock notifications) are
//! written in the same transaction as the triggering change.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
