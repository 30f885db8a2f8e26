//! Core types and trait definitions for the voltmarket backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod analytics;
pub mod error;
pub mod geo;
pub mod inventory;
pub mod market;
pub mod notification;
pub mod policy;
pub mod review;
pub mod search;
pub mod store;
pub mod user;
pub mod wishlist;

pub use error::{Error, Result};
