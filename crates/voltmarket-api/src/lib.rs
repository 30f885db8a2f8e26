//! JSON REST API for voltmarket.
//!
//! Exposes an axum [`Router`] backed by any
//! [`voltmarket_core::market::MarketStore`]. Every route lives under `/api`;
//! TLS and request tracing are the binary's concern.

pub mod auth;
pub mod categories;
pub mod components;
pub mod error;
pub mod export;
pub mod mail;
pub mod reports;
pub mod reviews;
pub mod search;
pub mod stores;
pub mod users;
pub mod wishlists;

#[cfg(test)]
mod tests;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use voltmarket_core::market::MarketStore;

pub use error::ApiError;

use auth::AuthKeys;
use mail::{MailConfig, Mailer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `VOLTMARKET__*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_database_path")]
  pub database_path:        PathBuf,
  /// HMAC secret for every JWT the API issues.
  pub jwt_secret:           String,
  #[serde(default = "default_access_token_minutes")]
  pub access_token_minutes: i64,
  #[serde(default = "default_refresh_token_days")]
  pub refresh_token_days:   i64,
  #[serde(default = "default_reset_token_minutes")]
  pub reset_token_minutes:  i64,
  /// Base URL of the web client; password reset links point here.
  #[serde(default = "default_frontend_url")]
  pub frontend_url:         String,
  #[serde(default)]
  pub mail:                 MailConfig,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8000 }
fn default_database_path() -> PathBuf { PathBuf::from("voltmarket.db") }
fn default_access_token_minutes() -> i64 { 60 }
fn default_refresh_token_days() -> i64 { 1 }
fn default_reset_token_minutes() -> i64 { 60 }
fn default_frontend_url() -> String { "http://localhost:5173".into() }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 default_host(),
      port:                 default_port(),
      database_path:        default_database_path(),
      jwt_secret:           String::new(),
      access_token_minutes: default_access_token_minutes(),
      refresh_token_days:   default_refresh_token_days(),
      reset_token_minutes:  default_reset_token_minutes(),
      frontend_url:         default_frontend_url(),
      mail:                 MailConfig::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: MarketStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthKeys>,
  pub mailer: Mailer,
}

impl<S: MarketStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig, mailer: Mailer) -> Self {
    Self {
      store: Arc::new(store),
      auth: Arc::new(AuthKeys::from_config(&config)),
      config: Arc::new(config),
      mailer,
    }
  }
}

impl<S: MarketStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
      auth:   Arc::clone(&self.auth),
      mailer: self.mailer.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for `state`, mounted under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: MarketStore + 'static,
{
  let api = Router::new()
    // Accounts
    .route("/users", get(users::list::<S>).post(users::register::<S>))
    .route("/users/login", post(users::login::<S>))
    .route("/users/me", get(users::me::<S>))
    .route("/users/change-password", post(users::change_password::<S>))
    .route("/users/delete-account", delete(users::delete_account::<S>))
    .route("/users/password-reset", post(users::password_reset::<S>))
    .route("/users/password-reset-confirm", post(users::password_reset_confirm::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>).patch(users::update::<S>).delete(users::remove::<S>),
    )
    .route("/token/refresh", post(users::refresh::<S>))
    // Stores
    .route("/stores", get(stores::list::<S>).post(stores::create::<S>))
    .route(
      "/stores/{id}",
      get(stores::get_one::<S>).patch(stores::update::<S>).delete(stores::remove::<S>),
    )
    // Categories
    .route("/categories", get(categories::list::<S>).post(categories::create::<S>))
    .route(
      "/categories/{id}",
      get(categories::get_one::<S>)
        .patch(categories::update::<S>)
        .delete(categories::remove::<S>),
    )
    // Components
    .route("/components", get(components::list::<S>).post(components::create::<S>))
    .route("/components/recommendations", get(components::recommendations::<S>))
    .route("/components/low-stock-alerts", get(components::low_stock::<S>))
    .route("/components/download-excel", get(components::download_excel::<S>))
    .route(
      "/components/{id}",
      get(components::get_one::<S>)
        .patch(components::update::<S>)
        .delete(components::remove::<S>),
    )
    .route("/components/{id}/compare-prices", get(components::compare_prices::<S>))
    .route(
      "/components/{id}/notify",
      post(components::subscribe::<S>).delete(components::unsubscribe::<S>),
    )
    // Reviews
    .route("/reviews", get(reviews::list::<S>).post(reviews::create::<S>))
    .route(
      "/reviews/{id}",
      get(reviews::get_one::<S>).patch(reviews::update::<S>).delete(reviews::remove::<S>),
    )
    // Wishlists
    .route("/wishlists", get(wishlists::list::<S>).post(wishlists::create::<S>))
    .route(
      "/wishlists/{id}",
      get(wishlists::get_one::<S>)
        .patch(wishlists::rename::<S>)
        .delete(wishlists::remove::<S>),
    )
    .route("/wishlists/{id}/toggle-item", post(wishlists::toggle_item::<S>))
    .route("/wishlists/{id}/update-quantity", post(wishlists::update_quantity::<S>))
    .route("/wishlists/{id}/clear", post(wishlists::clear::<S>))
    .route("/wishlists/{id}/export-budget", get(wishlists::export_budget::<S>))
    // Search history
    .route("/search/suggestions", get(search::suggestions::<S>))
    .route("/search/history", post(search::record::<S>))
    // Reports
    .route("/analytics", get(reports::analytics::<S>))
    .route("/platform-stats", get(reports::platform_stats::<S>));

  Router::new().nest("/api", api).with_state(state)
}
