//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Field validation failures render as `{"<field>": ["message", ...]}`;
//! everything else renders as `{"detail": "..."}`.

use std::collections::BTreeMap;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use voltmarket_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid fields: {0:?}")]
  Validation(BTreeMap<String, Vec<String>>),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Validation(BTreeMap::from([(field.into(), vec![message.into()])]))
  }

  pub fn not_found(what: &str) -> Self { Self::NotFound(format!("{what} not found.")) }

  pub fn internal(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Internal(Box::new(e))
  }
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::Validation { field, message } => ApiError::field(field, message),
      CoreError::Forbidden(m) => ApiError::Forbidden(m),

      CoreError::UserNotFound(_) => ApiError::not_found("User"),
      CoreError::StoreNotFound(_) => ApiError::not_found("Store"),
      CoreError::CategoryNotFound(_) => ApiError::not_found("Category"),
      CoreError::ComponentNotFound(_) => ApiError::not_found("Component"),
      CoreError::ReviewNotFound(_) => ApiError::not_found("Review"),
      CoreError::WishlistNotFound(_) => ApiError::not_found("Wishlist"),
      CoreError::WishlistItemNotFound { .. } => ApiError::not_found("Item"),
      CoreError::NotificationNotFound(_) => ApiError::not_found("Notification"),

      CoreError::EmailTaken(_) => {
        ApiError::field("email", "A user with that email already exists.")
      }
      CoreError::DuplicateMpn(_) => {
        ApiError::field("mpn", "A component with this MPN already exists.")
      }
      CoreError::DuplicateCategory(_) => {
        ApiError::field("name", "A category with this name already exists.")
      }
      CoreError::DuplicateReview(_) => {
        ApiError::field("store", "You have already reviewed this store.")
      }
      CoreError::StoreAlreadyExists(_) => {
        ApiError::BadRequest("You already have a store.".into())
      }
      CoreError::CategoryInUse(_) => ApiError::BadRequest(
        "This category is in use by components and cannot be deleted.".into(),
      ),

      e @ (CoreError::Serialization(_) | CoreError::Backend(_)) => ApiError::internal(e),
    }
  }
}

impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let fields = errors
      .field_errors()
      .into_iter()
      .map(|(field, errs)| {
        let messages = errs
          .iter()
          .map(|e| match &e.message {
            Some(m) => m.to_string(),
            None => format!("Invalid value ({}).", e.code),
          })
          .collect();
        (field.to_string(), messages)
      })
      .collect();
    ApiError::Validation(fields)
  }
}

/// Lift a backend or domain result into the API error space.
pub trait OrApiError<T> {
  fn or_api(self) -> Result<T, ApiError>;
}

impl<T, E: Into<CoreError>> OrApiError<T> for Result<T, E> {
  fn or_api(self) -> Result<T, ApiError> { self.map_err(|e| ApiError::from(e.into())) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(fields) => (StatusCode::BAD_REQUEST, Json(fields)).into_response(),
      ApiError::Unauthorized(m) => {
        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": m }))).into_response()
      }
      ApiError::Forbidden(m) => {
        (StatusCode::FORBIDDEN, Json(json!({ "detail": m }))).into_response()
      }
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "detail": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "detail": m }))).into_response()
      }
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "detail": "Internal server error." })),
        )
          .into_response()
      }
    }
  }
}
