//! Error types for `voltmarket-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("store not found: {0}")]
  StoreNotFound(Uuid),

  #[error("category not found: {0}")]
  CategoryNotFound(Uuid),

  #[error("component not found: {0}")]
  ComponentNotFound(Uuid),

  #[error("review not found: {0}")]
  ReviewNotFound(Uuid),

  #[error("wishlist not found: {0}")]
  WishlistNotFound(Uuid),

  #[error("component {component_id} is not in wishlist {wishlist_id}")]
  WishlistItemNotFound {
    wishlist_id:  Uuid,
    component_id: Uuid,
  },

  #[error("no stock notification for component {0}")]
  NotificationNotFound(Uuid),

  #[error("email {0:?} is already registered")]
  EmailTaken(String),

  #[error("user {0} already owns a store")]
  StoreAlreadyExists(Uuid),

  #[error("a component with MPN {0:?} already exists")]
  DuplicateMpn(String),

  #[error("a category named {0:?} already exists")]
  DuplicateCategory(String),

  #[error("user has already reviewed store {0}")]
  DuplicateReview(Uuid),

  #[error("category {0} is still referenced by components")]
  CategoryInUse(Uuid),

  /// A field-level validation failure, reported against `field`.
  #[error("{field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// An opaque failure from a storage backend.
  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation { field, message: message.into() }
  }

  pub fn forbidden(message: impl Into<String>) -> Self {
    Self::Forbidden(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
