//! User accounts and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a user is allowed to do on the marketplace.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  /// Owns at most one store and manages its components.
  Provider,
  /// Reviews stores and keeps wishlists.
  #[default]
  Client,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Provider => "provider",
      Self::Client => "client",
    }
  }

  pub fn is_admin(self) -> bool { matches!(self, Self::Admin) }
}

/// A registered account. The password hash never leaves the store through
/// this type; see [`Credentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:         Uuid,
  pub email:      String,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

impl User {
  /// "First Last" when either part is set, otherwise the email address.
  pub fn display_name(&self) -> String {
    let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
    let full = full.trim();
    if full.is_empty() {
      self.email.clone()
    } else {
      full.to_owned()
    }
  }
}

/// A user together with their stored argon2 PHC hash.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}

/// Store profile submitted alongside a provider registration.
#[derive(Debug, Clone)]
pub struct StoreProfile {
  pub name:    String,
  pub address: String,
}

/// Input to [`crate::market::MarketStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub username:      String,
  pub first_name:    String,
  pub last_name:     String,
  pub role:          Role,
  pub password_hash: String,
  /// Created in the same transaction as the user when present.
  pub store:         Option<StoreProfile>,
}

/// Admin-side edits to an account. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
  pub username:   Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub role:       Option<Role>,
}

/// Normalise an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
