//! Stores: the storefront a provider sells through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A provider's storefront. `rating` and `review_count` are a cache of the
/// store's reviews, rewritten by the backend after every review mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
  pub id:           Uuid,
  pub owner_id:     Uuid,
  pub owner_email:  String,
  pub name:         String,
  pub description:  String,
  pub address:      String,
  pub latitude:     Option<f64>,
  pub longitude:    Option<f64>,
  pub image_url:    Option<String>,
  pub rating:       f64,
  pub review_count: u32,
  pub created_at:   DateTime<Utc>,
}

impl Store {
  pub fn coordinates(&self) -> Option<(f64, f64)> {
    Some((self.latitude?, self.longitude?))
  }
}

/// Input to [`crate::market::MarketStore::create_store`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStore {
  pub name:        String,
  #[serde(default)]
  pub description: String,
  pub address:     String,
  pub latitude:    Option<f64>,
  pub longitude:   Option<f64>,
  pub image_url:   Option<String>,
}

/// Partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorePatch {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub address:     Option<String>,
  pub latitude:    Option<f64>,
  pub longitude:   Option<f64>,
  pub image_url:   Option<String>,
}

/// One of the most recently opened stores, as listed in platform stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentStore {
  pub id:         Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}
