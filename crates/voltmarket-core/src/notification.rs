//! Stock notifications: one-shot "tell me when it's back" subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inventory::Component;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockNotification {
  pub id:           Uuid,
  pub user_id:      Uuid,
  pub component_id: Uuid,
  pub is_active:    bool,
  pub created_at:   DateTime<Utc>,
}

/// Result of [`crate::market::MarketStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subscription {
  /// A new subscription row was written.
  Created,
  /// A previously fired subscription was switched back on.
  Reactivated,
  /// The user was already waiting on this component.
  AlreadyActive,
}

impl Subscription {
  pub fn is_new(self) -> bool { !matches!(self, Self::AlreadyActive) }
}

/// A component update together with the addresses whose notifications it
/// fired. Those notifications are already inactive when this is returned.
#[derive(Debug, Clone)]
pub struct ComponentUpdate {
  pub component:  Component,
  pub recipients: Vec<String>,
}

/// Mail subject and body for a restock notice.
pub fn restock_message(component: &Component) -> (String, String) {
  (
    format!("Back in stock: {}", component.name),
    format!(
      "The component {} ({}) is available again with {} units in stock.",
      component.name, component.mpn, component.stock
    ),
  )
}
