//! Read-only aggregate reports for administrators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::RecentStore;

pub const TOP_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCount {
  pub query: String,
  pub count: u64,
}

/// A component and how many users are actively waiting for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDemand {
  pub component_id:   Uuid,
  pub component_name: String,
  pub total:          u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySummary {
  /// Sum of list prices across the catalog.
  pub total_value:        Decimal,
  pub out_of_stock_count: u64,
  pub total_components:   u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analytics {
  pub top_searches:      Vec<SearchCount>,
  pub stock_demands:     Vec<StockDemand>,
  pub inventory_summary: InventorySummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformStats {
  pub total_stores:         u64,
  pub total_components:     u64,
  pub low_stock_alerts:     u64,
  pub recent_registrations: Vec<RecentStore>,
}
