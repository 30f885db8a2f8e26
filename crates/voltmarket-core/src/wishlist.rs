//! Wishlists, their line items, and the budget derived from them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{inventory::Component, user::User};

pub const DEFAULT_WISHLIST_NAME: &str = "My Wishlist";

/// A line in a wishlist. `subtotal` is `quantity × component.price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
  pub id:        Uuid,
  pub component: Component,
  pub quantity:  u32,
  pub subtotal:  Decimal,
  pub added_at:  DateTime<Utc>,
}

impl WishlistItem {
  pub fn new(
    id: Uuid,
    component: Component,
    quantity: u32,
    added_at: DateTime<Utc>,
  ) -> Self {
    let subtotal = component.price * Decimal::from(quantity);
    Self { id, component, quantity, subtotal, added_at }
  }
}

/// A named collection of components. `total_budget` is the sum of the item
/// subtotals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wishlist {
  pub id:           Uuid,
  pub user_id:      Uuid,
  pub user_email:   String,
  pub name:         String,
  pub items:        Vec<WishlistItem>,
  pub total_budget: Decimal,
  pub updated_at:   DateTime<Utc>,
}

impl Wishlist {
  pub fn new(
    id: Uuid,
    user_id: Uuid,
    user_email: String,
    name: String,
    items: Vec<WishlistItem>,
    updated_at: DateTime<Utc>,
  ) -> Self {
    let total_budget = items.iter().map(|i| i.subtotal).sum();
    Self { id, user_id, user_email, name, items, total_budget, updated_at }
  }

  pub fn component_ids(&self) -> Vec<Uuid> {
    self.items.iter().map(|i| i.component.id).collect()
  }
}

// ─── Budget export ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLine {
  pub component:  String,
  pub store:      String,
  pub quantity:   u32,
  pub unit_price: Decimal,
  pub subtotal:   Decimal,
}

/// A printable summary of a wishlist treated as a project budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSummary {
  pub project_name: String,
  pub user:         String,
  /// `dd/mm/YYYY` of the wishlist's last update.
  pub date:         String,
  pub total_budget: Decimal,
  pub items:        Vec<BudgetLine>,
}

impl BudgetSummary {
  pub fn new(wishlist: &Wishlist, owner: &User) -> Self {
    Self {
      project_name: wishlist.name.clone(),
      user:         owner.display_name(),
      date:         wishlist.updated_at.format("%d/%m/%Y").to_string(),
      total_budget: wishlist.total_budget,
      items:        wishlist
        .items
        .iter()
        .map(|i| BudgetLine {
          component:  i.component.name.clone(),
          store:      i.component.store_name.clone(),
          quantity:   i.quantity,
          unit_price: i.component.price,
          subtotal:   i.subtotal,
        })
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;
  use crate::{inventory::StockStatus, user::Role};

  fn component(name: &str, price: &str) -> Component {
    Component {
      id:                Uuid::new_v4(),
      store_id:          Uuid::new_v4(),
      store_name:        "Electro Maracay".into(),
      category_id:       Uuid::new_v4(),
      category_name:     "Passives".into(),
      name:              name.into(),
      mpn:               format!("MPN-{name}"),
      description:       String::new(),
      price:             price.parse().unwrap(),
      stock:             3,
      technical_specs:   Default::default(),
      is_available:      true,
      is_on_offer:       false,
      offer_price:       None,
      datasheet_url:     None,
      image_url:         None,
      created_at:        Utc::now(),
      times_in_wishlist: 1,
      stock_status:      StockStatus::LowStock,
    }
  }

  fn wishlist() -> Wishlist {
    let now = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
    Wishlist::new(
      Uuid::new_v4(),
      Uuid::new_v4(),
      "ana@example.com".into(),
      "Robot arm".into(),
      vec![
        WishlistItem::new(Uuid::new_v4(), component("A", "10"), 2, now),
        WishlistItem::new(Uuid::new_v4(), component("B", "5"), 1, now),
      ],
      now,
    )
  }

  #[test]
  fn total_is_sum_of_subtotals() {
    let w = wishlist();
    assert_eq!(w.items[0].subtotal, Decimal::from(20));
    assert_eq!(w.total_budget, Decimal::from(25));
  }

  #[test]
  fn empty_wishlist_totals_zero() {
    let w = Wishlist::new(
      Uuid::new_v4(),
      Uuid::new_v4(),
      "x@example.com".into(),
      DEFAULT_WISHLIST_NAME.into(),
      vec![],
      Utc::now(),
    );
    assert_eq!(w.total_budget, Decimal::ZERO);
  }

  #[test]
  fn budget_summary_lines() {
    let w = wishlist();
    let owner = User {
      id:         w.user_id,
      email:      w.user_email.clone(),
      username:   "ana".into(),
      first_name: String::new(),
      last_name:  String::new(),
      role:       Role::Client,
      created_at: Utc::now(),
    };

    let summary = BudgetSummary::new(&w, &owner);
    assert_eq!(summary.project_name, "Robot arm");
    assert_eq!(summary.user, "ana@example.com");
    assert_eq!(summary.date, "07/03/2024");
    assert_eq!(summary.total_budget, Decimal::from(25));
    assert_eq!(summary.items.len(), 2);
    assert_eq!(summary.items[0].store, "Electro Maracay");
    assert_eq!(summary.items[0].unit_price, Decimal::from(10));
  }
}
