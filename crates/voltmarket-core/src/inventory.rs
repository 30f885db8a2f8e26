//! Categories and components: the catalog.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Components at or below this stock level are reported as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

// ─── Category ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
  pub id:          Uuid,
  pub name:        String,
  pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
  pub name:        String,
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
  pub name:        Option<String>,
  pub description: Option<String>,
}

// ─── Stock status ────────────────────────────────────────────────────────────

/// Availability bucket derived from the stock count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
  OutOfStock,
  LowStock,
  Available,
}

impl StockStatus {
  pub fn from_stock(stock: u32) -> Self {
    match stock {
      0 => Self::OutOfStock,
      s if s <= LOW_STOCK_THRESHOLD => Self::LowStock,
      _ => Self::Available,
    }
  }
}

// ─── Component ───────────────────────────────────────────────────────────────

/// Free-form technical specification, e.g. `{"voltage": "5V"}`.
pub type TechnicalSpecs = BTreeMap<String, String>;

/// A catalog entry as read back from the backend, with its derived fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
  pub id:                Uuid,
  pub store_id:          Uuid,
  pub store_name:        String,
  pub category_id:       Uuid,
  pub category_name:     String,
  pub name:              String,
  /// Manufacturer part number; unique across the catalog.
  pub mpn:               String,
  pub description:       String,
  pub price:             Decimal,
  pub stock:             u32,
  pub technical_specs:   TechnicalSpecs,
  pub is_available:      bool,
  pub is_on_offer:       bool,
  pub offer_price:       Option<Decimal>,
  pub datasheet_url:     Option<String>,
  pub image_url:         Option<String>,
  pub created_at:        DateTime<Utc>,
  /// Number of wishlist items referencing this component.
  pub times_in_wishlist: u32,
  pub stock_status:      StockStatus,
}

impl Component {
  /// The price a buyer pays right now.
  pub fn effective_price(&self) -> Decimal {
    match (self.is_on_offer, self.offer_price) {
      (true, Some(offer)) => offer,
      _ => self.price,
    }
  }
}

/// Input to [`crate::market::MarketStore::create_component`]. The owning
/// store is supplied separately by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComponent {
  pub category_id:     Uuid,
  pub name:            String,
  pub mpn:             String,
  #[serde(default)]
  pub description:     String,
  pub price:           Decimal,
  #[serde(default)]
  pub stock:           u32,
  #[serde(default)]
  pub technical_specs: TechnicalSpecs,
  #[serde(default = "default_true")]
  pub is_available:    bool,
  #[serde(default)]
  pub is_on_offer:     bool,
  pub offer_price:     Option<Decimal>,
  pub datasheet_url:   Option<String>,
  pub image_url:       Option<String>,
}

fn default_true() -> bool { true }

impl NewComponent {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::validation("name", "This field may not be blank."));
    }
    if mpn_key(&self.mpn).is_empty() {
      return Err(Error::validation("mpn", "A part number is required."));
    }
    validate_pricing(self.price, self.is_on_offer, self.offer_price)
  }
}

/// Partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentPatch {
  pub category_id:     Option<Uuid>,
  pub name:            Option<String>,
  pub mpn:             Option<String>,
  pub description:     Option<String>,
  pub price:           Option<Decimal>,
  pub stock:           Option<u32>,
  pub technical_specs: Option<TechnicalSpecs>,
  pub is_available:    Option<bool>,
  pub is_on_offer:     Option<bool>,
  pub offer_price:     Option<Decimal>,
  pub datasheet_url:   Option<String>,
  pub image_url:       Option<String>,
}

impl ComponentPatch {
  /// Check the patch against the component it will be applied to, so that
  /// cross-field rules see the merged result.
  pub fn validate_against(&self, current: &Component) -> Result<()> {
    if let Some(name) = &self.name
      && name.trim().is_empty()
    {
      return Err(Error::validation("name", "This field may not be blank."));
    }
    if let Some(mpn) = &self.mpn
      && mpn_key(mpn).is_empty()
    {
      return Err(Error::validation("mpn", "A part number is required."));
    }
    validate_pricing(
      self.price.unwrap_or(current.price),
      self.is_on_offer.unwrap_or(current.is_on_offer),
      self.offer_price.or(current.offer_price),
    )
  }
}

/// Prices must be non-negative, and an active offer must undercut the list
/// price.
pub fn validate_pricing(
  price: Decimal,
  is_on_offer: bool,
  offer_price: Option<Decimal>,
) -> Result<()> {
  if price.is_sign_negative() {
    return Err(Error::validation("price", "Price must not be negative."));
  }
  if let Some(offer) = offer_price {
    if offer.is_sign_negative() {
      return Err(Error::validation("offer_price", "Offer price must not be negative."));
    }
    if is_on_offer && offer >= price {
      return Err(Error::validation(
        "offer_price",
        "Offer price must be lower than the list price.",
      ));
    }
  }
  Ok(())
}

/// Cross-store equality key for a part number: lower-cased, alphanumerics
/// only, so `LM7805-CT` and `lm7805ct` compare equal.
pub fn mpn_key(mpn: &str) -> String {
  mpn
    .chars()
    .filter(char::is_ascii_alphanumeric)
    .map(|c| c.to_ascii_lowercase())
    .collect()
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Catalog listing filters. Every field is optional; an empty query matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct ComponentQuery {
  /// Case-insensitive substring over name, MPN, description and spec values.
  pub text:         Option<String>,
  pub category_id:  Option<Uuid>,
  pub store_id:     Option<Uuid>,
  pub is_available: Option<bool>,
  pub min_price:    Option<Decimal>,
  pub max_price:    Option<Decimal>,
  /// Case-insensitive substring on the MPN.
  pub mpn:          Option<String>,
  /// Per-key case-insensitive substring filters on `technical_specs`.
  pub specs:        BTreeMap<String, String>,
}

impl ComponentQuery {
  pub fn matches(&self, c: &Component) -> bool {
    if self.category_id.is_some_and(|id| id != c.category_id)
      || self.store_id.is_some_and(|id| id != c.store_id)
      || self.is_available.is_some_and(|a| a != c.is_available)
      || self.min_price.is_some_and(|min| c.price < min)
      || self.max_price.is_some_and(|max| c.price > max)
    {
      return false;
    }

    if let Some(mpn) = &self.mpn
      && !contains_ci(&c.mpn, mpn)
    {
      return false;
    }

    let specs_match = self.specs.iter().all(|(key, wanted)| {
      c.technical_specs
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .is_some_and(|(_, v)| contains_ci(v, wanted))
    });
    if !specs_match {
      return false;
    }

    match &self.text {
      Some(text) => {
        contains_ci(&c.name, text)
          || contains_ci(&c.mpn, text)
          || contains_ci(&c.description, text)
          || c.technical_specs.values().any(|v| contains_ci(v, text))
      }
      None => true,
    }
  }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dec(s: &str) -> Decimal { s.parse().unwrap() }

  fn component() -> Component {
    Component {
      id:                Uuid::new_v4(),
      store_id:          Uuid::new_v4(),
      store_name:        "Shop".into(),
      category_id:       Uuid::new_v4(),
      category_name:     "Regulators".into(),
      name:              "Voltage regulator".into(),
      mpn:               "LM7805-CT".into(),
      description:       "Linear regulator, TO-220".into(),
      price:             dec("1.50"),
      stock:             10,
      technical_specs:   [("Voltage".to_string(), "5V".to_string())].into(),
      is_available:      true,
      is_on_offer:       false,
      offer_price:       None,
      datasheet_url:     None,
      image_url:         None,
      created_at:        Utc::now(),
      times_in_wishlist: 0,
      stock_status:      StockStatus::Available,
    }
  }

  #[test]
  fn stock_status_buckets() {
    assert_eq!(StockStatus::from_stock(0), StockStatus::OutOfStock);
    assert_eq!(StockStatus::from_stock(5), StockStatus::LowStock);
    assert_eq!(StockStatus::from_stock(6), StockStatus::Available);
  }

  #[test]
  fn offer_price_must_undercut_list_price() {
    let err = validate_pricing(dec("10"), true, Some(dec("10"))).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "offer_price", .. }));
    assert!(validate_pricing(dec("10"), true, Some(dec("9.99"))).is_ok());
  }

  #[test]
  fn inactive_offer_is_not_checked_against_price() {
    assert!(validate_pricing(dec("10"), false, Some(dec("12"))).is_ok());
  }

  #[test]
  fn patch_is_validated_against_merged_state() {
    let mut current = component();
    current.offer_price = Some(dec("1.20"));

    let patch = ComponentPatch { is_on_offer: Some(true), price: Some(dec("1.00")), ..Default::default() };
    assert!(matches!(
      patch.validate_against(&current),
      Err(Error::Validation { field: "offer_price", .. })
    ));

    let patch = ComponentPatch { is_on_offer: Some(true), ..Default::default() };
    assert!(patch.validate_against(&current).is_ok());
  }

  #[test]
  fn mpn_key_ignores_case_and_separators() {
    assert_eq!(mpn_key("LM7805-CT"), "lm7805ct");
    assert_eq!(mpn_key(" lm 7805ct "), "lm7805ct");
  }

  #[test]
  fn effective_price_uses_active_offer() {
    let mut c = component();
    c.offer_price = Some(dec("1.00"));
    assert_eq!(c.effective_price(), dec("1.50"));
    c.is_on_offer = true;
    assert_eq!(c.effective_price(), dec("1.00"));
  }

  #[test]
  fn query_filters() {
    let c = component();
    assert!(ComponentQuery::default().matches(&c));
    assert!(ComponentQuery { text: Some("to-220".into()), ..Default::default() }.matches(&c));
    assert!(ComponentQuery { text: Some("5v".into()), ..Default::default() }.matches(&c));
    assert!(!ComponentQuery { min_price: Some(dec("2")), ..Default::default() }.matches(&c));
    assert!(ComponentQuery { max_price: Some(dec("1.50")), ..Default::default() }.matches(&c));

    let specs = ComponentQuery {
      specs: [("voltage".to_string(), "5".to_string())].into(),
      ..Default::default()
    };
    assert!(specs.matches(&c));

    let missing = ComponentQuery {
      specs: [("package".to_string(), "DIP".to_string())].into(),
      ..Default::default()
    };
    assert!(!missing.matches(&c));
  }
}
