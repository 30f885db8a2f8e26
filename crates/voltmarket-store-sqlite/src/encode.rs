//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings in UTC. UUIDs are stored as
//! hyphenated lowercase strings. Money is stored as decimal strings so no
//! precision is lost to floating point. Technical specs are compact JSON.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use voltmarket_core::{
  inventory::{Category, Component, StockStatus, TechnicalSpecs},
  notification::StockNotification,
  review::Review,
  store::Store,
  user::{Credentials, Role, User},
  wishlist::{Wishlist, WishlistItem},
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

/// Fixed-width so that lexicographic order is chronological order.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_decimal(d: Decimal) -> String { d.to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

pub fn encode_role(r: Role) -> &'static str { r.as_str() }

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "admin" => Ok(Role::Admin),
    "provider" => Ok(Role::Provider),
    "client" => Ok(Role::Client),
    other => Err(Error::InvalidValue(format!("unknown role: {other:?}"))),
  }
}

pub fn encode_specs(specs: &TechnicalSpecs) -> Result<String> {
  Ok(serde_json::to_string(specs)?)
}

pub fn decode_specs(s: &str) -> Result<TechnicalSpecs> {
  Ok(serde_json::from_str(s)?)
}

// ─── Select lists ────────────────────────────────────────────────────────────
//
// Each `*_COLUMNS` constant matches the positional reads of the corresponding
// `Raw*::from_row`.

pub const USER_SELECT: &str = "
  SELECT user_id, email, username, first_name, last_name, role, created_at,
         password_hash
  FROM users";

pub const STORE_SELECT: &str = "
  SELECT s.store_id, s.owner_id, u.email, s.name, s.description, s.address,
         s.latitude, s.longitude, s.image_url, s.rating, s.review_count,
         s.created_at
  FROM stores s
  JOIN users u ON u.user_id = s.owner_id";

pub const CATEGORY_SELECT: &str =
  "SELECT category_id, name, description FROM categories";

/// Seventeen columns plus the wishlist popularity count.
pub const COMPONENT_COLUMNS: &str = "
  c.component_id, c.store_id, s.name, c.category_id, cat.name, c.name, c.mpn,
  c.description, c.price, c.stock, c.technical_specs, c.is_available,
  c.is_on_offer, c.offer_price, c.datasheet_url, c.image_url, c.created_at,
  (SELECT COUNT(*) FROM wishlist_items wi2
     WHERE wi2.component_id = c.component_id)";

pub const COMPONENT_JOINS: &str = "
  JOIN stores s       ON s.store_id      = c.store_id
  JOIN categories cat ON cat.category_id = c.category_id";

pub const REVIEW_SELECT: &str = "
  SELECT r.review_id, r.user_id, u.email, r.store_id, r.rating, r.comment,
         r.created_at
  FROM reviews r
  JOIN users u ON u.user_id = r.user_id";

pub const NOTIFICATION_SELECT: &str = "
  SELECT notification_id, user_id, component_id, is_active, created_at
  FROM stock_notifications";

pub fn component_select() -> String {
  format!("SELECT {COMPONENT_COLUMNS} FROM components c {COMPONENT_JOINS}")
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub username:      String,
  pub first_name:    String,
  pub last_name:     String,
  pub role:          String,
  pub created_at:    String,
  pub password_hash: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      email:         row.get(1)?,
      username:      row.get(2)?,
      first_name:    row.get(3)?,
      last_name:     row.get(4)?,
      role:          row.get(5)?,
      created_at:    row.get(6)?,
      password_hash: row.get(7)?,
    })
  }

  pub fn into_credentials(self) -> Result<Credentials> {
    let user = User {
      id:         decode_uuid(&self.user_id)?,
      email:      self.email,
      username:   self.username,
      first_name: self.first_name,
      last_name:  self.last_name,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
    };
    Ok(Credentials { user, password_hash: self.password_hash })
  }

  pub fn into_user(self) -> Result<User> { Ok(self.into_credentials()?.user) }
}

pub struct RawStore {
  pub store_id:     String,
  pub owner_id:     String,
  pub owner_email:  String,
  pub name:         String,
  pub description:  String,
  pub address:      String,
  pub latitude:     Option<f64>,
  pub longitude:    Option<f64>,
  pub image_url:    Option<String>,
  pub rating:       f64,
  pub review_count: u32,
  pub created_at:   String,
}

impl RawStore {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      store_id:     row.get(0)?,
      owner_id:     row.get(1)?,
      owner_email:  row.get(2)?,
      name:         row.get(3)?,
      description:  row.get(4)?,
      address:      row.get(5)?,
      latitude:     row.get(6)?,
      longitude:    row.get(7)?,
      image_url:    row.get(8)?,
      rating:       row.get(9)?,
      review_count: row.get(10)?,
      created_at:   row.get(11)?,
    })
  }

  pub fn into_store(self) -> Result<Store> {
    Ok(Store {
      id:           decode_uuid(&self.store_id)?,
      owner_id:     decode_uuid(&self.owner_id)?,
      owner_email:  self.owner_email,
      name:         self.name,
      description:  self.description,
      address:      self.address,
      latitude:     self.latitude,
      longitude:    self.longitude,
      image_url:    self.image_url,
      rating:       self.rating,
      review_count: self.review_count,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCategory {
  pub category_id: String,
  pub name:        String,
  pub description: String,
}

impl RawCategory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      category_id: row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
    })
  }

  pub fn into_category(self) -> Result<Category> {
    Ok(Category {
      id:          decode_uuid(&self.category_id)?,
      name:        self.name,
      description: self.description,
    })
  }
}

pub struct RawComponent {
  pub component_id:      String,
  pub store_id:          String,
  pub store_name:        String,
  pub category_id:       String,
  pub category_name:     String,
  pub name:              String,
  pub mpn:               String,
  pub description:       String,
  pub price:             String,
  pub stock:             u32,
  pub technical_specs:   String,
  pub is_available:      bool,
  pub is_on_offer:       bool,
  pub offer_price:       Option<String>,
  pub datasheet_url:     Option<String>,
  pub image_url:         Option<String>,
  pub created_at:        String,
  pub times_in_wishlist: u32,
}

impl RawComponent {
  /// Read [`COMPONENT_COLUMNS`] starting at column `at`.
  pub fn from_row_at(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      component_id:      row.get(at)?,
      store_id:          row.get(at + 1)?,
      store_name:        row.get(at + 2)?,
      category_id:       row.get(at + 3)?,
      category_name:     row.get(at + 4)?,
      name:              row.get(at + 5)?,
      mpn:               row.get(at + 6)?,
      description:       row.get(at + 7)?,
      price:             row.get(at + 8)?,
      stock:             row.get(at + 9)?,
      technical_specs:   row.get(at + 10)?,
      is_available:      row.get(at + 11)?,
      is_on_offer:       row.get(at + 12)?,
      offer_price:       row.get(at + 13)?,
      datasheet_url:     row.get(at + 14)?,
      image_url:         row.get(at + 15)?,
      created_at:        row.get(at + 16)?,
      times_in_wishlist: row.get(at + 17)?,
    })
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Self::from_row_at(row, 0)
  }

  pub fn into_component(self) -> Result<Component> {
    Ok(Component {
      id:                decode_uuid(&self.component_id)?,
      store_id:          decode_uuid(&self.store_id)?,
      store_name:        self.store_name,
      category_id:       decode_uuid(&self.category_id)?,
      category_name:     self.category_name,
      name:              self.name,
      mpn:               self.mpn,
      description:       self.description,
      price:             decode_decimal(&self.price)?,
      stock:             self.stock,
      technical_specs:   decode_specs(&self.technical_specs)?,
      is_available:      self.is_available,
      is_on_offer:       self.is_on_offer,
      offer_price:       self.offer_price.as_deref().map(decode_decimal).transpose()?,
      datasheet_url:     self.datasheet_url,
      image_url:         self.image_url,
      created_at:        decode_dt(&self.created_at)?,
      times_in_wishlist: self.times_in_wishlist,
      stock_status:      StockStatus::from_stock(self.stock),
    })
  }
}

pub struct RawReview {
  pub review_id:  String,
  pub user_id:    String,
  pub user_email: String,
  pub store_id:   String,
  pub rating:     u8,
  pub comment:    String,
  pub created_at: String,
}

impl RawReview {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      review_id:  row.get(0)?,
      user_id:    row.get(1)?,
      user_email: row.get(2)?,
      store_id:   row.get(3)?,
      rating:     row.get(4)?,
      comment:    row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      id:         decode_uuid(&self.review_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      user_email: self.user_email,
      store_id:   decode_uuid(&self.store_id)?,
      rating:     self.rating,
      comment:    self.comment,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawNotification {
  pub notification_id: String,
  pub user_id:         String,
  pub component_id:    String,
  pub is_active:       bool,
  pub created_at:      String,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      user_id:         row.get(1)?,
      component_id:    row.get(2)?,
      is_active:       row.get(3)?,
      created_at:      row.get(4)?,
    })
  }

  pub fn into_notification(self) -> Result<StockNotification> {
    Ok(StockNotification {
      id:           decode_uuid(&self.notification_id)?,
      user_id:      decode_uuid(&self.user_id)?,
      component_id: decode_uuid(&self.component_id)?,
      is_active:    self.is_active,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawWishlistItem {
  pub item_id:   String,
  pub quantity:  u32,
  pub added_at:  String,
  pub component: RawComponent,
}

/// A wishlist header row plus its item rows.
pub struct RawWishlist {
  pub wishlist_id: String,
  pub user_id:     String,
  pub user_email:  String,
  pub name:        String,
  pub updated_at:  String,
  pub items:       Vec<RawWishlistItem>,
}

impl RawWishlist {
  pub fn into_wishlist(self) -> Result<Wishlist> {
    let items = self
      .items
      .into_iter()
      .map(|raw| {
        Ok(WishlistItem::new(
          decode_uuid(&raw.item_id)?,
          raw.component.into_component()?,
          raw.quantity,
          decode_dt(&raw.added_at)?,
        ))
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(Wishlist::new(
      decode_uuid(&self.wishlist_id)?,
      decode_uuid(&self.user_id)?,
      self.user_email,
      self.name,
      items,
      decode_dt(&self.updated_at)?,
    ))
  }
}
