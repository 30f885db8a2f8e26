//! [`SqliteStore`]: the SQLite implementation of [`MarketStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};
use rust_decimal::Decimal;
use uuid::Uuid;
use voltmarket_core::{
  Error as CoreError,
  analytics::{
    Analytics, InventorySummary, PlatformStats, SearchCount, StockDemand,
    TOP_LIMIT,
  },
  inventory::{
    Category, CategoryPatch, Component, ComponentPatch, ComponentQuery,
    LOW_STOCK_THRESHOLD, NewCategory, NewComponent, mpn_key,
  },
  market::MarketStore,
  notification::{ComponentUpdate, StockNotification, Subscription},
  review::{self, NewReview, Review, ReviewPatch},
  search::{POPULAR_LIMIT, RECENT_LIMIT, SearchRecord, Suggestions},
  store::{NewStore, RecentStore, Store, StorePatch},
  user::{Credentials, NewUser, User, UserPatch},
  wishlist::Wishlist,
};

use crate::{
  Error, Result,
  encode::{
    CATEGORY_SELECT, NOTIFICATION_SELECT, RawCategory, RawComponent,
    RawNotification, RawReview, RawStore, RawUser, RawWishlist,
    RawWishlistItem, REVIEW_SELECT, STORE_SELECT, USER_SELECT,
    COMPONENT_COLUMNS, COMPONENT_JOINS, component_select, decode_decimal,
    decode_dt, decode_uuid, encode_decimal, encode_dt, encode_role,
    encode_specs, encode_uuid,
  },
  error::{escape, on_unique_violation, reject},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A voltmarket backend over a single SQLite file.
///
/// Cloning is cheap; the inner connection handle is reference-counted and
/// every call is serialised through the one connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Connection helpers ──────────────────────────────────────────────────────
//
// These run on the connection thread, inside `call` closures, and take a
// plain `&Connection` so they work the same on a `Transaction`.

fn exists(
  conn: &rusqlite::Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<bool> {
  Ok(conn.query_row(sql, params, |_| Ok(())).optional()?.is_some())
}

fn query_all<T>(
  conn: &rusqlite::Connection,
  sql: &str,
  params: impl rusqlite::Params,
  f: impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt.query_map(params, f)?.collect();
  rows
}

fn load_user(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      &format!("{USER_SELECT} WHERE user_id = ?1"),
      params![id],
      RawUser::from_row,
    )
    .optional()
}

fn load_store(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawStore>> {
  conn
    .query_row(
      &format!("{STORE_SELECT} WHERE s.store_id = ?1"),
      params![id],
      RawStore::from_row,
    )
    .optional()
}

fn load_category(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawCategory>> {
  conn
    .query_row(
      &format!("{CATEGORY_SELECT} WHERE category_id = ?1"),
      params![id],
      RawCategory::from_row,
    )
    .optional()
}

fn load_component(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawComponent>> {
  conn
    .query_row(
      &format!("{} WHERE c.component_id = ?1", component_select()),
      params![id],
      RawComponent::from_row,
    )
    .optional()
}

fn load_review(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawReview>> {
  conn
    .query_row(
      &format!("{REVIEW_SELECT} WHERE r.review_id = ?1"),
      params![id],
      RawReview::from_row,
    )
    .optional()
}

fn load_notification(
  conn: &rusqlite::Connection,
  user_id: &str,
  component_id: &str,
) -> rusqlite::Result<Option<RawNotification>> {
  conn
    .query_row(
      &format!("{NOTIFICATION_SELECT} WHERE user_id = ?1 AND component_id = ?2"),
      params![user_id, component_id],
      RawNotification::from_row,
    )
    .optional()
}

fn load_wishlist(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawWishlist>> {
  let header = conn
    .query_row(
      "SELECT w.wishlist_id, w.user_id, u.email, w.name, w.updated_at
       FROM wishlists w
       JOIN users u ON u.user_id = w.user_id
       WHERE w.wishlist_id = ?1",
      params![id],
      |row| {
        Ok(RawWishlist {
          wishlist_id: row.get(0)?,
          user_id:     row.get(1)?,
          user_email:  row.get(2)?,
          name:        row.get(3)?,
          updated_at:  row.get(4)?,
          items:       Vec::new(),
        })
      },
    )
    .optional()?;

  let Some(mut wishlist) = header else {
    return Ok(None);
  };

  wishlist.items = query_all(
    conn,
    &format!(
      "SELECT wi.item_id, wi.quantity, wi.added_at, {COMPONENT_COLUMNS}
       FROM wishlist_items wi
       JOIN components c ON c.component_id = wi.component_id
       {COMPONENT_JOINS}
       WHERE wi.wishlist_id = ?1
       ORDER BY wi.added_at, wi.rowid"
    ),
    params![id],
    |row| {
      Ok(RawWishlistItem {
        item_id:   row.get(0)?,
        quantity:  row.get(1)?,
        added_at:  row.get(2)?,
        component: RawComponent::from_row_at(row, 3)?,
      })
    },
  )?;

  Ok(Some(wishlist))
}

fn touch_wishlist(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE wishlists SET updated_at = ?2 WHERE wishlist_id = ?1",
    params![id, encode_dt(Utc::now())],
  )?;
  Ok(())
}

fn require_wishlist(conn: &rusqlite::Connection, id: Uuid) -> tokio_rusqlite::Result<()> {
  if !exists(
    conn,
    "SELECT 1 FROM wishlists WHERE wishlist_id = ?1",
    params![encode_uuid(id)],
  )? {
    return Err(reject(CoreError::WishlistNotFound(id)));
  }
  Ok(())
}

fn reload_wishlist(conn: &rusqlite::Connection, id: Uuid) -> tokio_rusqlite::Result<RawWishlist> {
  load_wishlist(conn, &encode_uuid(id))?
    .ok_or_else(|| reject(CoreError::WishlistNotFound(id)))
}

fn insert_store(conn: &rusqlite::Connection, store: &Store) -> tokio_rusqlite::Result<()> {
  conn
    .execute(
      "INSERT INTO stores (
         store_id, owner_id, name, description, address,
         latitude, longitude, image_url, rating, review_count, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
      params![
        encode_uuid(store.id),
        encode_uuid(store.owner_id),
        store.name,
        store.description,
        store.address,
        store.latitude,
        store.longitude,
        store.image_url,
        store.rating,
        store.review_count,
        encode_dt(store.created_at),
      ],
    )
    .map_err(|e| on_unique_violation(e, || CoreError::StoreAlreadyExists(store.owner_id)))?;
  Ok(())
}

/// Rewrite a store's cached rating and review count from its review rows.
fn refresh_store_rating(conn: &rusqlite::Connection, store_id: &str) -> rusqlite::Result<()> {
  let ratings: Vec<u8> = query_all(
    conn,
    "SELECT rating FROM reviews WHERE store_id = ?1",
    params![store_id],
    |row| row.get(0),
  )?;
  let summary = review::aggregate(&ratings);
  conn.execute(
    "UPDATE stores SET rating = ?2, review_count = ?3 WHERE store_id = ?1",
    params![store_id, summary.rating, summary.review_count],
  )?;
  Ok(())
}

fn count(conn: &rusqlite::Connection, sql: &str, params: impl rusqlite::Params) -> rusqlite::Result<u64> {
  let n: i64 = conn.query_row(sql, params, |row| row.get(0))?;
  Ok(n as u64)
}

// ─── MarketStore impl ────────────────────────────────────────────────────────

impl MarketStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<(User, Option<Store>)> {
    let now = Utc::now();
    let user = User {
      id:         Uuid::new_v4(),
      email:      input.email,
      username:   input.username,
      first_name: input.first_name,
      last_name:  input.last_name,
      role:       input.role,
      created_at: now,
    };
    let store = input.store.map(|profile| Store {
      id:           Uuid::new_v4(),
      owner_id:     user.id,
      owner_email:  user.email.clone(),
      name:         profile.name,
      description:  String::new(),
      address:      profile.address,
      latitude:     None,
      longitude:    None,
      image_url:    None,
      rating:       0.0,
      review_count: 0,
      created_at:   now,
    });

    let (u, s, password_hash) = (user.clone(), store.clone(), input.password_hash);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if exists(&tx, "SELECT 1 FROM users WHERE email = ?1", params![u.email])? {
          return Err(reject(CoreError::EmailTaken(u.email)));
        }

        tx.execute(
          "INSERT INTO users (
             user_id, email, username, first_name, last_name, role,
             password_hash, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          params![
            encode_uuid(u.id),
            u.email,
            u.username,
            u.first_name,
            u.last_name,
            encode_role(u.role),
            password_hash,
            encode_dt(u.created_at),
          ],
        )
        .map_err(|e| on_unique_violation(e, || CoreError::EmailTaken(u.email.clone())))?;

        if let Some(store) = &s {
          insert_store(&tx, store)?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok((user, store))
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let raw = self.conn.call(move |conn| Ok(load_user(conn, &id_str)?)).await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn get_credentials_by_email(&self, email: String) -> Result<Option<Credentials>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{USER_SELECT} WHERE email = ?1"),
              params![email],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_credentials).transpose()
  }

  async fn get_credentials(&self, id: Uuid) -> Result<Option<Credentials>> {
    let id_str = encode_uuid(id);
    let raw = self.conn.call(move |conn| Ok(load_user(conn, &id_str)?)).await?;
    raw.map(RawUser::into_credentials).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws = self
      .conn
      .call(|conn| {
        Ok(query_all(
          conn,
          &format!("{USER_SELECT} ORDER BY created_at, rowid"),
          [],
          RawUser::from_row,
        )?)
      })
      .await?;
    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User> {
    let id_str = encode_uuid(id);
    let role = patch.role.map(encode_role);

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users SET
             username   = COALESCE(?2, username),
             first_name = COALESCE(?3, first_name),
             last_name  = COALESCE(?4, last_name),
             role       = COALESCE(?5, role)
           WHERE user_id = ?1",
          params![id_str, patch.username, patch.first_name, patch.last_name, role],
        )?;
        if changed == 0 {
          return Err(reject(CoreError::UserNotFound(id)));
        }
        load_user(conn, &id_str)?.ok_or_else(|| reject(CoreError::UserNotFound(id)))
      })
      .await?;

    raw.into_user()
  }

  async fn set_password_hash(&self, id: Uuid, password_hash: String) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users SET password_hash = ?2 WHERE user_id = ?1",
          params![id_str, password_hash],
        )?;
        if changed == 0 {
          return Err(reject(CoreError::UserNotFound(id)));
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_user(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // The cascade removes this user's reviews; the stores they rated
        // need their cache rebuilt afterwards.
        let reviewed: Vec<String> = query_all(
          &tx,
          "SELECT DISTINCT store_id FROM reviews WHERE user_id = ?1",
          params![id_str],
          |row| row.get(0),
        )?;

        let changed = tx.execute("DELETE FROM users WHERE user_id = ?1", params![id_str])?;
        if changed == 0 {
          return Err(reject(CoreError::UserNotFound(id)));
        }

        for store_id in &reviewed {
          refresh_store_rating(&tx, store_id)?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Stores ────────────────────────────────────────────────────────────────

  async fn create_store(&self, owner_id: Uuid, input: NewStore) -> Result<Store> {
    let store = Store {
      id:           Uuid::new_v4(),
      owner_id,
      owner_email:  String::new(),
      name:         input.name,
      description:  input.description,
      address:      input.address,
      latitude:     input.latitude,
      longitude:    input.longitude,
      image_url:    input.image_url,
      rating:       0.0,
      review_count: 0,
      created_at:   Utc::now(),
    };

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let owner_str = encode_uuid(owner_id);

        if load_user(&tx, &owner_str)?.is_none() {
          return Err(reject(CoreError::UserNotFound(owner_id)));
        }
        if exists(&tx, "SELECT 1 FROM stores WHERE owner_id = ?1", params![owner_str])? {
          return Err(reject(CoreError::StoreAlreadyExists(owner_id)));
        }

        insert_store(&tx, &store)?;
        let raw = load_store(&tx, &encode_uuid(store.id))?
          .ok_or_else(|| reject(CoreError::StoreNotFound(store.id)))?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_store()
  }

  async fn get_store(&self, id: Uuid) -> Result<Option<Store>> {
    let id_str = encode_uuid(id);
    let raw = self.conn.call(move |conn| Ok(load_store(conn, &id_str)?)).await?;
    raw.map(RawStore::into_store).transpose()
  }

  async fn get_store_by_owner(&self, owner_id: Uuid) -> Result<Option<Store>> {
    let owner_str = encode_uuid(owner_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{STORE_SELECT} WHERE s.owner_id = ?1"),
              params![owner_str],
              RawStore::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawStore::into_store).transpose()
  }

  async fn list_stores(&self) -> Result<Vec<Store>> {
    let raws = self
      .conn
      .call(|conn| {
        Ok(query_all(
          conn,
          &format!("{STORE_SELECT} ORDER BY s.created_at, s.rowid"),
          [],
          RawStore::from_row,
        )?)
      })
      .await?;
    raws.into_iter().map(RawStore::into_store).collect()
  }

  async fn update_store(&self, id: Uuid, patch: StorePatch) -> Result<Store> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE stores SET
             name        = COALESCE(?2, name),
             description = COALESCE(?3, description),
             address     = COALESCE(?4, address),
             latitude    = COALESCE(?5, latitude),
             longitude   = COALESCE(?6, longitude),
             image_url   = COALESCE(?7, image_url)
           WHERE store_id = ?1",
          params![
            id_str,
            patch.name,
            patch.description,
            patch.address,
            patch.latitude,
            patch.longitude,
            patch.image_url,
          ],
        )?;
        if changed == 0 {
          return Err(reject(CoreError::StoreNotFound(id)));
        }
        load_store(conn, &id_str)?.ok_or_else(|| reject(CoreError::StoreNotFound(id)))
      })
      .await?;
    raw.into_store()
  }

  async fn delete_store(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let changed = conn.execute("DELETE FROM stores WHERE store_id = ?1", params![id_str])?;
        if changed == 0 {
          return Err(reject(CoreError::StoreNotFound(id)));
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Categories ────────────────────────────────────────────────────────────

  async fn create_category(&self, input: NewCategory) -> Result<Category> {
    let category = Category {
      id:          Uuid::new_v4(),
      name:        input.name.trim().to_owned(),
      description: input.description,
    };
    let c = category.clone();

    self
      .conn
      .call(move |conn| {
        if exists(conn, "SELECT 1 FROM categories WHERE name = ?1", params![c.name])? {
          return Err(reject(CoreError::DuplicateCategory(c.name)));
        }
        conn
          .execute(
            "INSERT INTO categories (category_id, name, description) VALUES (?1, ?2, ?3)",
            params![encode_uuid(c.id), c.name, c.description],
          )
          .map_err(|e| on_unique_violation(e, || CoreError::DuplicateCategory(c.name.clone())))?;
        Ok(())
      })
      .await?;

    Ok(category)
  }

  async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    let id_str = encode_uuid(id);
    let raw = self.conn.call(move |conn| Ok(load_category(conn, &id_str)?)).await?;
    raw.map(RawCategory::into_category).transpose()
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let raws = self
      .conn
      .call(|conn| {
        Ok(query_all(
          conn,
          &format!("{CATEGORY_SELECT} ORDER BY name"),
          [],
          RawCategory::from_row,
        )?)
      })
      .await?;
    raws.into_iter().map(RawCategory::into_category).collect()
  }

  async fn update_category(&self, id: Uuid, patch: CategoryPatch) -> Result<Category> {
    let id_str = encode_uuid(id);
    let name = patch.name.map(|n| n.trim().to_owned());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if let Some(name) = &name
          && exists(
            &tx,
            "SELECT 1 FROM categories WHERE name = ?1 AND category_id <> ?2",
            params![name, id_str],
          )?
        {
          return Err(reject(CoreError::DuplicateCategory(name.clone())));
        }

        let changed = tx.execute(
          "UPDATE categories SET
             name        = COALESCE(?2, name),
             description = COALESCE(?3, description)
           WHERE category_id = ?1",
          params![id_str, name, patch.description],
        )?;
        if changed == 0 {
          return Err(reject(CoreError::CategoryNotFound(id)));
        }

        let raw = load_category(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::CategoryNotFound(id)))?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_category()
  }

  async fn delete_category(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if load_category(&tx, &id_str)?.is_none() {
          return Err(reject(CoreError::CategoryNotFound(id)));
        }
        if exists(&tx, "SELECT 1 FROM components WHERE category_id = ?1", params![id_str])? {
          return Err(reject(CoreError::CategoryInUse(id)));
        }
        tx.execute("DELETE FROM categories WHERE category_id = ?1", params![id_str])?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Components ────────────────────────────────────────────────────────────

  async fn create_component(&self, store_id: Uuid, input: NewComponent) -> Result<Component> {
    input.validate()?;

    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let store_str = encode_uuid(store_id);
    let category_id = input.category_id;
    let category_str = encode_uuid(category_id);
    let mpn = input.mpn.trim().to_owned();
    let key = mpn_key(&mpn);
    let price = encode_decimal(input.price);
    let offer_price = input.offer_price.map(encode_decimal);
    let specs = encode_specs(&input.technical_specs)?;
    let created_at = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !exists(&tx, "SELECT 1 FROM stores WHERE store_id = ?1", params![store_str])? {
          return Err(reject(CoreError::StoreNotFound(store_id)));
        }
        if load_category(&tx, &category_str)?.is_none() {
          return Err(reject(CoreError::CategoryNotFound(category_id)));
        }
        if exists(&tx, "SELECT 1 FROM components WHERE mpn = ?1", params![mpn])? {
          return Err(reject(CoreError::DuplicateMpn(mpn)));
        }

        tx.execute(
          "INSERT INTO components (
             component_id, store_id, category_id, name, mpn, mpn_key,
             description, price, stock, technical_specs, is_available,
             is_on_offer, offer_price, datasheet_url, image_url, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
          params![
            id_str,
            store_str,
            category_str,
            input.name,
            mpn,
            key,
            input.description,
            price,
            input.stock,
            specs,
            input.is_available,
            input.is_on_offer,
            offer_price,
            input.datasheet_url,
            input.image_url,
            created_at,
          ],
        )
        .map_err(|e| on_unique_violation(e, || CoreError::DuplicateMpn(mpn.clone())))?;

        let raw = load_component(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::ComponentNotFound(id)))?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_component()
  }

  async fn get_component(&self, id: Uuid) -> Result<Option<Component>> {
    let id_str = encode_uuid(id);
    let raw = self.conn.call(move |conn| Ok(load_component(conn, &id_str)?)).await?;
    raw.map(RawComponent::into_component).transpose()
  }

  async fn list_components<'a>(&'a self, query: &'a ComponentQuery) -> Result<Vec<Component>> {
    // Exact-match filters narrow the scan in SQL; text, price and spec
    // filters need decoded values and run in `ComponentQuery::matches`.
    let category = query.category_id.map(encode_uuid);
    let store = query.store_id.map(encode_uuid);
    let available = query.is_available;

    let raws = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "{} WHERE (?1 IS NULL OR c.category_id = ?1)
                 AND (?2 IS NULL OR c.store_id = ?2)
                 AND (?3 IS NULL OR c.is_available = ?3)
               ORDER BY c.created_at DESC, c.rowid DESC",
            component_select()
          ),
          params![category, store, available],
          RawComponent::from_row,
        )?)
      })
      .await?;

    let mut components = Vec::with_capacity(raws.len());
    for raw in raws {
      let component = raw.into_component()?;
      if query.matches(&component) {
        components.push(component);
      }
    }
    Ok(components)
  }

  async fn update_component(&self, id: Uuid, patch: ComponentPatch) -> Result<ComponentUpdate> {
    let id_str = encode_uuid(id);
    let category_id = patch.category_id;
    let category_str = category_id.map(encode_uuid);
    let mpn = patch.mpn.as_deref().map(str::trim).map(str::to_owned);
    let key = mpn.as_deref().map(mpn_key);
    let price = patch.price.map(encode_decimal);
    let offer_price = patch.offer_price.map(encode_decimal);
    let specs = patch.technical_specs.as_ref().map(encode_specs).transpose()?;

    let (raw, recipients) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current = load_component(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::ComponentNotFound(id)))?
          .into_component()
          .map_err(escape)?;
        patch.validate_against(&current).map_err(reject)?;

        if let (Some(category_id), Some(category_str)) = (category_id, &category_str)
          && load_category(&tx, category_str)?.is_none()
        {
          return Err(reject(CoreError::CategoryNotFound(category_id)));
        }
        if let Some(mpn) = &mpn
          && exists(
            &tx,
            "SELECT 1 FROM components WHERE mpn = ?1 AND component_id <> ?2",
            params![mpn, id_str],
          )?
        {
          return Err(reject(CoreError::DuplicateMpn(mpn.clone())));
        }

        tx.execute(
          "UPDATE components SET
             category_id     = COALESCE(?2, category_id),
             name            = COALESCE(?3, name),
             mpn             = COALESCE(?4, mpn),
             mpn_key         = COALESCE(?5, mpn_key),
             description     = COALESCE(?6, description),
             price           = COALESCE(?7, price),
             stock           = COALESCE(?8, stock),
             technical_specs = COALESCE(?9, technical_specs),
             is_available    = COALESCE(?10, is_available),
             is_on_offer     = COALESCE(?11, is_on_offer),
             offer_price     = COALESCE(?12, offer_price),
             datasheet_url   = COALESCE(?13, datasheet_url),
             image_url       = COALESCE(?14, image_url)
           WHERE component_id = ?1",
          params![
            id_str,
            category_str,
            patch.name,
            mpn,
            key,
            patch.description,
            price,
            patch.stock,
            specs,
            patch.is_available,
            patch.is_on_offer,
            offer_price,
            patch.datasheet_url,
            patch.image_url,
          ],
        )
        .map_err(|e| {
          on_unique_violation(e, || CoreError::DuplicateMpn(mpn.clone().unwrap_or_default()))
        })?;

        // Restocked: fire every waiting notification exactly once.
        let recipients = if patch.stock.unwrap_or(current.stock) > 0 {
          let emails: Vec<String> = query_all(
            &tx,
            "SELECT u.email
             FROM stock_notifications n
             JOIN users u ON u.user_id = n.user_id
             WHERE n.component_id = ?1 AND n.is_active = 1
             ORDER BY n.created_at, n.rowid",
            params![id_str],
            |row| row.get(0),
          )?;
          tx.execute(
            "UPDATE stock_notifications SET is_active = 0
             WHERE component_id = ?1 AND is_active = 1",
            params![id_str],
          )?;
          emails
        } else {
          Vec::new()
        };

        let raw = load_component(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::ComponentNotFound(id)))?;
        tx.commit()?;
        Ok((raw, recipients))
      })
      .await?;

    Ok(ComponentUpdate { component: raw.into_component()?, recipients })
  }

  async fn delete_component(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let changed =
          conn.execute("DELETE FROM components WHERE component_id = ?1", params![id_str])?;
        if changed == 0 {
          return Err(reject(CoreError::ComponentNotFound(id)));
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn compare_prices(&self, id: Uuid) -> Result<Vec<Component>> {
    let id_str = encode_uuid(id);
    let raws = self
      .conn
      .call(move |conn| {
        let key: Option<String> = conn
          .query_row(
            "SELECT mpn_key FROM components WHERE component_id = ?1",
            params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(key) = key else {
          return Err(reject(CoreError::ComponentNotFound(id)));
        };
        Ok(query_all(
          conn,
          &format!("{} WHERE c.mpn_key = ?1 AND c.component_id <> ?2", component_select()),
          params![key, id_str],
          RawComponent::from_row,
        )?)
      })
      .await?;

    let mut offers = raws
      .into_iter()
      .map(RawComponent::into_component)
      .collect::<Result<Vec<_>>>()?;
    offers.sort_by_key(Component::effective_price);
    Ok(offers)
  }

  async fn low_stock(&self, store_id: Option<Uuid>) -> Result<Vec<Component>> {
    let store = store_id.map(encode_uuid);
    let raws = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "{} WHERE c.stock <= ?1 AND (?2 IS NULL OR c.store_id = ?2)
               ORDER BY c.stock, c.name",
            component_select()
          ),
          params![LOW_STOCK_THRESHOLD, store],
          RawComponent::from_row,
        )?)
      })
      .await?;
    raws.into_iter().map(RawComponent::into_component).collect()
  }

  async fn recommendations(&self, user_id: Option<Uuid>, limit: usize) -> Result<Vec<Component>> {
    let user = user_id.map(encode_uuid);
    let limit = limit as i64;

    let raws = self
      .conn
      .call(move |conn| {
        if let Some(user) = &user {
          let wishlisted = "SELECT wi.component_id
                            FROM wishlist_items wi
                            JOIN wishlists w ON w.wishlist_id = wi.wishlist_id
                            WHERE w.user_id = ?1";
          if exists(conn, &format!("{wishlisted} LIMIT 1"), params![user])? {
            return Ok(query_all(
              conn,
              &format!(
                "{select}
                 WHERE c.category_id IN (
                         SELECT category_id FROM components
                         WHERE component_id IN ({wishlisted}))
                   AND c.component_id NOT IN ({wishlisted})
                 ORDER BY c.created_at DESC, c.rowid DESC
                 LIMIT ?2",
                select = component_select()
              ),
              params![user, limit],
              RawComponent::from_row,
            )?);
          }
        }
        Ok(query_all(
          conn,
          &format!("{} ORDER BY RANDOM() LIMIT ?1", component_select()),
          params![limit],
          RawComponent::from_row,
        )?)
      })
      .await?;

    raws.into_iter().map(RawComponent::into_component).collect()
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn create_review(&self, input: NewReview) -> Result<Review> {
    review::validate_rating(input.rating)?;

    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let store_id = input.store_id;
    let store_str = encode_uuid(store_id);
    let user_str = encode_uuid(input.user_id);
    let created_at = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !exists(&tx, "SELECT 1 FROM stores WHERE store_id = ?1", params![store_str])? {
          return Err(reject(CoreError::StoreNotFound(store_id)));
        }
        if exists(
          &tx,
          "SELECT 1 FROM reviews WHERE user_id = ?1 AND store_id = ?2",
          params![user_str, store_str],
        )? {
          return Err(reject(CoreError::DuplicateReview(store_id)));
        }

        tx.execute(
          "INSERT INTO reviews (review_id, user_id, store_id, rating, comment, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![id_str, user_str, store_str, input.rating, input.comment, created_at],
        )
        .map_err(|e| on_unique_violation(e, || CoreError::DuplicateReview(store_id)))?;

        refresh_store_rating(&tx, &store_str)?;

        let raw = load_review(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::ReviewNotFound(id)))?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_review()
  }

  async fn get_review(&self, id: Uuid) -> Result<Option<Review>> {
    let id_str = encode_uuid(id);
    let raw = self.conn.call(move |conn| Ok(load_review(conn, &id_str)?)).await?;
    raw.map(RawReview::into_review).transpose()
  }

  async fn list_reviews(&self, store_id: Option<Uuid>) -> Result<Vec<Review>> {
    let store = store_id.map(encode_uuid);
    let raws = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "{REVIEW_SELECT} WHERE (?1 IS NULL OR r.store_id = ?1)
             ORDER BY r.created_at DESC, r.rowid DESC"
          ),
          params![store],
          RawReview::from_row,
        )?)
      })
      .await?;
    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> Result<Review> {
    if let Some(rating) = patch.rating {
      review::validate_rating(rating)?;
    }
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let store_str: String = tx
          .query_row(
            "SELECT store_id FROM reviews WHERE review_id = ?1",
            params![id_str],
            |row| row.get(0),
          )
          .optional()?
          .ok_or_else(|| reject(CoreError::ReviewNotFound(id)))?;

        tx.execute(
          "UPDATE reviews SET
             rating  = COALESCE(?2, rating),
             comment = COALESCE(?3, comment)
           WHERE review_id = ?1",
          params![id_str, patch.rating, patch.comment],
        )?;
        refresh_store_rating(&tx, &store_str)?;

        let raw = load_review(&tx, &id_str)?
          .ok_or_else(|| reject(CoreError::ReviewNotFound(id)))?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_review()
  }

  async fn delete_review(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let store_str: String = tx
          .query_row(
            "SELECT store_id FROM reviews WHERE review_id = ?1",
            params![id_str],
            |row| row.get(0),
          )
          .optional()?
          .ok_or_else(|| reject(CoreError::ReviewNotFound(id)))?;

        tx.execute("DELETE FROM reviews WHERE review_id = ?1", params![id_str])?;
        refresh_store_rating(&tx, &store_str)?;

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Wishlists ─────────────────────────────────────────────────────────────

  async fn create_wishlist(&self, user_id: Uuid, name: String) -> Result<Wishlist> {
    let id = Uuid::new_v4();
    let user_str = encode_uuid(user_id);
    let updated_at = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if load_user(&tx, &user_str)?.is_none() {
          return Err(reject(CoreError::UserNotFound(user_id)));
        }
        tx.execute(
          "INSERT INTO wishlists (wishlist_id, user_id, name, updated_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![encode_uuid(id), user_str, name, updated_at],
        )?;
        let raw = reload_wishlist(&tx, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_wishlist()
  }

  async fn get_wishlist(&self, id: Uuid) -> Result<Option<Wishlist>> {
    let id_str = encode_uuid(id);
    let raw = self.conn.call(move |conn| Ok(load_wishlist(conn, &id_str)?)).await?;
    raw.map(RawWishlist::into_wishlist).transpose()
  }

  async fn list_wishlists(&self, user_id: Uuid) -> Result<Vec<Wishlist>> {
    let user_str = encode_uuid(user_id);
    let raws = self
      .conn
      .call(move |conn| {
        let ids: Vec<String> = query_all(
          conn,
          "SELECT wishlist_id FROM wishlists WHERE user_id = ?1
           ORDER BY updated_at DESC, rowid DESC",
          params![user_str],
          |row| row.get(0),
        )?;
        let mut raws = Vec::with_capacity(ids.len());
        for id in &ids {
          if let Some(raw) = load_wishlist(conn, id)? {
            raws.push(raw);
          }
        }
        Ok(raws)
      })
      .await?;
    raws.into_iter().map(RawWishlist::into_wishlist).collect()
  }

  async fn rename_wishlist(&self, id: Uuid, name: String) -> Result<Wishlist> {
    let id_str = encode_uuid(id);
    let updated_at = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE wishlists SET name = ?2, updated_at = ?3 WHERE wishlist_id = ?1",
          params![id_str, name, updated_at],
        )?;
        if changed == 0 {
          return Err(reject(CoreError::WishlistNotFound(id)));
        }
        reload_wishlist(conn, id)
      })
      .await?;

    raw.into_wishlist()
  }

  async fn delete_wishlist(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        let changed =
          conn.execute("DELETE FROM wishlists WHERE wishlist_id = ?1", params![id_str])?;
        if changed == 0 {
          return Err(reject(CoreError::WishlistNotFound(id)));
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn toggle_wishlist_item(&self, wishlist_id: Uuid, component_id: Uuid) -> Result<Wishlist> {
    let wishlist_str = encode_uuid(wishlist_id);
    let component_str = encode_uuid(component_id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        require_wishlist(&tx, wishlist_id)?;
        if !exists(
          &tx,
          "SELECT 1 FROM components WHERE component_id = ?1",
          params![component_str],
        )? {
          return Err(reject(CoreError::ComponentNotFound(component_id)));
        }

        let removed = tx.execute(
          "DELETE FROM wishlist_items WHERE wishlist_id = ?1 AND component_id = ?2",
          params![wishlist_str, component_str],
        )?;
        if removed == 0 {
          tx.execute(
            "INSERT INTO wishlist_items (item_id, wishlist_id, component_id, quantity, added_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![
              encode_uuid(Uuid::new_v4()),
              wishlist_str,
              component_str,
              encode_dt(Utc::now()),
            ],
          )?;
        }

        touch_wishlist(&tx, &wishlist_str)?;
        let raw = reload_wishlist(&tx, wishlist_id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_wishlist()
  }

  async fn set_wishlist_item_quantity(
    &self,
    wishlist_id: Uuid,
    component_id: Uuid,
    quantity: i64,
  ) -> Result<Wishlist> {
    let wishlist_str = encode_uuid(wishlist_id);
    let component_str = encode_uuid(component_id);
    if quantity > i64::from(u32::MAX) {
      return Err(CoreError::validation("quantity", "Quantity is too large.").into());
    }

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        require_wishlist(&tx, wishlist_id)?;
        if !exists(
          &tx,
          "SELECT 1 FROM wishlist_items WHERE wishlist_id = ?1 AND component_id = ?2",
          params![wishlist_str, component_str],
        )? {
          return Err(reject(CoreError::WishlistItemNotFound { wishlist_id, component_id }));
        }

        if quantity <= 0 {
          tx.execute(
            "DELETE FROM wishlist_items WHERE wishlist_id = ?1 AND component_id = ?2",
            params![wishlist_str, component_str],
          )?;
        } else {
          tx.execute(
            "UPDATE wishlist_items SET quantity = ?3
             WHERE wishlist_id = ?1 AND component_id = ?2",
            params![wishlist_str, component_str, quantity],
          )?;
        }

        touch_wishlist(&tx, &wishlist_str)?;
        let raw = reload_wishlist(&tx, wishlist_id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_wishlist()
  }

  async fn clear_wishlist(&self, id: Uuid) -> Result<Wishlist> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        require_wishlist(&tx, id)?;
        tx.execute("DELETE FROM wishlist_items WHERE wishlist_id = ?1", params![id_str])?;
        touch_wishlist(&tx, &id_str)?;
        let raw = reload_wishlist(&tx, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_wishlist()
  }

  // ── Stock notifications ───────────────────────────────────────────────────

  async fn subscribe(
    &self,
    user_id: Uuid,
    component_id: Uuid,
  ) -> Result<(StockNotification, Subscription)> {
    let user_str = encode_uuid(user_id);
    let component_str = encode_uuid(component_id);

    let (raw, outcome) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !exists(
          &tx,
          "SELECT 1 FROM components WHERE component_id = ?1",
          params![component_str],
        )? {
          return Err(reject(CoreError::ComponentNotFound(component_id)));
        }

        let outcome = match load_notification(&tx, &user_str, &component_str)? {
          Some(existing) if existing.is_active => Subscription::AlreadyActive,
          Some(_) => {
            tx.execute(
              "UPDATE stock_notifications SET is_active = 1
               WHERE user_id = ?1 AND component_id = ?2",
              params![user_str, component_str],
            )?;
            Subscription::Reactivated
          }
          None => {
            tx.execute(
              "INSERT INTO stock_notifications
                 (notification_id, user_id, component_id, is_active, created_at)
               VALUES (?1, ?2, ?3, 1, ?4)",
              params![
                encode_uuid(Uuid::new_v4()),
                user_str,
                component_str,
                encode_dt(Utc::now()),
              ],
            )?;
            Subscription::Created
          }
        };

        let raw = load_notification(&tx, &user_str, &component_str)?
          .ok_or_else(|| reject(CoreError::NotificationNotFound(component_id)))?;
        tx.commit()?;
        Ok((raw, outcome))
      })
      .await?;

    Ok((raw.into_notification()?, outcome))
  }

  async fn unsubscribe(&self, user_id: Uuid, component_id: Uuid) -> Result<()> {
    let user_str = encode_uuid(user_id);
    let component_str = encode_uuid(component_id);
    self
      .conn
      .call(move |conn| {
        let removed = conn.execute(
          "DELETE FROM stock_notifications WHERE user_id = ?1 AND component_id = ?2",
          params![user_str, component_str],
        )?;
        if removed == 0 {
          return Err(reject(CoreError::NotificationNotFound(component_id)));
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Search history ────────────────────────────────────────────────────────

  async fn record_search(&self, user_id: Option<Uuid>, query: String) -> Result<SearchRecord> {
    let user = user_id.map(encode_uuid);
    let created_at = encode_dt(Utc::now());

    let record = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // `IS` so that anonymous searches compare against the NULL bucket.
        let last: Option<String> = tx
          .query_row(
            "SELECT query FROM search_history WHERE user_id IS ?1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![user],
            |row| row.get(0),
          )
          .optional()?;
        if last.as_deref() == Some(query.as_str()) {
          return Ok(SearchRecord::AlreadyRecorded);
        }

        tx.execute(
          "INSERT INTO search_history (search_id, user_id, query, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![encode_uuid(Uuid::new_v4()), user, query, created_at],
        )?;
        tx.commit()?;
        Ok(SearchRecord::Saved)
      })
      .await?;

    Ok(record)
  }

  async fn suggestions(&self, user_id: Option<Uuid>) -> Result<Suggestions> {
    let user = user_id.map(encode_uuid);
    let suggestions = self
      .conn
      .call(move |conn| {
        let popular = query_all(
          conn,
          "SELECT query FROM search_history
           GROUP BY query
           ORDER BY COUNT(*) DESC, MAX(created_at) DESC
           LIMIT ?1",
          params![POPULAR_LIMIT as i64],
          |row| row.get(0),
        )?;
        let recent = match &user {
          Some(user) => query_all(
            conn,
            "SELECT query FROM search_history WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
            params![user, RECENT_LIMIT as i64],
            |row| row.get(0),
          )?,
          None => Vec::new(),
        };
        Ok(Suggestions { popular, recent })
      })
      .await?;
    Ok(suggestions)
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn analytics(&self) -> Result<Analytics> {
    let (top_searches, demands, prices, out_of_stock_count) = self
      .conn
      .call(|conn| {
        let top_searches = query_all(
          conn,
          "SELECT query, COUNT(*) AS total FROM search_history
           GROUP BY query
           ORDER BY total DESC, query
           LIMIT ?1",
          params![TOP_LIMIT as i64],
          |row| {
            let total: i64 = row.get(1)?;
            Ok(SearchCount { query: row.get(0)?, count: total as u64 })
          },
        )?;
        let demands: Vec<(String, String, i64)> = query_all(
          conn,
          "SELECT c.component_id, c.name, COUNT(*) AS total
           FROM stock_notifications n
           JOIN components c ON c.component_id = n.component_id
           WHERE n.is_active = 1
           GROUP BY c.component_id
           ORDER BY total DESC, c.name
           LIMIT ?1",
          params![TOP_LIMIT as i64],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let prices: Vec<String> =
          query_all(conn, "SELECT price FROM components", [], |row| row.get(0))?;
        let out_of_stock = count(conn, "SELECT COUNT(*) FROM components WHERE stock = 0", [])?;
        Ok((top_searches, demands, prices, out_of_stock))
      })
      .await?;

    let stock_demands = demands
      .into_iter()
      .map(|(id, component_name, total)| {
        Ok(StockDemand { component_id: decode_uuid(&id)?, component_name, total: total as u64 })
      })
      .collect::<Result<Vec<_>>>()?;

    let total_value = prices
      .iter()
      .map(String::as_str)
      .map(decode_decimal)
      .sum::<Result<Decimal>>()?;

    Ok(Analytics {
      top_searches,
      stock_demands,
      inventory_summary: InventorySummary {
        total_value,
        out_of_stock_count,
        total_components: prices.len() as u64,
      },
    })
  }

  async fn platform_stats(&self) -> Result<PlatformStats> {
    let (total_stores, total_components, low_stock_alerts, recent) = self
      .conn
      .call(|conn| {
        let stores = count(conn, "SELECT COUNT(*) FROM stores", [])?;
        let components = count(conn, "SELECT COUNT(*) FROM components", [])?;
        let low = count(
          conn,
          "SELECT COUNT(*) FROM components WHERE stock <= ?1",
          params![LOW_STOCK_THRESHOLD],
        )?;
        let recent: Vec<(String, String, String)> = query_all(
          conn,
          "SELECT store_id, name, created_at FROM stores
           ORDER BY created_at DESC, rowid DESC
           LIMIT 5",
          [],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok((stores, components, low, recent))
      })
      .await?;

    let recent_registrations = recent
      .into_iter()
      .map(|(id, name, created_at)| {
        Ok(RecentStore { id: decode_uuid(&id)?, name, created_at: decode_dt(&created_at)? })
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(PlatformStats { total_stores, total_components, low_stock_alerts, recent_registrations })
  }
}
