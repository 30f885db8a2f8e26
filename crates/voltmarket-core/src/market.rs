//! The `MarketStore` trait: everything the HTTP layer asks of a backend.
//!
//! The trait is implemented by storage backends (e.g.
//! `voltmarket-store-sqlite`). Relational integrity (uniqueness, cascades,
//! restrict-on-delete) is the backend's job; so are the two write-side
//! effects that must stay consistent with the rows they derive from:
//!
//! - every review create/update/delete rewrites the owning store's `rating`
//!   and `review_count` from the full set of its reviews;
//! - every component update that leaves stock positive deactivates the
//!   component's active stock notifications and reports who to tell.

use std::future::Future;

use uuid::Uuid;

use crate::{
  analytics::{Analytics, PlatformStats},
  inventory::{
    Category, CategoryPatch, Component, ComponentPatch, ComponentQuery,
    NewCategory, NewComponent,
  },
  notification::{ComponentUpdate, StockNotification, Subscription},
  review::{NewReview, Review, ReviewPatch},
  search::{SearchRecord, Suggestions},
  store::{NewStore, Store, StorePatch},
  user::{Credentials, NewUser, User, UserPatch},
  wishlist::Wishlist,
};

/// Abstraction over a marketplace backend.
///
/// Lookups by id return `Ok(None)` for missing rows; mutations of a missing
/// row fail with the matching `*NotFound` variant of [`crate::Error`].
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait MarketStore: Send + Sync {
  /// Backend errors must be convertible into the domain error so callers can
  /// tell a uniqueness conflict from an I/O failure.
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user, creating their store in the same transaction when
  /// `input.store` is set.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<(User, Option<Store>), Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up login credentials by (normalised) email.
  fn get_credentials_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  fn get_credentials(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  fn update_user(
    &self,
    id: Uuid,
    patch: UserPatch,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn set_password_hash(
    &self,
    id: Uuid,
    password_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a user and everything they own.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Stores ────────────────────────────────────────────────────────────

  /// Fails with `StoreAlreadyExists` if `owner_id` already has a store.
  fn create_store(
    &self,
    owner_id: Uuid,
    input: NewStore,
  ) -> impl Future<Output = Result<Store, Self::Error>> + Send + '_;

  fn get_store(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + '_;

  fn get_store_by_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + '_;

  fn list_stores(
    &self,
  ) -> impl Future<Output = Result<Vec<Store>, Self::Error>> + Send + '_;

  fn update_store(
    &self,
    id: Uuid,
    patch: StorePatch,
  ) -> impl Future<Output = Result<Store, Self::Error>> + Send + '_;

  fn delete_store(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Categories ────────────────────────────────────────────────────────

  fn create_category(
    &self,
    input: NewCategory,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  fn get_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  fn update_category(
    &self,
    id: Uuid,
    patch: CategoryPatch,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  /// Fails with `CategoryInUse` while any component references it.
  fn delete_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Components ────────────────────────────────────────────────────────

  fn create_component(
    &self,
    store_id: Uuid,
    input: NewComponent,
  ) -> impl Future<Output = Result<Component, Self::Error>> + Send + '_;

  fn get_component(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Component>, Self::Error>> + Send + '_;

  fn list_components<'a>(
    &'a self,
    query: &'a ComponentQuery,
  ) -> impl Future<Output = Result<Vec<Component>, Self::Error>> + Send + 'a;

  /// Apply `patch`; if the resulting stock is positive, deactivate every
  /// active notification for the component and return their addresses.
  fn update_component(
    &self,
    id: Uuid,
    patch: ComponentPatch,
  ) -> impl Future<Output = Result<ComponentUpdate, Self::Error>> + Send + '_;

  fn delete_component(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Other components sharing this one's normalised part number, cheapest
  /// first.
  fn compare_prices(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<Component>, Self::Error>> + Send + '_;

  /// Components at or below the low-stock threshold, optionally limited to
  /// one store.
  fn low_stock(
    &self,
    store_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Component>, Self::Error>> + Send + '_;

  /// Components from categories the user has wishlisted that they have not
  /// wishlisted yet; random components when there is nothing to go on.
  fn recommendations(
    &self,
    user_id: Option<Uuid>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Component>, Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// Fails with `DuplicateReview` if the user already reviewed the store.
  fn create_review(
    &self,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  fn get_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  fn list_reviews(
    &self,
    store_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  fn update_review(
    &self,
    id: Uuid,
    patch: ReviewPatch,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  fn delete_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Wishlists ─────────────────────────────────────────────────────────

  fn create_wishlist(
    &self,
    user_id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<Wishlist, Self::Error>> + Send + '_;

  fn get_wishlist(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Wishlist>, Self::Error>> + Send + '_;

  fn list_wishlists(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Wishlist>, Self::Error>> + Send + '_;

  fn rename_wishlist(
    &self,
    id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<Wishlist, Self::Error>> + Send + '_;

  fn delete_wishlist(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the component if present, otherwise add it with quantity 1.
  fn toggle_wishlist_item(
    &self,
    wishlist_id: Uuid,
    component_id: Uuid,
  ) -> impl Future<Output = Result<Wishlist, Self::Error>> + Send + '_;

  /// Set an existing item's quantity, removing it when `quantity <= 0`.
  /// Fails with `WishlistItemNotFound` if the item is not in the wishlist.
  fn set_wishlist_item_quantity(
    &self,
    wishlist_id: Uuid,
    component_id: Uuid,
    quantity: i64,
  ) -> impl Future<Output = Result<Wishlist, Self::Error>> + Send + '_;

  fn clear_wishlist(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Wishlist, Self::Error>> + Send + '_;

  // ── Stock notifications ───────────────────────────────────────────────

  fn subscribe(
    &self,
    user_id: Uuid,
    component_id: Uuid,
  ) -> impl Future<Output = Result<(StockNotification, Subscription), Self::Error>>
  + Send
  + '_;

  /// Fails with `NotificationNotFound` if there is nothing to remove.
  fn unsubscribe(
    &self,
    user_id: Uuid,
    component_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Search history ────────────────────────────────────────────────────

  /// Append an already-normalised query unless it repeats the user's last
  /// one.
  fn record_search(
    &self,
    user_id: Option<Uuid>,
    query: String,
  ) -> impl Future<Output = Result<SearchRecord, Self::Error>> + Send + '_;

  fn suggestions(
    &self,
    user_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Suggestions, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  fn analytics(
    &self,
  ) -> impl Future<Output = Result<Analytics, Self::Error>> + Send + '_;

  fn platform_stats(
    &self,
  ) -> impl Future<Output = Result<PlatformStats, Self::Error>> + Send + '_;
}
