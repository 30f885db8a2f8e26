//! Handlers for `/wishlists` endpoints.
//!
//! Every route is scoped to the caller: someone else's wishlist answers 404
//! exactly like a missing one.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use voltmarket_core::{
  market::MarketStore,
  user::User,
  wishlist::{BudgetSummary, DEFAULT_WISHLIST_NAME, Wishlist},
};

use crate::{
  AppState,
  auth::AuthUser,
  error::{ApiError, OrApiError as _},
};

#[derive(Debug, Default, Deserialize)]
pub struct WishlistBody {
  pub name: Option<String>,
}

/// `GET /wishlists`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
) -> Result<Json<Vec<Wishlist>>, ApiError>
where
  S: MarketStore + 'static,
{
  Ok(Json(state.store.list_wishlists(user.id).await.or_api()?))
}

/// `POST /wishlists`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Json(body): Json<WishlistBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketStore + 'static,
{
  let name = body
    .name
    .map(|n| n.trim().to_string())
    .filter(|n| !n.is_empty())
    .unwrap_or_else(|| DEFAULT_WISHLIST_NAME.to_string());
  let wishlist = state.store.create_wishlist(user.id, name).await.or_api()?;
  Ok((StatusCode::CREATED, Json(wishlist)))
}

/// `GET /wishlists/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Wishlist>, ApiError>
where
  S: MarketStore + 'static,
{
  Ok(Json(owned(&state, &user, id).await?))
}

/// `PATCH /wishlists/{id}`: rename.
pub async fn rename<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
  Json(body): Json<WishlistBody>,
) -> Result<Json<Wishlist>, ApiError>
where
  S: MarketStore + 'static,
{
  let wishlist = owned(&state, &user, id).await?;
  let Some(name) = body.name.map(|n| n.trim().to_string()) else {
    return Ok(Json(wishlist));
  };
  if name.is_empty() {
    return Err(ApiError::field("name", "This field may not be blank."));
  }
  Ok(Json(state.store.rename_wishlist(id, name).await.or_api()?))
}

/// `DELETE /wishlists/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: MarketStore + 'static,
{
  owned(&state, &user, id).await?;
  state.store.delete_wishlist(id).await.or_api()?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Items ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
  pub product_id: Uuid,
}

/// `POST /wishlists/{id}/toggle-item`
pub async fn toggle_item<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
  Json(body): Json<ToggleBody>,
) -> Result<Json<Wishlist>, ApiError>
where
  S: MarketStore + 'static,
{
  owned(&state, &user, id).await?;
  Ok(Json(state.store.toggle_wishlist_item(id, body.product_id).await.or_api()?))
}

#[derive(Debug, Deserialize)]
pub struct QuantityBody {
  pub product_id: Uuid,
  pub quantity:   i64,
}

/// `POST /wishlists/{id}/update-quantity`: a quantity of zero or less
/// removes the item.
pub async fn update_quantity<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
  Json(body): Json<QuantityBody>,
) -> Result<Json<Wishlist>, ApiError>
where
  S: MarketStore + 'static,
{
  owned(&state, &user, id).await?;
  let wishlist = state
    .store
    .set_wishlist_item_quantity(id, body.product_id, body.quantity)
    .await
    .or_api()?;
  Ok(Json(wishlist))
}

/// `POST /wishlists/{id}/clear`
pub async fn clear<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Wishlist>, ApiError>
where
  S: MarketStore + 'static,
{
  owned(&state, &user, id).await?;
  Ok(Json(state.store.clear_wishlist(id).await.or_api()?))
}

/// `GET /wishlists/{id}/export-budget`
pub async fn export_budget<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<Json<BudgetSummary>, ApiError>
where
  S: MarketStore + 'static,
{
  let wishlist = owned(&state, &user, id).await?;
  Ok(Json(BudgetSummary::new(&wishlist, &user)))
}

async fn owned<S: MarketStore>(
  state: &AppState<S>,
  user: &User,
  id: Uuid,
) -> Result<Wishlist, ApiError> {
  state
    .store
    .get_wishlist(id)
    .await
    .or_api()?
    .filter(|w| w.user_id == user.id)
    .ok_or_else(|| ApiError::not_found("Wishlist"))
}
