//! Handlers for `/stores` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/stores` | `?lat&lon` keeps stores within 5 km; `?manage=true` limits a provider to their own |
//! | `POST` | `/stores` | Providers only, one store each |
//! | `GET`  | `/stores/{id}` | |
//! | `PATCH`, `DELETE` | `/stores/{id}` | Owning provider or admin |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use voltmarket_core::{
  geo,
  market::MarketStore,
  policy,
  store::{NewStore, Store, StorePatch},
  user::{Role, User},
};

use crate::{
  AppState,
  auth::{AuthUser, MaybeUser},
  error::{ApiError, OrApiError as _},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Kept as text: coordinates that do not parse switch the filter off.
  pub lat:    Option<String>,
  pub lon:    Option<String>,
  #[serde(default)]
  pub manage: bool,
}

impl ListParams {
  fn origin(&self) -> Option<(f64, f64)> {
    let lat = self.lat.as_deref()?.trim().parse().ok()?;
    let lon = self.lon.as_deref()?.trim().parse().ok()?;
    Some((lat, lon))
  }
}

/// `GET /stores[?lat=..&lon=..][&manage=true]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  MaybeUser(caller): MaybeUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Store>>, ApiError>
where
  S: MarketStore + 'static,
{
  let mut stores = state.store.list_stores().await.or_api()?;

  if params.manage
    && let Some(User { id, role: Role::Provider, .. }) = caller
  {
    stores.retain(|s| s.owner_id == id);
  }
  if let Some(origin) = params.origin() {
    stores = geo::nearby(stores, origin);
  }
  Ok(Json(stores))
}

/// `POST /stores`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Json(input): Json<NewStore>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_provider(&actor)?;
  if input.name.trim().is_empty() {
    return Err(ApiError::field("name", "This field may not be blank."));
  }
  if input.address.trim().is_empty() {
    return Err(ApiError::field("address", "This field may not be blank."));
  }

  let store = state.store.create_store(actor.id, input).await.or_api()?;
  tracing::info!(store_id = %store.id, owner_id = %actor.id, "store created");
  Ok((StatusCode::CREATED, Json(store)))
}

/// `GET /stores/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Store>, ApiError>
where
  S: MarketStore + 'static,
{
  Ok(Json(load(&state, id).await?))
}

/// `PATCH /stores/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<StorePatch>,
) -> Result<Json<Store>, ApiError>
where
  S: MarketStore + 'static,
{
  let store = load(&state, id).await?;
  policy::can_manage_store(&actor, &store)?;
  if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(ApiError::field("name", "This field may not be blank."));
  }
  Ok(Json(state.store.update_store(id, patch).await.or_api()?))
}

/// `DELETE /stores/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: MarketStore + 'static,
{
  let store = load(&state, id).await?;
  policy::can_manage_store(&actor, &store)?;
  state.store.delete_store(id).await.or_api()?;
  tracing::info!(store_id = %id, actor_id = %actor.id, "store deleted");
  Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn load<S: MarketStore>(
  state: &AppState<S>,
  id: Uuid,
) -> Result<Store, ApiError> {
  state
    .store
    .get_store(id)
    .await
    .or_api()?
    .ok_or_else(|| ApiError::not_found("Store"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn origin_requires_both_coordinates() {
    let params = ListParams { lat: Some("10.24".into()), lon: Some("-67.59".into()), manage: false };
    assert_eq!(params.origin(), Some((10.24, -67.59)));

    let params = ListParams { lat: Some("10.24".into()), ..Default::default() };
    assert_eq!(params.origin(), None);
  }

  #[test]
  fn unparseable_coordinates_disable_the_filter() {
    let params = ListParams { lat: Some("north".into()), lon: Some("-67".into()), manage: false };
    assert_eq!(params.origin(), None);
  }
}
