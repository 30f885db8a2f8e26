//! Handlers for `/categories` endpoints. Reads are public; writes are admin
//! only.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;
use voltmarket_core::{
  inventory::{Category, CategoryPatch, NewCategory},
  market::MarketStore,
  policy,
};

use crate::{
  AppState,
  auth::AuthUser,
  error::{ApiError, OrApiError as _},
};

/// `GET /categories`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Category>>, ApiError>
where
  S: MarketStore + 'static,
{
  Ok(Json(state.store.list_categories().await.or_api()?))
}

/// `POST /categories`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Json(mut input): Json<NewCategory>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_admin(&actor)?;
  input.name = input.name.trim().to_string();
  if input.name.is_empty() {
    return Err(ApiError::field("name", "This field may not be blank."));
  }
  let category = state.store.create_category(input).await.or_api()?;
  Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /categories/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError>
where
  S: MarketStore + 'static,
{
  let category = state
    .store
    .get_category(id)
    .await
    .or_api()?
    .ok_or_else(|| ApiError::not_found("Category"))?;
  Ok(Json(category))
}

/// `PATCH /categories/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
  Json(mut patch): Json<CategoryPatch>,
) -> Result<Json<Category>, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_admin(&actor)?;
  if let Some(name) = &mut patch.name {
    *name = name.trim().to_string();
    if name.is_empty() {
      return Err(ApiError::field("name", "This field may not be blank."));
    }
  }
  Ok(Json(state.store.update_category(id, patch).await.or_api()?))
}

/// `DELETE /categories/{id}`: 400 while components still reference it.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_admin(&actor)?;
  state.store.delete_category(id).await.or_api()?;
  Ok(StatusCode::NO_CONTENT)
}
