//! Handlers for `/reviews` endpoints.
//!
//! Every write recomputes the reviewed store's rating in the backend; the
//! handlers only enforce who may write.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use voltmarket_core::{
  market::MarketStore,
  policy,
  review::{NewReview, Review, ReviewPatch, validate_rating},
};

use crate::{
  AppState,
  auth::AuthUser,
  error::{ApiError, OrApiError as _},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub store: Option<Uuid>,
}

/// `GET /reviews[?store=<id>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Review>>, ApiError>
where
  S: MarketStore + 'static,
{
  Ok(Json(state.store.list_reviews(params.store).await.or_api()?))
}

#[derive(Debug, Deserialize)]
pub struct NewReviewBody {
  pub store:   Uuid,
  pub rating:  u8,
  #[serde(default)]
  pub comment: String,
}

/// `POST /reviews`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Json(body): Json<NewReviewBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketStore + 'static,
{
  let store = state
    .store
    .get_store(body.store)
    .await
    .or_api()?
    .ok_or_else(|| ApiError::field("store", "Store does not exist."))?;
  policy::can_review(&actor, &store)?;
  validate_rating(body.rating)?;

  let review = state
    .store
    .create_review(NewReview {
      user_id:  actor.id,
      store_id: store.id,
      rating:   body.rating,
      comment:  body.comment,
    })
    .await
    .or_api()?;
  Ok((StatusCode::CREATED, Json(review)))
}

/// `GET /reviews/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Review>, ApiError>
where
  S: MarketStore + 'static,
{
  Ok(Json(load(&state, id).await?))
}

/// `PATCH /reviews/{id}`: author only.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<ReviewPatch>,
) -> Result<Json<Review>, ApiError>
where
  S: MarketStore + 'static,
{
  let review = load(&state, id).await?;
  policy::can_edit_review(&actor, &review)?;
  if let Some(rating) = patch.rating {
    validate_rating(rating)?;
  }
  Ok(Json(state.store.update_review(id, patch).await.or_api()?))
}

/// `DELETE /reviews/{id}`: author or admin.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: MarketStore + 'static,
{
  let review = load(&state, id).await?;
  policy::can_delete_review(&actor, &review)?;
  state.store.delete_review(id).await.or_api()?;
  Ok(StatusCode::NO_CONTENT)
}

async fn load<S: MarketStore>(state: &AppState<S>, id: Uuid) -> Result<Review, ApiError> {
  state
    .store
    .get_review(id)
    .await
    .or_api()?
    .ok_or_else(|| ApiError::not_found("Review"))
}
