//! Handlers for search history.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/search/history` | `{"query": "..."}`; 201 saved, 200 repeat, 400 too short |
//! | `GET`  | `/search/suggestions` | Popular overall plus the caller's recent |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use voltmarket_core::{
  market::MarketStore,
  search::{SearchRecord, Suggestions, normalize_query},
};

use crate::{
  AppState,
  auth::MaybeUser,
  error::{ApiError, OrApiError as _},
};

#[derive(Debug, Deserialize)]
pub struct SearchBody {
  #[serde(default)]
  pub query: String,
}

/// `POST /search/history`
pub async fn record<S>(
  State(state): State<AppState<S>>,
  MaybeUser(caller): MaybeUser,
  Json(body): Json<SearchBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketStore + 'static,
{
  let Ok(query) = normalize_query(&body.query) else {
    return Ok((StatusCode::BAD_REQUEST, Json(json!({ "status": "query too short" }))));
  };

  let record = state
    .store
    .record_search(caller.map(|u| u.id), query)
    .await
    .or_api()?;
  Ok(match record {
    SearchRecord::Saved => (StatusCode::CREATED, Json(json!({ "status": "saved" }))),
    SearchRecord::AlreadyRecorded => {
      (StatusCode::OK, Json(json!({ "status": "already recorded" })))
    }
  })
}

/// `GET /search/suggestions`
pub async fn suggestions<S>(
  State(state): State<AppState<S>>,
  MaybeUser(caller): MaybeUser,
) -> Result<Json<Suggestions>, ApiError>
where
  S: MarketStore + 'static,
{
  Ok(Json(state.store.suggestions(caller.map(|u| u.id)).await.or_api()?))
}
