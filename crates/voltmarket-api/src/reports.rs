//! Admin-only aggregate reports.

use axum::{Json, extract::State};
use voltmarket_core::{
  analytics::{Analytics, PlatformStats},
  market::MarketStore,
  policy,
};

use crate::{
  AppState,
  auth::AuthUser,
  error::{ApiError, OrApiError as _},
};

/// `GET /analytics`
pub async fn analytics<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
) -> Result<Json<Analytics>, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_admin(&actor)?;
  Ok(Json(state.store.analytics().await.or_api()?))
}

/// `GET /platform-stats`
pub async fn platform_stats<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
) -> Result<Json<PlatformStats>, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_admin(&actor)?;
  Ok(Json(state.store.platform_stats().await.or_api()?))
}
