//! Handlers for `/components` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/components` | Filters: `search`, `category`, `store`, `is_available`, `min_price`, `max_price`, `mpn`, `spec.<key>`, `manage` |
//! | `POST` | `/components` | Provider with a store |
//! | `GET`  | `/components/{id}` | |
//! | `PATCH`, `DELETE` | `/components/{id}` | Owning provider or admin; a restock mails waiting subscribers |
//! | `GET`  | `/components/recommendations` | Personalised when authenticated |
//! | `GET`  | `/components/low-stock-alerts` | Provider (own store) or admin (all) |
//! | `GET`  | `/components/download-excel` | Inventory spreadsheet |
//! | `GET`  | `/components/{id}/compare-prices` | Same part number, cheapest first |
//! | `POST`, `DELETE` | `/components/{id}/notify` | Restock subscription |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;
use voltmarket_core::{
  inventory::{Component, ComponentPatch, ComponentQuery, NewComponent},
  market::MarketStore,
  notification::{Subscription, restock_message},
  policy,
  user::{Role, User},
};

use crate::{
  AppState,
  auth::{AuthUser, MaybeUser},
  error::{ApiError, OrApiError as _},
  export, stores,
};

/// How many components a recommendation request returns.
pub const RECOMMENDATION_LIMIT: usize = 5;

const XLSX_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ─── Query parsing ────────────────────────────────────────────────────────────

/// Build a [`ComponentQuery`] from raw query-string pairs. Unknown keys are
/// ignored; `spec.<key>` pairs become technical-spec filters.
pub fn parse_query(params: &BTreeMap<String, String>) -> Result<ComponentQuery, ApiError> {
  let mut query = ComponentQuery::default();

  for (key, value) in params {
    let value = value.trim();
    if value.is_empty() {
      continue;
    }
    match key.as_str() {
      "search" => query.text = Some(value.to_string()),
      "mpn" => query.mpn = Some(value.to_string()),
      "category" => query.category_id = Some(parse_uuid("category", value)?),
      "store" => query.store_id = Some(parse_uuid("store", value)?),
      "min_price" => query.min_price = Some(parse_decimal("min_price", value)?),
      "max_price" => query.max_price = Some(parse_decimal("max_price", value)?),
      "is_available" => {
        query.is_available = Some(parse_bool(value).ok_or_else(|| {
          ApiError::field("is_available", "Must be true or false.")
        })?)
      }
      other => {
        if let Some(spec) = other.strip_prefix("spec.")
          && !spec.is_empty()
        {
          query.specs.insert(spec.to_string(), value.to_string());
        }
      }
    }
  }
  Ok(query)
}

fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(value).map_err(|_| ApiError::field(field, "Must be a valid UUID."))
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, ApiError> {
  value
    .parse()
    .map_err(|_| ApiError::field(field, "A valid number is required."))
}

fn parse_bool(value: &str) -> Option<bool> {
  match value.to_ascii_lowercase().as_str() {
    "true" | "1" => Some(true),
    "false" | "0" => Some(false),
    _ => None,
  }
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

/// `GET /components?...`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  MaybeUser(caller): MaybeUser,
  Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Vec<Component>>, ApiError>
where
  S: MarketStore + 'static,
{
  let mut query = parse_query(&params)?;

  let manage = params.get("manage").and_then(|v| parse_bool(v.trim())).unwrap_or(false);
  if manage
    && let Some(User { id, role: Role::Provider, .. }) = caller
  {
    match state.store.get_store_by_owner(id).await.or_api()? {
      Some(store) => query.store_id = Some(store.id),
      None => return Ok(Json(Vec::new())),
    }
  }

  Ok(Json(state.store.list_components(&query).await.or_api()?))
}

/// `POST /components`: the component is placed in the caller's store.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Json(input): Json<NewComponent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_provider(&actor)?;
  let store = state
    .store
    .get_store_by_owner(actor.id)
    .await
    .or_api()?
    .ok_or_else(|| {
      ApiError::BadRequest("You must create a store before adding components.".into())
    })?;
  input.validate().or_api()?;

  let component = state.store.create_component(store.id, input).await.or_api()?;
  tracing::info!(component_id = %component.id, store_id = %store.id, "component created");
  Ok((StatusCode::CREATED, Json(component)))
}

/// `GET /components/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Component>, ApiError>
where
  S: MarketStore + 'static,
{
  Ok(Json(load(&state, id).await?))
}

/// `PATCH /components/{id}`: when the update leaves stock positive, every
/// waiting subscriber is mailed once.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<ComponentPatch>,
) -> Result<Json<Component>, ApiError>
where
  S: MarketStore + 'static,
{
  authorize(&state, &actor, id).await?;
  let update = state.store.update_component(id, patch).await.or_api()?;

  if !update.recipients.is_empty() {
    let (subject, body) = restock_message(&update.component);
    for to in &update.recipients {
      state.mailer.send_best_effort(to, &subject, &body).await;
    }
    tracing::info!(
      component_id = %id,
      recipients = update.recipients.len(),
      "restock notifications sent"
    );
  }
  Ok(Json(update.component))
}

/// `DELETE /components/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: MarketStore + 'static,
{
  authorize(&state, &actor, id).await?;
  state.store.delete_component(id).await.or_api()?;
  Ok(StatusCode::NO_CONTENT)
}

async fn load<S: MarketStore>(state: &AppState<S>, id: Uuid) -> Result<Component, ApiError> {
  state
    .store
    .get_component(id)
    .await
    .or_api()?
    .ok_or_else(|| ApiError::not_found("Component"))
}

/// Component mutation follows the rules of the owning store.
async fn authorize<S: MarketStore>(
  state: &AppState<S>,
  actor: &User,
  id: Uuid,
) -> Result<(), ApiError> {
  let component = load(state, id).await?;
  let store = stores::load(state, component.store_id).await?;
  policy::can_manage_store(actor, &store)?;
  Ok(())
}

/// The store filter for inventory views: `Some(None)` for admins (every
/// store), `Some(Some(id))` for a provider's own store, and `None` for a
/// provider who has no store yet.
async fn inventory_scope<S: MarketStore>(
  state: &AppState<S>,
  actor: &User,
) -> Result<Option<Option<Uuid>>, ApiError> {
  policy::require_provider_or_admin(actor)?;
  if actor.role.is_admin() {
    return Ok(Some(None));
  }
  let store = state.store.get_store_by_owner(actor.id).await.or_api()?;
  Ok(store.map(|s| Some(s.id)))
}

// ─── Views ────────────────────────────────────────────────────────────────────

/// `GET /components/recommendations`
pub async fn recommendations<S>(
  State(state): State<AppState<S>>,
  MaybeUser(caller): MaybeUser,
) -> Result<Json<Vec<Component>>, ApiError>
where
  S: MarketStore + 'static,
{
  let components = state
    .store
    .recommendations(caller.map(|u| u.id), RECOMMENDATION_LIMIT)
    .await
    .or_api()?;
  Ok(Json(components))
}

/// `GET /components/low-stock-alerts`
pub async fn low_stock<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
) -> Result<Json<Vec<Component>>, ApiError>
where
  S: MarketStore + 'static,
{
  let Some(store_id) = inventory_scope(&state, &actor).await? else {
    return Ok(Json(Vec::new()));
  };
  Ok(Json(state.store.low_stock(store_id).await.or_api()?))
}

/// `GET /components/download-excel`
pub async fn download_excel<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketStore + 'static,
{
  let components = match inventory_scope(&state, &actor).await? {
    Some(store_id) => {
      let query = ComponentQuery { store_id, ..Default::default() };
      state.store.list_components(&query).await.or_api()?
    }
    None => Vec::new(),
  };

  let bytes = export::inventory_workbook(&components).map_err(ApiError::internal)?;
  Ok((
    [
      (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
      (header::CONTENT_DISPOSITION, "attachment; filename=inventory_report.xlsx"),
    ],
    bytes,
  ))
}

/// `GET /components/{id}/compare-prices`
pub async fn compare_prices<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Component>>, ApiError>
where
  S: MarketStore + 'static,
{
  Ok(Json(state.store.compare_prices(id).await.or_api()?))
}

// ─── Stock notifications ──────────────────────────────────────────────────────

/// `POST /components/{id}/notify`: 201 when a subscription is (re)armed,
/// 200 when the caller was already waiting.
pub async fn subscribe<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketStore + 'static,
{
  let (notification, subscription) = state.store.subscribe(actor.id, id).await.or_api()?;
  let (status, detail) = match subscription {
    Subscription::AlreadyActive => {
      (StatusCode::OK, "You are already subscribed to this component.")
    }
    Subscription::Created | Subscription::Reactivated => {
      (StatusCode::CREATED, "You will be notified when this component is back in stock.")
    }
  };
  Ok((
    status,
    Json(json!({
      "detail": detail,
      "subscription": subscription,
      "notification": notification,
    })),
  ))
}

/// `DELETE /components/{id}/notify`
pub async fn unsubscribe<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: MarketStore + 'static,
{
  state.store.unsubscribe(actor.id, id).await.or_api()?;
  Ok(StatusCode::NO_CONTENT)
}
