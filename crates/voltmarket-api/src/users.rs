//! Handlers for accounts, tokens and password management.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Register; providers must send `store_name` and `store_address` |
//! | `POST` | `/users/login` | `{email, password}` → token pair |
//! | `POST` | `/token/refresh` | `{refresh}` → `{access}` |
//! | `GET`  | `/users/me` | The caller |
//! | `POST` | `/users/change-password` | `{old_password, new_password}` |
//! | `DELETE` | `/users/delete-account` | 204 |
//! | `POST` | `/users/password-reset` | `{email}`; always 200 |
//! | `POST` | `/users/password-reset-confirm` | `{uidb64, token, new_password}` |
//! | `GET`  | `/users`, `/users/{id}` | Admin only; also `PATCH` and `DELETE` |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;
use voltmarket_core::{
  market::MarketStore,
  policy,
  store::Store,
  user::{NewUser, Role, StoreProfile, User, UserPatch, normalize_email},
};

use crate::{
  AppState,
  auth::{self, AuthUser, TokenKind},
  error::{ApiError, OrApiError as _},
};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
  pub access:  String,
  pub refresh: String,
  pub role:    Role,
  pub user:    User,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub store:   Option<Store>,
}

fn issue<S: MarketStore>(
  state: &AppState<S>,
  user: User,
  store: Option<Store>,
) -> Result<AuthResponse, ApiError> {
  let pair = state.auth.token_pair(&user)?;
  Ok(AuthResponse {
    access: pair.access,
    refresh: pair.refresh,
    role: user.role,
    user,
    store,
  })
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBody {
  #[validate(email(message = "Enter a valid email address."))]
  pub email:         String,
  #[validate(length(min = 1, max = 150, message = "Username must be 1 to 150 characters."))]
  pub username:      String,
  #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
  pub password:      String,
  #[serde(default)]
  pub first_name:    String,
  #[serde(default)]
  pub last_name:     String,
  #[serde(default)]
  pub role:          Role,
  pub store_name:    Option<String>,
  pub store_address: Option<String>,
}

impl RegisterBody {
  /// The store profile a provider registration must carry.
  fn store_profile(&self) -> Result<Option<StoreProfile>, ApiError> {
    match self.role {
      Role::Client => Ok(None),
      Role::Admin => Err(ApiError::field("role", "Administrators cannot self-register.")),
      Role::Provider => {
        let name = self.store_name.as_deref().map(str::trim).unwrap_or_default();
        let address = self.store_address.as_deref().map(str::trim).unwrap_or_default();

        let mut missing = BTreeMap::new();
        if name.is_empty() {
          missing.insert(
            "store_name".to_string(),
            vec!["Providers must supply a store name.".to_string()],
          );
        }
        if address.is_empty() {
          missing.insert(
            "store_address".to_string(),
            vec!["Providers must supply a store address.".to_string()],
          );
        }
        if !missing.is_empty() {
          return Err(ApiError::Validation(missing));
        }
        Ok(Some(StoreProfile { name: name.to_string(), address: address.to_string() }))
      }
    }
  }
}

/// `POST /users`: returns 201 with a token pair for the new account.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MarketStore + 'static,
{
  body.validate()?;
  let store = body.store_profile()?;

  let (user, store) = state
    .store
    .create_user(NewUser {
      email: normalize_email(&body.email),
      username: body.username.trim().to_string(),
      first_name: body.first_name,
      last_name: body.last_name,
      role: body.role,
      password_hash: auth::hash_password(&body.password)?,
      store,
    })
    .await
    .or_api()?;

  tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");
  if let Some(store) = &store {
    tracing::info!(store_id = %store.id, owner_id = %user.id, "store created");
  }

  Ok((StatusCode::CREATED, Json(issue(&state, user, store)?)))
}

// ─── Tokens ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /users/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: MarketStore + 'static,
{
  let credentials = state
    .store
    .get_credentials_by_email(normalize_email(&body.email))
    .await
    .or_api()?
    .filter(|c| auth::verify_password(&body.password, &c.password_hash))
    .ok_or(ApiError::Unauthorized("No active account found with the given credentials."))?;

  let store = match credentials.user.role {
    Role::Provider => state.store.get_store_by_owner(credentials.user.id).await.or_api()?,
    _ => None,
  };
  Ok(Json(issue(&state, credentials.user, store)?))
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
  pub refresh: String,
}

/// `POST /token/refresh`
pub async fn refresh<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RefreshBody>,
) -> Result<Json<Value>, ApiError>
where
  S: MarketStore + 'static,
{
  let claims = state.auth.verify(&body.refresh, TokenKind::Refresh)?;
  let user = state
    .store
    .get_user(claims.sub)
    .await
    .or_api()?
    .ok_or(ApiError::Unauthorized("User not found."))?;
  Ok(Json(json!({ "access": state.auth.access_token(&user)? })))
}

// ─── Self service ─────────────────────────────────────────────────────────────

/// `GET /users/me`
pub async fn me<S>(AuthUser(user): AuthUser) -> Json<User>
where
  S: MarketStore + 'static,
{
  Json(user)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordBody {
  pub old_password: String,
  #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
  pub new_password: String,
}

/// `POST /users/change-password`
pub async fn change_password<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Json(body): Json<ChangePasswordBody>,
) -> Result<Json<Value>, ApiError>
where
  S: MarketStore + 'static,
{
  body.validate()?;
  let credentials = state
    .store
    .get_credentials(user.id)
    .await
    .or_api()?
    .ok_or(ApiError::Unauthorized("User not found."))?;
  if !auth::verify_password(&body.old_password, &credentials.password_hash) {
    return Err(ApiError::field("old_password", "Old password is incorrect."));
  }

  let hash = auth::hash_password(&body.new_password)?;
  state.store.set_password_hash(user.id, hash).await.or_api()?;
  Ok(Json(json!({ "detail": "Password updated successfully." })))
}

/// `DELETE /users/delete-account`
pub async fn delete_account<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError>
where
  S: MarketStore + 'static,
{
  state.store.delete_user(user.id).await.or_api()?;
  tracing::info!(user_id = %user.id, "account deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Password reset ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PasswordResetBody {
  pub email: String,
}

const RESET_SENT: &str = "If an account exists for this email, a reset link has been sent.";

/// `POST /users/password-reset`: answers the same way whether or not the
/// address is registered.
pub async fn password_reset<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<PasswordResetBody>,
) -> Result<Json<Value>, ApiError>
where
  S: MarketStore + 'static,
{
  let credentials = state
    .store
    .get_credentials_by_email(normalize_email(&body.email))
    .await
    .or_api()?;

  if let Some(credentials) = credentials {
    let token = state.auth.reset_token(&credentials)?;
    let link = format!(
      "{}/reset-password/{}/{}/",
      state.config.frontend_url.trim_end_matches('/'),
      auth::encode_uid(credentials.user.id),
      token,
    );
    let body = format!(
      "Hello {},\n\nUse the link below to choose a new password:\n\n{link}\n\n\
       If you did not ask for this, you can ignore this message.",
      credentials.user.display_name(),
    );
    state
      .mailer
      .send_best_effort(&credentials.user.email, "Reset your VoltMarket password", &body)
      .await;
  }

  Ok(Json(json!({ "detail": RESET_SENT })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirmBody {
  pub uidb64:       String,
  pub token:        String,
  #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
  pub new_password: String,
}

/// `POST /users/password-reset-confirm`
pub async fn password_reset_confirm<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<PasswordResetConfirmBody>,
) -> Result<Json<Value>, ApiError>
where
  S: MarketStore + 'static,
{
  body.validate()?;
  let invalid = || ApiError::BadRequest("Invalid or expired link.".into());

  let id = auth::decode_uid(&body.uidb64).ok_or_else(invalid)?;
  let credentials = state
    .store
    .get_credentials(id)
    .await
    .or_api()?
    .ok_or_else(invalid)?;
  if !state.auth.check_reset_token(&body.token, &credentials) {
    return Err(invalid());
  }

  let hash = auth::hash_password(&body.new_password)?;
  state.store.set_password_hash(id, hash).await.or_api()?;
  Ok(Json(json!({ "detail": "Password has been reset." })))
}

// ─── Administration ───────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_admin(&actor)?;
  Ok(Json(state.store.list_users().await.or_api()?))
}

/// `GET /users/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_admin(&actor)?;
  let user = state
    .store
    .get_user(id)
    .await
    .or_api()?
    .ok_or_else(|| ApiError::not_found("User"))?;
  Ok(Json(user))
}

/// `PATCH /users/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_admin(&actor)?;
  if patch.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
    return Err(ApiError::field("username", "This field may not be blank."));
  }
  Ok(Json(state.store.update_user(id, patch).await.or_api()?))
}

/// `DELETE /users/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  AuthUser(actor): AuthUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: MarketStore + 'static,
{
  policy::require_admin(&actor)?;
  state.store.delete_user(id).await.or_api()?;
  tracing::info!(user_id = %id, admin_id = %actor.id, "user deleted by admin");
  Ok(StatusCode::NO_CONTENT)
}
