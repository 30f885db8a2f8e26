//! Password hashing, JWT issuance and the bearer-token extractors.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use voltmarket_core::{
  market::MarketStore,
  user::{Credentials, Role, User},
};

use crate::{
  AppState, ServerConfig,
  error::{ApiError, OrApiError as _},
};

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}").into()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
  PasswordHash::new(password_hash)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Access,
  Refresh,
  Reset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub:  Uuid,
  pub role: Role,
  pub kind: TokenKind,
  pub iat:  i64,
  pub exp:  i64,
  /// Password fingerprint; set on reset tokens only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fp:   Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
  pub access:  String,
  pub refresh: String,
}

/// Signing keys and lifetimes for every token the API issues.
pub struct AuthKeys {
  encoding:    EncodingKey,
  decoding:    DecodingKey,
  access_ttl:  Duration,
  refresh_ttl: Duration,
  reset_ttl:   Duration,
}

impl AuthKeys {
  pub fn from_config(config: &ServerConfig) -> Self {
    let secret = config.jwt_secret.as_bytes();
    Self {
      encoding:    EncodingKey::from_secret(secret),
      decoding:    DecodingKey::from_secret(secret),
      access_ttl:  Duration::minutes(config.access_token_minutes),
      refresh_ttl: Duration::days(config.refresh_token_days),
      reset_ttl:   Duration::minutes(config.reset_token_minutes),
    }
  }

  fn issue(
    &self,
    user: &User,
    kind: TokenKind,
    ttl: Duration,
    fp: Option<String>,
  ) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
      sub: user.id,
      role: user.role,
      kind,
      iat: now.timestamp(),
      exp: (now + ttl).timestamp(),
      fp,
    };
    encode(&Header::default(), &claims, &self.encoding).map_err(ApiError::internal)
  }

  pub fn access_token(&self, user: &User) -> Result<String, ApiError> {
    self.issue(user, TokenKind::Access, self.access_ttl, None)
  }

  pub fn token_pair(&self, user: &User) -> Result<TokenPair, ApiError> {
    Ok(TokenPair {
      access:  self.access_token(user)?,
      refresh: self.issue(user, TokenKind::Refresh, self.refresh_ttl, None)?,
    })
  }

  /// Decode `token`, requiring a valid signature, an unexpired `exp` and the
  /// given kind.
  pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(token, &self.decoding, &Validation::default())
      .map_err(|_| ApiError::Unauthorized("Token is invalid or expired."))?;
    if data.claims.kind != kind {
      return Err(ApiError::Unauthorized("Token is invalid or expired."));
    }
    Ok(data.claims)
  }

  /// A single-use password reset token: it stops verifying as soon as the
  /// password hash it was minted against changes.
  pub fn reset_token(&self, credentials: &Credentials) -> Result<String, ApiError> {
    let fp = fingerprint(&credentials.password_hash);
    self.issue(&credentials.user, TokenKind::Reset, self.reset_ttl, Some(fp))
  }

  pub fn check_reset_token(&self, token: &str, credentials: &Credentials) -> bool {
    match self.verify(token, TokenKind::Reset) {
      Ok(claims) => {
        claims.sub == credentials.user.id
          && claims.fp.as_deref() == Some(fingerprint(&credentials.password_hash).as_str())
      }
      Err(_) => false,
    }
  }
}

fn fingerprint(password_hash: &str) -> String {
  let digest = Sha256::digest(password_hash.as_bytes());
  hex::encode(&digest[..8])
}

/// URL-safe encoding of a user id, as used in reset links.
pub fn encode_uid(id: Uuid) -> String { B64.encode(id.to_string()) }

pub fn decode_uid(uidb64: &str) -> Option<Uuid> {
  let bytes = B64.decode(uidb64).ok()?;
  Uuid::parse_str(std::str::from_utf8(&bytes).ok()?).ok()
}

// ─── Extractors ──────────────────────────────────────────────────────────────

fn bearer(headers: &HeaderMap) -> Option<Result<&str, ApiError>> {
  let value = headers.get(header::AUTHORIZATION)?;
  Some(
    value
      .to_str()
      .ok()
      .and_then(|v| v.strip_prefix("Bearer "))
      .map(str::trim)
      .ok_or(ApiError::Unauthorized("Malformed Authorization header.")),
  )
}

async fn resolve<S: MarketStore>(
  state: &AppState<S>,
  token: &str,
) -> Result<User, ApiError> {
  let claims = state.auth.verify(token, TokenKind::Access)?;
  state
    .store
    .get_user(claims.sub)
    .await
    .or_api()?
    .ok_or(ApiError::Unauthorized("User not found."))
}

/// The authenticated caller. Rejects with 401 when the bearer token is
/// missing, invalid, or names a deleted user.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: MarketStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer(&parts.headers)
      .ok_or(ApiError::Unauthorized("Authentication credentials were not provided."))??;
    Ok(AuthUser(resolve(state, token).await?))
  }
}

/// The caller, if any. A request without an `Authorization` header is
/// anonymous; a request with a bad token is still rejected.
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<AppState<S>> for MaybeUser
where
  S: MarketStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    match bearer(&parts.headers) {
      None => Ok(MaybeUser(None)),
      Some(token) => Ok(MaybeUser(Some(resolve(state, token?).await?))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config() -> ServerConfig {
    ServerConfig { jwt_secret: "test-secret".into(), ..ServerConfig::default() }
  }

  fn credentials(hash: &str) -> Credentials {
    Credentials {
      user:          User {
        id:         Uuid::new_v4(),
        email:      "ana@example.com".into(),
        username:   "ana".into(),
        first_name: String::new(),
        last_name:  String::new(),
        role:       Role::Client,
        created_at: Utc::now(),
      },
      password_hash: hash.into(),
    }
  }

  #[test]
  fn password_round_trip() {
    let hash = hash_password("s3cret-pass").unwrap();
    assert!(verify_password("s3cret-pass", &hash));
    assert!(!verify_password("wrong", &hash));
    assert!(!verify_password("s3cret-pass", "not-a-phc-string"));
  }

  #[test]
  fn token_kinds_are_not_interchangeable() {
    let keys = AuthKeys::from_config(&config());
    let creds = credentials("h");
    let pair = keys.token_pair(&creds.user).unwrap();

    let claims = keys.verify(&pair.access, TokenKind::Access).unwrap();
    assert_eq!(claims.sub, creds.user.id);
    assert!(keys.verify(&pair.refresh, TokenKind::Access).is_err());
    assert!(keys.verify(&pair.access, TokenKind::Refresh).is_err());
  }

  #[test]
  fn reset_token_dies_with_password_change() {
    let keys = AuthKeys::from_config(&config());
    let mut creds = credentials("old-hash");
    let token = keys.reset_token(&creds).unwrap();
    assert!(keys.check_reset_token(&token, &creds));

    creds.password_hash = "new-hash".into();
    assert!(!keys.check_reset_token(&token, &creds));
  }

  #[test]
  fn foreign_signature_is_rejected() {
    let keys = AuthKeys::from_config(&config());
    let other = AuthKeys::from_config(&ServerConfig {
      jwt_secret: "other-secret".into(),
      ..ServerConfig::default()
    });
    let token = other.access_token(&credentials("h").user).unwrap();
    assert!(keys.verify(&token, TokenKind::Access).is_err());
  }

  #[test]
  fn uid_encoding() {
    let id = Uuid::new_v4();
    assert_eq!(decode_uid(&encode_uid(id)), Some(id));
    assert_eq!(decode_uid("!!"), None);
  }
}
