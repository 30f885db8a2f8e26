//! End-to-end tests: the full router over an in-memory `SqliteStore` with
//! mail captured by a stub transport.

use axum::{
  body::Body,
  http::{Method, Request, StatusCode, header},
  response::Response,
};
use lettre::transport::stub::AsyncStubTransport;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;
use voltmarket_core::{
  market::MarketStore,
  user::{NewUser, Role},
};
use voltmarket_store_sqlite::SqliteStore;

use crate::{AppState, ServerConfig, auth, mail::Mailer, router};

struct Harness {
  state:  AppState<SqliteStore>,
  outbox: AsyncStubTransport,
}

async fn harness() -> Harness {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let config = ServerConfig {
    jwt_secret: "test-secret".to_string(),
    frontend_url: "http://front.test".to_string(),
    ..ServerConfig::default()
  };
  let (mailer, outbox) = Mailer::stub();
  Harness { state: AppState::new(store, config, mailer), outbox }
}

async fn oneshot_raw(
  state: &AppState<SqliteStore>,
  method: Method,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> Response {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let req = match body {
    Some(body) => req
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => req.body(Body::empty()).unwrap(),
  };
  router(state.clone()).oneshot(req).await.unwrap()
}

async fn call(
  state: &AppState<SqliteStore>,
  method: Method,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let resp = oneshot_raw(state, method, uri, token, body).await;
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn dec(v: &Value) -> Decimal {
  match v {
    Value::String(s) => s.parse().unwrap(),
    Value::Number(n) => n.to_string().parse().unwrap(),
    other => panic!("not a decimal: {other}"),
  }
}

/// Register through the API and return `(access token, user id)`.
async fn register(state: &AppState<SqliteStore>, email: &str, role: &str) -> (String, Uuid) {
  let mut body = json!({
    "email": email,
    "username": email.split('@').next().unwrap(),
    "password": "correct-horse",
    "role": role,
  });
  if role == "provider" {
    body["store_name"] = json!(format!("Store of {email}"));
    body["store_address"] = json!("Av. Bolívar 12");
  }
  let (status, body) = call(state, Method::POST, "/api/users", None, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
  (body["access"].as_str().unwrap().to_string(), id)
}

async fn admin(state: &AppState<SqliteStore>) -> String {
  let (user, _) = state
    .store
    .create_user(NewUser {
      email:         "root@voltmarket.test".into(),
      username:      "root".into(),
      first_name:    String::new(),
      last_name:     String::new(),
      role:          Role::Admin,
      password_hash: auth::hash_password("admin-password").unwrap(),
      store:         None,
    })
    .await
    .unwrap();
  state.auth.access_token(&user).unwrap()
}

async fn category(state: &AppState<SqliteStore>, admin: &str, name: &str) -> String {
  let (status, body) = call(
    state,
    Method::POST,
    "/api/categories",
    Some(admin),
    Some(json!({ "name": name })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_str().unwrap().to_string()
}

async fn component(
  state: &AppState<SqliteStore>,
  provider: &str,
  category_id: &str,
  mpn: &str,
  price: &str,
  stock: u32,
) -> String {
  let (status, body) = call(
    state,
    Method::POST,
    "/api/components",
    Some(provider),
    Some(json!({
      "category_id": category_id,
      "name": format!("Part {mpn}"),
      "mpn": mpn,
      "price": price,
      "stock": stock,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_str().unwrap().to_string()
}

// ─── Accounts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_client_and_fetch_profile() {
  let h = harness().await;
  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/users",
    None,
    Some(json!({
      "email": "Ana@Example.com",
      "username": "ana",
      "password": "correct-horse",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["role"], "client");
  assert_eq!(body["user"]["email"], "ana@example.com");
  assert!(body["refresh"].is_string());

  let access = body["access"].as_str().unwrap();
  let (status, me) = call(&h.state, Method::GET, "/api/users/me", Some(access), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["email"], "ana@example.com");
}

#[tokio::test]
async fn provider_registration_requires_store_fields() {
  let h = harness().await;
  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/users",
    None,
    Some(json!({
      "email": "shop@example.com",
      "username": "shop",
      "password": "correct-horse",
      "role": "provider",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.get("store_name").is_some());
  assert!(body.get("store_address").is_some());
}

#[tokio::test]
async fn provider_registration_opens_store() {
  let h = harness().await;
  register(&h.state, "shop@example.com", "provider").await;

  let (status, stores) = call(&h.state, Method::GET, "/api/stores", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stores.as_array().unwrap().len(), 1);
  assert_eq!(stores[0]["owner_email"], "shop@example.com");
}

#[tokio::test]
async fn registration_validates_fields() {
  let h = harness().await;
  register(&h.state, "ana@example.com", "client").await;

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/users",
    None,
    Some(json!({ "email": "ANA@example.com", "username": "ana2", "password": "correct-horse" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.get("email").is_some());

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/users",
    None,
    Some(json!({ "email": "bob@example.com", "username": "bob", "password": "short" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.get("password").is_some());

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/users",
    None,
    Some(json!({
      "email": "eve@example.com",
      "username": "eve",
      "password": "correct-horse",
      "role": "admin",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.get("role").is_some());
}

#[tokio::test]
async fn login_and_refresh() {
  let h = harness().await;
  register(&h.state, "ana@example.com", "client").await;

  let (status, _) = call(
    &h.state,
    Method::POST,
    "/api/users/login",
    None,
    Some(json!({ "email": "ana@example.com", "password": "wrong-password" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/users/login",
    None,
    Some(json!({ "email": " Ana@example.com", "password": "correct-horse" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let refresh = body["refresh"].as_str().unwrap().to_string();
  let access = body["access"].as_str().unwrap().to_string();

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/token/refresh",
    None,
    Some(json!({ "refresh": refresh })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["access"].is_string());

  // An access token is not a refresh token.
  let (status, _) = call(
    &h.state,
    Method::POST,
    "/api/token/refresh",
    None,
    Some(json!({ "refresh": access })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
  let h = harness().await;
  let (status, _) = call(&h.state, Method::GET, "/api/users/me", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) =
    call(&h.state, Method::GET, "/api/users/me", Some("not.a.jwt"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  // Optional auth still rejects a bad token instead of treating it as
  // anonymous.
  let (status, _) = call(
    &h.state,
    Method::GET,
    "/api/components/recommendations",
    Some("not.a.jwt"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_then_delete_account() {
  let h = harness().await;
  let (token, _) = register(&h.state, "ana@example.com", "client").await;

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/users/change-password",
    Some(&token),
    Some(json!({ "old_password": "nope-nope", "new_password": "battery-staple" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.get("old_password").is_some());

  let (status, _) = call(
    &h.state,
    Method::POST,
    "/api/users/change-password",
    Some(&token),
    Some(json!({ "old_password": "correct-horse", "new_password": "battery-staple" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = call(
    &h.state,
    Method::POST,
    "/api/users/login",
    None,
    Some(json!({ "email": "ana@example.com", "password": "battery-staple" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) =
    call(&h.state, Method::DELETE, "/api/users/delete-account", Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  // The token outlives the account but no longer resolves to anyone.
  let (status, _) = call(&h.state, Method::GET, "/api/users/me", Some(&token), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_reset_flow() {
  let h = harness().await;
  let (_, id) = register(&h.state, "ana@example.com", "client").await;

  let (status, unknown) = call(
    &h.state,
    Method::POST,
    "/api/users/password-reset",
    None,
    Some(json!({ "email": "nobody@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(h.outbox.messages().await.is_empty());

  let (status, known) = call(
    &h.state,
    Method::POST,
    "/api/users/password-reset",
    None,
    Some(json!({ "email": "ana@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(unknown, known);
  let sent = h.outbox.messages().await;
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].0.to()[0].to_string(), "ana@example.com");

  let credentials = h.state.store.get_credentials(id).await.unwrap().unwrap();
  let token = h.state.auth.reset_token(&credentials).unwrap();
  let confirm = json!({
    "uidb64": auth::encode_uid(id),
    "token": token,
    "new_password": "battery-staple",
  });

  let (status, _) = call(
    &h.state,
    Method::POST,
    "/api/users/password-reset-confirm",
    None,
    Some(confirm.clone()),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  // Single use: the password hash it was bound to is gone.
  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/users/password-reset-confirm",
    None,
    Some(confirm),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["detail"], "Invalid or expired link.");

  let (status, _) = call(
    &h.state,
    Method::POST,
    "/api/users/login",
    None,
    Some(json!({ "email": "ana@example.com", "password": "battery-staple" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn user_administration_is_admin_only() {
  let h = harness().await;
  let admin = admin(&h.state).await;
  let (client, client_id) = register(&h.state, "ana@example.com", "client").await;

  let (status, _) = call(&h.state, Method::GET, "/api/users", Some(&client), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, users) = call(&h.state, Method::GET, "/api/users", Some(&admin), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(users.as_array().unwrap().len(), 2);

  let uri = format!("/api/users/{client_id}");
  let (status, user) = call(
    &h.state,
    Method::PATCH,
    &uri,
    Some(&admin),
    Some(json!({ "first_name": "Ana" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(user["first_name"], "Ana");

  let (status, _) = call(&h.state, Method::DELETE, &uri, Some(&admin), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(&h.state, Method::GET, &uri, Some(&admin), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Stores ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn store_proximity_and_ownership() {
  let h = harness().await;
  let (near, _) = register(&h.state, "near@example.com", "provider").await;
  let (other, _) = register(&h.state, "far@example.com", "provider").await;

  let (_, mine) =
    call(&h.state, Method::GET, "/api/stores?manage=true", Some(&near), None).await;
  assert_eq!(mine.as_array().unwrap().len(), 1);
  let store_uri = format!("/api/stores/{}", mine[0]["id"].as_str().unwrap());

  let (status, _) = call(
    &h.state,
    Method::PATCH,
    &store_uri,
    Some(&near),
    Some(json!({ "latitude": 10.2600, "longitude": -67.6000 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = call(
    &h.state,
    Method::PATCH,
    &store_uri,
    Some(&other),
    Some(json!({ "name": "Mine now" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (_, close) =
    call(&h.state, Method::GET, "/api/stores?lat=10.2469&lon=-67.5958", None, None).await;
  assert_eq!(close.as_array().unwrap().len(), 1);
  assert_eq!(close[0]["owner_email"], "near@example.com");

  let (_, all) = call(&h.state, Method::GET, "/api/stores?lat=abc&lon=-67.5958", None, None).await;
  assert_eq!(all.as_array().unwrap().len(), 2);

  // Providers already own their store.
  let (status, _) = call(
    &h.state,
    Method::POST,
    "/api/stores",
    Some(&near),
    Some(json!({ "name": "Second", "address": "Elsewhere" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn component_creation_rules() {
  let h = harness().await;
  let admin = admin(&h.state).await;
  let (provider, _) = register(&h.state, "shop@example.com", "provider").await;
  let (client, _) = register(&h.state, "ana@example.com", "client").await;
  let cat = category(&h.state, &admin, "Regulators").await;

  let new = json!({ "category_id": cat, "name": "LM7805", "mpn": "LM7805", "price": "1.50" });
  let (status, _) =
    call(&h.state, Method::POST, "/api/components", Some(&client), Some(new.clone())).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let mut offer = new.clone();
  offer["is_on_offer"] = json!(true);
  offer["offer_price"] = json!("1.50");
  let (status, body) =
    call(&h.state, Method::POST, "/api/components", Some(&provider), Some(offer)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.get("offer_price").is_some());

  let (status, body) =
    call(&h.state, Method::POST, "/api/components", Some(&provider), Some(new.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["category_name"], "Regulators");

  let (status, body) =
    call(&h.state, Method::POST, "/api/components", Some(&provider), Some(new)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.get("mpn").is_some());

  // The category is referenced now.
  let (status, _) = call(
    &h.state,
    Method::DELETE,
    &format!("/api/categories/{cat}"),
    Some(&admin),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn component_listing_filters() {
  let h = harness().await;
  let admin = admin(&h.state).await;
  let (shop_a, _) = register(&h.state, "a@example.com", "provider").await;
  let (shop_b, _) = register(&h.state, "b@example.com", "provider").await;
  let cat = category(&h.state, &admin, "Sensors").await;

  let id = component(&h.state, &shop_a, &cat, "DHT22", "4.00", 3).await;
  component(&h.state, &shop_b, &cat, "BME280", "9.00", 10).await;
  let (status, _) = call(
    &h.state,
    Method::PATCH,
    &format!("/api/components/{id}"),
    Some(&shop_a),
    Some(json!({ "technical_specs": { "Voltage": "3.3V" } })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (_, all) = call(&h.state, Method::GET, "/api/components", None, None).await;
  assert_eq!(all.as_array().unwrap().len(), 2);

  let (_, cheap) = call(&h.state, Method::GET, "/api/components?max_price=5", None, None).await;
  assert_eq!(cheap.as_array().unwrap().len(), 1);
  assert_eq!(cheap[0]["mpn"], "DHT22");

  let (_, by_spec) =
    call(&h.state, Method::GET, "/api/components?spec.voltage=3.3", None, None).await;
  assert_eq!(by_spec.as_array().unwrap().len(), 1);

  let (_, managed) =
    call(&h.state, Method::GET, "/api/components?manage=true", Some(&shop_b), None).await;
  assert_eq!(managed.as_array().unwrap().len(), 1);
  assert_eq!(managed[0]["mpn"], "BME280");

  let (status, _) =
    call(&h.state, Method::GET, "/api/components?min_price=cheap", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, low) =
    call(&h.state, Method::GET, "/api/components/low-stock-alerts", Some(&shop_b), None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(low.as_array().unwrap().is_empty());

  let (_, low) =
    call(&h.state, Method::GET, "/api/components/low-stock-alerts", Some(&admin), None).await;
  assert_eq!(low.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn compare_prices_matches_normalised_part_numbers() {
  let h = harness().await;
  let admin = admin(&h.state).await;
  let (shop_a, _) = register(&h.state, "a@example.com", "provider").await;
  let (shop_b, _) = register(&h.state, "b@example.com", "provider").await;
  let cat = category(&h.state, &admin, "Regulators").await;

  let id = component(&h.state, &shop_a, &cat, "LM7805-CT", "1.50", 10).await;
  component(&h.state, &shop_b, &cat, "lm7805ct ", "1.20", 10).await;

  let (status, others) = call(
    &h.state,
    Method::GET,
    &format!("/api/components/{id}/compare-prices"),
    None,
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(others.as_array().unwrap().len(), 1);
  assert_eq!(dec(&others[0]["price"]), "1.20".parse().unwrap());
}

#[tokio::test]
async fn restock_mails_waiting_subscribers_once() {
  let h = harness().await;
  let admin = admin(&h.state).await;
  let (provider, _) = register(&h.state, "shop@example.com", "provider").await;
  let (client, _) = register(&h.state, "ana@example.com", "client").await;
  let cat = category(&h.state, &admin, "Microcontrollers").await;
  let id = component(&h.state, &provider, &cat, "ATMEGA328P", "3.10", 0).await;
  let notify = format!("/api/components/{id}/notify");

  let (status, body) = call(&h.state, Method::POST, &notify, Some(&client), None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["subscription"], "created");
  let (status, _) = call(&h.state, Method::POST, &notify, Some(&client), None).await;
  assert_eq!(status, StatusCode::OK);

  let uri = format!("/api/components/{id}");
  let (status, body) =
    call(&h.state, Method::PATCH, &uri, Some(&provider), Some(json!({ "stock": 4 }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["stock"], 4);

  let sent = h.outbox.messages().await;
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].0.to()[0].to_string(), "ana@example.com");

  // Fired notifications are spent.
  call(&h.state, Method::PATCH, &uri, Some(&provider), Some(json!({ "stock": 9 }))).await;
  assert_eq!(h.outbox.messages().await.len(), 1);

  // Re-subscribing arms it again.
  let (status, body) = call(&h.state, Method::POST, &notify, Some(&client), None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["subscription"], "reactivated");

  let (status, _) = call(&h.state, Method::DELETE, &notify, Some(&client), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(&h.state, Method::DELETE, &notify, Some(&client), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_owner_edits_a_component() {
  let h = harness().await;
  let admin = admin(&h.state).await;
  let (owner, _) = register(&h.state, "a@example.com", "provider").await;
  let (rival, _) = register(&h.state, "b@example.com", "provider").await;
  let cat = category(&h.state, &admin, "Passives").await;
  let id = component(&h.state, &owner, &cat, "R-10K", "0.05", 100).await;
  let uri = format!("/api/components/{id}");

  let (status, _) =
    call(&h.state, Method::PATCH, &uri, Some(&rival), Some(json!({ "stock": 0 }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = call(&h.state, Method::DELETE, &uri, Some(&rival), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = call(&h.state, Method::DELETE, &uri, Some(&admin), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(&h.state, Method::GET, &uri, None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inventory_spreadsheet_download() {
  let h = harness().await;
  let admin = admin(&h.state).await;
  let (provider, _) = register(&h.state, "shop@example.com", "provider").await;
  let (client, _) = register(&h.state, "ana@example.com", "client").await;
  let cat = category(&h.state, &admin, "Sensors").await;
  component(&h.state, &provider, &cat, "DHT22", "4.00", 0).await;

  let resp = oneshot_raw(
    &h.state,
    Method::GET,
    "/api/components/download-excel",
    Some(&provider),
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(
    resp.headers()[header::CONTENT_TYPE],
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
  );
  assert_eq!(
    resp.headers()[header::CONTENT_DISPOSITION],
    "attachment; filename=inventory_report.xlsx"
  );
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  assert!(bytes.starts_with(b"PK"));

  let (status, _) = call(
    &h.state,
    Method::GET,
    "/api/components/download-excel",
    Some(&client),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

// ─── Reviews ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reviews_drive_store_rating() {
  let h = harness().await;
  let (provider, _) = register(&h.state, "shop@example.com", "provider").await;
  let (ana, _) = register(&h.state, "ana@example.com", "client").await;
  let (bob, _) = register(&h.state, "bob@example.com", "client").await;

  let (_, stores) = call(&h.state, Method::GET, "/api/stores", None, None).await;
  let store_id = stores[0]["id"].as_str().unwrap().to_string();
  let store_uri = format!("/api/stores/{store_id}");

  let (status, _) = call(
    &h.state,
    Method::POST,
    "/api/reviews",
    Some(&provider),
    Some(json!({ "store": store_id, "rating": 5 })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, five) = call(
    &h.state,
    Method::POST,
    "/api/reviews",
    Some(&ana),
    Some(json!({ "store": store_id, "rating": 5, "comment": "Great" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/reviews",
    Some(&ana),
    Some(json!({ "store": store_id, "rating": 4 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.get("store").is_some());

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/reviews",
    Some(&bob),
    Some(json!({ "store": store_id, "rating": 9 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.get("rating").is_some());

  call(
    &h.state,
    Method::POST,
    "/api/reviews",
    Some(&bob),
    Some(json!({ "store": store_id, "rating": 3 })),
  )
  .await;
  let (_, store) = call(&h.state, Method::GET, &store_uri, None, None).await;
  assert_eq!(store["rating"].as_f64(), Some(4.0));
  assert_eq!(store["review_count"], 2);

  let five_uri = format!("/api/reviews/{}", five["id"].as_str().unwrap());
  let (status, _) = call(&h.state, Method::DELETE, &five_uri, Some(&bob), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = call(&h.state, Method::DELETE, &five_uri, Some(&ana), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, store) = call(&h.state, Method::GET, &store_uri, None, None).await;
  assert_eq!(store["rating"].as_f64(), Some(3.0));
  assert_eq!(store["review_count"], 1);

  let (_, listed) = call(
    &h.state,
    Method::GET,
    &format!("/api/reviews?store={store_id}"),
    None,
    None,
  )
  .await;
  assert_eq!(listed.as_array().unwrap().len(), 1);
}

// ─── Wishlists ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn wishlist_items_and_budget() {
  let h = harness().await;
  let admin = admin(&h.state).await;
  let (provider, _) = register(&h.state, "shop@example.com", "provider").await;
  let (ana, _) = register(&h.state, "ana@example.com", "client").await;
  let (bob, _) = register(&h.state, "bob@example.com", "client").await;
  let cat = category(&h.state, &admin, "Boards").await;
  let a = component(&h.state, &provider, &cat, "UNO-R3", "10", 50).await;
  let b = component(&h.state, &provider, &cat, "NANO", "5", 50).await;

  let (status, wishlist) = call(
    &h.state,
    Method::POST,
    "/api/wishlists",
    Some(&ana),
    Some(json!({ "name": "Robot arm" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let base = format!("/api/wishlists/{}", wishlist["id"].as_str().unwrap());

  let (status, _) = call(&h.state, Method::GET, &base, Some(&bob), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let toggle = format!("{base}/toggle-item");
  let quantity = format!("{base}/update-quantity");
  call(&h.state, Method::POST, &toggle, Some(&ana), Some(json!({ "product_id": a }))).await;
  call(&h.state, Method::POST, &toggle, Some(&ana), Some(json!({ "product_id": b }))).await;
  let (status, w) = call(
    &h.state,
    Method::POST,
    &quantity,
    Some(&ana),
    Some(json!({ "product_id": a, "quantity": 2 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(w["items"].as_array().unwrap().len(), 2);
  assert_eq!(dec(&w["total_budget"]), Decimal::from(25));

  let (status, budget) =
    call(&h.state, Method::GET, &format!("{base}/export-budget"), Some(&ana), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(budget["project_name"], "Robot arm");
  assert_eq!(budget["user"], "ana@example.com");
  assert_eq!(dec(&budget["total_budget"]), Decimal::from(25));

  // Toggling again removes; a quantity of zero removes too.
  let (_, w) =
    call(&h.state, Method::POST, &toggle, Some(&ana), Some(json!({ "product_id": b }))).await;
  assert_eq!(w["items"].as_array().unwrap().len(), 1);
  let (_, w) = call(
    &h.state,
    Method::POST,
    &quantity,
    Some(&ana),
    Some(json!({ "product_id": a, "quantity": 0 })),
  )
  .await;
  assert!(w["items"].as_array().unwrap().is_empty());

  let (status, _) = call(
    &h.state,
    Method::POST,
    &quantity,
    Some(&ana),
    Some(json!({ "product_id": a, "quantity": 3 })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = call(
    &h.state,
    Method::POST,
    &toggle,
    Some(&ana),
    Some(json!({ "product_id": Uuid::new_v4() })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Search and reports ───────────────────────────────────────────────────────

#[tokio::test]
async fn search_history_and_suggestions() {
  let h = harness().await;
  let (ana, _) = register(&h.state, "ana@example.com", "client").await;

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/search/history",
    Some(&ana),
    Some(json!({ "query": " ab " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["status"], "query too short");

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/search/history",
    Some(&ana),
    Some(json!({ "query": "Arduino" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["status"], "saved");

  let (status, body) = call(
    &h.state,
    Method::POST,
    "/api/search/history",
    Some(&ana),
    Some(json!({ "query": "arduino " })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "already recorded");

  let (_, mine) =
    call(&h.state, Method::GET, "/api/search/suggestions", Some(&ana), None).await;
  assert_eq!(mine["recent"], json!(["arduino"]));
  assert_eq!(mine["popular"], json!(["arduino"]));

  let (_, anonymous) = call(&h.state, Method::GET, "/api/search/suggestions", None, None).await;
  assert_eq!(anonymous["recent"], json!([]));
}

#[tokio::test]
async fn reports_are_admin_only() {
  let h = harness().await;
  let admin = admin(&h.state).await;
  let (provider, _) = register(&h.state, "shop@example.com", "provider").await;
  let cat = category(&h.state, &admin, "Sensors").await;
  component(&h.state, &provider, &cat, "DHT22", "4.00", 0).await;
  component(&h.state, &provider, &cat, "BME280", "9.00", 20).await;

  let (status, _) = call(&h.state, Method::GET, "/api/analytics", Some(&provider), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, analytics) =
    call(&h.state, Method::GET, "/api/analytics", Some(&admin), None).await;
  assert_eq!(status, StatusCode::OK);
  let summary = &analytics["inventory_summary"];
  assert_eq!(dec(&summary["total_value"]), Decimal::from(13));
  assert_eq!(summary["out_of_stock_count"], 1);
  assert_eq!(summary["total_components"], 2);

  let (status, stats) =
    call(&h.state, Method::GET, "/api/platform-stats", Some(&admin), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats["total_stores"], 1);
  assert_eq!(stats["low_stock_alerts"], 1);
  assert_eq!(stats["recent_registrations"].as_array().unwrap().len(), 1);
}
