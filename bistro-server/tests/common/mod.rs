//! In-process test harness: router over the in-memory store with locally signed tokens

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use bistro_server::api::{HttpSettings, build_app};
use bistro_server::auth::JwtIdentityProvider;
use bistro_server::db::MemoryStore;
use bistro_server::AppState;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::MenuItem;
use shared::order::TransitionPolicy;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "owner@bistro.test";

pub struct Menu {
    pub pizza: MenuItem,
    pub soda: MenuItem,
    pub salad: MenuItem,
}

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub menu: Menu,
    jwt: JwtIdentityProvider,
}

pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

pub fn seed_menu(store: &MemoryStore) -> Menu {
    Menu {
        pizza: store.seed_menu_item("Margherita Pizza", cents(1200), Some("Pizza")),
        soda: store.seed_menu_item("Soda", cents(250), Some("Drinks")),
        salad: store.seed_menu_item("Caesar Salad", cents(850), Some("Salads")),
    }
}

/// State over a seeded memory store; `ADMIN_EMAIL` always resolves as admin
pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    AppState::new(store, Arc::new(JwtIdentityProvider::new(JWT_SECRET)))
        .with_bootstrap_admins([ADMIN_EMAIL])
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(TransitionPolicy::any())
    }

    pub fn with_policy(policy: TransitionPolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        let menu = seed_menu(&store);
        let state = test_state(store.clone()).with_transitions(policy);
        Self {
            app: build_app(state, &HttpSettings::default()),
            store,
            menu,
            jwt: JwtIdentityProvider::new(JWT_SECRET),
        }
    }

    pub fn token(&self, user_id: &str, email: &str) -> String {
        self.token_with_ttl(user_id, email, chrono::Duration::minutes(5))
    }

    pub fn token_with_ttl(&self, user_id: &str, email: &str, ttl: chrono::Duration) -> String {
        self.jwt.issue(user_id, Some(email), ttl).unwrap()
    }

    pub fn customer_token(&self) -> String {
        self.token("user-customer", "diner@example.com")
    }

    pub fn admin_token(&self) -> String {
        self.token("user-admin", ADMIN_EMAIL)
    }

    /// Token of a user promoted to staff through the admin endpoint
    pub async fn staff_token(&self) -> String {
        let body = serde_json::json!({ "user_id": "user-staff", "role": "staff" });
        let (status, _) = self
            .send(Method::POST, "/api/admin/users/role", Some(&self.admin_token()), Some(body))
            .await;
        assert_eq!(status, StatusCode::OK);
        self.token("user-staff", "cook@bistro.test")
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_with_headers(method, uri, token, body, &[]).await
    }

    pub async fn send_with_headers(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Place an order for `email` with the given `(item_id, quantity)` lines
    pub async fn place_order(&self, token: &str, email: &str, lines: &[(i64, i32)]) -> Value {
        let (status, body) = self
            .send(Method::POST, "/api/orders", Some(token), Some(order_body(email, lines)))
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
        body
    }
}

pub fn order_body(email: &str, lines: &[(i64, i32)]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|(item_id, quantity)| serde_json::json!({ "item_id": item_id, "quantity": quantity }))
        .collect();
    serde_json::json!({
        "customer": { "name": "Dana", "email": email, "phone": "555-0100" },
        "items": items,
        "payment_method": "cash",
        "status": "pending",
    })
}

/// Numeric error code of an error body
pub fn error_code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap_or_default()
}

pub fn decimal(value: &Value) -> Decimal {
    value
        .as_f64()
        .and_then(Decimal::from_f64_retain)
        .map(|d| d.round_dp(2))
        .unwrap()
}
