//! The client library against a server on an ephemeral port

mod common;

use std::sync::Arc;
use std::time::Duration;

use bistro_client::{
    Auth, CartStore, Checkout, CheckoutForm, ClientConfig, ClientError, GateDecision,
    HostedIdentity, HttpClient, IdentityUser, MenuCatalog, Redirect, ReservationOutcome,
    RoleState, Session, authorize, resolve_role,
};
use bistro_server::auth::JwtIdentityProvider;
use bistro_server::db::MemoryStore;
use bistro_server::{Config, Server};
use common::{ADMIN_EMAIL, JWT_SECRET, cents, seed_menu, test_state};
use shared::error::ErrorCode;
use shared::models::{CustomerContact, Role};
use shared::order::{OrderListQuery, OrderSort, OrderStatus};
use shared::request::SubmitOrderRequest;
use tokio::net::TcpListener;

struct Running {
    base_url: String,
    store: Arc<MemoryStore>,
    jwt: JwtIdentityProvider,
}

impl Running {
    fn token(&self, user_id: &str, email: &str) -> String {
        self.jwt
            .issue(user_id, Some(email), chrono::Duration::minutes(5))
            .unwrap()
    }

    fn client(&self) -> HttpClient {
        ClientConfig::new(format!("{}/", self.base_url))
            .with_timeout(5)
            .build_http_client()
            .unwrap()
    }
}

async fn start() -> Running {
    let config = Config::from_lookup(|name| match name {
        "ENVIRONMENT" => Some("test".into()),
        "STORE_BACKEND" => Some("memory".into()),
        "IDENTITY_JWT_SECRET" => Some(JWT_SECRET.into()),
        _ => None,
    })
    .unwrap();
    let store = Arc::new(MemoryStore::new());
    seed_menu(&store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::with_state(config, test_state(store.clone()));
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    Running {
        base_url: format!("http://{addr}"),
        store,
        jwt: JwtIdentityProvider::new(JWT_SECRET),
    }
}

#[tokio::test]
async fn test_browse_sign_in_and_check_out() {
    let server = start().await;
    let http = server.client();

    assert_eq!(http.health().await.unwrap().status, "ok");

    let mut catalog = MenuCatalog::load(&http).await.unwrap();
    assert_eq!(catalog.categories(), ["All", "Drinks", "Pizza", "Salads"]);
    catalog.set_category("pizza");
    let pizza = catalog.visible()[0].clone();
    catalog.reset();
    catalog.set_search("soda");
    let soda = catalog.visible()[0].clone();

    // session restored from a token obtained out of band
    let identity =
        HostedIdentity::new("http://127.0.0.1:9", "anon", Duration::from_secs(1)).unwrap();
    let auth = Auth::new(identity);
    let session_state = auth.subscribe();
    assert_eq!(
        authorize(&session_state.borrow(), &RoleState::Unresolved, &[], "/cart"),
        GateDecision::Pending
    );
    let token = server.token("user-dana", "dana@example.com");
    auth.restore(Some(Session::from_token(
        token.clone(),
        IdentityUser {
            id: "user-dana".into(),
            email: Some("dana@example.com".into()),
        },
    )));

    let role = resolve_role(&http, &auth.state()).await.unwrap();
    assert_eq!(role, RoleState::Resolved(Role::Customer));
    assert_eq!(authorize(&auth.state(), &role, &[], "/cart"), GateDecision::Allow);
    assert_eq!(
        authorize(&auth.state(), &role, Role::BACK_OFFICE, "/admin"),
        GateDecision::Redirect(Redirect::Home)
    );

    let cart = CartStore::new();
    cart.add_item(&pizza);
    cart.add_item(&soda);
    cart.add_item(&pizza);
    assert_eq!(cart.total(), cents(2650));

    let checkout = Checkout::new(http.with_token(&token));
    let form = CheckoutForm::new(CustomerContact::new("dana@example.com").with_name("Dana"))
        .with_reservation("2026-11-02T19:30", 2);
    let outcome = checkout.submit(&cart, &form).await.unwrap();

    assert_eq!(outcome.order.total_amount, cents(2650));
    assert_eq!(outcome.order.status, OrderStatus::Pending);
    assert!(matches!(outcome.reservation, ReservationOutcome::Booked(ref r) if r.party_size == 2));
    assert!(cart.snapshot().is_empty());
    assert_eq!(server.store.order_count(), 1);
}

#[tokio::test]
async fn test_reservation_failure_keeps_order() {
    let server = start().await;
    let http = server.client();
    let token = server.token("user-dana", "dana@example.com");
    let menu = http.menu_items(&Default::default()).await.unwrap();

    let cart = CartStore::new();
    cart.add_item(&menu[0]);
    let form = CheckoutForm::new(CustomerContact::new("dana@example.com"))
        .with_reservation("2026-11-02T19:30", 0);
    let outcome = Checkout::new(http.with_token(&token))
        .submit(&cart, &form)
        .await
        .unwrap();

    match outcome.reservation {
        ReservationOutcome::Failed(message) => assert!(message.contains("party_size")),
        other => panic!("expected failed reservation, got {other:?}"),
    }
    assert!(cart.snapshot().is_empty());
    assert_eq!(server.store.order_count(), 1);
}

#[tokio::test]
async fn test_server_errors_surface_as_client_errors() {
    let server = start().await;
    let http = server.client();

    let empty = SubmitOrderRequest::new(CustomerContact::new("a@example.com"), vec![]);
    let err = http.submit_order(&empty, "k-1").await.unwrap_err();
    assert!(err.is_unauthorized());

    let customer = http.with_token(server.token("user-a", "a@example.com"));
    let err = customer.submit_order(&empty, "k-1").await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::OrderEmpty));
    assert_eq!(err.to_string(), "Order must contain at least one item");

    let err = customer.list_orders(&OrderListQuery::new()).await.unwrap_err();
    assert!(err.is_forbidden());
    assert!(matches!(err, ClientError::Api(_)));
}

#[tokio::test]
async fn test_back_office_round_trip() {
    let server = start().await;
    let http = server.client();
    let menu = http.menu_items(&Default::default()).await.unwrap();
    let customer = http.with_token(server.token("user-a", "a@example.com"));
    let admin = http.with_token(server.token("user-admin", ADMIN_EMAIL));

    let request = SubmitOrderRequest::new(
        CustomerContact::new("a@example.com"),
        vec![shared::request::OrderLineRequest::new(menu[0].item_id, 2)],
    );
    let first = customer.submit_order(&request, "same-key").await.unwrap();
    let replay = customer.submit_order(&request, "same-key").await.unwrap();
    assert!(first.created);
    assert!(!replay.created);
    assert_eq!(first.order.order_id, replay.order.order_id);

    let listed = admin
        .list_orders(&OrderListQuery::new().with_sort(OrderSort::HighestPrice))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_complete());

    let order_id = first.order.order_id;
    let updated = admin.update_status(order_id, OrderStatus::Ready).await.unwrap();
    assert_eq!(updated.status, OrderStatus::Ready);

    let stats = admin.order_stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.pending, 0);

    let err = admin.delete_order(order_id, false).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ConfirmationRequired));
    let deleted = admin.delete_order(order_id, true).await.unwrap();
    assert!(deleted.deleted);
    assert_eq!(server.store.order_count(), 0);

    let me = admin.me().await.unwrap();
    assert_eq!(me.role, Role::Admin);
}
