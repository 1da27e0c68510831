//! HTTP client for the Bistro API

use std::time::Duration;

use http::StatusCode;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorBody, ErrorCode};
use shared::models::{
    CurrentUser, Customer, MenuItem, MenuItemCreate, MenuQuery, Order, OrderDetail, Reservation,
    ReservationWithCustomer, RoleAssignment, Staff,
};
use shared::order::{OrderListQuery, OrderStats, OrderStatus};
use shared::request::{
    DeleteOrderQuery, IDEMPOTENCY_KEY_HEADER, ReservationRequest, RoleAssignmentRequest,
    SubmitOrderRequest, UpdateStatusRequest,
};
use shared::response::{DeletedResponse, HealthResponse, OrderCreatedResponse};

use crate::{ClientConfig, ClientError, ClientResult};

/// Outcome of an order submission
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub order: Order,
    /// `false` when the server replayed an earlier submission with the same key
    pub created: bool,
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Copy of this client carrying another bearer token
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.authorized(self.client.get(self.url(path))).send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request with a query string
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let request = self.client.get(self.url(path)).query(query);
        let response = self.authorized(request).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.client.post(self.url(path)).json(body);
        let response = self.authorized(request).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PATCH request
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.client.patch(self.url(path)).json(body);
        let response = self.authorized(request).send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request with a query string
    pub async fn delete_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let request = self.client.delete(self.url(path)).query(query);
        let response = self.authorized(request).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()));
        }

        Err(Self::error_from_body(status, &bytes))
    }

    /// Structured error bodies keep their code; anything else maps by status
    fn error_from_body(status: StatusCode, bytes: &[u8]) -> ClientError {
        if let Ok(body) = serde_json::from_slice::<ErrorBody>(bytes) {
            return ClientError::Api(body.into());
        }

        let text = String::from_utf8_lossy(bytes).trim().to_string();
        let code = match status {
            StatusCode::UNAUTHORIZED => ErrorCode::NotAuthenticated,
            StatusCode::FORBIDDEN => ErrorCode::PermissionDenied,
            StatusCode::NOT_FOUND => ErrorCode::NotFound,
            StatusCode::CONFLICT => ErrorCode::AlreadyExists,
            s if s.is_client_error() => ErrorCode::InvalidRequest,
            _ => ErrorCode::InternalError,
        };
        let err = if text.is_empty() {
            AppError::new(code)
        } else {
            AppError::with_message(code, text)
        };
        ClientError::Api(err)
    }

    // ========== Public ==========

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.get("/health").await
    }

    /// Menu items matching the query, ordered by name
    pub async fn menu_items(&self, query: &MenuQuery) -> ClientResult<Vec<MenuItem>> {
        self.get_with_query("/api/menu-items", query).await
    }

    // ========== Signed-in ==========

    /// Submit an order under a client-generated idempotency key
    pub async fn submit_order(
        &self,
        request: &SubmitOrderRequest,
        idempotency_key: &str,
    ) -> ClientResult<OrderReceipt> {
        let builder = self
            .client
            .post(self.url("/api/orders"))
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .json(request);
        let response = self.authorized(builder).send().await?;
        let created = response.status() == StatusCode::CREATED;
        let body: OrderCreatedResponse = Self::handle_response(response).await?;
        Ok(OrderReceipt {
            order: body.order,
            created,
        })
    }

    pub async fn submit_reservation(
        &self,
        request: &ReservationRequest,
    ) -> ClientResult<Reservation> {
        self.post("/api/reservations", request).await
    }

    pub async fn me(&self) -> ClientResult<CurrentUser> {
        self.get("/api/me").await
    }

    // ========== Back office ==========

    pub async fn list_orders(&self, query: &OrderListQuery) -> ClientResult<Vec<OrderDetail>> {
        self.get_with_query("/api/orders", query).await
    }

    pub async fn update_status(&self, order_id: i64, status: OrderStatus) -> ClientResult<Order> {
        let path = format!("/api/orders/{order_id}/status");
        self.patch(&path, &UpdateStatusRequest::new(status)).await
    }

    pub async fn order_stats(&self) -> ClientResult<OrderStats> {
        self.get("/api/admin/orders/stats").await
    }

    pub async fn list_reservations(&self) -> ClientResult<Vec<ReservationWithCustomer>> {
        self.get("/api/reservations").await
    }

    pub async fn customers(&self) -> ClientResult<Vec<Customer>> {
        self.get("/api/customers").await
    }

    // ========== Admin ==========

    /// Delete an order; the server refuses unless `confirm` is set
    pub async fn delete_order(
        &self,
        order_id: i64,
        confirm: bool,
    ) -> ClientResult<DeletedResponse> {
        let path = format!("/api/admin/orders/{order_id}");
        self.delete_with_query(&path, &DeleteOrderQuery { confirm }).await
    }

    pub async fn assign_role(
        &self,
        request: &RoleAssignmentRequest,
    ) -> ClientResult<RoleAssignment> {
        self.post("/api/admin/users/role", request).await
    }

    pub async fn create_menu_item(&self, item: &MenuItemCreate) -> ClientResult<MenuItem> {
        self.post("/api/menu-items", item).await
    }

    pub async fn staff(&self) -> ClientResult<Vec<Staff>> {
        self.get("/api/staff").await
    }
}
