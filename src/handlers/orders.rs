use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::order::{
    items_subtotal, CustomerInfo, Order, OrderFilter, OrderItem, OrderStats, OrderStatus,
};
use crate::domain::pincode::Pincode;
use crate::errors::AppError;
use crate::handlers::admin::Admin;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerDto {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    /// 6-digit delivery pincode.
    pub pincode: String,
    pub notes: Option<String>,
}

impl From<CustomerDto> for CustomerInfo {
    fn from(c: CustomerDto) -> Self {
        let optional = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        CustomerInfo {
            name: c.name.trim().to_string(),
            phone: c.phone.trim().to_string(),
            email: optional(c.email),
            address: c.address.trim().to_string(),
            city: c.city.trim().to_string(),
            pincode: c.pincode,
            notes: optional(c.notes),
        }
    }
}

impl From<CustomerInfo> for CustomerDto {
    fn from(c: CustomerInfo) -> Self {
        CustomerDto {
            name: c.name,
            phone: c.phone,
            email: c.email,
            address: c.address,
            city: c.city,
            pincode: c.pincode,
            notes: c.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemDto {
    pub name: String,
    /// Whole rupees.
    pub unit_price: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub customer: CustomerDto,
    pub items: Vec<OrderItemDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: String,
    pub customer: CustomerDto,
    pub items: Vec<OrderItemDto>,
    pub subtotal: i64,
    pub shipping: i64,
    pub total: i64,
    pub status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            order_id: o.order_id,
            customer: o.customer.into(),
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemDto {
                    name: i.name,
                    unit_price: i.unit_price,
                    quantity: i.quantity,
                })
                .collect(),
            subtotal: o.subtotal,
            shipping: o.shipping,
            total: o.total,
            status: o.status.to_string(),
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// pending, processing, shipped, delivered or cancelled.
    pub status: Option<String>,
    /// Only orders placed with this email (case-insensitive).
    pub customer_email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
    pub cancelled: usize,
    pub revenue: i64,
}

impl From<OrderStats> for StatsResponse {
    fn from(s: OrderStats) -> Self {
        StatsResponse {
            total: s.total,
            pending: s.pending,
            processing: s.processing,
            shipped: s.shipped,
            delivered: s.delivered,
            cancelled: s.cancelled,
            revenue: s.revenue,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Checkout. The subtotal and delivery charge are computed here from the
/// submitted lines and pincode; the order starts out `pending`.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 422, description = "Invalid pincode, empty cart, bad line or out-of-range total"),
        (status = 503, description = "Order store unavailable, retry"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    Pincode::parse(&body.customer.pincode)?;

    let order = web::block(move || {
        let items: Vec<OrderItem> = body
            .items
            .into_iter()
            .map(|l| OrderItem {
                name: l.name.trim().to_string(),
                unit_price: l.unit_price,
                quantity: l.quantity,
            })
            .collect();
        let subtotal = items_subtotal(&items)?;
        let quote = state.delivery.calculate(&body.customer.pincode, subtotal);
        state
            .orders
            .create_order(body.customer.into(), items, subtotal, &quote)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{order_id}
///
/// Tracking lookup by the public order id. Case and surrounding whitespace
/// are ignored.
#[utoipa::path(
    get,
    path = "/orders/{order_id}",
    params(
        ("order_id" = String, Path, description = "Public tracking id, e.g. FRY-M5X2K1-7QK3ZP0A9B"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || state.orders.get_order(&order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// All orders, newest first, optionally narrowed by status or customer email.
#[utoipa::path(
    get,
    path = "/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Orders", body = [OrderResponse]),
        (status = 401, description = "Admin credentials required"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    _admin: Admin,
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = OrderFilter {
        status: params
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()?,
        customer_email: params.customer_email,
    };

    let orders = web::block(move || state.orders.list_orders(&filter))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/stats
///
/// Counts per status and revenue from delivered orders.
#[utoipa::path(
    get,
    path = "/orders/stats",
    responses(
        (status = 200, description = "Order statistics", body = StatsResponse),
        (status = 401, description = "Admin credentials required"),
    ),
    tag = "orders"
)]
pub async fn order_stats(
    _admin: Admin,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let stats = web::block(move || state.orders.stats())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(StatsResponse::from(stats)))
}

/// POST /orders/{order_id}/status
///
/// Moves the order to the next lifecycle step, or cancels it.
#[utoipa::path(
    post,
    path = "/orders/{order_id}/status",
    params(("order_id" = String, Path, description = "Public tracking id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed from the current status"),
    ),
    tag = "orders"
)]
pub async fn transition_status(
    admin: Admin,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<StatusChangeRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let next: OrderStatus = body.status.parse()?;
    log::info!("Admin '{}' requests {order_id} -> {next}", admin.username);

    let order = web::block(move || state.orders.transition_status(&order_id, next))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /orders/{order_id}/status
///
/// Sets any status, bypassing lifecycle checks. For correcting mistakes.
#[utoipa::path(
    put,
    path = "/orders/{order_id}/status",
    params(("order_id" = String, Path, description = "Public tracking id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status overridden", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn force_status(
    admin: Admin,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<StatusChangeRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status: OrderStatus = body.status.parse()?;
    log::warn!("Admin '{}' overrides {order_id} -> {status}", admin.username);

    let order = web::block(move || state.orders.force_status(&order_id, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
