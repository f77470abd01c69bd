//! Order API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::request::PaginationQuery;
use shared::{ApiResponse, PaginatedResponse};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderStatus};
use crate::db::repository::OrderRepository;
use crate::ordering::OrderAnalytics;
use crate::utils::{AppError, AppResult, ok, ok_with_message};

/// POST /api/orders - 下单 (游客或登录顾客)
pub async fn place(
    State(state): State<ServerState>,
    user: Option<Extension<CurrentUser>>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let engine = state.ordering_engine();
    let customer = user.map(|Extension(u)| u.id);
    let order = engine.place_order(payload, customer).await?;
    Ok(ok_with_message(order, "Order placed successfully"))
}

/// Query params for staff order listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    /// Table id ("dining_table:xxx")
    pub table: Option<String>,
    /// "asc" | "desc" (default desc, by creation time)
    pub order: Option<String>,
}

/// GET /api/orders - 订单列表 (跑堂/管理员)
pub async fn list(
    State(state): State<ServerState>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Order>>>> {
    let descending = query.order.as_deref() != Some("asc");

    let repo = OrderRepository::new(state.db.clone());
    let (orders, total) = repo
        .list(
            query.status,
            query.table.as_deref(),
            pagination.limit(),
            pagination.offset(),
            descending,
        )
        .await?;

    Ok(ok(PaginatedResponse::new(
        orders,
        pagination.page,
        pagination.limit(),
        total,
    )))
}

/// GET /api/orders/:id - 获取单个订单 (跑堂/管理员)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(ok(order))
}

/// Status update payload
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    /// Unix millis
    pub estimated_ready_time: Option<i64>,
}

/// PATCH /api/orders/:id/status - 履约状态流转 (跑堂/管理员)
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let engine = state.ordering_engine();
    let order = engine
        .transition(&id, payload.status, payload.estimated_ready_time)
        .await?;
    Ok(ok_with_message(order, "Order status updated successfully"))
}

/// Query params for customer order listing
#[derive(Debug, Deserialize)]
pub struct MyOrdersQuery {
    pub status: Option<OrderStatus>,
}

/// GET /api/orders/me - 当前顾客的订单
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<MyOrdersQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Order>>>> {
    let repo = OrderRepository::new(state.db.clone());
    let (orders, total) = repo
        .list_for_customer(&user.id, query.status, pagination.limit(), pagination.offset())
        .await?;

    Ok(ok(PaginatedResponse::new(
        orders,
        pagination.page,
        pagination.limit(),
        total,
    )))
}

/// GET /api/orders/me/:id - 当前顾客的单个订单
///
/// 非本人订单按不存在处理。
pub async fn get_mine(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .find_by_id(&id)
        .await?
        .filter(|o| {
            o.customer
                .as_ref()
                .is_some_and(|c| c.to_string() == user.id)
        })
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(ok(order))
}

/// PATCH /api/orders/me/:id/cancel - 顾客撤单
///
/// 只能撤自己的单，且只在 placed / preparing 阶段。
pub async fn cancel_mine(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let engine = state.ordering_engine();
    let order = engine.cancel_for_customer(&id, &user.id).await?;
    Ok(ok_with_message(order, "Order canceled successfully"))
}

/// GET /api/orders/analytics - 订单统计 (管理员)
pub async fn analytics(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<OrderAnalytics>>> {
    let engine = state.ordering_engine();
    let analytics = engine.analytics().await?;
    Ok(ok(analytics))
}
