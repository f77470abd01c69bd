//! Order API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::patch, routing::post};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // 下单: 游客与登录顾客均可 (认证中间件对该路径做可选认证)
    let place_routes = Router::new().route("/", post(handler::place));

    // 顾客自己的订单
    let customer_routes = Router::new()
        .route("/me", get(handler::list_mine))
        .route("/me/{id}", get(handler::get_mine))
        .route(
            "/me/{id}/cancel",
            patch(handler::cancel_mine)
                .layer(middleware::from_fn(require_role(&[Role::Customer]))),
        );

    // 履约面: 跑堂与管理员
    let staff_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_role(&[Role::Staff, Role::Admin])));

    // 统计: 仅管理员
    let analytics_routes = Router::new()
        .route("/analytics", get(handler::analytics))
        .layer(middleware::from_fn(require_role(&[Role::Admin])));

    place_routes
        .merge(customer_routes)
        .merge(analytics_routes)
        .merge(staff_routes)
}
