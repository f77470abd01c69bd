//! Menu Item API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::patch, routing::post};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/menu/items", routes())
        // 菜单统计挂在 /api/menu 下，避开 items/{id} 路径捕获
        .route(
            "/api/menu/analytics",
            get(handler::analytics)
                .layer(middleware::from_fn(require_role(&[Role::Admin]))),
        )
}

fn routes() -> Router<ServerState> {
    // 浏览公开
    let public_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // 菜品维护仅限管理员
    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_role(&[Role::Admin])));

    // 上下架开关：跑堂也能操作
    let toggle_routes = Router::new()
        .route("/{id}/toggle-availability", patch(handler::toggle_availability))
        .layer(middleware::from_fn(require_role(&[Role::Staff, Role::Admin])));

    public_routes.merge(manage_routes).merge(toggle_routes)
}
