//! Dining Table API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::patch};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    // 扫码入口：顾客唯一能访问的桌台接口
    let public_routes = Router::new().route("/by-slug/{slug}", get(handler::get_by_slug));

    // 桌台管理与二维码生成仅限管理员
    let manage_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        // 固定路径段先于 /{id} 注册，避免被捕获
        .route("/qr/bulk-generate", get(handler::bulk_generate_qr))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/toggle-status", patch(handler::toggle_status))
        .route("/{id}/qr", get(handler::generate_qr))
        .layer(middleware::from_fn(require_role(&[Role::Admin])));

    public_routes.merge(manage_routes)
}
