//! Menu Category API 模块

mod handler;

use axum::{Router, middleware, routing::get};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu/categories", routes())
}

fn routes() -> Router<ServerState> {
    // 浏览公开；管理仅限管理员
    let public_routes = Router::new().route("/", get(handler::list));

    let manage_routes = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_role(&[Role::Admin])));

    public_routes.merge(manage_routes)
}
