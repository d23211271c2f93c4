//! Reservation API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    // 公开路由：创建 + 查询
    let public_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/apply-coupon", post(handler::apply_coupon));

    // 管理路由：状态迁移 (confirm / cancel / complete)
    let manage_routes = Router::new()
        .route("/upcoming", get(handler::upcoming))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/complete", post(handler::complete));

    public_routes.merge(manage_routes)
}
