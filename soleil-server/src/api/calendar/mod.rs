//! Calendar API 模块

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/calendar", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由 (公开)
    let read_routes = Router::new()
        .route("/", get(handler::get_calendar))
        .route("/resolve/{date}", get(handler::resolve_date));

    // 管理路由 (覆盖日 + 定休日设定)
    let manage_routes = Router::new()
        .route("/days", put(handler::upsert_day))
        .route("/holidays", put(handler::replace_holidays));

    read_routes.merge(manage_routes)
}
