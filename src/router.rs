use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    middleware::{log_errors, require_session},
    routes,
};

// 无需登录的路由
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(routes::system::ping))
        .route("/user/register", post(routes::user::register))
        .route("/user/login", post(routes::user::login))
        .route("/user/logout", post(routes::user::logout))
}

// 需要会话 Cookie 的路由
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/user/get_user_info", get(routes::user::get_user_info))
        .route("/user/update_nick_name", post(routes::user::update_nick_name))
        .layer(axum::middleware::from_fn(require_session))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .layer(axum::middleware::from_fn(log_errors));

    // 非 release 模式允许任意来源跨域
    let router = if state.config.is_release() {
        router
    } else {
        tracing::debug!("Adding permissive CORS layer");
        router.layer(CorsLayer::permissive())
    };

    router.with_state(state)
}
