use axum::{body::Body, http::Request, middleware::Next, response::Response};
use axum_extra::extract::CookieJar;

use crate::error::AppError;
use crate::utils::SESSION_COOKIE;

/// 受保护路由的前置检查：没有会话 Cookie 或 Cookie 为空时直接拒绝
///
/// 这里只检查 Cookie 是否存在，会话是否有效由服务层校验。
pub async fn require_session(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(req.headers());
    match jar.get(SESSION_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => Ok(next.run(req).await),
        _ => {
            tracing::warn!("rejected {} without session cookie", req.uri().path());
            Err(AppError::NotAuthenticated)
        }
    }
}
