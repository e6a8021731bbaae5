use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

pub mod system;
pub mod user;

/// JSON 请求体，解析失败时返回统一的错误响应
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// 查询参数，解析失败时返回统一的错误响应
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
