use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::AuthError;
use crate::utils::{error_codes, error_to_api_response};

/// 对外可见的错误，每个变体对应一个固定错误码
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("请求体解析失败: {0}")]
    BodyBind(String),
    #[error("请求参数不合法: {0}")]
    InvalidParams(String),
    #[error("用户已注册，不能重复注册")]
    AlreadyRegistered,
    #[error("用户尚未注册")]
    UserNotFound,
    #[error("密码不正确")]
    InvalidCredentials,
    #[error("未登录或会话已过期")]
    NotAuthenticated,
    #[error("创建会话失败: {0}")]
    SessionIssuance(String),
    #[error("存储错误: {0}")]
    Persistence(String),
    #[error("缓存错误: {0}")]
    CacheUnavailable(String),
}

impl AppError {
    pub fn code(&self) -> i32 {
        match self {
            AppError::BodyBind(_) => error_codes::BODY_BIND_ERROR,
            AppError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            AppError::AlreadyRegistered => error_codes::ALREADY_REGISTERED,
            AppError::UserNotFound => error_codes::USER_NOT_FOUND,
            AppError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
            AppError::NotAuthenticated => error_codes::NOT_AUTHENTICATED,
            AppError::SessionIssuance(_) => error_codes::SESSION_ISSUANCE_ERROR,
            AppError::Persistence(_) => error_codes::PERSISTENCE_ERROR,
            AppError::CacheUnavailable(_) => error_codes::CACHE_ERROR,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BodyBind(_) | AppError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::AlreadyRegistered | AppError::UserNotFound | AppError::InvalidCredentials => {
                StatusCode::OK
            }
            AppError::SessionIssuance(_)
            | AppError::Persistence(_)
            | AppError::CacheUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::SessionNotFound | AuthError::IdentityMismatch { .. } => {
                AppError::NotAuthenticated
            }
            AuthError::UserNotFound => AppError::UserNotFound,
            AuthError::Cache(e) => AppError::CacheUnavailable(e.to_string()),
            AuthError::Store(e) => AppError::Persistence(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BodyBind(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BodyBind(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = error_to_api_response::<()>(self.code(), self.to_string());
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;
    use std::collections::HashSet;

    #[test]
    fn codes_do_not_overlap() {
        let errors = [
            AppError::BodyBind(String::new()),
            AppError::InvalidParams(String::new()),
            AppError::AlreadyRegistered,
            AppError::UserNotFound,
            AppError::InvalidCredentials,
            AppError::NotAuthenticated,
            AppError::SessionIssuance(String::new()),
            AppError::Persistence(String::new()),
            AppError::CacheUnavailable(String::new()),
        ];
        let codes: HashSet<i32> = errors.iter().map(AppError::code).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&error_codes::SUCCESS));
    }

    #[test]
    fn auth_errors_map_to_user_visible_errors() {
        assert!(matches!(
            AppError::from(AuthError::SessionNotFound),
            AppError::NotAuthenticated
        ));
        assert!(matches!(
            AppError::from(AuthError::UserNotFound),
            AppError::UserNotFound
        ));
        assert!(matches!(
            AppError::from(AuthError::Cache(CacheError::Unavailable("down".into()))),
            AppError::CacheUnavailable(_)
        ));
    }

    #[test]
    fn not_authenticated_is_401() {
        let response = AppError::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
