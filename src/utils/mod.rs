use axum::Json;
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::common::ApiResponse;

/// 保存会话标识的 Cookie 名
pub const SESSION_COOKIE: &str = "user_session";

/// 会话令牌拼接的固定后缀
const SESSION_SUFFIX: &str = "session";

/// 由用户名、固定后缀和当前时间生成不可逆的会话令牌
pub fn generate_session_token(username: &str) -> String {
    let now = Utc::now();
    let salt = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros());
    session_digest(username, salt)
}

fn session_digest(username: &str, salt: i64) -> String {
    let source = format!("{}:{}:{}", username, SESSION_SUFFIX, salt);
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const BODY_BIND_ERROR: i32 = 10001;
    pub const INVALID_PARAMS: i32 = 10002;
    pub const ALREADY_REGISTERED: i32 = 10003;
    pub const USER_NOT_FOUND: i32 = 10004;
    pub const INVALID_CREDENTIALS: i32 = 10005;
    pub const NOT_AUTHENTICATED: i32 = 10006;
    pub const SESSION_ISSUANCE_ERROR: i32 = 10007;
    pub const PERSISTENCE_ERROR: i32 = 10008;
    pub const CACHE_ERROR: i32 = 10009;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_for_same_inputs() {
        assert_eq!(session_digest("alice", 42), session_digest("alice", 42));
        assert_ne!(session_digest("alice", 42), session_digest("alice", 43));
        assert_ne!(session_digest("alice", 42), session_digest("bob", 42));
    }

    #[test]
    fn token_is_hex_sha256() {
        let token = generate_session_token("alice");
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!token.contains("alice"));
    }
}
