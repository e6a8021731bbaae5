use serde::{Deserialize, Serialize};

use crate::models::{Gender, User};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "user_name", default)]
    pub username: String,
    #[serde(rename = "pass_word", default)]
    pub password: String,
    #[serde(default)]
    pub age: i32,
    #[serde(default)]
    pub gender: String,
    #[serde(rename = "nick_name", default)]
    pub nickname: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "user_name", default)]
    pub username: String,
    #[serde(rename = "pass_word", default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "user_name")]
    pub username: String,
}

/// 登出请求，用户名只用于日志，不与会话核对
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(rename = "user_name", default)]
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetUserInfoQuery {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNickNameRequest {
    #[serde(rename = "user_name", default)]
    pub username: String,
    #[serde(rename = "new_nick_name", default)]
    pub new_nickname: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateNickNameResponse {
    pub affected_rows: u64,
}

/// 对外公开的用户资料，不含密码
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "user_name")]
    pub username: String,
    pub age: i32,
    pub gender: Gender,
    #[serde(rename = "nick_name")]
    pub nickname: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.name,
            age: user.age,
            gender: user.gender,
            nickname: user.nickname,
        }
    }
}
