/// 用户资料缓存键前缀
const USER_INFO_PREFIX: &str = "userinfo:";

/// 生成用户资料缓存键
pub fn user_info_key(username: &str) -> String {
    format!("{}{}", USER_INFO_PREFIX, username)
}
