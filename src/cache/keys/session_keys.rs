/// 会话缓存键前缀
const SESSION_PREFIX: &str = "session:";

/// 生成会话缓存键
pub fn session_key(token: &str) -> String {
    format!("{}{}", SESSION_PREFIX, token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::user_info_key;

    #[test]
    fn namespaces_do_not_collide() {
        assert_eq!(session_key("abc"), "session:abc");
        assert_eq!(user_info_key("abc"), "userinfo:abc");
        assert_ne!(session_key("alice"), user_info_key("alice"));
    }
}
