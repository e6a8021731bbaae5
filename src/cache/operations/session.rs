use std::time::Duration;

use crate::cache::keys::session_keys;
use crate::cache::{CacheBackend, CacheError};
use crate::models::User;

/// 会话缓存操作，会话条目保存登录时的用户快照
pub struct SessionCacheOperations;

impl SessionCacheOperations {
    /// 缓存会话
    pub async fn cache_session(
        cache: &dyn CacheBackend,
        token: &str,
        user: &User,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let key = session_keys::session_key(token);
        let json = serde_json::to_string(user)?;
        cache.set_ex(&key, &json, ttl).await
    }

    /// 获取会话
    pub async fn get_session(
        cache: &dyn CacheBackend,
        token: &str,
    ) -> Result<Option<User>, CacheError> {
        let key = session_keys::session_key(token);
        match cache.get(&key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 删除会话，返回会话删除前是否存在
    pub async fn remove_session(cache: &dyn CacheBackend, token: &str) -> Result<bool, CacheError> {
        let key = session_keys::session_key(token);
        cache.del(&key).await
    }
}
