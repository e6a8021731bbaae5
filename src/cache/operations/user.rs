use std::time::Duration;

use crate::cache::keys::user_keys;
use crate::cache::{CacheBackend, CacheError};
use crate::models::User;

/// 用户资料缓存操作
pub struct UserCacheOperations;

impl UserCacheOperations {
    /// 将用户资料写入缓存
    pub async fn cache_user(
        cache: &dyn CacheBackend,
        user: &User,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let key = user_keys::user_info_key(&user.name);
        let json = serde_json::to_string(user)?;
        cache.set_ex(&key, &json, ttl).await
    }

    /// 从缓存读取用户资料
    pub async fn get_cached_user(
        cache: &dyn CacheBackend,
        username: &str,
    ) -> Result<Option<User>, CacheError> {
        let key = user_keys::user_info_key(username);
        match cache.get(&key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 从缓存中删除用户资料
    pub async fn remove_user(cache: &dyn CacheBackend, username: &str) -> Result<bool, CacheError> {
        let key = user_keys::user_info_key(username);
        cache.del(&key).await
    }

    /// 用最新资料覆盖缓存，写入失败时删除旧条目，避免保留过期数据
    pub async fn refresh_user(
        cache: &dyn CacheBackend,
        user: &User,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        if let Err(e) = Self::cache_user(cache, user, ttl).await {
            if let Err(del_err) = Self::remove_user(cache, &user.name).await {
                tracing::error!(
                    "Failed to invalidate cached user {} after refresh failure: {}",
                    user.name,
                    del_err
                );
            }
            return Err(e);
        }
        Ok(())
    }
}
