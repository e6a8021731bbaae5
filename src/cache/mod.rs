// 缓存模块
// 用户资料缓存和会话缓存，两类条目各自独立设置过期时间

pub mod keys;
pub mod memory;
pub mod operations;
pub mod redis_backend;

use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryCache;
pub use operations::{SessionCacheOperations, UserCacheOperations};
pub use redis_backend::RedisCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("ttl must be at least one second, got {0:?}")]
    InvalidTtl(Duration),
}

/// 带过期时间的键值缓存
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 读取键，不存在或已过期时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 写入键并设置过期时间，不足一秒的过期时间返回 `InvalidTtl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// 删除键，返回删除前键是否存在
    async fn del(&self, key: &str) -> Result<bool, CacheError>;
}
