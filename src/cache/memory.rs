use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::cache::{CacheBackend, CacheError};

/// 进程内缓存后端，过期判断使用 tokio 时钟
///
/// 可以通过开关模拟读写失败。
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让后续的 get 返回错误
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// 让后续的 set_ex 返回错误
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// 当前未过期的条目数量
    pub async fn live_entries(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("read refused".into()));
        }

        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("write refused".into()));
        }
        if ttl.as_secs() == 0 {
            return Err(CacheError::InvalidTtl(ttl));
        }

        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self.entries.lock().await;
        match entries.remove(key) {
            Some((_, expires_at)) => Ok(expires_at > Instant::now()),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = MemoryCache::new();
        cache.set_ex("k", "v", Duration::from_secs(10)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.live_entries().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn del_reports_whether_a_live_entry_existed() {
        let cache = MemoryCache::new();
        assert!(!cache.del("missing").await.unwrap());

        cache.set_ex("k", "v", Duration::from_secs(5)).await.unwrap();
        assert!(cache.del("k").await.unwrap());
        assert!(!cache.del("k").await.unwrap());

        cache.set_ex("k", "v", Duration::from_secs(5)).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(!cache.del("k").await.unwrap());
    }

    #[tokio::test]
    async fn failure_switches_affect_only_their_direction() {
        let cache = MemoryCache::new();
        cache.set_ex("k", "v", Duration::from_secs(60)).await.unwrap();

        cache.set_fail_writes(true);
        assert!(cache.set_ex("k", "w", Duration::from_secs(60)).await.is_err());
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        cache.set_fail_reads(true);
        assert!(matches!(cache.get("k").await, Err(CacheError::Unavailable(_))));
    }

    #[tokio::test]
    async fn sub_second_ttl_is_rejected() {
        let cache = MemoryCache::new();

        let err = cache.set_ex("k", "v", Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidTtl(_)));
        assert_eq!(cache.live_entries().await, 0);
    }
}
