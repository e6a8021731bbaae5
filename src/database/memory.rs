use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::{StoreError, UserStore};
use crate::models::{NewUser, User};

/// 进程内用户存储，用于测试和本地调试
///
/// 记录 `find_by_name` 的调用次数，方便观察缓存是否生效。
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
    next_id: AtomicI64,
    reads: AtomicUsize,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `find_by_name` 被调用的次数
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// 绕过接口直接读取，不计入读取次数
    pub async fn snapshot(&self, name: &str) -> Option<User> {
        self.users.read().await.get(name).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.read().await.get(name).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.name) {
            return Err(StoreError::Duplicate(user.name.clone()));
        }

        let now = Utc::now();
        let stored = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: user.name.clone(),
            password: user.password.clone(),
            age: user.age,
            gender: user.gender,
            nickname: user.nickname.clone(),
            creator: user.creator().to_string(),
            modifier: user.creator().to_string(),
            created_at: now,
            updated_at: now,
        };
        users.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_nickname(
        &self,
        name: &str,
        nickname: &str,
        modifier: &str,
    ) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(name) {
            Some(user) => {
                user.nickname = nickname.to_string();
                user.modifier = modifier.to_string();
                user.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
