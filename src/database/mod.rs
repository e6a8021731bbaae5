// 数据库模块
// 用户表的存储接口及其实现

pub mod memory;
pub mod repositories;

use async_trait::async_trait;

use crate::models::{NewUser, User};

pub use memory::MemoryUserStore;
pub use repositories::user::UserRepository;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user {0} already exists")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid user row: {0}")]
    InvalidRow(String),
}

/// 用户身份存储，以用户名为唯一键
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 按用户名查询，不存在时返回 `None`
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;

    /// 插入新用户，用户名冲突时返回 `StoreError::Duplicate`
    async fn create(&self, user: &NewUser) -> Result<User, StoreError>;

    /// 按用户名更新昵称，返回受影响的行数
    async fn update_nickname(
        &self,
        name: &str,
        nickname: &str,
        modifier: &str,
    ) -> Result<u64, StoreError>;
}
