// 认证与会话管理
// 会话的签发、校验、撤销，以及先查缓存再查库的用户资料读取

pub mod policy;
pub mod session;

use crate::cache::CacheError;
use crate::database::StoreError;

pub use policy::SessionIdentityPolicy;
pub use session::SessionManager;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("session not found")]
    SessionNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("session belongs to {session_user}, not {requested}")]
    IdentityMismatch {
        session_user: String,
        requested: String,
    },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
