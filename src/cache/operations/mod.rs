/// 缓存操作
/// 在键值缓存之上读写用户快照

// 用户资料缓存操作
pub mod user;

// 会话缓存操作
pub mod session;

pub use session::SessionCacheOperations;
pub use user::UserCacheOperations;
