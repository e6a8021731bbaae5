/// 缓存键模块
/// 提供各种缓存键生成函数

// 用户资料缓存键
pub mod user_keys;

// 会话缓存键
pub mod session_keys;

pub use session_keys::session_key;
pub use user_keys::user_info_key;
