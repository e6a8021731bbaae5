// 账户服务
// 组合用户存储和会话管理，实现注册、登录、登出、查询资料和修改昵称

pub mod account;
pub mod model;

pub use account::AccountService;
pub use model::{
    GetUserInfoQuery, LoginRequest, LoginResponse, LogoutRequest, RegisterRequest,
    UpdateNickNameRequest, UpdateNickNameResponse, UserProfile,
};
