mod handler;

pub use handler::{get_user_info, login, logout, register, update_nick_name};
