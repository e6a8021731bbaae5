pub mod user;

pub use user::{Gender, NewUser, User};
