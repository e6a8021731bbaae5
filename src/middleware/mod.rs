mod auth;
mod error_handler;

pub use auth::require_session;
pub use error_handler::log_errors;
