use std::sync::Arc;

use config::Config;
use service::AccountService;

pub mod auth;
pub mod cache;
pub mod common;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod router;
pub mod routes;
pub mod service;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AccountService>,
    pub config: Arc<Config>,
}
