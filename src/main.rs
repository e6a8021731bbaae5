use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use account_service::{
    AppState,
    auth::SessionManager,
    cache::RedisCache,
    config::{Config, LogPattern},
    database::UserRepository,
    router::create_router,
    service::AccountService,
};
use sqlx::postgres::PgPoolOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 初始化日志，文件模式下 guard 需要活到进程结束
    let _log_guard = init_tracing(&config);

    tracing::info!(
        "Starting {} {} in {} mode",
        config.app_name,
        config.app_version,
        config.run_mode
    );

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .idle_timeout(config.db_idle_timeout())
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 建立 Redis 连接，所有请求共用
    let cache = RedisCache::connect(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");
    cache.ping().await.expect("Failed to ping Redis");

    // 组装服务
    let store = Arc::new(UserRepository::new(pool));
    let sessions = SessionManager::new(
        Arc::new(cache),
        store.clone(),
        config.session_expiration(),
        config.user_cache_expiration(),
    );
    let service = AccountService::new(store, sessions, config.identity_policy());

    let state = AppState {
        service: Arc::new(service),
        config: Arc::new(config),
    };

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    let app = create_router(state);

    // 启动服务器
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_pattern {
        LogPattern::Stdout => {
            registry.with(tracing_subscriber::fmt::layer()).init();
            None
        }
        LogPattern::Stderr => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            None
        }
        LogPattern::File => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(config.log_file_prefix())
                .max_log_files(config.log_save_days.max(1))
                .build(config.log_dir())
                .expect("Failed to create log file appender");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
    }
}
