use axum::extract::State;

use crate::AppState;

/// 健康检查，返回应用信息和当前配置（不含连接串）
pub async fn ping(State(state): State<AppState>) -> String {
    let config = &state.config;
    let conf_info = serde_json::to_string_pretty(config.as_ref()).unwrap_or_default();
    format!(
        "app_name: {}\nversion: {}\n\n{}",
        config.app_name, config.app_version, conf_info
    )
}
