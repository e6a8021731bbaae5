use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::auth::SessionIdentityPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required config {0}")]
    Missing(&'static str),
    #[error("invalid config {key}={value}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// 日志输出位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogPattern {
    Stdout,
    Stderr,
    /// 按天滚动写入 `LOG_PATH`
    File,
}

impl FromStr for LogPattern {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "file" => Ok(Self::File),
            _ => Err("expected stdout, stderr or file"),
        }
    }
}

impl fmt::Display for LogPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::File => "file",
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Config {
    #[serde(skip_serializing)]
    pub database_url: String,
    #[serde(skip_serializing)]
    pub redis_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_idle_timeout_secs: u64,
    pub session_expired_secs: u64,
    pub user_expired_secs: u64,
    pub cookie_expire_secs: i64,
    pub strict_session_identity: bool,
    pub server_host: String,
    pub server_port: u16,
    pub app_name: String,
    pub app_version: String,
    pub run_mode: String,
    pub log_level: String,
    pub log_pattern: LogPattern,
    pub log_path: PathBuf,
    pub log_save_days: usize,
}

impl Config {
    /// 从 .env 文件和进程环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 通过任意键查找函数构建配置
    ///
    /// 缺少必填项、日志模式未知、过期时间为 0 时返回错误；其余无法解析的可选项使用默认值。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());
        let positive = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            let raw = optional(key, &default.to_string());
            match raw.parse::<u64>() {
                Ok(0) => Err(ConfigError::Invalid {
                    key,
                    value: raw,
                    reason: "must be greater than zero",
                }),
                Ok(value) => Ok(value),
                Err(_) => Ok(default),
            }
        };

        let log_pattern_raw = optional("LOG_PATTERN", "stdout");
        let log_pattern = log_pattern_raw
            .parse::<LogPattern>()
            .map_err(|reason| ConfigError::Invalid {
                key: "LOG_PATTERN",
                value: log_pattern_raw.clone(),
                reason,
            })?;

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", "10").parse().unwrap_or(10),
            db_min_connections: optional("DB_MIN_CONNECTIONS", "0").parse().unwrap_or(0),
            db_idle_timeout_secs: optional("DB_IDLE_TIMEOUT_SECS", "600").parse().unwrap_or(600),
            session_expired_secs: positive("SESSION_EXPIRED_SECS", 3600)?,
            user_expired_secs: positive("USER_EXPIRED_SECS", 3600)?,
            cookie_expire_secs: positive("COOKIE_EXPIRE_SECS", 3600)? as i64,
            strict_session_identity: optional("STRICT_SESSION_IDENTITY", "false")
                .parse()
                .unwrap_or(false),
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080").parse().unwrap_or(8080),
            app_name: optional("APP_NAME", env!("CARGO_PKG_NAME")),
            app_version: optional("APP_VERSION", env!("CARGO_PKG_VERSION")),
            run_mode: optional("RUN_MODE", "debug"),
            log_level: optional("LOG_LEVEL", "info"),
            log_pattern,
            log_path: PathBuf::from(optional("LOG_PATH", "logs/user-account-service.log")),
            log_save_days: optional("LOG_SAVE_DAYS", "7").parse().unwrap_or(7),
        })
    }

    pub fn session_expiration(&self) -> Duration {
        Duration::from_secs(self.session_expired_secs)
    }

    pub fn user_cache_expiration(&self) -> Duration {
        Duration::from_secs(self.user_expired_secs)
    }

    pub fn db_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.db_idle_timeout_secs)
    }

    pub fn is_release(&self) -> bool {
        self.run_mode.eq_ignore_ascii_case("release")
    }

    pub fn identity_policy(&self) -> SessionIdentityPolicy {
        if self.strict_session_identity {
            SessionIdentityPolicy::Strict
        } else {
            SessionIdentityPolicy::Lenient
        }
    }

    /// 日志目录，`LOG_PATH` 没有父目录时为当前目录
    pub fn log_dir(&self) -> &Path {
        match self.log_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// 日志文件名前缀，滚动后追加日期
    pub fn log_file_prefix(&self) -> String {
        self.log_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.app_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[("REDIS_URL", "redis://localhost")]));
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn optional_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/users"),
            ("REDIS_URL", "redis://localhost"),
            ("SESSION_EXPIRED_SECS", "not-a-number"),
        ]))
        .unwrap();

        assert_eq!(config.session_expiration(), Duration::from_secs(3600));
        assert_eq!(config.user_cache_expiration(), Duration::from_secs(3600));
        assert_eq!(config.cookie_expire_secs, 3600);
        assert_eq!(config.server_port, 8080);
        assert!(!config.is_release());
        assert_eq!(config.identity_policy(), SessionIdentityPolicy::Lenient);
        assert_eq!(config.log_pattern, LogPattern::Stdout);
        assert_eq!(config.log_save_days, 7);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/users"),
            ("REDIS_URL", "redis://localhost"),
            ("USER_EXPIRED_SECS", "120"),
            ("RUN_MODE", "release"),
            ("STRICT_SESSION_IDENTITY", "true"),
            ("DB_MAX_CONNECTIONS", "32"),
        ]))
        .unwrap();

        assert_eq!(config.user_cache_expiration(), Duration::from_secs(120));
        assert_eq!(config.db_max_connections, 32);
        assert!(config.is_release());
        assert_eq!(config.identity_policy(), SessionIdentityPolicy::Strict);
    }

    fn base_with(extra: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let mut pairs = vec![
            ("DATABASE_URL", "postgres://localhost/users"),
            ("REDIS_URL", "redis://localhost"),
        ];
        pairs.extend_from_slice(extra);
        Config::from_lookup(lookup_from(&pairs))
    }

    #[test]
    fn log_pattern_accepts_known_modes() {
        assert_eq!("stdout".parse::<LogPattern>(), Ok(LogPattern::Stdout));
        assert_eq!("STDERR".parse::<LogPattern>(), Ok(LogPattern::Stderr));
        assert_eq!("file".parse::<LogPattern>(), Ok(LogPattern::File));
        assert!("syslog".parse::<LogPattern>().is_err());
    }

    #[test]
    fn unknown_log_pattern_fails_loading() {
        let err = base_with(&[("LOG_PATTERN", "syslog")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "LOG_PATTERN", .. }
        ));
    }

    #[test]
    fn file_logging_splits_path_into_dir_and_prefix() {
        let config = base_with(&[
            ("LOG_PATTERN", "file"),
            ("LOG_PATH", "/var/log/account/app.log"),
            ("LOG_SAVE_DAYS", "30"),
        ])
        .unwrap();

        assert_eq!(config.log_pattern, LogPattern::File);
        assert_eq!(config.log_dir(), Path::new("/var/log/account"));
        assert_eq!(config.log_file_prefix(), "app.log");
        assert_eq!(config.log_save_days, 30);

        let bare = base_with(&[("LOG_PATH", "app.log")]).unwrap();
        assert_eq!(bare.log_dir(), Path::new("."));
    }

    #[test]
    fn zero_ttls_are_rejected() {
        for key in ["SESSION_EXPIRED_SECS", "USER_EXPIRED_SECS", "COOKIE_EXPIRE_SECS"] {
            let err = base_with(&[(key, "0")]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}: {err}"
            );
        }
    }
}
