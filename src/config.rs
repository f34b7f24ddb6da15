//! 数据库连接配置
//!
//! 从环境变量读取，未设置时使用 wishdeal-path 解析出的本地 SQLite 文件。

use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

pub const ENV_DATABASE_URL: &str = "WISHDEAL_DATABASE_URL";
pub const ENV_FALLBACK_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_MAX_CONNECTIONS: &str = "WISHDEAL_DB_MAX_CONNECTIONS";
pub const ENV_MIN_CONNECTIONS: &str = "WISHDEAL_DB_MIN_CONNECTIONS";
pub const ENV_CONNECT_TIMEOUT: &str = "WISHDEAL_DB_CONNECT_TIMEOUT";
pub const ENV_SQLX_LOGGING: &str = "WISHDEAL_DB_SQLX_LOGGING";

const DEFAULT_MAX_CONNECTIONS: u32 = 1;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub sqlx_logging: bool,
}

impl DatabaseConfig {
    /// 使用给定连接串和默认连接池参数
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            sqlx_logging: false,
        }
    }

    /// 内存数据库（测试用）
    ///
    /// 每个连接都是一个独立的内存库，因此连接池固定为 1。
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:")
    }

    /// 从进程环境变量读取配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match lookup(ENV_DATABASE_URL).or_else(|| lookup(ENV_FALLBACK_DATABASE_URL)) {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => default_sqlite_url()?,
        };

        let mut config = Self::new(url);

        if let Some(v) = lookup(ENV_MAX_CONNECTIONS) {
            config.max_connections = parse_number(ENV_MAX_CONNECTIONS, &v)?;
        }
        if let Some(v) = lookup(ENV_MIN_CONNECTIONS) {
            config.min_connections = parse_number(ENV_MIN_CONNECTIONS, &v)?;
        }
        if let Some(v) = lookup(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout = Duration::from_secs(parse_number(ENV_CONNECT_TIMEOUT, &v)?);
        }
        if let Some(v) = lookup(ENV_SQLX_LOGGING) {
            config.sqlx_logging = parse_bool(ENV_SQLX_LOGGING, &v)?;
        }

        if config.max_connections == 0 {
            return Err(Error::Config(format!("{} 必须大于 0", ENV_MAX_CONNECTIONS)));
        }
        if config.min_connections > config.max_connections {
            return Err(Error::Config(format!(
                "{} ({}) 不能大于 {} ({})",
                ENV_MIN_CONNECTIONS,
                config.min_connections,
                ENV_MAX_CONNECTIONS,
                config.max_connections
            )));
        }

        Ok(config)
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// 本地 SQLite 数据库的连接串（自动判断便携模式）
pub fn default_sqlite_url() -> Result<String> {
    let db_path = wishdeal_path::get_db_path().map_err(Error::Config)?;
    sqlite_url_for(&db_path)
}

/// 指定文件路径的 SQLite 连接串（不存在时自动创建）
pub fn sqlite_url_for(db_path: &Path) -> Result<String> {
    // 使用 `url` crate 安全地构建连接字符串
    let db_url = Url::from_file_path(db_path)
        .map_err(|_| Error::Config(format!("Invalid database path: {}", db_path.display())))?;

    Ok(format!("sqlite:{}?mode=rwc", db_url.path()))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} 的值无效: {}", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{} 的值无效: {}", key, value))),
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
    fn explicit_url_and_pool_settings() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            (ENV_DATABASE_URL, "sqlite:/tmp/wishdeal.db?mode=rwc"),
            (ENV_MAX_CONNECTIONS, "4"),
            (ENV_MIN_CONNECTIONS, "2"),
            (ENV_CONNECT_TIMEOUT, "3"),
            (ENV_SQLX_LOGGING, "yes"),
        ]))
        .unwrap();

        assert_eq!(config.url, "sqlite:/tmp/wishdeal.db?mode=rwc");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(config.sqlx_logging);
    }

    #[test]
    fn falls_back_to_database_url() {
        let config =
            DatabaseConfig::from_lookup(lookup_from(&[(ENV_FALLBACK_DATABASE_URL, "sqlite::memory:")]))
                .unwrap();
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn rejects_invalid_numbers() {
        let err = DatabaseConfig::from_lookup(lookup_from(&[
            (ENV_DATABASE_URL, "sqlite::memory:"),
            (ENV_MAX_CONNECTIONS, "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_min_above_max() {
        let err = DatabaseConfig::from_lookup(lookup_from(&[
            (ENV_DATABASE_URL, "sqlite::memory:"),
            (ENV_MAX_CONNECTIONS, "2"),
            (ENV_MIN_CONNECTIONS, "5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_unknown_bool() {
        assert!(parse_bool(ENV_SQLX_LOGGING, "maybe").is_err());
        assert!(!parse_bool(ENV_SQLX_LOGGING, "off").unwrap());
    }
}
