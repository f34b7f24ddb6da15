use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl From<log::LevelFilter> for LogLevel {
    fn from(level: log::LevelFilter) -> Self {
        match level {
            log::LevelFilter::Error => LogLevel::Error,
            log::LevelFilter::Warn => LogLevel::Warn,
            log::LevelFilter::Info => LogLevel::Info,
            log::LevelFilter::Debug => LogLevel::Debug,
            log::LevelFilter::Trace => LogLevel::Trace,
            log::LevelFilter::Off => LogLevel::Off,
        }
    }
}

/// 解析日志级别字符串（不区分大小写）
pub fn parse_level(level: &str) -> Result<log::LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "error" => Ok(log::LevelFilter::Error),
        "warn" => Ok(log::LevelFilter::Warn),
        "info" => Ok(log::LevelFilter::Info),
        "debug" => Ok(log::LevelFilter::Debug),
        "trace" => Ok(log::LevelFilter::Trace),
        "off" => Ok(log::LevelFilter::Off),
        other => Err(Error::InvalidInput(format!("无效的日志级别: {}", other))),
    }
}

/// 动态设置日志输出级别（不持久化）
pub fn set_log_level(level: &str) -> Result<()> {
    log::set_max_level(parse_level(level)?);
    Ok(())
}

/// 获取当前日志级别
pub fn get_log_level() -> LogLevel {
    log::max_level().into()
}

/// 安装 pretty_env_logger
///
/// 默认级别为 info，`RUST_LOG` 优先；重复调用时忽略。
pub fn init_logger() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        log::debug!("logger 已初始化，跳过");
    }
}
