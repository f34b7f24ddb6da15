//! 游戏折扣与愿望单应用的数据层
//!
//! 基于 SeaORM 的 SQLite 持久化：实体、迁移、各模型仓库与 [`WishdealClient`]。

pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod utils;

pub use config::DatabaseConfig;
pub use database::WishdealClient;
pub use error::{Error, Result};

/// 按配置连接数据库并执行迁移
pub async fn init(config: &DatabaseConfig) -> Result<WishdealClient> {
    WishdealClient::connect(config).await
}
