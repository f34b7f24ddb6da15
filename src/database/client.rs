//! 数据库客户端
//!
//! 持有连接，负责启动时迁移、事务与关闭。各模型的操作通过仓库完成：
//!
//! ```ignore
//! let client = WishdealClient::connect(&DatabaseConfig::from_env()?).await?;
//! let user = UsersRepository::find_by_email(client.db(), "a@b.c").await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use migration::backup::main_database_file;
use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait};

use crate::config::DatabaseConfig;
use crate::database::db::{self, BackupResult};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct WishdealClient {
    db: DatabaseConnection,
}

impl WishdealClient {
    /// 建立连接并执行所有未应用的迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db = db::establish_connection(config).await?;
        log::info!("数据库连接建立成功");

        log::info!("开始执行数据库迁移...");
        if let Err(e) = Migrator::up(&db, None).await {
            log::error!("数据库迁移失败: {}", e);
            return Err(e.into());
        }
        log::info!("数据库迁移完成");

        Ok(Self { db })
    }

    /// 使用已有连接（不执行迁移）
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 在事务中执行回调：返回 Ok 时提交，返回 Err 时回滚
    ///
    /// ```ignore
    /// client
    ///     .transaction(|txn| {
    ///         Box::pin(async move {
    ///             let user = UsersRepository::create(txn, data).await?;
    ///             WishlistsRepository::create(txn, entry(user.id)).await?;
    ///             Ok(user)
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn transaction<F, T>(&self, callback: F) -> Result<T>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'c>>
            + Send,
        T: Send,
    {
        self.db
            .transaction::<F, T, Error>(callback)
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) => Error::from(e),
                TransactionError::Transaction(e) => e,
            })
    }

    /// 手动开启事务，未提交的事务在 drop 时回滚
    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        Ok(self.db.begin().await?)
    }

    /// 热备份到指定目录，内存库没有可备份的文件
    pub async fn backup(&self, backup_dir: &Path) -> Result<BackupResult> {
        if main_database_file(&self.db).await?.is_none() {
            return Err(Error::InvalidInput("内存数据库无法备份".to_string()));
        }
        Ok(db::backup_database(&self.db, backup_dir).await?)
    }

    /// 关闭连接
    pub async fn close(self) -> Result<()> {
        db::close_connection(self.db).await?;
        log::info!("数据库连接已成功关闭");
        Ok(())
    }
}
