use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbErr, Statement};
use wishdeal_path::backup_dir_for;

/// 查询当前连接所使用的 SQLite 主库文件
///
/// 内存数据库没有文件，返回 `None`。
pub async fn main_database_file<C>(conn: &C) -> Result<Option<PathBuf>, DbErr>
where
    C: ConnectionTrait,
{
    let row = conn
        .query_one(Statement::from_string(
            conn.get_database_backend(),
            "PRAGMA database_list",
        ))
        .await?;

    let file = match row {
        Some(row) => row.try_get::<Option<String>>("", "file")?,
        None => None,
    };

    Ok(file
        .filter(|f| !f.trim().is_empty())
        .map(PathBuf::from)
        .filter(|p| p.exists()))
}

/// 备份 SQLite 数据库文件
///
/// 备份文件写入数据库所在目录的 `backups/` 子目录，
/// 文件名中带有迁移版本和时间戳。
pub fn backup_sqlite(db_path: &Path, version: &str) -> Result<PathBuf, DbErr> {
    let target_dir = backup_dir_for(db_path);

    fs::create_dir_all(&target_dir)
        .map_err(|e| DbErr::Custom(format!("Failed to create backup dir: {}", e)))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = target_dir.join(format!("wishdeal_{}_{}.db", version, timestamp));

    fs::copy(db_path, &backup_path)
        .map_err(|e| DbErr::Custom(format!("Failed to copy database: {}", e)))?;

    Ok(backup_path)
}
