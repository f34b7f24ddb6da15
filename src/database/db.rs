use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, RuntimeErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::config::DatabaseConfig;

const MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// 数据库备份结果
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupResult {
    pub success: bool,
    pub path: Option<String>,
    pub message: String,
}

// ==================== 数据库连接管理 ====================

/// Establish a SeaORM database connection.
pub async fn establish_connection(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    // 1. 本地 SQLite 文件：确保所在目录存在
    if let Some(db_path) = sqlite_file_path(&config.url) {
        if !db_path.exists() {
            if let Some(parent) = db_path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    DbErr::Conn(RuntimeErr::Internal(format!("无法创建数据库目录: {}", e)))
                })?;
            }
            log::info!("首次启动，创建数据库: {}", db_path.display());
        } else {
            log::info!("使用数据库: {}", db_path.display());
        }
    }

    // 2. 设置连接选项
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .sqlx_logging(config.sqlx_logging);

    // 内存库的每个连接都是独立的数据库，不能让空闲连接被回收
    if config.is_in_memory() {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONNECTION_LIFETIME)
            .max_lifetime(MEMORY_CONNECTION_LIFETIME);
    }

    log::debug!("Database connection string: {}", options.get_url());

    // 3. 连接数据库
    Database::connect(options).await
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}

/// 从 `sqlite:` 连接串中取出数据库文件路径，内存库返回 `None`
///
/// 连接串里的路径是百分号编码的（例如空格写作 `%20`），这里借助 file URL 解码，
/// 相对路径按当前工作目录解析。
pub fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    if path.is_empty() || path.starts_with(":memory:") || query.contains("mode=memory") {
        return None;
    }

    let file_url = if Path::new(path).is_absolute() || path.starts_with('/') {
        Url::parse(&format!("file:///{}", path.trim_start_matches('/'))).ok()?
    } else {
        let cwd = std::env::current_dir().ok()?;
        Url::from_directory_path(cwd).ok()?.join(path).ok()?
    };
    file_url.to_file_path().ok()
}

// ==================== 数据库备份 ====================

/// 生成带时间戳的备份文件名
fn generate_backup_filename() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    format!("wishdeal_{}.db", timestamp)
}

/// 使用 VACUUM INTO 进行数据库热备份
///
/// 此方法使用 SQLite 的 VACUUM INTO 语句，可以在数据库正在使用时安全地创建备份。
///
/// # Arguments
///
/// * `db` - 当前数据库连接
/// * `backup_dir` - 备份目录，不存在时自动创建
pub async fn backup_database(
    db: &DatabaseConnection,
    backup_dir: &Path,
) -> Result<BackupResult, DbErr> {
    if !backup_dir.exists() {
        fs::create_dir_all(backup_dir)
            .map_err(|e| DbErr::Custom(format!("无法创建备份目录: {}", e)))?;
    }

    let target_path = backup_dir.join(generate_backup_filename());

    // SQLite 在 Windows 上也支持正斜杠，使用正斜杠可以避免转义问题
    let target_path_str = target_path
        .to_str()
        .ok_or_else(|| DbErr::Custom("备份路径包含无效字符".to_string()))?
        .replace('\\', "/");

    // 只需要转义单引号
    let escaped_path = target_path_str.replace('\'', "''");
    let vacuum_sql = format!("VACUUM INTO '{}'", escaped_path);

    db.execute_unprepared(&vacuum_sql)
        .await
        .map_err(|e| DbErr::Custom(format!("VACUUM INTO 备份失败: {}", e)))?;

    if !target_path.exists() {
        return Err(DbErr::Custom(format!(
            "备份文件未生成: {}",
            target_path_str
        )));
    }

    log::info!("数据库热备份成功: {}", target_path_str);

    Ok(BackupResult {
        success: true,
        path: Some(target_path_str),
        message: "数据库备份成功".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn file_path_from_sqlite_url() {
        assert_eq!(
            sqlite_file_path("sqlite:/var/lib/wishdeal/wishdeal.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/wishdeal/wishdeal.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite://data/wishdeal.db"),
            Some(std::env::current_dir().unwrap().join("data/wishdeal.db"))
        );
    }

    #[test]
    #[cfg(unix)]
    fn file_path_is_percent_decoded() {
        assert_eq!(
            sqlite_file_path("sqlite:/tmp/Application%20Support/wishdeal.db?mode=rwc"),
            Some(PathBuf::from("/tmp/Application Support/wishdeal.db"))
        );
    }

    #[test]
    fn memory_and_foreign_urls_have_no_file() {
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("sqlite:shared.db?mode=memory"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/wishdeal"), None);
    }
}
