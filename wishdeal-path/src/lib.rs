use std::path::{Path, PathBuf};

/// 数据库相关路径常量
pub const DB_DATA_DIR: &str = "data";
pub const DB_FILE_NAME: &str = "wishdeal.db";
pub const DB_BACKUP_SUBDIR: &str = "backups";
pub const RESOURCE_DIR: &str = "resources";

/// 判断是否处于便携模式
///
/// 检测逻辑：检查可执行文件同级目录下是否存在 resources/data/wishdeal.db
pub fn is_portable_mode() -> bool {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let portable_data_dir = exe_dir.join(RESOURCE_DIR).join(DB_DATA_DIR);
            let portable_db_file = portable_data_dir.join(DB_FILE_NAME);
            return portable_data_dir.exists() && portable_db_file.exists();
        }
    }
    false
}

/// 获取基础数据目录
pub fn get_base_data_dir() -> Result<PathBuf, String> {
    get_base_data_dir_for_mode(is_portable_mode())
}

/// 获取指定模式的基础数据目录
pub fn get_base_data_dir_for_mode(portable: bool) -> Result<PathBuf, String> {
    if portable {
        // 便携模式：使用可执行文件所在目录的 resources 子目录
        let exe_path =
            std::env::current_exe().map_err(|e| format!("无法获取可执行文件路径: {}", e))?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| "无法获取可执行文件父目录".to_string())?;
        Ok(exe_dir.join(RESOURCE_DIR))
    } else {
        get_system_data_dir()
    }
}

/// 获取系统数据目录（跨平台）
fn get_system_data_dir() -> Result<PathBuf, String> {
    use directories::ProjectDirs;

    let dirs = ProjectDirs::from("dev", "wishdeal", "wishdeal")
        .ok_or_else(|| "无法获取系统目录信息".to_string())?;
    Ok(dirs.data_dir().to_path_buf())
}

/// 获取数据库文件路径
pub fn get_db_path() -> Result<PathBuf, String> {
    Ok(get_base_data_dir()?.join(DB_DATA_DIR).join(DB_FILE_NAME))
}

/// 获取默认的数据库备份路径
pub fn get_default_db_backup_path() -> Result<PathBuf, String> {
    Ok(get_base_data_dir()?
        .join(DB_DATA_DIR)
        .join(DB_BACKUP_SUBDIR))
}

/// 给定数据库文件，返回与其同级的备份目录
///
/// 数据库文件没有父目录时（例如相对路径 `wishdeal.db`）使用当前目录。
pub fn backup_dir_for(db_file: &Path) -> PathBuf {
    db_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
        .join(DB_BACKUP_SUBDIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_dir_sits_next_to_database() {
        let dir = backup_dir_for(Path::new("/var/lib/wishdeal/data/wishdeal.db"));
        assert_eq!(dir, PathBuf::from("/var/lib/wishdeal/data/backups"));
    }

    #[test]
    fn backup_dir_for_bare_file_name() {
        assert_eq!(backup_dir_for(Path::new("wishdeal.db")), PathBuf::from("backups"));
    }

    #[test]
    fn db_path_ends_with_data_file() {
        if let Ok(path) = get_db_path() {
            assert!(path.ends_with(Path::new(DB_DATA_DIR).join(DB_FILE_NAME)));
        }
    }
}
