//! 错误类型

use sea_orm::{DbErr, SqlErr};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("数据库错误: {0}")]
    Database(DbErr),

    #[error("违反唯一约束: {0}")]
    UniqueViolation(String),

    #[error("违反外键约束: {0}")]
    ForeignKeyViolation(String),

    #[error("记录不存在: {0}")]
    NotFound(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("参数无效: {0}")]
    InvalidInput(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => return Error::NotFound(msg.clone()),
            DbErr::RecordNotUpdated => return Error::NotFound("record not updated".to_string()),
            _ => {}
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Error::UniqueViolation(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Error::ForeignKeyViolation(msg),
            _ => Error::Database(err),
        }
    }
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Error::UniqueViolation(_))
    }
}
