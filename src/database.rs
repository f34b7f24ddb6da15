pub mod client;
pub mod db;
pub mod dto;
pub mod query;
pub mod repository;

// 重新导出常用类型方便使用
pub use client::WishdealClient;
pub use query::{FindManyArgs, NumericAggregate, SortOrder};
pub use repository::*;
