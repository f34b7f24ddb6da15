//! 数据实体模块
//!
//! 包含所有 SeaORM 实体定义和 JSON 列数据结构。

pub mod prelude;

// === JSON 数据结构（嵌入数组列）===
pub mod json_list;

// === SeaORM 实体（对应数据库表）===
pub mod deals;
pub mod games;
pub mod messages;
pub mod platforms;
pub mod user_games;
pub mod users;
pub mod wishlist_deal_notifications;
pub mod wishlists;
