//! 游戏数据实体
//!
//! 从外部元数据源（IGDB）同步的游戏目录条目，
//! 类型/开发商/发行商/截图/视频以 JSON 数组列存储。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::json_list::StringList;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    // === 外部 ID ===
    #[sea_orm(unique)]
    pub igdb_id: i64,

    // === 基础信息 ===
    #[sea_orm(column_type = "Text")]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub cover_url: Option<String>,
    pub release_date: Option<i64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub rating: Option<f64>,

    // === JSON 数组列 ===
    #[sea_orm(column_type = "Text")]
    pub genres: StringList,
    #[sea_orm(column_type = "Text")]
    pub developers: StringList,
    #[sea_orm(column_type = "Text")]
    pub publishers: StringList,
    #[sea_orm(column_type = "Text")]
    pub screenshots: StringList,
    #[sea_orm(column_type = "Text")]
    pub videos: StringList,

    // === 同步与时间戳 ===
    pub last_synced_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::deals::Entity")]
    Deals,
    #[sea_orm(has_many = "super::user_games::Entity")]
    UserGames,
    #[sea_orm(has_many = "super::wishlists::Entity")]
    Wishlists,
}

impl Related<super::deals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deals.def()
    }
}

impl Related<super::user_games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGames.def()
    }
}

impl Related<super::wishlists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishlists.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
