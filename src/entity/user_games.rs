//! 用户游戏库实体
//!
//! User 与 Game 的关联表，记录拥有/游玩时长/安装状态。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::json_list::IdList;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub game_id: i32,

    // === 状态 ===
    pub owned: bool,
    pub playtime_minutes: i32,
    pub installed: bool,
    pub last_played_at: Option<i64>,

    /// 关联的平台 ID（platforms.id），JSON 数组
    #[sea_orm(column_type = "Text")]
    pub platform_ids: IdList,

    // === 时间戳 ===
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::games::Entity",
        from = "Column::GameId",
        to = "super::games::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Games,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Games.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
