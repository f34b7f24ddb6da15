//! 折扣实体
//!
//! 从外部商店抓取的某个游戏的报价，(external_id, source) 唯一。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub game_id: i32,

    // === 来源 ===
    #[sea_orm(column_type = "Text")]
    pub external_id: String,
    #[sea_orm(column_type = "Text")]
    pub source: String,
    #[sea_orm(column_type = "Text")]
    pub title: String,

    // === 价格 ===
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    #[sea_orm(column_type = "Double")]
    pub regular_price: f64,
    pub discount_percent: i32,
    #[sea_orm(column_type = "Text")]
    pub currency: String,

    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub expires_at: Option<i64>,
    pub is_active: bool,

    // === 时间戳 ===
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::games::Entity",
        from = "Column::GameId",
        to = "super::games::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Games,
    #[sea_orm(has_many = "super::wishlist_deal_notifications::Entity")]
    WishlistDealNotifications,
}

impl Related<super::games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Games.def()
    }
}

impl Related<super::wishlist_deal_notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WishlistDealNotifications.def()
    }
}

impl Model {
    /// 截至 `now` 是否已过期
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }
}

/// 按原价与现价计算折扣百分比（四舍五入，范围 0..=100）
pub fn discount_percent(price: f64, regular_price: f64) -> i32 {
    if regular_price <= 0.0 || price >= regular_price {
        return 0;
    }
    let pct = ((regular_price - price) / regular_price * 100.0).round();
    pct.clamp(0.0, 100.0) as i32
}

impl ActiveModelBehavior for ActiveModel {}
