//! 用户实体
//!
//! 账户资料、经验/等级/积分计数器以及可选的平台绑定标记。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    // === 账户 ===
    #[sea_orm(column_type = "Text", unique)]
    pub email: String,
    #[sea_orm(column_type = "Text", unique)]
    pub username: String,
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    // === 计数器 ===
    pub experience: i32,
    pub level: i32,
    pub credits: i32,

    // === 平台绑定 ===
    pub steam_connected: Option<bool>,
    pub epic_connected: Option<bool>,
    pub gog_connected: Option<bool>,

    // === 时间戳 ===
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_games::Entity")]
    UserGames,
    #[sea_orm(has_many = "super::wishlists::Entity")]
    Wishlists,
    #[sea_orm(has_many = "super::wishlist_deal_notifications::Entity")]
    WishlistDealNotifications,
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

impl Related<super::wishlist_deal_notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WishlistDealNotifications.def()
    }
}

impl Model {
    /// 是否绑定了任意一个平台账号
    pub fn has_connected_platform(&self) -> bool {
        [self.steam_connected, self.epic_connected, self.gog_connected]
            .iter()
            .any(|flag| flag.unwrap_or(false))
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Model {
        Model {
            id: 1,
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            password_hash: "argon2$secret".to_string(),
            avatar_url: None,
            bio: Some("collector".to_string()),
            experience: 1200,
            level: 2,
            credits: 50,
            steam_connected: Some(true),
            epic_connected: None,
            gog_connected: None,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        }
    }

    #[test]
    fn json_hides_password_hash_and_reads_back() {
        let user = sample();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());

        let back: Model = serde_json::from_value(json).unwrap();
        assert_eq!(back.password_hash, "");
        assert_eq!(back.username, user.username);
        assert_eq!(back.experience, user.experience);
        assert!(back.has_connected_platform());
    }
}
