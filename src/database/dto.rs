//! 数据传输对象 (DTO)
//!
//! create/update 操作的输入结构。
//! 更新结构的所有字段均为 Option，允许部分更新；
//! 可空列使用 Option<Option<T>> 区分"未提供字段"和"显式设为 null"。

use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::json_list::{IdList, StringList};

/// 辅助函数：支持 Option<Option<T>> 的反序列化
/// 用于区分"未提供字段"和"显式设为 null"
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

// ==================== User ====================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertUserData {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub steam_connected: Option<bool>,
    #[serde(default)]
    pub epic_connected: Option<bool>,
    #[serde(default)]
    pub gog_connected: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateUserData {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    pub experience: Option<i32>,
    pub level: Option<i32>,
    pub credits: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub steam_connected: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    pub epic_connected: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    pub gog_connected: Option<Option<bool>>,
}

// ==================== Game ====================

/// 用于插入/同步游戏的数据结构
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertGameData {
    pub igdb_id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub release_date: Option<i64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: StringList,
    #[serde(default)]
    pub developers: StringList,
    #[serde(default)]
    pub publishers: StringList,
    #[serde(default)]
    pub screenshots: StringList,
    #[serde(default)]
    pub videos: StringList,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateGameData {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub release_date: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub rating: Option<Option<f64>>,
    pub genres: Option<StringList>,
    pub developers: Option<StringList>,
    pub publishers: Option<StringList>,
    pub screenshots: Option<StringList>,
    pub videos: Option<StringList>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_synced_at: Option<Option<i64>>,
}

// ==================== Platform ====================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertPlatformData {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub store_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdatePlatformData {
    pub slug: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub store_url: Option<Option<String>>,
}

// ==================== UserGame ====================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertUserGameData {
    pub user_id: i32,
    pub game_id: i32,
    #[serde(default = "default_true")]
    pub owned: bool,
    #[serde(default)]
    pub playtime_minutes: i32,
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub last_played_at: Option<i64>,
    #[serde(default)]
    pub platform_ids: IdList,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateUserGameData {
    pub owned: Option<bool>,
    pub playtime_minutes: Option<i32>,
    pub installed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_played_at: Option<Option<i64>>,
    pub platform_ids: Option<IdList>,
}

// ==================== Deal ====================

/// 用于插入/同步折扣的数据结构
///
/// discount_percent 未提供时由现价和原价计算。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertDealData {
    pub game_id: i32,
    pub external_id: String,
    pub source: String,
    pub title: String,
    pub price: f64,
    pub regular_price: f64,
    #[serde(default)]
    pub discount_percent: Option<i32>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub url: String,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateDealData {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub regular_price: Option<f64>,
    pub discount_percent: Option<i32>,
    pub currency: Option<String>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

// ==================== Wishlist ====================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertWishlistData {
    pub user_id: i32,
    pub game_id: i32,
    #[serde(default)]
    pub target_price: Option<f64>,
    #[serde(default = "default_true")]
    pub notify: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateWishlistData {
    #[serde(default, deserialize_with = "double_option")]
    pub target_price: Option<Option<f64>>,
    pub notify: Option<bool>,
}

// ==================== Message ====================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertMessageData {
    #[serde(default)]
    pub sender_id: Option<i32>,
    pub receiver_id: i32,
    pub content: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateMessageData {
    pub content: Option<String>,
    pub read: Option<bool>,
}

// ==================== wishlist_deal_notifications ====================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsertNotificationData {
    pub user_id: i32,
    pub deal_id: i32,
    #[serde(default)]
    pub notified: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateNotificationData {
    pub notified: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub notified_at: Option<Option<i64>>,
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_field_and_explicit_null_are_distinct() {
        let missing: UpdateGameData = serde_json::from_value(json!({ "name": "Hades" })).unwrap();
        assert_eq!(missing.name.as_deref(), Some("Hades"));
        assert_eq!(missing.summary, None);

        let cleared: UpdateGameData =
            serde_json::from_value(json!({ "summary": null, "rating": 9.1 })).unwrap();
        assert_eq!(cleared.summary, Some(None));
        assert_eq!(cleared.rating, Some(Some(9.1)));
    }

    #[test]
    fn deal_defaults() {
        let deal: InsertDealData = serde_json::from_value(json!({
            "game_id": 1,
            "external_id": "abc",
            "source": "steam",
            "title": "Hades",
            "price": 9.99,
            "regular_price": 24.99,
            "url": "https://store.example/hades"
        }))
        .unwrap();
        assert_eq!(deal.currency, "USD");
        assert!(deal.is_active);
        assert_eq!(deal.discount_percent, None);
    }

    #[test]
    fn user_game_defaults_to_owned() {
        let ug: InsertUserGameData =
            serde_json::from_value(json!({ "user_id": 1, "game_id": 2, "platform_ids": [3, 1] }))
                .unwrap();
        assert!(ug.owned);
        assert!(!ug.installed);
        assert_eq!(ug.playtime_minutes, 0);
        assert_eq!(ug.platform_ids.len(), 2);
    }

    #[test]
    fn wishlist_update_can_clear_target_price() {
        let update: UpdateWishlistData =
            serde_json::from_value(json!({ "target_price": null })).unwrap();
        assert_eq!(update.target_price, Some(None));
        assert_eq!(update.notify, None);
    }
}
