#![allow(dead_code)]

use wishdeal::database::dto::{InsertDealData, InsertGameData, InsertUserData};
use wishdeal::database::{DealsRepository, GamesRepository, UsersRepository};
use wishdeal::entity::{deals, games, users};
use wishdeal::{DatabaseConfig, WishdealClient};

/// 内存数据库 + 全部迁移
pub async fn setup() -> WishdealClient {
    WishdealClient::connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to set up in-memory database")
}

pub fn user_data(name: &str) -> InsertUserData {
    InsertUserData {
        email: format!("{}@example.com", name),
        username: name.to_string(),
        password_hash: "$argon2id$v=19$hash".to_string(),
        avatar_url: None,
        bio: None,
        steam_connected: None,
        epic_connected: None,
        gog_connected: None,
    }
}

pub fn game_data(igdb_id: i64, name: &str) -> InsertGameData {
    InsertGameData {
        igdb_id,
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        summary: None,
        cover_url: None,
        release_date: None,
        rating: None,
        genres: Default::default(),
        developers: Default::default(),
        publishers: Default::default(),
        screenshots: Default::default(),
        videos: Default::default(),
    }
}

pub fn deal_data(game_id: i32, external_id: &str, source: &str, price: f64) -> InsertDealData {
    InsertDealData {
        game_id,
        external_id: external_id.to_string(),
        source: source.to_string(),
        title: format!("{} @ {}", external_id, source),
        price,
        regular_price: 60.0,
        discount_percent: None,
        currency: "USD".to_string(),
        url: format!("https://{}.example.com/{}", source, external_id),
        expires_at: None,
        is_active: true,
    }
}

pub async fn create_user(client: &WishdealClient, name: &str) -> users::Model {
    UsersRepository::create(client.db(), user_data(name))
        .await
        .expect("Failed to create user")
}

pub async fn create_game(client: &WishdealClient, igdb_id: i64, name: &str) -> games::Model {
    GamesRepository::create(client.db(), game_data(igdb_id, name))
        .await
        .expect("Failed to create game")
}

pub async fn create_deal(
    client: &WishdealClient,
    game_id: i32,
    external_id: &str,
    source: &str,
    price: f64,
) -> deals::Model {
    DealsRepository::create(client.db(), deal_data(game_id, external_id, source, price))
        .await
        .expect("Failed to create deal")
}
