mod common;

use sea_orm::{ColumnTrait, Condition};
use wishdeal::database::dto::{InsertUserGameData, UpdateUserGameData};
use wishdeal::database::{
    FindManyArgs, LibrarySort, LibraryStats, SortOrder, UserGamesRepository, UsersRepository,
};
use wishdeal::entity::json_list::IdList;
use wishdeal::entity::user_games;
use wishdeal::Error;

use common::{create_game, create_user, setup};

fn entry(user_id: i32, game_id: i32) -> InsertUserGameData {
    InsertUserGameData {
        user_id,
        game_id,
        owned: true,
        playtime_minutes: 0,
        installed: false,
        last_played_at: None,
        platform_ids: IdList::default(),
    }
}

#[tokio::test]
async fn create_normalizes_platform_ids() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Factorio").await;

    let mut data = entry(user.id, game.id);
    data.platform_ids = IdList::from(vec![3, 1, 3, 2]);
    let row = UserGamesRepository::create(client.db(), data).await.unwrap();

    assert_eq!(row.platform_ids.to_vec(), vec![1, 2, 3]);
    assert!(row.owned);

    let found = UserGamesRepository::find_for_user_and_game(client.db(), user.id, game.id)
        .await
        .unwrap();
    assert_eq!(found.map(|r| r.id), Some(row.id));
}

#[tokio::test]
async fn foreign_keys_are_enforced() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;

    let err: Error = UserGamesRepository::create(client.db(), entry(user.id, 999))
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, Error::ForeignKeyViolation(_)), "{:?}", err);
}

#[tokio::test]
async fn playtime_increment_is_atomic_and_touches_last_played() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Rimworld").await;
    let row = UserGamesRepository::create(client.db(), entry(user.id, game.id))
        .await
        .unwrap();

    UserGamesRepository::add_playtime(client.db(), row.id, 45)
        .await
        .unwrap();
    let row = UserGamesRepository::add_playtime(client.db(), row.id, 30)
        .await
        .unwrap();

    assert_eq!(row.playtime_minutes, 75);
    assert!(row.last_played_at.is_some());

    assert!(UserGamesRepository::add_playtime(client.db(), row.id, -5)
        .await
        .is_err());
    let err: Error = UserGamesRepository::add_playtime(client.db(), row.id + 1, 5)
        .await
        .unwrap_err()
        .into();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn add_platform_keeps_list_sorted() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Outer Wilds").await;
    let mut data = entry(user.id, game.id);
    data.platform_ids = IdList::from(vec![5]);
    let row = UserGamesRepository::create(client.db(), data).await.unwrap();

    let row = UserGamesRepository::add_platform(client.db(), row.id, 2)
        .await
        .unwrap();
    assert_eq!(row.platform_ids.to_vec(), vec![2, 5]);

    let again = UserGamesRepository::add_platform(client.db(), row.id, 5)
        .await
        .unwrap();
    assert_eq!(again.platform_ids.to_vec(), vec![2, 5]);
}

#[tokio::test]
async fn playtime_refuses_to_overflow() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Factorio").await;
    let mut data = entry(user.id, game.id);
    data.playtime_minutes = i32::MAX - 10;
    let row = UserGamesRepository::create(client.db(), data).await.unwrap();

    let err: Error = UserGamesRepository::add_playtime(client.db(), row.id, 11)
        .await
        .unwrap_err()
        .into();
    assert!(!err.is_not_found());

    let row = UserGamesRepository::add_playtime(client.db(), row.id, 10)
        .await
        .unwrap();
    assert_eq!(row.playtime_minutes, i32::MAX);
}

#[tokio::test]
async fn concurrent_add_platform_keeps_both() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Stardew Valley").await;
    let mut data = entry(user.id, game.id);
    data.platform_ids = IdList::from(vec![5]);
    let row = UserGamesRepository::create(client.db(), data).await.unwrap();

    let (a, b) = tokio::join!(
        UserGamesRepository::add_platform(client.db(), row.id, 2),
        UserGamesRepository::add_platform(client.db(), row.id, 3),
    );
    a.unwrap();
    b.unwrap();

    let row = UserGamesRepository::find_by_id_or_throw(client.db(), row.id)
        .await
        .unwrap();
    assert_eq!(row.platform_ids.to_vec(), vec![2, 3, 5]);
}

#[tokio::test]
async fn library_joins_games_and_sorts() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let other = create_user(&client, "bob").await;
    let a = create_game(&client, 1, "Alpha").await;
    let b = create_game(&client, 2, "Beta").await;

    let mut first = entry(user.id, a.id);
    first.playtime_minutes = 10;
    UserGamesRepository::create(client.db(), first).await.unwrap();
    let mut second = entry(user.id, b.id);
    second.playtime_minutes = 300;
    UserGamesRepository::create(client.db(), second).await.unwrap();
    UserGamesRepository::create(client.db(), entry(other.id, a.id))
        .await
        .unwrap();

    let library =
        UserGamesRepository::library(client.db(), user.id, LibrarySort::Playtime, SortOrder::Desc)
            .await
            .unwrap();
    let names: Vec<_> = library
        .iter()
        .map(|(_, game)| game.as_ref().map(|g| g.name.clone()).unwrap_or_default())
        .collect();
    assert_eq!(names, ["Beta", "Alpha"]);
}

#[tokio::test]
async fn update_many_and_find_many() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    for igdb_id in 1..=3 {
        let game = create_game(&client, igdb_id, &format!("Game {}", igdb_id)).await;
        UserGamesRepository::create(client.db(), entry(user.id, game.id))
            .await
            .unwrap();
    }

    let affected = UserGamesRepository::update_many(
        client.db(),
        Condition::all().add(user_games::Column::UserId.eq(user.id)),
        UpdateUserGameData {
            installed: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(affected, 3);

    let installed = UserGamesRepository::find_many(
        client.db(),
        FindManyArgs::new()
            .filter(user_games::Column::Installed.eq(true))
            .order_by(user_games::Column::Id, SortOrder::Desc)
            .take(2),
    )
    .await
    .unwrap();
    assert_eq!(installed.len(), 2);
    assert!(installed[0].id > installed[1].id);

    let row = UserGamesRepository::update(
        client.db(),
        installed[0].id,
        UpdateUserGameData {
            owned: Some(false),
            last_played_at: Some(Some(1_700_000_000)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(!row.owned);
    assert!(row.installed);
    assert_eq!(row.last_played_at, Some(1_700_000_000));
}

#[tokio::test]
async fn stats_group_by_user() {
    let client = setup().await;
    let alice = create_user(&client, "alice").await;
    let bob = create_user(&client, "bob").await;
    let g1 = create_game(&client, 1, "One").await;
    let g2 = create_game(&client, 2, "Two").await;

    for (user_id, game_id, minutes, installed) in [
        (alice.id, g1.id, 120, true),
        (alice.id, g2.id, 30, false),
        (bob.id, g1.id, 0, false),
    ] {
        let mut data = entry(user_id, game_id);
        data.playtime_minutes = minutes;
        data.installed = installed;
        UserGamesRepository::create(client.db(), data).await.unwrap();
    }

    let stats = UserGamesRepository::stats_by_user(client.db(), Condition::all())
        .await
        .unwrap();
    assert_eq!(
        stats,
        vec![
            LibraryStats {
                user_id: alice.id,
                games: 2,
                installed: 1,
                total_playtime: 150,
            },
            LibraryStats {
                user_id: bob.id,
                games: 1,
                installed: 0,
                total_playtime: 0,
            },
        ]
    );
}

#[tokio::test]
async fn deleting_user_cascades_to_library() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Cascade").await;
    UserGamesRepository::create(client.db(), entry(user.id, game.id))
        .await
        .unwrap();

    UsersRepository::delete(client.db(), user.id).await.unwrap();
    assert_eq!(
        UserGamesRepository::count(client.db(), Condition::all())
            .await
            .unwrap(),
        0
    );
}
