mod common;

use sea_orm::{ColumnTrait, Condition};
use wishdeal::database::dto::{InsertWishlistData, UpdateWishlistData};
use wishdeal::database::{GamesRepository, WishlistsRepository};
use wishdeal::entity::wishlists;
use wishdeal::Error;

use common::{create_game, create_user, setup};

fn wish(user_id: i32, game_id: i32, target_price: Option<f64>) -> InsertWishlistData {
    InsertWishlistData {
        user_id,
        game_id,
        target_price,
        notify: true,
    }
}

#[tokio::test]
async fn user_and_game_pair_is_unique() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Tunic").await;

    WishlistsRepository::create(client.db(), wish(user.id, game.id, None))
        .await
        .unwrap();
    let err: Error = WishlistsRepository::create(client.db(), wish(user.id, game.id, Some(5.0)))
        .await
        .unwrap_err()
        .into();
    assert!(err.is_unique_violation());

    assert!(WishlistsRepository::contains(client.db(), user.id, game.id)
        .await
        .unwrap());
    assert!(!WishlistsRepository::contains(client.db(), user.id + 1, game.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn upsert_updates_target_price() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Tunic").await;

    let first = WishlistsRepository::upsert(client.db(), wish(user.id, game.id, Some(20.0)))
        .await
        .unwrap();
    let mut data = wish(user.id, game.id, Some(12.5));
    data.notify = false;
    let second = WishlistsRepository::upsert(client.db(), data).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.target_price, Some(12.5));
    assert!(!second.notify);
    assert_eq!(
        WishlistsRepository::count(client.db(), Condition::all())
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn negative_target_price_is_rejected() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Tunic").await;

    assert!(
        WishlistsRepository::create(client.db(), wish(user.id, game.id, Some(-1.0)))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn update_can_clear_target_price() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let game = create_game(&client, 1, "Tunic").await;
    let item = WishlistsRepository::create(client.db(), wish(user.id, game.id, Some(9.99)))
        .await
        .unwrap();

    let updated = WishlistsRepository::update(
        client.db(),
        item.id,
        UpdateWishlistData {
            target_price: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.target_price, None);
    assert!(updated.notify);

    let muted = WishlistsRepository::update_many(
        client.db(),
        Condition::all().add(wishlists::Column::UserId.eq(user.id)),
        UpdateWishlistData {
            notify: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(muted, 1);
}

#[tokio::test]
async fn wishlist_with_games_newest_first() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let a = create_game(&client, 1, "First").await;
    let b = create_game(&client, 2, "Second").await;

    WishlistsRepository::create(client.db(), wish(user.id, a.id, None))
        .await
        .unwrap();
    WishlistsRepository::create(client.db(), wish(user.id, b.id, None))
        .await
        .unwrap();

    let items = WishlistsRepository::with_games(client.db(), user.id)
        .await
        .unwrap();
    let names: Vec<_> = items
        .iter()
        .filter_map(|(_, game)| game.as_ref().map(|g| g.name.as_str()))
        .collect();
    assert_eq!(names, ["Second", "First"]);
}

#[tokio::test]
async fn most_wishlisted_groups_by_game() {
    let client = setup().await;
    let users = [
        create_user(&client, "alice").await,
        create_user(&client, "bob").await,
        create_user(&client, "carol").await,
    ];
    let popular = create_game(&client, 1, "Popular").await;
    let niche = create_game(&client, 2, "Niche").await;

    for user in &users {
        WishlistsRepository::create(client.db(), wish(user.id, popular.id, None))
            .await
            .unwrap();
    }
    WishlistsRepository::create(client.db(), wish(users[0].id, niche.id, None))
        .await
        .unwrap();

    let top = WishlistsRepository::most_wishlisted(client.db(), 10)
        .await
        .unwrap();
    assert_eq!(top, vec![(popular.id, 3), (niche.id, 1)]);

    let top_one = WishlistsRepository::most_wishlisted(client.db(), 1)
        .await
        .unwrap();
    assert_eq!(top_one, vec![(popular.id, 3)]);
}

#[tokio::test]
async fn remove_and_cascade_from_game() {
    let client = setup().await;
    let user = create_user(&client, "alice").await;
    let a = create_game(&client, 1, "Kept").await;
    let b = create_game(&client, 2, "Deleted").await;
    WishlistsRepository::create(client.db(), wish(user.id, a.id, None))
        .await
        .unwrap();
    WishlistsRepository::create(client.db(), wish(user.id, b.id, None))
        .await
        .unwrap();

    assert!(WishlistsRepository::remove(client.db(), user.id, a.id)
        .await
        .unwrap());
    assert!(!WishlistsRepository::remove(client.db(), user.id, a.id)
        .await
        .unwrap());

    GamesRepository::delete(client.db(), b.id).await.unwrap();
    assert_eq!(
        WishlistsRepository::count(client.db(), Condition::all())
            .await
            .unwrap(),
        0
    );
}
