mod common;

use std::path::{Path, PathBuf};

use migration::{Migrator, MigratorTrait};
use sea_orm::{Condition, ConnectionTrait, DbBackend, Statement, TransactionTrait};
use wishdeal::config::sqlite_url_for;
use wishdeal::database::dto::InsertWishlistData;
use wishdeal::database::{NotificationsRepository, UsersRepository, WishlistsRepository};
use wishdeal::{DatabaseConfig, Error, WishdealClient};

use common::{create_game, setup, user_data};

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "wishdeal-{}-test-{}-{}",
        tag,
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ))
}

async fn table_exists(client: &WishdealClient, table: &str) -> bool {
    let row = client
        .db()
        .query_one(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ?",
            [table.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap() > 0
}

#[tokio::test]
async fn connect_applies_all_migrations() {
    let client = setup().await;
    let pending = Migrator::get_pending_migrations(client.db()).await.unwrap();
    assert!(pending.is_empty());
    let applied = Migrator::get_applied_migrations(client.db()).await.unwrap();
    assert_eq!(applied.len(), 2);
}

#[tokio::test]
async fn transaction_commits_on_ok() {
    let client = setup().await;
    let game = create_game(&client, 1, "Balatro").await;
    let game_id = game.id;

    let user = client
        .transaction(|txn| {
            Box::pin(async move {
                let user = UsersRepository::create(txn, user_data("alice")).await?;
                WishlistsRepository::create(
                    txn,
                    InsertWishlistData {
                        user_id: user.id,
                        game_id,
                        target_price: Some(10.0),
                        notify: true,
                    },
                )
                .await?;
                Ok::<_, Error>(user)
            })
        })
        .await
        .unwrap();

    assert!(WishlistsRepository::contains(client.db(), user.id, game_id)
        .await
        .unwrap());
}

#[tokio::test]
async fn transaction_rolls_back_on_err() {
    let client = setup().await;

    let result = client
        .transaction(|txn| {
            Box::pin(async move {
                UsersRepository::create(txn, user_data("alice")).await?;
                // 重复用户名，触发唯一约束
                let mut dup = user_data("bob");
                dup.username = "alice".to_string();
                UsersRepository::create(txn, dup).await?;
                Ok::<_, Error>(())
            })
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_unique_violation(), "{:?}", err);
    assert_eq!(
        UsersRepository::count(client.db(), Condition::all())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn transaction_rolls_back_on_application_error() {
    let client = setup().await;

    let result: Result<(), Error> = client
        .transaction(|txn| {
            Box::pin(async move {
                UsersRepository::create(txn, user_data("alice")).await?;
                Err(Error::InvalidInput("abort".to_string()))
            })
        })
        .await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(UsersRepository::find_by_username(client.db(), "alice")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn manual_transaction_drops_uncommitted_writes() {
    let client = setup().await;

    {
        let txn = client.begin().await.unwrap();
        UsersRepository::create(&txn, user_data("alice")).await.unwrap();
        txn.rollback().await.unwrap();
    }

    let txn = client.db().begin().await.unwrap();
    UsersRepository::create(&txn, user_data("bob")).await.unwrap();
    txn.commit().await.unwrap();

    let users = UsersRepository::find_many(client.db(), Default::default())
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "bob");
}

#[tokio::test]
async fn backup_writes_database_copy() {
    let dir = temp_dir("backup");
    let url = sqlite_url_for(&dir.join("wishdeal.db")).unwrap();
    let client = WishdealClient::connect(&DatabaseConfig::new(url))
        .await
        .unwrap();
    create_game(&client, 1, "Backup Me").await;

    let result = client.backup(&dir.join("backups")).await.unwrap();

    assert!(result.success);
    let path = result.path.unwrap();
    assert!(Path::new(&path).exists());

    client.close().await.unwrap();
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn backup_of_memory_database_is_rejected() {
    let client = setup().await;
    let dir = temp_dir("backup-memory");

    let err = client.backup(&dir).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "{:?}", err);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn database_path_with_spaces_is_created() {
    let dir = temp_dir("space");
    let db_path = dir.join("Application Support").join("wishdeal.db");
    let url = sqlite_url_for(&db_path).unwrap();
    assert!(url.contains("%20"));

    let client = WishdealClient::connect(&DatabaseConfig::new(url))
        .await
        .unwrap();
    UsersRepository::create(client.db(), user_data("alice"))
        .await
        .unwrap();
    client.close().await.unwrap();

    assert!(db_path.exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn migrate_down_then_up_restores_schema() {
    let client = setup().await;

    Migrator::down(client.db(), Some(1)).await.unwrap();
    assert!(!table_exists(&client, "wishlist_deal_notifications").await);
    assert!(table_exists(&client, "deals").await);
    let pending = Migrator::get_pending_migrations(client.db()).await.unwrap();
    let names: Vec<_> = pending.iter().map(|m| m.name().to_string()).collect();
    assert_eq!(names, ["m20250412_000002_add_wishlist_deal_notifications"]);

    Migrator::up(client.db(), None).await.unwrap();
    assert!(table_exists(&client, "wishlist_deal_notifications").await);
    assert!(Migrator::get_pending_migrations(client.db())
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        NotificationsRepository::count(client.db(), Condition::all())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn file_database_is_created_and_reopened() {
    let dir = temp_dir("file");
    let db_path = dir.join("data").join("wishdeal.db");
    let url = format!("sqlite:{}?mode=rwc", db_path.display());

    let client = WishdealClient::connect(&DatabaseConfig::new(url.clone()))
        .await
        .unwrap();
    UsersRepository::create(client.db(), user_data("alice"))
        .await
        .unwrap();
    client.close().await.unwrap();
    assert!(db_path.exists());

    let reopened = wishdeal::init(&DatabaseConfig::new(url)).await.unwrap();
    assert!(UsersRepository::find_by_username(reopened.db(), "alice")
        .await
        .unwrap()
        .is_some());
    reopened.close().await.unwrap();

    std::fs::remove_dir_all(&dir).ok();
}
