use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend, Statement, TransactionTrait};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // 开启事务，保证所有建表操作的原子性
        let txn = conn.begin().await?;

        create_account_tables(&txn).await?;
        create_catalog_tables(&txn).await?;
        create_library_tables(&txn).await?;
        create_baseline_indexes(&txn).await?;

        txn.commit().await?;

        log::info!("[MIGRATION] baseline schema created successfully");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        let txn = conn.begin().await?;

        // 按外键依赖的逆序删除
        for table in [
            "messages",
            "wishlists",
            "deals",
            "user_games",
            "platforms",
            "games",
            "users",
        ] {
            txn.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                format!(r#"DROP TABLE IF EXISTS "{}""#, table),
            ))
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

/// 用户与私信
async fn create_account_tables<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "users" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "email" TEXT NOT NULL UNIQUE,
            "username" TEXT NOT NULL UNIQUE,
            "password_hash" TEXT NOT NULL,
            "avatar_url" TEXT,
            "bio" TEXT,
            "experience" INTEGER NOT NULL DEFAULT 0,
            "level" INTEGER NOT NULL DEFAULT 1,
            "credits" INTEGER NOT NULL DEFAULT 0,
            "steam_connected" BOOLEAN,
            "epic_connected" BOOLEAN,
            "gog_connected" BOOLEAN,
            "created_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )"#,
    ))
    .await?;

    // 发送者被删除后消息保留（sender_id 置空），接收者被删除时消息一并删除
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "messages" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "sender_id" INTEGER,
            "receiver_id" INTEGER NOT NULL,
            "content" TEXT NOT NULL,
            "read" BOOLEAN NOT NULL DEFAULT 0,
            "created_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY("sender_id") REFERENCES "users"("id") ON DELETE SET NULL,
            FOREIGN KEY("receiver_id") REFERENCES "users"("id") ON DELETE CASCADE
        )"#,
    ))
    .await?;

    Ok(())
}

/// 游戏目录、平台与折扣
async fn create_catalog_tables<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    // 数组字段以 JSON 文本存储
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "games" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "igdb_id" INTEGER NOT NULL UNIQUE,
            "name" TEXT NOT NULL,
            "slug" TEXT NOT NULL,
            "summary" TEXT,
            "cover_url" TEXT,
            "release_date" INTEGER,
            "rating" REAL,
            "genres" TEXT NOT NULL DEFAULT '[]',
            "developers" TEXT NOT NULL DEFAULT '[]',
            "publishers" TEXT NOT NULL DEFAULT '[]',
            "screenshots" TEXT NOT NULL DEFAULT '[]',
            "videos" TEXT NOT NULL DEFAULT '[]',
            "last_synced_at" INTEGER,
            "created_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )"#,
    ))
    .await?;

    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "platforms" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "slug" TEXT NOT NULL UNIQUE,
            "name" TEXT NOT NULL,
            "icon_url" TEXT,
            "store_url" TEXT
        )"#,
    ))
    .await?;

    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "deals" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "game_id" INTEGER NOT NULL,
            "external_id" TEXT NOT NULL,
            "source" TEXT NOT NULL,
            "title" TEXT NOT NULL,
            "price" REAL NOT NULL,
            "regular_price" REAL NOT NULL,
            "discount_percent" INTEGER NOT NULL DEFAULT 0,
            "currency" TEXT NOT NULL DEFAULT 'USD',
            "url" TEXT NOT NULL,
            "expires_at" INTEGER,
            "is_active" BOOLEAN NOT NULL DEFAULT 1,
            "created_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            UNIQUE("external_id", "source"),
            FOREIGN KEY("game_id") REFERENCES "games"("id") ON DELETE CASCADE
        )"#,
    ))
    .await?;

    Ok(())
}

/// 用户游戏库与愿望单
async fn create_library_tables<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "user_games" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "user_id" INTEGER NOT NULL,
            "game_id" INTEGER NOT NULL,
            "owned" BOOLEAN NOT NULL DEFAULT 1,
            "playtime_minutes" INTEGER NOT NULL DEFAULT 0,
            "installed" BOOLEAN NOT NULL DEFAULT 0,
            "last_played_at" INTEGER,
            "platform_ids" TEXT NOT NULL DEFAULT '[]',
            "created_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            "updated_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY("user_id") REFERENCES "users"("id") ON DELETE CASCADE,
            FOREIGN KEY("game_id") REFERENCES "games"("id") ON DELETE CASCADE
        )"#,
    ))
    .await?;

    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"CREATE TABLE "wishlists" (
            "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            "user_id" INTEGER NOT NULL,
            "game_id" INTEGER NOT NULL,
            "target_price" REAL,
            "notify" BOOLEAN NOT NULL DEFAULT 1,
            "created_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            UNIQUE("user_id", "game_id"),
            FOREIGN KEY("user_id") REFERENCES "users"("id") ON DELETE CASCADE,
            FOREIGN KEY("game_id") REFERENCES "games"("id") ON DELETE CASCADE
        )"#,
    ))
    .await?;

    Ok(())
}

async fn create_baseline_indexes<C>(conn: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let indexes = [
        ("idx_games_slug", "games", "slug"),
        ("idx_games_name", "games", "name"),
        ("idx_games_last_synced_at", "games", "last_synced_at"),
        ("idx_deals_game_id", "deals", "game_id"),
        ("idx_deals_source", "deals", "source"),
        ("idx_deals_price", "deals", "price"),
        ("idx_user_games_user_id", "user_games", "user_id"),
        ("idx_user_games_game_id", "user_games", "game_id"),
        ("idx_wishlists_game_id", "wishlists", "game_id"),
        ("idx_messages_sender_id", "messages", "sender_id"),
        ("idx_messages_receiver_id", "messages", "receiver_id"),
    ];

    for (index_name, table_name, column_name) in &indexes {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!(
                r#"CREATE INDEX IF NOT EXISTS "{}" ON "{}" ("{}")"#,
                index_name, table_name, column_name
            ),
        ))
        .await?;
    }

    Ok(())
}
