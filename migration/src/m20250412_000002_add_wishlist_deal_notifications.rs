use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend, Statement, TransactionTrait};

use crate::backup::{backup_sqlite, main_database_file};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // 已有数据库文件时先备份，内存库直接跳过
        if let Some(db_file) = main_database_file(conn).await? {
            match backup_sqlite(&db_file, "v0.3.0") {
                Ok(path) => log::info!("[MIGRATION] Database backed up to: {}", path.display()),
                Err(e) => log::warn!("[MIGRATION] Backup failed (continuing anyway): {}", e),
            }
        }

        let txn = conn.begin().await?;

        txn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            r#"CREATE TABLE "wishlist_deal_notifications" (
                "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
                "user_id" INTEGER NOT NULL,
                "deal_id" INTEGER NOT NULL,
                "notified" BOOLEAN NOT NULL DEFAULT 0,
                "notified_at" INTEGER,
                "created_at" INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
                UNIQUE("user_id", "deal_id"),
                FOREIGN KEY("user_id") REFERENCES "users"("id") ON DELETE CASCADE,
                FOREIGN KEY("deal_id") REFERENCES "deals"("id") ON DELETE CASCADE
            )"#,
        ))
        .await?;

        txn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            r#"CREATE INDEX IF NOT EXISTS "idx_wishlist_deal_notifications_deal_id"
               ON "wishlist_deal_notifications" ("deal_id")"#,
        ))
        .await?;

        txn.commit().await?;

        log::info!("[MIGRATION] wishlist_deal_notifications table created");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                r#"DROP TABLE IF EXISTS "wishlist_deal_notifications""#,
            ))
            .await?;
        Ok(())
    }
}
