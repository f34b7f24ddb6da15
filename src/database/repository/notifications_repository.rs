//! 愿望单折扣通知仓库
//!
//! 每个 (user_id, deal_id) 只通知一次，匹配逻辑见 [`NotificationsRepository::pending_matches`]。

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::database::dto::{InsertNotificationData, UpdateNotificationData};
use crate::database::query::FindManyArgs;
use crate::database::repository::crud;
use crate::entity::prelude::*;
use crate::entity::wishlist_deal_notifications as notifications;

/// 一条待通知的愿望单折扣匹配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult)]
pub struct WishlistDealMatch {
    pub user_id: i32,
    pub wishlist_id: i32,
    pub game_id: i32,
    pub deal_id: i32,
    pub price: f64,
    pub target_price: Option<f64>,
    pub source: String,
}

/// 冲突时的 notified_at：再次标记保留首次通知时间，重置为未通知时清空
const NOTIFIED_AT_ON_CONFLICT: &str = "CASE WHEN excluded.notified \
     THEN COALESCE(wishlist_deal_notifications.notified_at, excluded.notified_at) \
     ELSE NULL END";

const PENDING_MATCHES_SQL: &str = r#"
    SELECT
        w."user_id" AS user_id,
        w."id" AS wishlist_id,
        w."game_id" AS game_id,
        d."id" AS deal_id,
        d."price" AS price,
        w."target_price" AS target_price,
        d."source" AS source
    FROM "wishlists" w
    JOIN "deals" d ON d."game_id" = w."game_id"
    WHERE w."notify" = 1
      AND d."is_active" = 1
      AND (w."target_price" IS NULL OR d."price" <= w."target_price")
      AND NOT EXISTS (
          SELECT 1 FROM "wishlist_deal_notifications" n
          WHERE n."user_id" = w."user_id"
            AND n."deal_id" = d."id"
            AND n."notified" = 1
      )
"#;

/// 通知记录仓库
pub struct NotificationsRepository;

impl NotificationsRepository {
    pub async fn create<C>(
        db: &C,
        entry: InsertNotificationData,
    ) -> Result<notifications::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();

        notifications::ActiveModel {
            id: NotSet,
            user_id: Set(entry.user_id),
            deal_id: Set(entry.deal_id),
            notified: Set(entry.notified),
            notified_at: Set(entry.notified.then_some(now)),
            created_at: Set(now),
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<Option<notifications::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        WishlistDealNotifications::find_by_id(id).one(db).await
    }

    pub async fn find_by_user_and_deal<C>(
        db: &C,
        user_id: i32,
        deal_id: i32,
    ) -> Result<Option<notifications::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        WishlistDealNotifications::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::DealId.eq(deal_id))
            .one(db)
            .await
    }

    pub async fn find_many<C>(
        db: &C,
        args: FindManyArgs<notifications::Column>,
    ) -> Result<Vec<notifications::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_many::<WishlistDealNotifications, C>(db, args).await
    }

    pub async fn count<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::count::<WishlistDealNotifications, C>(db, filter).await
    }

    pub async fn update<C>(
        db: &C,
        id: i32,
        updates: UpdateNotificationData,
    ) -> Result<notifications::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        notifications::ActiveModel {
            id: Set(id),
            notified: updates.notified.map_or(NotSet, Set),
            notified_at: updates.notified_at.map_or(NotSet, Set),
            ..Default::default()
        }
        .update(db)
        .await
    }

    /// 按 (user_id, deal_id) upsert，冲突时覆盖通知状态
    pub async fn upsert<C>(
        db: &C,
        entry: InsertNotificationData,
    ) -> Result<notifications::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        let (user_id, deal_id) = (entry.user_id, entry.deal_id);

        let active = notifications::ActiveModel {
            id: NotSet,
            user_id: Set(entry.user_id),
            deal_id: Set(entry.deal_id),
            notified: Set(entry.notified),
            notified_at: Set(entry.notified.then_some(now)),
            created_at: Set(now),
        };

        WishlistDealNotifications::insert(active)
            .on_conflict(
                OnConflict::columns([
                    notifications::Column::UserId,
                    notifications::Column::DealId,
                ])
                .update_column(notifications::Column::Notified)
                .value(
                    notifications::Column::NotifiedAt,
                    Expr::cust(NOTIFIED_AT_ON_CONFLICT),
                )
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::find_by_user_and_deal(db, user_id, deal_id)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "Notification ({}, {}) not found",
                    user_id, deal_id
                ))
            })
    }

    pub async fn delete<C>(db: &C, id: i32) -> Result<DeleteResult, DbErr>
    where
        C: ConnectionTrait,
    {
        WishlistDealNotifications::delete_by_id(id).exec(db).await
    }

    pub async fn delete_many<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::delete_many::<WishlistDealNotifications, C>(db, filter).await
    }

    // ==================== 匹配与投递 ====================

    /// 尚未通知的愿望单折扣匹配
    ///
    /// 条件：愿望单开启提醒，折扣有效，价格不高于期望价（未设期望价时任意折扣都算），
    /// 且不存在 notified = 1 的通知记录。结果按用户、价格排序。
    pub async fn pending_matches<C>(
        db: &C,
        user_id: Option<i32>,
    ) -> Result<Vec<WishlistDealMatch>, DbErr>
    where
        C: ConnectionTrait,
    {
        let order = r#" ORDER BY w."user_id" ASC, d."price" ASC, d."id" ASC"#;
        let statement = match user_id {
            Some(user_id) => Statement::from_sql_and_values(
                db.get_database_backend(),
                format!(r#"{} AND w."user_id" = ?{}"#, PENDING_MATCHES_SQL, order),
                [user_id.into()],
            ),
            None => Statement::from_string(
                db.get_database_backend(),
                format!("{}{}", PENDING_MATCHES_SQL, order),
            ),
        };

        WishlistDealMatch::find_by_statement(statement).all(db).await
    }

    /// 标记某个折扣已通知给用户
    pub async fn mark_notified<C>(
        db: &C,
        user_id: i32,
        deal_id: i32,
    ) -> Result<notifications::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::upsert(
            db,
            InsertNotificationData {
                user_id,
                deal_id,
                notified: true,
            },
        )
        .await
    }

    /// 批量标记（事务内执行），返回处理条数
    pub async fn mark_notified_many<C>(db: &C, matches: &[WishlistDealMatch]) -> Result<u64, DbErr>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        if matches.is_empty() {
            return Ok(0);
        }

        let txn = db.begin().await?;
        for m in matches {
            Self::mark_notified(&txn, m.user_id, m.deal_id).await?;
        }
        txn.commit().await?;

        log::debug!("已标记 {} 条愿望单折扣通知", matches.len());
        Ok(matches.len() as u64)
    }
}
