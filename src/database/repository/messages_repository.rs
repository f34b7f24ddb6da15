//! 私信数据仓库

use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::database::dto::{InsertMessageData, UpdateMessageData};
use crate::database::query::FindManyArgs;
use crate::database::repository::crud;
use crate::entity::messages::{self, SenderLink};
use crate::entity::prelude::*;
use crate::entity::users;

/// 私信数据仓库
pub struct MessagesRepository;

impl MessagesRepository {
    /// 发送私信，内容去除首尾空白后不能为空
    pub async fn create<C>(db: &C, message: InsertMessageData) -> Result<messages::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let content = message.content.trim();
        if content.is_empty() {
            return Err(DbErr::Custom("私信内容不能为空".to_string()));
        }

        messages::ActiveModel {
            id: NotSet,
            sender_id: Set(message.sender_id),
            receiver_id: Set(message.receiver_id),
            content: Set(content.to_string()),
            read: Set(false),
            created_at: Set(chrono::Utc::now().timestamp()),
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<Option<messages::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Messages::find_by_id(id).one(db).await
    }

    pub async fn find_by_id_or_throw<C>(db: &C, id: i32) -> Result<messages::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Message {} not found", id)))
    }

    pub async fn find_many<C>(
        db: &C,
        args: FindManyArgs<messages::Column>,
    ) -> Result<Vec<messages::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_many::<Messages, C>(db, args).await
    }

    pub async fn count<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::count::<Messages, C>(db, filter).await
    }

    pub async fn update<C>(
        db: &C,
        id: i32,
        updates: UpdateMessageData,
    ) -> Result<messages::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let content = match updates.content {
            Some(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    return Err(DbErr::Custom("私信内容不能为空".to_string()));
                }
                Set(trimmed.to_string())
            }
            None => NotSet,
        };

        messages::ActiveModel {
            id: Set(id),
            content,
            read: updates.read.map_or(NotSet, Set),
            ..Default::default()
        }
        .update(db)
        .await
    }

    pub async fn delete<C>(db: &C, id: i32) -> Result<DeleteResult, DbErr>
    where
        C: ConnectionTrait,
    {
        Messages::delete_by_id(id).exec(db).await
    }

    pub async fn delete_many<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::delete_many::<Messages, C>(db, filter).await
    }

    // ==================== 收发箱 ====================

    /// 收件箱，最新的在前
    pub async fn inbox<C>(
        db: &C,
        receiver_id: i32,
        unread_only: bool,
    ) -> Result<Vec<messages::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut query = Messages::find().filter(messages::Column::ReceiverId.eq(receiver_id));
        if unread_only {
            query = query.filter(messages::Column::Read.eq(false));
        }
        query
            .order_by_desc(messages::Column::CreatedAt)
            .order_by_desc(messages::Column::Id)
            .all(db)
            .await
    }

    /// 发件箱，最新的在前
    pub async fn outbox<C>(db: &C, sender_id: i32) -> Result<Vec<messages::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Messages::find()
            .filter(messages::Column::SenderId.eq(sender_id))
            .order_by_desc(messages::Column::CreatedAt)
            .order_by_desc(messages::Column::Id)
            .all(db)
            .await
    }

    /// 两个用户之间的会话，按时间正序
    pub async fn conversation<C>(db: &C, a: i32, b: i32) -> Result<Vec<messages::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Messages::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(messages::Column::SenderId.eq(a))
                            .add(messages::Column::ReceiverId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(messages::Column::SenderId.eq(b))
                            .add(messages::Column::ReceiverId.eq(a)),
                    ),
            )
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(db)
            .await
    }

    /// 收件箱并附带发送者（发送者已注销时为 None）
    pub async fn inbox_with_senders<C>(
        db: &C,
        receiver_id: i32,
    ) -> Result<Vec<(messages::Model, Option<users::Model>)>, DbErr>
    where
        C: ConnectionTrait,
    {
        Messages::find()
            .find_also_linked(SenderLink)
            .filter(messages::Column::ReceiverId.eq(receiver_id))
            .order_by_desc(messages::Column::CreatedAt)
            .order_by_desc(messages::Column::Id)
            .all(db)
            .await
    }

    pub async fn unread_count<C>(db: &C, receiver_id: i32) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::count(
            db,
            Condition::all()
                .add(messages::Column::ReceiverId.eq(receiver_id))
                .add(messages::Column::Read.eq(false)),
        )
        .await
    }

    pub async fn mark_read<C>(db: &C, id: i32) -> Result<messages::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::update(
            db,
            id,
            UpdateMessageData {
                read: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    /// 将收件箱标记为已读，可限定发送者；返回受影响行数
    pub async fn mark_all_read<C>(
        db: &C,
        receiver_id: i32,
        sender_id: Option<i32>,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut query = Messages::update_many()
            .col_expr(messages::Column::Read, Expr::value(true))
            .filter(messages::Column::ReceiverId.eq(receiver_id))
            .filter(messages::Column::Read.eq(false));
        if let Some(sender_id) = sender_id {
            query = query.filter(messages::Column::SenderId.eq(sender_id));
        }
        query.exec(db).await.map(|result| result.rows_affected)
    }
}
