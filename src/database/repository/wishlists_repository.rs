//! 愿望单数据仓库

use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::database::dto::{InsertWishlistData, UpdateWishlistData};
use crate::database::query::FindManyArgs;
use crate::database::repository::crud;
use crate::entity::prelude::*;
use crate::entity::{games, wishlists};

/// 愿望单数据仓库
pub struct WishlistsRepository;

impl WishlistsRepository {
    fn validate_target(target_price: Option<f64>) -> Result<(), DbErr> {
        match target_price {
            Some(price) if price < 0.0 => Err(DbErr::Custom(format!(
                "期望价格不能为负数: {}",
                price
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create<C>(db: &C, entry: InsertWishlistData) -> Result<wishlists::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::validate_target(entry.target_price)?;

        wishlists::ActiveModel {
            id: NotSet,
            user_id: Set(entry.user_id),
            game_id: Set(entry.game_id),
            target_price: Set(entry.target_price),
            notify: Set(entry.notify),
            created_at: Set(chrono::Utc::now().timestamp()),
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<Option<wishlists::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Wishlists::find_by_id(id).one(db).await
    }

    pub async fn find_by_id_or_throw<C>(db: &C, id: i32) -> Result<wishlists::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Wishlist {} not found", id)))
    }

    /// 按唯一键 (user_id, game_id) 查询
    pub async fn find_by_user_and_game<C>(
        db: &C,
        user_id: i32,
        game_id: i32,
    ) -> Result<Option<wishlists::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Wishlists::find()
            .filter(wishlists::Column::UserId.eq(user_id))
            .filter(wishlists::Column::GameId.eq(game_id))
            .one(db)
            .await
    }

    pub async fn find_many<C>(
        db: &C,
        args: FindManyArgs<wishlists::Column>,
    ) -> Result<Vec<wishlists::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_many::<Wishlists, C>(db, args).await
    }

    pub async fn count<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::count::<Wishlists, C>(db, filter).await
    }

    /// 游戏是否在用户愿望单中
    pub async fn contains<C>(db: &C, user_id: i32, game_id: i32) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::exists::<Wishlists, C>(
            db,
            Condition::all()
                .add(wishlists::Column::UserId.eq(user_id))
                .add(wishlists::Column::GameId.eq(game_id)),
        )
        .await
    }

    pub async fn update<C>(
        db: &C,
        id: i32,
        updates: UpdateWishlistData,
    ) -> Result<wishlists::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Some(target) = updates.target_price {
            Self::validate_target(target)?;
        }

        wishlists::ActiveModel {
            id: Set(id),
            target_price: updates.target_price.map_or(NotSet, Set),
            notify: updates.notify.map_or(NotSet, Set),
            ..Default::default()
        }
        .update(db)
        .await
    }

    pub async fn update_many<C>(
        db: &C,
        filter: Condition,
        updates: UpdateWishlistData,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Some(target) = updates.target_price {
            Self::validate_target(target)?;
        }

        let active = wishlists::ActiveModel {
            target_price: updates.target_price.map_or(NotSet, Set),
            notify: updates.notify.map_or(NotSet, Set),
            ..Default::default()
        };

        Wishlists::update_many()
            .set(active)
            .filter(filter)
            .exec(db)
            .await
            .map(|result| result.rows_affected)
    }

    /// 加入愿望单，已存在时只更新期望价格与提醒开关
    pub async fn upsert<C>(db: &C, entry: InsertWishlistData) -> Result<wishlists::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::validate_target(entry.target_price)?;
        let (user_id, game_id) = (entry.user_id, entry.game_id);

        let active = wishlists::ActiveModel {
            id: NotSet,
            user_id: Set(entry.user_id),
            game_id: Set(entry.game_id),
            target_price: Set(entry.target_price),
            notify: Set(entry.notify),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        Wishlists::insert(active)
            .on_conflict(
                OnConflict::columns([wishlists::Column::UserId, wishlists::Column::GameId])
                    .update_columns([wishlists::Column::TargetPrice, wishlists::Column::Notify])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::find_by_user_and_game(db, user_id, game_id)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("Wishlist ({}, {}) not found", user_id, game_id))
            })
    }

    pub async fn delete<C>(db: &C, id: i32) -> Result<DeleteResult, DbErr>
    where
        C: ConnectionTrait,
    {
        Wishlists::delete_by_id(id).exec(db).await
    }

    /// 从愿望单移除游戏，返回是否删除了记录
    pub async fn remove<C>(db: &C, user_id: i32, game_id: i32) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = Wishlists::delete_many()
            .filter(wishlists::Column::UserId.eq(user_id))
            .filter(wishlists::Column::GameId.eq(game_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn delete_many<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::delete_many::<Wishlists, C>(db, filter).await
    }

    // ==================== 关联查询 ====================

    /// 用户愿望单（附带游戏），最近加入的在前
    pub async fn with_games<C>(
        db: &C,
        user_id: i32,
    ) -> Result<Vec<(wishlists::Model, Option<games::Model>)>, DbErr>
    where
        C: ConnectionTrait,
    {
        Wishlists::find()
            .find_also_related(Games)
            .filter(wishlists::Column::UserId.eq(user_id))
            .order_by_desc(wishlists::Column::CreatedAt)
            .order_by_desc(wishlists::Column::Id)
            .all(db)
            .await
    }

    /// 被加入愿望单次数最多的游戏：(game_id, 次数)
    pub async fn most_wishlisted<C>(db: &C, take: usize) -> Result<Vec<(i32, i64)>, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut counts =
            crud::group_count::<Wishlists, C, i32>(db, wishlists::Column::GameId, Condition::all())
                .await?;
        counts.truncate(take);
        Ok(counts)
    }
}
