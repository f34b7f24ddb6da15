//! 用户游戏库仓库

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::database::dto::{InsertUserGameData, UpdateUserGameData};
use crate::database::query::{FindManyArgs, SortOrder};
use crate::database::repository::crud;
use crate::entity::prelude::*;
use crate::entity::{games, user_games};

/// 每个用户的游戏库统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct LibraryStats {
    pub user_id: i32,
    pub games: i64,
    pub installed: i64,
    pub total_playtime: i64,
}

/// 游戏库排序选项
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibrarySort {
    Addtime,
    LastPlayed,
    Playtime,
}

/// 用户游戏库仓库
pub struct UserGamesRepository;

impl UserGamesRepository {
    pub async fn create<C>(db: &C, entry: InsertUserGameData) -> Result<user_games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();

        user_games::ActiveModel {
            id: NotSet,
            user_id: Set(entry.user_id),
            game_id: Set(entry.game_id),
            owned: Set(entry.owned),
            playtime_minutes: Set(entry.playtime_minutes.max(0)),
            installed: Set(entry.installed),
            last_played_at: Set(entry.last_played_at),
            platform_ids: Set(entry.platform_ids.normalized()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<Option<user_games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        UserGames::find_by_id(id).one(db).await
    }

    pub async fn find_by_id_or_throw<C>(db: &C, id: i32) -> Result<user_games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("UserGame {} not found", id)))
    }

    /// 查询用户是否拥有某个游戏（最早的一条记录）
    pub async fn find_for_user_and_game<C>(
        db: &C,
        user_id: i32,
        game_id: i32,
    ) -> Result<Option<user_games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_first::<UserGames, C>(
            db,
            FindManyArgs::new()
                .filter(user_games::Column::UserId.eq(user_id))
                .filter(user_games::Column::GameId.eq(game_id))
                .order_by(user_games::Column::Id, SortOrder::Asc),
        )
        .await
    }

    pub async fn find_many<C>(
        db: &C,
        args: FindManyArgs<user_games::Column>,
    ) -> Result<Vec<user_games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_many::<UserGames, C>(db, args).await
    }

    /// 用户的游戏库（附带游戏信息）
    pub async fn library<C>(
        db: &C,
        user_id: i32,
        sort: LibrarySort,
        sort_order: SortOrder,
    ) -> Result<Vec<(user_games::Model, Option<games::Model>)>, DbErr>
    where
        C: ConnectionTrait,
    {
        let column = match sort {
            LibrarySort::Addtime => user_games::Column::CreatedAt,
            LibrarySort::LastPlayed => user_games::Column::LastPlayedAt,
            LibrarySort::Playtime => user_games::Column::PlaytimeMinutes,
        };

        UserGames::find()
            .find_also_related(Games)
            .filter(user_games::Column::UserId.eq(user_id))
            .order_by(column, Order::from(sort_order))
            .order_by_asc(user_games::Column::Id)
            .all(db)
            .await
    }

    pub async fn count<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::count::<UserGames, C>(db, filter).await
    }

    pub async fn update<C>(
        db: &C,
        id: i32,
        updates: UpdateUserGameData,
    ) -> Result<user_games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();

        user_games::ActiveModel {
            id: Set(id),
            owned: updates.owned.map_or(NotSet, Set),
            playtime_minutes: updates.playtime_minutes.map(|m| m.max(0)).map_or(NotSet, Set),
            installed: updates.installed.map_or(NotSet, Set),
            last_played_at: updates.last_played_at.map_or(NotSet, Set),
            platform_ids: updates
                .platform_ids
                .map(|ids| ids.normalized())
                .map_or(NotSet, Set),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(db)
        .await
    }

    pub async fn update_many<C>(
        db: &C,
        filter: Condition,
        updates: UpdateUserGameData,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        let active = user_games::ActiveModel {
            owned: updates.owned.map_or(NotSet, Set),
            playtime_minutes: updates.playtime_minutes.map(|m| m.max(0)).map_or(NotSet, Set),
            installed: updates.installed.map_or(NotSet, Set),
            last_played_at: updates.last_played_at.map_or(NotSet, Set),
            platform_ids: updates
                .platform_ids
                .map(|ids| ids.normalized())
                .map_or(NotSet, Set),
            updated_at: Set(now),
            ..Default::default()
        };

        UserGames::update_many()
            .set(active)
            .filter(filter)
            .exec(db)
            .await
            .map(|result| result.rows_affected)
    }

    pub async fn delete<C>(db: &C, id: i32) -> Result<DeleteResult, DbErr>
    where
        C: ConnectionTrait,
    {
        UserGames::delete_by_id(id).exec(db).await
    }

    pub async fn delete_many<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::delete_many::<UserGames, C>(db, filter).await
    }

    // ==================== 游玩记录 ====================

    /// 原子地累加游玩时长并刷新最近游玩时间
    pub async fn add_playtime<C>(
        db: &C,
        id: i32,
        minutes: i32,
    ) -> Result<user_games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        if minutes < 0 {
            return Err(DbErr::Custom(format!("游玩时长不能为负数: {}", minutes)));
        }

        let now = chrono::Utc::now().timestamp();
        let result = UserGames::update_many()
            .col_expr(
                user_games::Column::PlaytimeMinutes,
                Expr::col(user_games::Column::PlaytimeMinutes).add(minutes),
            )
            .col_expr(user_games::Column::LastPlayedAt, Expr::value(now))
            .col_expr(user_games::Column::UpdatedAt, Expr::value(now))
            .filter(user_games::Column::Id.eq(id))
            .filter(user_games::Column::PlaytimeMinutes.lte(i32::MAX - minutes))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            let row = Self::find_by_id_or_throw(db, id).await?;
            return Err(DbErr::Custom(format!(
                "游玩时长溢出: 当前 {}, 增量 {}",
                row.playtime_minutes, minutes
            )));
        }

        Self::find_by_id_or_throw(db, id).await
    }

    /// 为记录追加一个平台 ID（读改写在同一事务内）
    pub async fn add_platform<C>(
        db: &C,
        id: i32,
        platform_id: i32,
    ) -> Result<user_games::Model, DbErr>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        let existing = Self::find_by_id_or_throw(&txn, id).await?;
        let mut platform_ids = existing.platform_ids.clone().normalized();
        if !platform_ids.insert(platform_id) {
            txn.commit().await?;
            return Ok(existing);
        }

        let mut active: user_games::ActiveModel = existing.into();
        active.platform_ids = Set(platform_ids);
        active.updated_at = Set(chrono::Utc::now().timestamp());
        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    // ==================== 统计 ====================

    /// 按用户分组统计游戏库规模与总时长
    pub async fn stats_by_user<C>(db: &C, filter: Condition) -> Result<Vec<LibraryStats>, DbErr>
    where
        C: ConnectionTrait,
    {
        UserGames::find()
            .select_only()
            .column(user_games::Column::UserId)
            .column_as(Expr::cust("COUNT(*)"), "games")
            .column_as(
                SimpleExpr::from(Func::coalesce([
                    SimpleExpr::from(Func::sum(Expr::col(user_games::Column::Installed))),
                    Expr::val(0).into(),
                ])),
                "installed",
            )
            .column_as(
                SimpleExpr::from(Func::coalesce([
                    SimpleExpr::from(Func::sum(Expr::col(user_games::Column::PlaytimeMinutes))),
                    Expr::val(0).into(),
                ])),
                "total_playtime",
            )
            .filter(filter)
            .group_by(user_games::Column::UserId)
            .order_by_asc(user_games::Column::UserId)
            .into_model::<LibraryStats>()
            .all(db)
            .await
    }
}
