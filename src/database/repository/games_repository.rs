//! 游戏数据仓库
//!
//! 游戏目录从外部元数据源同步，以 igdb_id 为自然键 upsert。

use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::database::dto::{InsertGameData, UpdateGameData};
use crate::database::query::{FindManyArgs, NumericAggregate, SortOrder};
use crate::database::repository::crud;
use crate::entity::prelude::*;
use crate::entity::{deals, games};

/// 游戏列表筛选
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameFilter {
    /// 名称包含（不区分大小写）
    pub name_contains: Option<String>,
    pub min_rating: Option<f64>,
    pub released_after: Option<i64>,
    pub released_before: Option<i64>,
}

impl sea_orm::sea_query::IntoCondition for GameFilter {
    fn into_condition(self) -> Condition {
        let mut cond = Condition::all();
        if let Some(name) = self.name_contains {
            cond = cond.add(games::Column::Name.contains(name.as_str()));
        }
        if let Some(rating) = self.min_rating {
            cond = cond.add(games::Column::Rating.gte(rating));
        }
        if let Some(after) = self.released_after {
            cond = cond.add(games::Column::ReleaseDate.gte(after));
        }
        if let Some(before) = self.released_before {
            cond = cond.add(games::Column::ReleaseDate.lt(before));
        }
        cond
    }
}

/// 游戏数据仓库
pub struct GamesRepository;

impl GamesRepository {
    // ==================== 游戏 CRUD 操作 ====================

    fn to_active(game: InsertGameData, now: i64) -> games::ActiveModel {
        games::ActiveModel {
            id: NotSet,
            igdb_id: Set(game.igdb_id),
            name: Set(game.name),
            slug: Set(game.slug),
            summary: Set(game.summary),
            cover_url: Set(game.cover_url),
            release_date: Set(game.release_date),
            rating: Set(game.rating),
            genres: Set(game.genres),
            developers: Set(game.developers),
            publishers: Set(game.publishers),
            screenshots: Set(game.screenshots),
            videos: Set(game.videos),
            last_synced_at: NotSet,
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn update_active(updates: UpdateGameData, now: i64) -> games::ActiveModel {
        games::ActiveModel {
            name: updates.name.map_or(NotSet, Set),
            slug: updates.slug.map_or(NotSet, Set),
            summary: updates.summary.map_or(NotSet, Set),
            cover_url: updates.cover_url.map_or(NotSet, Set),
            release_date: updates.release_date.map_or(NotSet, Set),
            rating: updates.rating.map_or(NotSet, Set),
            genres: updates.genres.map_or(NotSet, Set),
            developers: updates.developers.map_or(NotSet, Set),
            publishers: updates.publishers.map_or(NotSet, Set),
            screenshots: updates.screenshots.map_or(NotSet, Set),
            videos: updates.videos.map_or(NotSet, Set),
            last_synced_at: updates.last_synced_at.map_or(NotSet, Set),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    /// 插入游戏
    pub async fn create<C>(db: &C, game: InsertGameData) -> Result<games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        Self::to_active(game, now).insert(db).await
    }

    /// 批量插入游戏（事务内执行）
    pub async fn create_many<C>(db: &C, games: Vec<InsertGameData>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        if games.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let count = games.len() as u64;
        let models: Vec<games::ActiveModel> = games
            .into_iter()
            .map(|game| Self::to_active(game, now))
            .collect();

        let txn = db.begin().await?;
        Games::insert_many(models).exec(&txn).await?;
        txn.commit().await?;
        Ok(count)
    }

    /// 根据 ID 查询游戏
    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<Option<games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Games::find_by_id(id).one(db).await
    }

    pub async fn find_by_id_or_throw<C>(db: &C, id: i32) -> Result<games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Game {} not found", id)))
    }

    pub async fn find_by_igdb_id<C>(db: &C, igdb_id: i64) -> Result<Option<games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Games::find()
            .filter(games::Column::IgdbId.eq(igdb_id))
            .one(db)
            .await
    }

    pub async fn find_by_slug<C>(db: &C, slug: &str) -> Result<Option<games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Games::find()
            .filter(games::Column::Slug.eq(slug))
            .order_by_asc(games::Column::Id)
            .one(db)
            .await
    }

    pub async fn find_many<C>(
        db: &C,
        args: FindManyArgs<games::Column>,
    ) -> Result<Vec<games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_many::<Games, C>(db, args).await
    }

    pub async fn find_first<C>(
        db: &C,
        args: FindManyArgs<games::Column>,
    ) -> Result<Option<games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_first::<Games, C>(db, args).await
    }

    pub async fn find_first_or_throw<C>(
        db: &C,
        args: FindManyArgs<games::Column>,
    ) -> Result<games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_first_or_throw::<Games, C>(db, args).await
    }

    /// 按名称模糊搜索，按评分降序
    pub async fn search<C>(db: &C, query: &str, take: u64) -> Result<Vec<games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let filter = GameFilter {
            name_contains: Some(query.trim().to_string()),
            ..Default::default()
        };
        Self::find_many(
            db,
            FindManyArgs::new()
                .filter(filter)
                .order_by(games::Column::Rating, SortOrder::Desc)
                .order_by(games::Column::Name, SortOrder::Asc)
                .take(take),
        )
        .await
    }

    pub async fn count<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::count::<Games, C>(db, filter).await
    }

    /// 更新游戏数据（部分更新）
    pub async fn update<C>(
        db: &C,
        id: i32,
        updates: UpdateGameData,
    ) -> Result<games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        let mut active = Self::update_active(updates, now);
        active.id = Set(id);
        active.update(db).await
    }

    pub async fn update_many<C>(
        db: &C,
        filter: Condition,
        updates: UpdateGameData,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        Games::update_many()
            .set(Self::update_active(updates, now))
            .filter(filter)
            .exec(db)
            .await
            .map(|result| result.rows_affected)
    }

    /// 按 igdb_id 同步游戏：存在则覆盖元数据，不存在则插入
    ///
    /// 同步后 last_synced_at 更新为当前时间。
    pub async fn upsert_by_igdb_id<C>(db: &C, game: InsertGameData) -> Result<games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        let igdb_id = game.igdb_id;

        let mut active = Self::to_active(game, now);
        active.last_synced_at = Set(Some(now));

        Games::insert(active)
            .on_conflict(
                OnConflict::column(games::Column::IgdbId)
                    .update_columns([
                        games::Column::Name,
                        games::Column::Slug,
                        games::Column::Summary,
                        games::Column::CoverUrl,
                        games::Column::ReleaseDate,
                        games::Column::Rating,
                        games::Column::Genres,
                        games::Column::Developers,
                        games::Column::Publishers,
                        games::Column::Screenshots,
                        games::Column::Videos,
                        games::Column::LastSyncedAt,
                        games::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::find_by_igdb_id(db, igdb_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Game igdb:{} not found", igdb_id)))
    }

    /// 删除游戏（级联删除折扣、游戏库与愿望单记录）
    pub async fn delete<C>(db: &C, id: i32) -> Result<DeleteResult, DbErr>
    where
        C: ConnectionTrait,
    {
        Games::delete_by_id(id).exec(db).await
    }

    pub async fn delete_many<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::delete_many::<Games, C>(db, filter).await
    }

    // ==================== 同步相关 ====================

    /// 需要重新同步的游戏：从未同步或上次同步早于 cutoff
    ///
    /// 从未同步的排在最前，其余按同步时间升序。
    pub async fn find_stale<C>(db: &C, cutoff: i64, take: u64) -> Result<Vec<games::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Games::find()
            .filter(
                Condition::any()
                    .add(games::Column::LastSyncedAt.is_null())
                    .add(games::Column::LastSyncedAt.lt(cutoff)),
            )
            .order_by_asc(games::Column::LastSyncedAt)
            .order_by_asc(games::Column::Id)
            .limit(take)
            .all(db)
            .await
    }

    /// 标记游戏已同步
    pub async fn mark_synced<C>(db: &C, id: i32) -> Result<games::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        games::ActiveModel {
            id: Set(id),
            last_synced_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(db)
        .await
    }

    // ==================== 关联查询 ====================

    /// 游戏及其当前有效折扣（按价格升序）
    pub async fn find_with_active_deals<C>(
        db: &C,
        id: i32,
    ) -> Result<Option<(games::Model, Vec<deals::Model>)>, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(game) = Self::find_by_id(db, id).await? else {
            return Ok(None);
        };

        let deals = game
            .find_related(Deals)
            .filter(deals::Column::IsActive.eq(true))
            .order_by_asc(deals::Column::Price)
            .all(db)
            .await?;

        Ok(Some((game, deals)))
    }

    /// 评分聚合
    pub async fn rating_aggregate<C>(db: &C, filter: Condition) -> Result<NumericAggregate, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::aggregate::<Games, C>(db, games::Column::Rating, filter).await
    }
}
