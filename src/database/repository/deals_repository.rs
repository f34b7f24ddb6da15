//! 折扣数据仓库
//!
//! 折扣以 (external_id, source) 为自然键，抓取结果通过 upsert 写入。

use sea_orm::sea_query::{Alias, Expr, Func, OnConflict, SimpleExpr};
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::database::dto::{InsertDealData, UpdateDealData};
use crate::database::query::{FindManyArgs, NumericAggregate, SortOrder};
use crate::database::repository::crud;
use crate::entity::deals::{self, discount_percent};
use crate::entity::prelude::*;

/// 折扣列表筛选
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealFilter {
    pub game_id: Option<i32>,
    pub source: Option<String>,
    pub active_only: bool,
    pub max_price: Option<f64>,
    pub min_discount: Option<i32>,
    pub currency: Option<String>,
}

impl sea_orm::sea_query::IntoCondition for DealFilter {
    fn into_condition(self) -> Condition {
        let mut cond = Condition::all();
        if let Some(game_id) = self.game_id {
            cond = cond.add(deals::Column::GameId.eq(game_id));
        }
        if let Some(source) = self.source {
            cond = cond.add(deals::Column::Source.eq(source));
        }
        if self.active_only {
            cond = cond.add(deals::Column::IsActive.eq(true));
        }
        if let Some(max_price) = self.max_price {
            cond = cond.add(deals::Column::Price.lte(max_price));
        }
        if let Some(min_discount) = self.min_discount {
            cond = cond.add(deals::Column::DiscountPercent.gte(min_discount));
        }
        if let Some(currency) = self.currency {
            cond = cond.add(deals::Column::Currency.eq(currency));
        }
        cond
    }
}

/// 按来源分组的折扣统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult)]
pub struct SourceStats {
    pub source: String,
    pub deals: i64,
    pub min_price: Option<f64>,
    pub avg_discount: Option<f64>,
}

/// 折扣数据仓库
pub struct DealsRepository;

impl DealsRepository {
    fn to_active(deal: InsertDealData, now: i64) -> deals::ActiveModel {
        let discount = deal
            .discount_percent
            .unwrap_or_else(|| discount_percent(deal.price, deal.regular_price));

        deals::ActiveModel {
            id: NotSet,
            game_id: Set(deal.game_id),
            external_id: Set(deal.external_id),
            source: Set(deal.source),
            title: Set(deal.title),
            price: Set(deal.price),
            regular_price: Set(deal.regular_price),
            discount_percent: Set(discount.clamp(0, 100)),
            currency: Set(deal.currency),
            url: Set(deal.url),
            expires_at: Set(deal.expires_at),
            is_active: Set(deal.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn validate_prices(price: Option<f64>, regular_price: Option<f64>) -> Result<(), DbErr> {
        let negative = |p: Option<f64>| p.is_some_and(|p| p < 0.0);
        if negative(price) || negative(regular_price) {
            return Err(DbErr::Custom(format!(
                "价格不能为负数: price={:?}, regular_price={:?}",
                price, regular_price
            )));
        }
        Ok(())
    }

    fn validate(deal: &InsertDealData) -> Result<(), DbErr> {
        Self::validate_prices(Some(deal.price), Some(deal.regular_price))?;
        if deal.external_id.trim().is_empty() || deal.source.trim().is_empty() {
            return Err(DbErr::Custom("external_id 与 source 不能为空".to_string()));
        }
        Ok(())
    }

    // ==================== 折扣 CRUD 操作 ====================

    pub async fn create<C>(db: &C, deal: InsertDealData) -> Result<deals::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::validate(&deal)?;
        let now = chrono::Utc::now().timestamp();
        Self::to_active(deal, now).insert(db).await
    }

    /// 批量插入折扣（事务内执行，任一失败则全部回滚）
    pub async fn create_many<C>(db: &C, deals: Vec<InsertDealData>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        if deals.is_empty() {
            return Ok(0);
        }
        for deal in &deals {
            Self::validate(deal)?;
        }

        let now = chrono::Utc::now().timestamp();
        let count = deals.len() as u64;
        let models: Vec<deals::ActiveModel> = deals
            .into_iter()
            .map(|deal| Self::to_active(deal, now))
            .collect();

        let txn = db.begin().await?;
        Deals::insert_many(models).exec(&txn).await?;
        txn.commit().await?;
        Ok(count)
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<Option<deals::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Deals::find_by_id(id).one(db).await
    }

    pub async fn find_by_id_or_throw<C>(db: &C, id: i32) -> Result<deals::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Deal {} not found", id)))
    }

    /// 按唯一键 (external_id, source) 查询
    pub async fn find_by_external<C>(
        db: &C,
        external_id: &str,
        source: &str,
    ) -> Result<Option<deals::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Deals::find()
            .filter(deals::Column::ExternalId.eq(external_id))
            .filter(deals::Column::Source.eq(source))
            .one(db)
            .await
    }

    pub async fn find_many<C>(
        db: &C,
        args: FindManyArgs<deals::Column>,
    ) -> Result<Vec<deals::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_many::<Deals, C>(db, args).await
    }

    pub async fn find_first<C>(
        db: &C,
        args: FindManyArgs<deals::Column>,
    ) -> Result<Option<deals::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_first::<Deals, C>(db, args).await
    }

    pub async fn count<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::count::<Deals, C>(db, filter).await
    }

    /// 更新折扣
    ///
    /// 修改了价格但未显式给出折扣时，按新价格重新计算 discount_percent。
    pub async fn update<C>(
        db: &C,
        id: i32,
        updates: UpdateDealData,
    ) -> Result<deals::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::validate_prices(updates.price, updates.regular_price)?;
        let existing = Self::find_by_id_or_throw(db, id).await?;
        let price_changed = updates.price.is_some() || updates.regular_price.is_some();
        let price = updates.price.unwrap_or(existing.price);
        let regular_price = updates.regular_price.unwrap_or(existing.regular_price);

        let mut active: deals::ActiveModel = existing.into();

        if let Some(t) = updates.title {
            active.title = Set(t);
        }
        if price_changed {
            active.price = Set(price);
            active.regular_price = Set(regular_price);
        }
        match updates.discount_percent {
            Some(d) => active.discount_percent = Set(d.clamp(0, 100)),
            None if price_changed => {
                active.discount_percent = Set(discount_percent(price, regular_price))
            }
            None => {}
        }
        if let Some(c) = updates.currency {
            active.currency = Set(c);
        }
        if let Some(u) = updates.url {
            active.url = Set(u);
        }
        if let Some(e) = updates.expires_at {
            active.expires_at = Set(e);
        }
        if let Some(a) = updates.is_active {
            active.is_active = Set(a);
        }

        active.updated_at = Set(chrono::Utc::now().timestamp());
        active.update(db).await
    }

    /// 按条件批量更新（不重算折扣）
    pub async fn update_many<C>(
        db: &C,
        filter: Condition,
        updates: UpdateDealData,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::validate_prices(updates.price, updates.regular_price)?;
        let active = deals::ActiveModel {
            title: updates.title.map_or(NotSet, Set),
            price: updates.price.map_or(NotSet, Set),
            regular_price: updates.regular_price.map_or(NotSet, Set),
            discount_percent: updates
                .discount_percent
                .map(|d| d.clamp(0, 100))
                .map_or(NotSet, Set),
            currency: updates.currency.map_or(NotSet, Set),
            url: updates.url.map_or(NotSet, Set),
            expires_at: updates.expires_at.map_or(NotSet, Set),
            is_active: updates.is_active.map_or(NotSet, Set),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        Deals::update_many()
            .set(active)
            .filter(filter)
            .exec(db)
            .await
            .map(|result| result.rows_affected)
    }

    /// 按 (external_id, source) upsert 抓取到的折扣
    pub async fn upsert<C>(db: &C, deal: InsertDealData) -> Result<deals::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::validate(&deal)?;
        let now = chrono::Utc::now().timestamp();
        let external_id = deal.external_id.clone();
        let source = deal.source.clone();

        Deals::insert(Self::to_active(deal, now))
            .on_conflict(
                OnConflict::columns([deals::Column::ExternalId, deals::Column::Source])
                    .update_columns([
                        deals::Column::GameId,
                        deals::Column::Title,
                        deals::Column::Price,
                        deals::Column::RegularPrice,
                        deals::Column::DiscountPercent,
                        deals::Column::Currency,
                        deals::Column::Url,
                        deals::Column::ExpiresAt,
                        deals::Column::IsActive,
                        deals::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::find_by_external(db, &external_id, &source)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("Deal {}@{} not found", external_id, source))
            })
    }

    /// 删除折扣（级联删除通知记录）
    pub async fn delete<C>(db: &C, id: i32) -> Result<DeleteResult, DbErr>
    where
        C: ConnectionTrait,
    {
        Deals::delete_by_id(id).exec(db).await
    }

    pub async fn delete_many<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::delete_many::<Deals, C>(db, filter).await
    }

    // ==================== 查询操作 ====================

    /// 某个游戏当前有效的折扣，按价格升序
    pub async fn active_for_game<C>(db: &C, game_id: i32) -> Result<Vec<deals::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find_many(
            db,
            FindManyArgs::new()
                .filter(DealFilter {
                    game_id: Some(game_id),
                    active_only: true,
                    ..Default::default()
                })
                .order_by(deals::Column::Price, SortOrder::Asc)
                .order_by(deals::Column::Id, SortOrder::Asc),
        )
        .await
    }

    /// 某个游戏当前最低价的有效折扣
    pub async fn best_for_game<C>(db: &C, game_id: i32) -> Result<Option<deals::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find_first(
            db,
            FindManyArgs::new()
                .filter(DealFilter {
                    game_id: Some(game_id),
                    active_only: true,
                    ..Default::default()
                })
                .order_by(deals::Column::Price, SortOrder::Asc)
                .order_by(deals::Column::Id, SortOrder::Asc),
        )
        .await
    }

    /// 价格聚合（count/sum/avg/min/max）
    pub async fn price_aggregate<C>(db: &C, filter: DealFilter) -> Result<NumericAggregate, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::aggregate::<Deals, C>(
            db,
            deals::Column::Price,
            sea_orm::sea_query::IntoCondition::into_condition(filter),
        )
        .await
    }

    /// 按来源分组统计
    pub async fn stats_by_source<C>(db: &C, filter: DealFilter) -> Result<Vec<SourceStats>, DbErr>
    where
        C: ConnectionTrait,
    {
        Deals::find()
            .select_only()
            .column(deals::Column::Source)
            .column_as(Expr::cust("COUNT(*)"), "deals")
            .column_as(
                SimpleExpr::from(Func::cast_as(
                    Func::min(Expr::col(deals::Column::Price)),
                    Alias::new("REAL"),
                )),
                "min_price",
            )
            .column_as(
                SimpleExpr::from(Func::cast_as(
                    Func::avg(Expr::col(deals::Column::DiscountPercent)),
                    Alias::new("REAL"),
                )),
                "avg_discount",
            )
            .filter(filter)
            .group_by(deals::Column::Source)
            .order_by_asc(deals::Column::Source)
            .into_model::<SourceStats>()
            .all(db)
            .await
    }

    /// 将已过期的折扣标记为无效，返回受影响行数
    pub async fn deactivate_expired<C>(db: &C, now: i64) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = Deals::update_many()
            .col_expr(deals::Column::IsActive, Expr::value(false))
            .col_expr(deals::Column::UpdatedAt, Expr::value(now))
            .filter(deals::Column::IsActive.eq(true))
            .filter(deals::Column::ExpiresAt.is_not_null())
            .filter(deals::Column::ExpiresAt.lte(now))
            .exec(db)
            .await?;

        if result.rows_affected > 0 {
            log::info!("已停用 {} 条过期折扣", result.rows_affected);
        }
        Ok(result.rows_affected)
    }
}
