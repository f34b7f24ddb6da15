//! 通用 CRUD 操作
//!
//! 对任意实体和任意连接（DatabaseConnection 或事务）都可用，
//! 各仓库在此基础上补充自己的业务查询。

use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::*;

use crate::database::query::{FindManyArgs, NumericAggregate};

/// 构建带筛选/排序/分页的查询
pub fn select_with<E>(args: FindManyArgs<E::Column>) -> Select<E>
where
    E: EntityTrait,
{
    let mut query = E::find().filter(args.filter);
    for (column, order) in args.order_by {
        query = query.order_by(column, Order::from(order));
    }
    if let Some(skip) = args.skip {
        query = query.offset(skip);
    }
    if let Some(take) = args.take {
        query = query.limit(take);
    }
    query
}

/// findMany
pub async fn find_many<E, C>(db: &C, args: FindManyArgs<E::Column>) -> Result<Vec<E::Model>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    select_with::<E>(args).all(db).await
}

/// findFirst：按参数排序后取第一条
pub async fn find_first<E, C>(
    db: &C,
    args: FindManyArgs<E::Column>,
) -> Result<Option<E::Model>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    select_with::<E>(args.take(1)).one(db).await
}

/// findFirstOrThrow
pub async fn find_first_or_throw<E, C>(
    db: &C,
    args: FindManyArgs<E::Column>,
) -> Result<E::Model, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    find_first::<E, C>(db, args)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("No {} found", E::default().table_name())))
}

/// count
pub async fn count<E, C>(db: &C, filter: Condition) -> Result<u64, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let total = E::find()
        .select_only()
        .column_as(Expr::cust("COUNT(*)"), "count")
        .filter(filter)
        .into_tuple::<i64>()
        .one(db)
        .await?
        .unwrap_or(0);
    Ok(total.max(0) as u64)
}

/// 是否存在满足条件的记录
pub async fn exists<E, C>(db: &C, filter: Condition) -> Result<bool, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    Ok(count::<E, C>(db, filter).await? > 0)
}

/// deleteMany
pub async fn delete_many<E, C>(db: &C, filter: Condition) -> Result<u64, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    E::delete_many()
        .filter(filter)
        .exec(db)
        .await
        .map(|result| result.rows_affected)
}

/// aggregate：对一个数值列求 count/sum/avg/min/max
///
/// 结果统一转为 REAL，整数列也按浮点返回。
pub async fn aggregate<E, C>(
    db: &C,
    column: E::Column,
    filter: Condition,
) -> Result<NumericAggregate, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let as_real = |expr: SimpleExpr| -> SimpleExpr {
        Func::cast_as(expr, Alias::new("REAL")).into()
    };

    let result = E::find()
        .select_only()
        .column_as(Expr::cust("COUNT(*)"), "count")
        .column_as(as_real(Func::sum(Expr::col(column)).into()), "sum")
        .column_as(as_real(Func::avg(Expr::col(column)).into()), "avg")
        .column_as(as_real(Func::min(Expr::col(column)).into()), "min")
        .column_as(as_real(Func::max(Expr::col(column)).into()), "max")
        .filter(filter)
        .into_model::<NumericAggregate>()
        .one(db)
        .await?;

    Ok(result.unwrap_or_default())
}

/// groupBy 单列并计数，按数量降序
pub async fn group_count<E, C, K>(
    db: &C,
    column: E::Column,
    filter: Condition,
) -> Result<Vec<(K, i64)>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
    K: TryGetable,
{
    E::find()
        .select_only()
        .column(column)
        .column_as(Expr::cust("COUNT(*)"), "count")
        .filter(filter)
        .group_by(column)
        .order_by_desc(Expr::cust("count"))
        .order_by_asc(column)
        .into_tuple::<(K, i64)>()
        .all(db)
        .await
}
