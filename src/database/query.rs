//! 通用查询参数
//!
//! findMany/findFirst 的筛选、排序、分页参数，以及聚合结果结构。

use sea_orm::{Condition, FromQueryResult, Order};
use serde::{Deserialize, Serialize};

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// findMany 参数：筛选条件 + 排序 + skip/take 分页
///
/// `Col` 为实体的列类型，例如 `deals::Column`。
#[derive(Debug, Clone)]
pub struct FindManyArgs<Col> {
    pub filter: Condition,
    pub order_by: Vec<(Col, SortOrder)>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl<Col> Default for FindManyArgs<Col> {
    fn default() -> Self {
        Self {
            filter: Condition::all(),
            order_by: Vec::new(),
            skip: None,
            take: None,
        }
    }
}

impl<Col> FindManyArgs<Col> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加筛选条件（与已有条件 AND）
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: sea_orm::sea_query::IntoCondition,
    {
        self.filter = self.filter.add(filter.into_condition());
        self
    }

    pub fn order_by(mut self, column: Col, order: SortOrder) -> Self {
        self.order_by.push((column, order));
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }
}

/// 数值列聚合结果（_count/_sum/_avg/_min/_max）
///
/// 没有匹配行时 sum/avg/min/max 为 `None`。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromQueryResult)]
pub struct NumericAggregate {
    pub count: i64,
    pub sum: Option<f64>,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::deals;
    use sea_orm::ColumnTrait;

    #[test]
    fn sort_order_deserializes_lowercase() {
        let order: SortOrder = serde_json::from_str(r#""desc""#).unwrap();
        assert_eq!(order, SortOrder::Desc);
        assert_eq!(Order::from(SortOrder::Asc), Order::Asc);
    }

    #[test]
    fn builder_accumulates_arguments() {
        let args = FindManyArgs::new()
            .filter(deals::Column::IsActive.eq(true))
            .filter(deals::Column::Price.lte(10.0))
            .order_by(deals::Column::Price, SortOrder::Asc)
            .skip(20)
            .take(10);

        assert_eq!(args.order_by.len(), 1);
        assert_eq!(args.skip, Some(20));
        assert_eq!(args.take, Some(10));
        assert_eq!(args.filter.len(), 2);
    }
}
