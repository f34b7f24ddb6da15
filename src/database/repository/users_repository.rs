//! 用户数据仓库

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;

use crate::database::dto::{InsertUserData, UpdateUserData};
use crate::database::query::{FindManyArgs, NumericAggregate};
use crate::database::repository::crud;
use crate::entity::prelude::*;
use crate::entity::users;

/// 每升一级所需经验
pub const EXPERIENCE_PER_LEVEL: i32 = 1000;

/// 根据经验计算等级（从 1 级开始）
pub fn level_for_experience(experience: i32) -> i32 {
    1 + experience.max(0) / EXPERIENCE_PER_LEVEL
}

/// 用户数据仓库
pub struct UsersRepository;

impl UsersRepository {
    // ==================== 用户 CRUD 操作 ====================

    fn to_active(user: InsertUserData, now: i64) -> users::ActiveModel {
        users::ActiveModel {
            id: NotSet,
            email: Set(user.email),
            username: Set(user.username),
            password_hash: Set(user.password_hash),
            avatar_url: Set(user.avatar_url),
            bio: Set(user.bio),
            experience: Set(0),
            level: Set(1),
            credits: Set(0),
            steam_connected: Set(user.steam_connected),
            epic_connected: Set(user.epic_connected),
            gog_connected: Set(user.gog_connected),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    fn update_active(updates: UpdateUserData, now: i64) -> users::ActiveModel {
        users::ActiveModel {
            email: updates.email.map_or(NotSet, Set),
            username: updates.username.map_or(NotSet, Set),
            password_hash: updates.password_hash.map_or(NotSet, Set),
            avatar_url: updates.avatar_url.map_or(NotSet, Set),
            bio: updates.bio.map_or(NotSet, Set),
            experience: updates.experience.map_or(NotSet, Set),
            // 给出经验时等级总是由经验推出
            level: match updates.experience {
                Some(experience) => Set(level_for_experience(experience)),
                None => updates.level.map_or(NotSet, Set),
            },
            credits: updates.credits.map_or(NotSet, Set),
            steam_connected: updates.steam_connected.map_or(NotSet, Set),
            epic_connected: updates.epic_connected.map_or(NotSet, Set),
            gog_connected: updates.gog_connected.map_or(NotSet, Set),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    /// 创建用户
    pub async fn create<C>(db: &C, user: InsertUserData) -> Result<users::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        Self::to_active(user, now).insert(db).await
    }

    /// 批量创建用户（事务内执行）
    pub async fn create_many<C>(db: &C, users: Vec<InsertUserData>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        if users.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let count = users.len() as u64;
        let models: Vec<users::ActiveModel> = users
            .into_iter()
            .map(|user| Self::to_active(user, now))
            .collect();

        let txn = db.begin().await?;
        Users::insert_many(models).exec(&txn).await?;
        txn.commit().await?;
        Ok(count)
    }

    /// 根据 ID 查询用户
    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<Option<users::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Users::find_by_id(id).one(db).await
    }

    /// 根据 ID 查询用户，不存在时返回 RecordNotFound
    pub async fn find_by_id_or_throw<C>(db: &C, id: i32) -> Result<users::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("User {} not found", id)))
    }

    pub async fn find_by_email<C>(db: &C, email: &str) -> Result<Option<users::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Users::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await
    }

    pub async fn find_by_username<C>(db: &C, username: &str) -> Result<Option<users::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Users::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await
    }

    pub async fn find_many<C>(
        db: &C,
        args: FindManyArgs<users::Column>,
    ) -> Result<Vec<users::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_many::<Users, C>(db, args).await
    }

    pub async fn find_first<C>(
        db: &C,
        args: FindManyArgs<users::Column>,
    ) -> Result<Option<users::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::find_first::<Users, C>(db, args).await
    }

    pub async fn count<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::count::<Users, C>(db, filter).await
    }

    /// 更新用户（部分更新）
    pub async fn update<C>(
        db: &C,
        id: i32,
        updates: UpdateUserData,
    ) -> Result<users::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        let mut active = Self::update_active(updates, now);
        active.id = Set(id);
        active.update(db).await
    }

    /// 按条件批量更新，返回受影响行数
    pub async fn update_many<C>(
        db: &C,
        filter: Condition,
        updates: UpdateUserData,
    ) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        Users::update_many()
            .set(Self::update_active(updates, now))
            .filter(filter)
            .exec(db)
            .await
            .map(|result| result.rows_affected)
    }

    /// 按邮箱 upsert：存在则更新资料字段，不存在则创建
    pub async fn upsert_by_email<C>(db: &C, user: InsertUserData) -> Result<users::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now().timestamp();
        let email = user.email.clone();

        Users::insert(Self::to_active(user, now))
            .on_conflict(
                OnConflict::column(users::Column::Email)
                    .update_columns([
                        users::Column::Username,
                        users::Column::PasswordHash,
                        users::Column::AvatarUrl,
                        users::Column::Bio,
                        users::Column::SteamConnected,
                        users::Column::EpicConnected,
                        users::Column::GogConnected,
                        users::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::find_by_email(db, &email)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("User {} not found", email)))
    }

    /// 删除用户（级联删除游戏库、愿望单、收到的私信与通知）
    pub async fn delete<C>(db: &C, id: i32) -> Result<DeleteResult, DbErr>
    where
        C: ConnectionTrait,
    {
        Users::delete_by_id(id).exec(db).await
    }

    pub async fn delete_many<C>(db: &C, filter: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::delete_many::<Users, C>(db, filter).await
    }

    // ==================== 计数器操作 ====================

    /// 原子地增加经验，并同步重算等级
    pub async fn add_experience<C>(db: &C, id: i32, amount: i32) -> Result<users::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        if amount < 0 {
            return Err(DbErr::Custom(format!("经验增量不能为负数: {}", amount)));
        }

        // UPDATE 右侧引用的是旧值，因此等级按 (旧经验 + 增量) 计算
        let result = Users::update_many()
            .col_expr(
                users::Column::Experience,
                Expr::col(users::Column::Experience).add(amount),
            )
            .col_expr(
                users::Column::Level,
                Expr::expr(
                    Expr::expr(Expr::col(users::Column::Experience).add(amount))
                        .div(EXPERIENCE_PER_LEVEL),
                )
                .add(1),
            )
            .col_expr(
                users::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::Experience.lte(i32::MAX - amount))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            let user = Self::find_by_id_or_throw(db, id).await?;
            return Err(DbErr::Custom(format!(
                "经验溢出: 当前 {}, 增量 {}",
                user.experience, amount
            )));
        }

        Self::find_by_id_or_throw(db, id).await
    }

    /// 原子地调整积分，余额不能变为负数
    pub async fn add_credits<C>(db: &C, id: i32, delta: i32) -> Result<users::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = Users::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).add(delta),
            )
            .col_expr(
                users::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(users::Column::Id.eq(id))
            .filter(Expr::expr(Expr::col(users::Column::Credits).add(delta)).gte(0))
            .filter(Expr::expr(Expr::col(users::Column::Credits).add(delta)).lte(i32::MAX))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            // 区分用户不存在、余额不足与溢出
            let user = Self::find_by_id_or_throw(db, id).await?;
            let reason = if i64::from(user.credits) + i64::from(delta) < 0 {
                "积分不足"
            } else {
                "积分溢出"
            };
            return Err(DbErr::Custom(format!(
                "{}: 当前 {}, 变动 {}",
                reason, user.credits, delta
            )));
        }

        Self::find_by_id_or_throw(db, id).await
    }

    // ==================== 聚合 ====================

    /// 对计数器列（experience/level/credits）做聚合
    pub async fn aggregate<C>(
        db: &C,
        column: users::Column,
        filter: Condition,
    ) -> Result<NumericAggregate, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::aggregate::<Users, C>(db, column, filter).await
    }

    /// 按等级分组统计人数
    pub async fn count_by_level<C>(db: &C) -> Result<Vec<(i32, i64)>, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::group_count::<Users, C, i32>(db, users::Column::Level, Condition::all()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_starts_at_one() {
        assert_eq!(level_for_experience(0), 1);
        assert_eq!(level_for_experience(-50), 1);
        assert_eq!(level_for_experience(EXPERIENCE_PER_LEVEL - 1), 1);
        assert_eq!(level_for_experience(EXPERIENCE_PER_LEVEL), 2);
        assert_eq!(level_for_experience(EXPERIENCE_PER_LEVEL * 5 + 10), 6);
    }
}
