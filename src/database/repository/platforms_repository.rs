use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::database::dto::{InsertPlatformData, UpdatePlatformData};
use crate::database::repository::crud;
use crate::entity::platforms;
use crate::entity::prelude::*;

/// 默认平台/商店列表：(slug, 名称, 商店地址)
pub const DEFAULT_PLATFORMS: &[(&str, &str, &str)] = &[
    ("steam", "Steam", "https://store.steampowered.com"),
    ("epic", "Epic Games Store", "https://store.epicgames.com"),
    ("gog", "GOG", "https://www.gog.com"),
    ("xbox", "Xbox", "https://www.xbox.com"),
    ("playstation", "PlayStation Store", "https://store.playstation.com"),
    ("nintendo", "Nintendo eShop", "https://www.nintendo.com/store"),
    ("humble", "Humble Store", "https://www.humblebundle.com/store"),
    ("itch", "itch.io", "https://itch.io"),
    ("ubisoft", "Ubisoft Store", "https://store.ubisoft.com"),
    ("ea", "EA App", "https://www.ea.com"),
];

/// 平台数据仓库
pub struct PlatformsRepository;

impl PlatformsRepository {
    pub async fn create<C>(db: &C, platform: InsertPlatformData) -> Result<platforms::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        platforms::ActiveModel {
            id: NotSet,
            slug: Set(platform.slug),
            name: Set(platform.name),
            icon_url: Set(platform.icon_url),
            store_url: Set(platform.store_url),
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id<C>(db: &C, id: i32) -> Result<Option<platforms::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Platforms::find_by_id(id).one(db).await
    }

    pub async fn find_by_slug<C>(db: &C, slug: &str) -> Result<Option<platforms::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Platforms::find()
            .filter(platforms::Column::Slug.eq(slug))
            .one(db)
            .await
    }

    /// 获取所有平台（按名称排序）
    pub async fn find_all<C>(db: &C) -> Result<Vec<platforms::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Platforms::find()
            .order_by_asc(platforms::Column::Name)
            .all(db)
            .await
    }

    /// 根据一组 ID 查询平台
    pub async fn find_by_ids<C>(db: &C, ids: &[i32]) -> Result<Vec<platforms::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Platforms::find()
            .filter(platforms::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(platforms::Column::Id)
            .all(db)
            .await
    }

    pub async fn update<C>(
        db: &C,
        id: i32,
        updates: UpdatePlatformData,
    ) -> Result<platforms::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        platforms::ActiveModel {
            id: Set(id),
            slug: updates.slug.map_or(NotSet, Set),
            name: updates.name.map_or(NotSet, Set),
            icon_url: updates.icon_url.map_or(NotSet, Set),
            store_url: updates.store_url.map_or(NotSet, Set),
        }
        .update(db)
        .await
    }

    pub async fn delete<C>(db: &C, id: i32) -> Result<DeleteResult, DbErr>
    where
        C: ConnectionTrait,
    {
        Platforms::delete_by_id(id).exec(db).await
    }

    pub async fn count<C>(db: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        crud::count::<Platforms, C>(db, Condition::all()).await
    }

    /// 写入默认平台，已存在的 slug 保持不变
    ///
    /// 返回新插入的数量，可重复执行。
    pub async fn seed_defaults<C>(db: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;
        let mut inserted = 0u64;

        for &(slug, name, store_url) in DEFAULT_PLATFORMS {
            let platform = platforms::ActiveModel {
                id: NotSet,
                slug: Set(slug.to_string()),
                name: Set(name.to_string()),
                icon_url: Set(None),
                store_url: Set(Some(store_url.to_string())),
            };

            inserted += Platforms::insert(platform)
                .on_conflict(
                    OnConflict::column(platforms::Column::Slug)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        log::info!("默认平台写入完成，新增 {} 条", inserted);
        Ok(inserted)
    }
}
