pub use sea_orm_migration::prelude::*;

pub mod backup;
mod m20250301_000001_baseline_schema;
mod m20250412_000002_add_wishlist_deal_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_baseline_schema::Migration),
            Box::new(m20250412_000002_add_wishlist_deal_notifications::Migration),
        ]
    }
}
