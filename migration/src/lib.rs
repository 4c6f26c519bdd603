pub use sea_orm_migration::prelude::*;

mod m20261018_000001_users;
mod m20261018_000002_posts_and_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261018_000001_users::Migration),
            Box::new(m20261018_000002_posts_and_comments::Migration),
        ]
    }
}
