//! Demo fixtures: one account per role, a published post with a comment and
//! a draft. Running it twice is a no-op.

use anyhow::{Context, Result};
use entity::users::Role;
use platform_authn::hash_password;
use platform_db::{
    DbPool,
    comments::{self as comment_store, NewComment},
    posts::{self as post_store, NewPost},
    users::{self as user_store, NewUser},
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::info;

const ADMIN_EMAIL: &str = "admin@blog.local";

#[derive(Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadySeeded,
}

pub async fn run(pool: &DbPool, password: &str) -> Result<SeedOutcome> {
    if user_store::find_by_email(pool, ADMIN_EMAIL).await?.is_some() {
        info!("seed data already present");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let password_hash = hash_password(password).context("hash seed password")?;
    let txn = pool.begin().await?;
    account(&txn, ADMIN_EMAIL, "admin", &password_hash, Role::Admin).await?;
    let author = account(&txn, "author@blog.local", "author", &password_hash, Role::Author).await?;
    let reader = account(&txn, "reader@blog.local", "reader", &password_hash, Role::User).await?;

    let welcome = post_store::insert(
        &txn,
        NewPost {
            author_id: author.id,
            title: "Welcome to the blog".into(),
            content: "This post is published, so anyone can read it.".into(),
            published: true,
        },
    )
    .await?;
    post_store::insert(
        &txn,
        NewPost {
            author_id: author.id,
            title: "Work in progress".into(),
            content: "Drafts stay visible to their author and admins only.".into(),
            published: false,
        },
    )
    .await?;
    comment_store::insert(
        &txn,
        NewComment {
            post_id: welcome.id,
            author_id: reader.id,
            content: "Great first post!".into(),
        },
    )
    .await?;
    txn.commit().await?;

    info!("seed data created");
    Ok(SeedOutcome::Created)
}

async fn account<C: ConnectionTrait>(
    db: &C,
    email: &str,
    username: &str,
    password_hash: &str,
    role: Role,
) -> Result<entity::users::Model> {
    let user = user_store::insert(
        db,
        NewUser {
            email: email.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            role,
        },
    )
    .await
    .with_context(|| format!("insert seed user {username}"))?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use super::*;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&pool, None).await.unwrap();

        assert_eq!(run(&pool, "changeme").await.unwrap(), SeedOutcome::Created);
        assert_eq!(
            run(&pool, "changeme").await.unwrap(),
            SeedOutcome::AlreadySeeded
        );
        assert_eq!(post_store::list_published(&pool).await.unwrap().len(), 1);
    }
}
