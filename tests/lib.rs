//! Shared fixtures for the cross-crate test suites.

use anyhow::{Context, Result};
use entity::users;
use migration::{Migrator, MigratorTrait};
use platform_authn::{TokenConfig, hash_password};
use platform_authz::{Caller, ContentPolicy};
use platform_db::{
    DbPool,
    users::{self as user_store, NewUser},
};
use products_blog::{BlogService, LoginInput, RegisterInput};
use sea_orm::Database;

pub const SECRET: &str = "integration-secret-integration-secret";
pub const PASSWORD: &str = "hunter22";

/// Migrated in-memory SQLite pool.
pub async fn memory_pool() -> Result<DbPool> {
    let pool = Database::connect("sqlite::memory:").await?;
    Migrator::up(&pool, None).await?;
    Ok(pool)
}

pub fn service_on(pool: DbPool) -> Result<BlogService> {
    let tokens = TokenConfig::new(SECRET, 60)?;
    Ok(BlogService::new(pool, ContentPolicy::default(), tokens))
}

/// Registers through the public flow and resolves the issued token.
pub async fn register(
    service: &BlogService,
    username: &str,
    role: users::Role,
) -> Result<(String, Caller)> {
    let payload = service
        .register(RegisterInput {
            email: format!("{username}@blog.test"),
            username: username.to_string(),
            password: PASSWORD.to_string(),
            role: Some(role),
        })
        .await
        .with_context(|| format!("register {username}"))?;
    let caller = service.resolve_caller(&payload.token).await?;
    Ok((payload.token, caller))
}

/// Admins cannot self-register, so they are written straight to the store.
pub async fn admin(service: &BlogService, username: &str) -> Result<(String, Caller)> {
    let user = user_store::insert(
        service.db(),
        NewUser {
            email: format!("{username}@blog.test"),
            username: username.to_string(),
            password_hash: hash_password(PASSWORD)?,
            role: users::Role::Admin,
        },
    )
    .await?;
    let payload = service
        .login(LoginInput {
            email: user.email,
            password: PASSWORD.to_string(),
        })
        .await?;
    let caller = service.resolve_caller(&payload.token).await?;
    Ok((payload.token, caller))
}
