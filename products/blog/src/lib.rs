//! Blog services.
//!
//! Each operation loads the rows it needs, asks `platform-authz` for a
//! decision, and only then writes. The database handle is injected when the
//! service is built, so tests run the same code against in-memory SQLite.

use entity::users;
use platform_api::ApiError;
use platform_authn::TokenConfig;
use platform_authz::{Caller, ContentPolicy, PostFacts, Role};
use platform_db::DbPool;
use sea_orm::DbErr;

pub mod accounts;
pub mod comments;
pub mod posts;
pub mod views;

pub use accounts::{LoginInput, RegisterInput};
pub use comments::CommentInput;
pub use posts::PostInput;

#[derive(Clone, Debug)]
pub struct BlogService {
    db: DbPool,
    policy: ContentPolicy,
    tokens: TokenConfig,
}

impl BlogService {
    pub fn new(db: DbPool, policy: ContentPolicy, tokens: TokenConfig) -> Self {
        Self { db, policy, tokens }
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }
}

pub(crate) fn role_of(role: users::Role) -> Role {
    match role {
        users::Role::User => Role::User,
        users::Role::Author => Role::Author,
        users::Role::Admin => Role::Admin,
    }
}

pub(crate) fn caller_of(user: &users::Model) -> Caller {
    Caller::new(user.id, role_of(user.role))
}

pub(crate) fn post_facts(post: &entity::posts::Model) -> PostFacts {
    PostFacts {
        author_id: post.author_id,
        published: post.published,
    }
}

/// A row that passed the existence check but was gone by the time we wrote.
pub(crate) fn vanished(resource: &'static str) -> impl FnOnce(DbErr) -> ApiError {
    move |err| match err {
        DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => ApiError::NotFound(resource),
        other => ApiError::from(other),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use migration::{Migrator, MigratorTrait};
    use platform_authz::Caller;
    use platform_db::users::{self as user_store, NewUser};
    use sea_orm::Database;

    use super::*;

    pub const SECRET: &str = "test-secret-test-secret-test-secret";

    pub async fn service() -> BlogService {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&pool, None).await.unwrap();
        let tokens = TokenConfig::new(SECRET, 60).unwrap();
        BlogService::new(pool, ContentPolicy::default(), tokens)
    }

    /// Inserts a user directly, skipping password hashing.
    pub async fn member(service: &BlogService, username: &str, role: users::Role) -> Caller {
        let user = user_store::insert(
            service.db(),
            NewUser {
                email: format!("{username}@blog.test"),
                username: username.to_string(),
                password_hash: "unused".into(),
                role,
            },
        )
        .await
        .unwrap();
        caller_of(&user)
    }
}
