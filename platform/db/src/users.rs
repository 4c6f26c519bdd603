use chrono::Utc;
use entity::users;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: users::Role,
}

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await
}

pub async fn email_or_username_taken<C: ConnectionTrait>(
    db: &C,
    email: &str,
    username: &str,
) -> Result<bool, DbErr> {
    let count = users::Entity::find()
        .filter(
            Condition::any()
                .add(users::Column::Email.eq(email))
                .add(users::Column::Username.eq(username)),
        )
        .count(db)
        .await?;
    Ok(count > 0)
}

pub async fn insert<C: ConnectionTrait>(db: &C, new: NewUser) -> Result<users::Model, DbErr> {
    let now = Utc::now();
    users::ActiveModel {
        id: Set(Uuid::now_v7()),
        email: Set(new.email),
        username: Set(new.username),
        password_hash: Set(new.password_hash),
        role: Set(new.role),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
}
