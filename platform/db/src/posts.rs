use std::collections::HashMap;

use chrono::Utc;
use entity::{comments, posts, users};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct NewPost {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub published: bool,
}

#[derive(Clone, Debug)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    /// `None` leaves the publish flag as it is.
    pub published: Option<bool>,
}

/// A post with its author and the number of comments attached to it.
#[derive(Clone, Debug)]
pub struct PostSummary {
    pub post: posts::Model,
    pub author: Option<users::Model>,
    pub comment_count: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CascadeReport {
    pub comments_removed: u64,
}

#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("failed to open transaction")]
    Begin(#[source] DbErr),
    #[error("failed to remove comments of post {post_id}")]
    Comments {
        post_id: Uuid,
        #[source]
        source: DbErr,
    },
    #[error("failed to remove post {post_id}")]
    Post {
        post_id: Uuid,
        #[source]
        source: DbErr,
    },
    #[error("failed to finish transaction")]
    Finish(#[source] DbErr),
}

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<posts::Model>, DbErr> {
    posts::Entity::find_by_id(id).one(db).await
}

pub async fn find_with_author<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<(posts::Model, Option<users::Model>)>, DbErr> {
    posts::Entity::find_by_id(id)
        .find_also_related(users::Entity)
        .one(db)
        .await
}

/// Published posts, newest first.
pub async fn list_published<C: ConnectionTrait>(db: &C) -> Result<Vec<PostSummary>, DbErr> {
    let rows = posts::Entity::find()
        .filter(posts::Column::Published.eq(true))
        .find_also_related(users::Entity)
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_asc(posts::Column::Id)
        .all(db)
        .await?;
    summarize(db, rows).await
}

/// Every post by `author_id`, drafts included, newest first.
pub async fn list_by_author<C: ConnectionTrait>(
    db: &C,
    author_id: Uuid,
) -> Result<Vec<PostSummary>, DbErr> {
    let rows = posts::Entity::find()
        .filter(posts::Column::AuthorId.eq(author_id))
        .find_also_related(users::Entity)
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_asc(posts::Column::Id)
        .all(db)
        .await?;
    summarize(db, rows).await
}

async fn summarize<C: ConnectionTrait>(
    db: &C,
    rows: Vec<(posts::Model, Option<users::Model>)>,
) -> Result<Vec<PostSummary>, DbErr> {
    let ids = rows.iter().map(|(post, _)| post.id).collect::<Vec<_>>();
    let counts = comment_counts(db, ids).await?;
    Ok(rows
        .into_iter()
        .map(|(post, author)| {
            let comment_count = counts.get(&post.id).copied().unwrap_or(0);
            PostSummary {
                post,
                author,
                comment_count,
            }
        })
        .collect())
}

async fn comment_counts<C: ConnectionTrait>(
    db: &C,
    post_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, u64>, DbErr> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, i64)> = comments::Entity::find()
        .select_only()
        .column(comments::Column::PostId)
        .column_as(Expr::col(comments::Column::Id).count(), "count")
        .filter(comments::Column::PostId.is_in(post_ids))
        .group_by(comments::Column::PostId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, count.max(0) as u64))
        .collect())
}

pub async fn insert<C: ConnectionTrait>(db: &C, new: NewPost) -> Result<posts::Model, DbErr> {
    let now = Utc::now();
    posts::ActiveModel {
        id: Set(Uuid::now_v7()),
        author_id: Set(new.author_id),
        title: Set(new.title),
        content: Set(new.content),
        published: Set(new.published),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
}

/// Fails with `DbErr::RecordNotUpdated` if the row vanished since it was read.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    post: posts::Model,
    changes: PostChanges,
) -> Result<posts::Model, DbErr> {
    let published = changes.published.unwrap_or(post.published);
    let mut model = post.into_active_model();
    model.title = Set(changes.title);
    model.content = Set(changes.content);
    model.published = Set(published);
    model.updated_at = Set(Utc::now().into());
    model.update(db).await
}

pub async fn set_published<C: ConnectionTrait>(
    db: &C,
    post: posts::Model,
    published: bool,
) -> Result<posts::Model, DbErr> {
    let mut model = post.into_active_model();
    model.published = Set(published);
    model.updated_at = Set(Utc::now().into());
    model.update(db).await
}

/// Removes a post and all of its comments in one transaction.
///
/// Returns `Ok(None)` when the post is already gone. Any failure leaves both
/// tables untouched: an early return drops `txn`, which rolls it back.
pub async fn delete_cascade<C: TransactionTrait>(
    db: &C,
    post_id: Uuid,
) -> Result<Option<CascadeReport>, CascadeError> {
    let txn = db.begin().await.map_err(CascadeError::Begin)?;

    let comments_removed = comments::Entity::delete_many()
        .filter(comments::Column::PostId.eq(post_id))
        .exec(&txn)
        .await
        .map_err(|source| CascadeError::Comments { post_id, source })?
        .rows_affected;

    let posts_removed = posts::Entity::delete_by_id(post_id)
        .exec(&txn)
        .await
        .map_err(|source| CascadeError::Post { post_id, source })?
        .rows_affected;

    if posts_removed == 0 {
        txn.rollback().await.map_err(CascadeError::Finish)?;
        return Ok(None);
    }

    txn.commit().await.map_err(CascadeError::Finish)?;
    debug!(%post_id, comments_removed, "post removed with comments");
    Ok(Some(CascadeReport { comments_removed }))
}
