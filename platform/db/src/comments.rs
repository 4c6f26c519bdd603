use chrono::Utc;
use entity::{comments, posts, users};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

/// Loads a comment together with its parent post.
pub async fn find_with_post<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<(comments::Model, posts::Model)>, DbErr> {
    let row = comments::Entity::find_by_id(id)
        .find_also_related(posts::Entity)
        .one(db)
        .await?;
    match row {
        None => Ok(None),
        Some((comment, Some(post))) => Ok(Some((comment, post))),
        Some((comment, None)) => Err(DbErr::Custom(format!(
            "comment {} references missing post {}",
            comment.id, comment.post_id
        ))),
    }
}

/// Comments on a post with their authors, newest first. Ties on the creation
/// timestamp keep insertion order (ids are time-ordered v7 UUIDs).
pub async fn list_for_post<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
) -> Result<Vec<(comments::Model, Option<users::Model>)>, DbErr> {
    comments::Entity::find()
        .filter(comments::Column::PostId.eq(post_id))
        .find_also_related(users::Entity)
        .order_by_desc(comments::Column::CreatedAt)
        .order_by_asc(comments::Column::Id)
        .all(db)
        .await
}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    new: NewComment,
) -> Result<comments::Model, DbErr> {
    let now = Utc::now();
    comments::ActiveModel {
        id: Set(Uuid::now_v7()),
        post_id: Set(new.post_id),
        author_id: Set(new.author_id),
        content: Set(new.content),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
}

pub async fn update_content<C: ConnectionTrait>(
    db: &C,
    comment: comments::Model,
    content: String,
) -> Result<comments::Model, DbErr> {
    let mut model = comment.into_active_model();
    model.content = Set(content);
    model.updated_at = Set(Utc::now().into());
    model.update(db).await
}

/// `Ok(false)` when nothing was removed.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, DbErr> {
    let result = comments::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::{self as post_store, NewPost};
    use crate::testing::{memory_pool, user};

    #[tokio::test]
    async fn listing_is_newest_first_with_stable_ties() {
        let pool = memory_pool().await;
        let author = user(&pool, "talker").await;
        let post = post_store::insert(
            &pool,
            NewPost {
                author_id: author.id,
                title: "Thread".into(),
                content: "Discussion starter".into(),
                published: true,
            },
        )
        .await
        .unwrap();

        let older = insert(
            &pool,
            NewComment {
                post_id: post.id,
                author_id: author.id,
                content: "older".into(),
            },
        )
        .await
        .unwrap();

        // two comments sharing one timestamp, inserted in order
        let stamp = Utc::now() + chrono::Duration::seconds(5);
        let mut tied = Vec::new();
        for text in ["tie-a", "tie-b"] {
            let model = comments::ActiveModel {
                id: Set(Uuid::now_v7()),
                post_id: Set(post.id),
                author_id: Set(author.id),
                content: Set(text.into()),
                created_at: Set(stamp.into()),
                updated_at: Set(stamp.into()),
            }
            .insert(&pool)
            .await
            .unwrap();
            tied.push(model.id);
        }

        let listed = list_for_post(&pool, post.id).await.unwrap();
        let ids = listed.iter().map(|(c, _)| c.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![tied[0], tied[1], older.id]);
        assert!(listed.iter().all(|(_, a)| a.as_ref().map(|a| a.id) == Some(author.id)));
    }

    #[tokio::test]
    async fn find_with_post_and_delete() {
        let pool = memory_pool().await;
        let author = user(&pool, "host").await;
        let post = post_store::insert(
            &pool,
            NewPost {
                author_id: author.id,
                title: "Host".into(),
                content: "Hosting comments".into(),
                published: false,
            },
        )
        .await
        .unwrap();
        let comment = insert(
            &pool,
            NewComment {
                post_id: post.id,
                author_id: author.id,
                content: "hello".into(),
            },
        )
        .await
        .unwrap();

        let (found, parent) = find_with_post(&pool, comment.id).await.unwrap().unwrap();
        assert_eq!(found.id, comment.id);
        assert_eq!(parent.id, post.id);

        let edited = update_content(&pool, found, "edited".into()).await.unwrap();
        assert_eq!(edited.content, "edited");

        assert!(delete(&pool, comment.id).await.unwrap());
        assert!(!delete(&pool, comment.id).await.unwrap());
        assert!(find_with_post(&pool, comment.id).await.unwrap().is_none());
    }
}
