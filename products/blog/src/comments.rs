use platform_api::{ApiError, ApiResult};
use platform_authz::{
    Caller, CommentFacts, Denied, comment_creation, comment_listing, comment_mutation,
};
use platform_db::{
    comments::{self as comment_store, NewComment},
    posts as post_store, users as user_store,
};
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    BlogService, post_facts, vanished,
    views::{CommentView, MessagePayload},
};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub content: String,
}

impl BlogService {
    /// Every comment on the post, newest first, or a denial. Never partial.
    #[instrument(name = "comments.list", skip_all, fields(post = %post_id))]
    pub async fn list_comments(
        &self,
        post_id: Uuid,
        caller: Option<&Caller>,
    ) -> ApiResult<Vec<CommentView>> {
        let post = post_store::find_by_id(&self.db, post_id).await?;
        comment_listing(post.as_ref().map(post_facts).as_ref(), caller)?;

        let comments = comment_store::list_for_post(&self.db, post_id).await?;
        Ok(comments
            .into_iter()
            .map(|(comment, author)| CommentView::new(comment, author.as_ref()))
            .collect())
    }

    #[instrument(name = "comments.create", skip_all, fields(post = %post_id, caller = %caller.id))]
    pub async fn create_comment(
        &self,
        post_id: Uuid,
        caller: &Caller,
        content: String,
    ) -> ApiResult<CommentView> {
        let post = post_store::find_by_id(&self.db, post_id).await?;
        comment_creation(
            post.as_ref().map(post_facts).as_ref(),
            Some(caller),
            &content,
            &self.policy,
        )?;

        let comment = comment_store::insert(
            &self.db,
            NewComment {
                post_id,
                author_id: caller.id,
                content,
            },
        )
        .await?;
        let author = user_store::find_by_id(&self.db, caller.id).await?;
        debug!(comment = %comment.id, "comment created");
        Ok(CommentView::new(comment, author.as_ref()))
    }

    #[instrument(name = "comments.update", skip_all, fields(comment = %id, caller = %caller.id))]
    pub async fn update_comment(
        &self,
        id: Uuid,
        caller: &Caller,
        content: String,
    ) -> ApiResult<CommentView> {
        self.policy.check_comment(&content).map_err(Denied::from)?;
        let row = comment_store::find_with_post(&self.db, id).await?;
        comment_mutation(row.as_ref().map(comment_facts).as_ref(), caller)?;
        let (comment, _) = row.ok_or(ApiError::NotFound("comment"))?;

        let updated = comment_store::update_content(&self.db, comment, content)
            .await
            .map_err(vanished("comment"))?;
        let author = user_store::find_by_id(&self.db, updated.author_id).await?;
        Ok(CommentView::new(updated, author.as_ref()))
    }

    #[instrument(name = "comments.delete", skip_all, fields(comment = %id, caller = %caller.id))]
    pub async fn delete_comment(
        &self,
        id: Uuid,
        caller: &Caller,
    ) -> ApiResult<MessagePayload> {
        let row = comment_store::find_with_post(&self.db, id).await?;
        comment_mutation(row.as_ref().map(comment_facts).as_ref(), caller)?;

        if !comment_store::delete(&self.db, id).await? {
            return Err(ApiError::NotFound("comment"));
        }
        Ok(MessagePayload {
            message: "Comment deleted successfully",
        })
    }
}

fn comment_facts((comment, post): &(entity::comments::Model, entity::posts::Model)) -> CommentFacts {
    CommentFacts {
        author_id: comment.author_id,
        post_author_id: post.author_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PostInput;
    use crate::testing::{member, service};
    use entity::users;

    async fn post(blog: &BlogService, author: &Caller, published: bool) -> Uuid {
        blog.create_post(
            author,
            PostInput {
                title: "Thread".into(),
                content: "Comments welcome below".into(),
                published: Some(published),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn comment_length_boundary_is_three() {
        let blog = service().await;
        let author = member(&blog, "author", users::Role::Author).await;
        let reader = member(&blog, "reader", users::Role::User).await;
        let post_id = post(&blog, &author, true).await;

        let err = blog
            .create_comment(post_id, &reader, "ab".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(blog.list_comments(post_id, None).await.unwrap().is_empty());

        let created = blog
            .create_comment(post_id, &reader, "abc".into())
            .await
            .unwrap();
        assert_eq!(created.author_id, reader.id);
        assert_eq!(created.author.map(|a| a.username), Some("reader".to_string()));
    }

    #[tokio::test]
    async fn draft_comments_are_hidden_from_outsiders() {
        let blog = service().await;
        let author = member(&blog, "author", users::Role::Author).await;
        let reader = member(&blog, "reader", users::Role::User).await;
        let admin = member(&blog, "admin", users::Role::Admin).await;
        let draft = post(&blog, &author, false).await;
        blog.create_comment(draft, &author, "first draft note".into())
            .await
            .unwrap();

        assert!(matches!(
            blog.list_comments(draft, None).await,
            Err(ApiError::Unauthenticated)
        ));
        assert!(matches!(
            blog.list_comments(draft, Some(&reader)).await,
            Err(ApiError::Forbidden)
        ));
        assert!(matches!(
            blog.create_comment(draft, &reader, "let me in".into()).await,
            Err(ApiError::Forbidden)
        ));
        assert_eq!(blog.list_comments(draft, Some(&admin)).await.unwrap().len(), 1);
        assert!(matches!(
            blog.list_comments(Uuid::new_v4(), None).await,
            Err(ApiError::NotFound("post"))
        ));
    }

    #[tokio::test]
    async fn post_author_moderates_foreign_comments() {
        let blog = service().await;
        let author = member(&blog, "author", users::Role::Author).await;
        let commenter = member(&blog, "commenter", users::Role::User).await;
        let bystander = member(&blog, "bystander", users::Role::User).await;
        let post_id = post(&blog, &author, true).await;
        let comment = blog
            .create_comment(post_id, &commenter, "hello there".into())
            .await
            .unwrap();

        assert!(matches!(
            blog.update_comment(comment.id, &bystander, "vandalism".into()).await,
            Err(ApiError::Forbidden)
        ));
        let edited = blog
            .update_comment(comment.id, &author, "[moderated]".into())
            .await
            .unwrap();
        assert_eq!(edited.content, "[moderated]");
        assert_eq!(edited.author_id, commenter.id);

        blog.delete_comment(comment.id, &author).await.unwrap();
        assert!(matches!(
            blog.delete_comment(comment.id, &author).await,
            Err(ApiError::NotFound("comment"))
        ));
    }

    #[tokio::test]
    async fn comments_list_newest_first() {
        let blog = service().await;
        let author = member(&blog, "author", users::Role::Author).await;
        let post_id = post(&blog, &author, true).await;
        let mut created = Vec::new();
        for text in ["one", "two", "three"] {
            created.push(
                blog.create_comment(post_id, &author, text.into())
                    .await
                    .unwrap()
                    .id,
            );
        }
        created.reverse();
        let listed = blog
            .list_comments(post_id, None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect::<Vec<_>>();
        assert_eq!(listed, created);
    }
}
