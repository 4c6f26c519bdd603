use platform_api::{ApiError, ApiResult};
use platform_authz::{Caller, Denied, post_creation, post_mutation, post_visibility};
use platform_db::{
    comments as comment_store,
    posts::{self as post_store, CascadeError, NewPost, PostChanges, PostSummary},
    users as user_store,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    BlogService, post_facts, vanished,
    views::{CommentView, MessagePayload, PostView},
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published: Option<bool>,
}

fn summary_view(summary: PostSummary) -> PostView {
    PostView::new(summary.post, summary.author.as_ref()).with_count(summary.comment_count)
}

impl BlogService {
    #[instrument(name = "posts.list_published", skip_all)]
    pub async fn list_published(&self) -> ApiResult<Vec<PostView>> {
        let posts = post_store::list_published(&self.db).await?;
        Ok(posts.into_iter().map(summary_view).collect())
    }

    /// The caller's own posts, drafts included.
    #[instrument(name = "posts.dashboard", skip_all, fields(caller = %caller.id))]
    pub async fn author_dashboard(&self, caller: &Caller) -> ApiResult<Vec<PostView>> {
        let posts = post_store::list_by_author(&self.db, caller.id).await?;
        Ok(posts.into_iter().map(summary_view).collect())
    }

    #[instrument(name = "posts.get", skip_all, fields(post = %id))]
    pub async fn get_post(&self, id: Uuid, caller: Option<&Caller>) -> ApiResult<PostView> {
        let row = post_store::find_with_author(&self.db, id).await?;
        post_visibility(row.as_ref().map(|(post, _)| post_facts(post)).as_ref(), caller)?;
        let (post, author) = row.ok_or(ApiError::NotFound("post"))?;

        let comments = comment_store::list_for_post(&self.db, post.id)
            .await?
            .into_iter()
            .map(|(comment, author)| CommentView::new(comment, author.as_ref()))
            .collect();
        Ok(PostView::new(post, author.as_ref()).with_comments(comments))
    }

    /// The role is checked before the input.
    #[instrument(name = "posts.create", skip_all, fields(caller = %caller.id))]
    pub async fn create_post(&self, caller: &Caller, input: PostInput) -> ApiResult<PostView> {
        post_creation(caller)?;
        self.policy
            .check_post(&input.title, &input.content)
            .map_err(Denied::from)?;

        let post = post_store::insert(
            &self.db,
            NewPost {
                author_id: caller.id,
                title: input.title,
                content: input.content,
                published: input.published.unwrap_or(false),
            },
        )
        .await?;
        let author = user_store::find_by_id(&self.db, caller.id).await?;
        info!(post = %post.id, published = post.published, "post created");
        Ok(PostView::new(post, author.as_ref()))
    }

    #[instrument(name = "posts.update", skip_all, fields(post = %id, caller = %caller.id))]
    pub async fn update_post(
        &self,
        id: Uuid,
        caller: &Caller,
        input: PostInput,
    ) -> ApiResult<PostView> {
        self.policy
            .check_post(&input.title, &input.content)
            .map_err(Denied::from)?;
        let post = post_store::find_by_id(&self.db, id).await?;
        post_mutation(post.as_ref().map(post_facts).as_ref(), caller)?;
        let post = post.ok_or(ApiError::NotFound("post"))?;

        let updated = post_store::update(
            &self.db,
            post,
            PostChanges {
                title: input.title,
                content: input.content,
                published: input.published,
            },
        )
        .await
        .map_err(vanished("post"))?;
        let author = user_store::find_by_id(&self.db, updated.author_id).await?;
        Ok(PostView::new(updated, author.as_ref()))
    }

    #[instrument(name = "posts.toggle_publish", skip_all, fields(post = %id, caller = %caller.id))]
    pub async fn toggle_publish(&self, id: Uuid, caller: &Caller) -> ApiResult<PostView> {
        let post = post_store::find_by_id(&self.db, id).await?;
        post_mutation(post.as_ref().map(post_facts).as_ref(), caller)?;
        let post = post.ok_or(ApiError::NotFound("post"))?;

        let published = !post.published;
        let updated = post_store::set_published(&self.db, post, published)
            .await
            .map_err(vanished("post"))?;
        info!(published, "post publish state changed");
        Ok(PostView::new(updated, None))
    }

    /// Removes the post and its comments as one unit. If either step fails
    /// nothing is removed.
    #[instrument(name = "posts.delete", skip_all, fields(post = %id, caller = %caller.id))]
    pub async fn delete_post(&self, id: Uuid, caller: &Caller) -> ApiResult<MessagePayload> {
        let post = post_store::find_by_id(&self.db, id).await?;
        post_mutation(post.as_ref().map(post_facts).as_ref(), caller)?;

        match post_store::delete_cascade(&self.db, id).await {
            Ok(Some(report)) => {
                info!(comments_removed = report.comments_removed, "post deleted");
                Ok(MessagePayload {
                    message: "Post deleted successfully",
                })
            }
            // removed concurrently between the lookup and the transaction
            Ok(None) => Err(ApiError::NotFound("post")),
            Err(err @ CascadeError::Begin(_)) => Err(ApiError::internal(err)),
            Err(err) => Err(ApiError::rolled_back(err)),
        }
    }
}
