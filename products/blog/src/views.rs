//! Response shapes. Field names follow the SPA's camelCase contract.

use entity::{comments, posts, users};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

/// Public identity attached to posts and comments. Never carries email or
/// credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
}

impl From<&users::Model> for AuthorView {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// The account owner's own view of their profile.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: users::Role,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<users::Model> for UserView {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AuthPayload {
    pub message: &'static str,
    pub token: String,
    pub user: UserView,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    pub message: &'static str,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommentCount {
    pub comments: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorView>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl CommentView {
    pub fn new(comment: comments::Model, author: Option<&users::Model>) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author: author.map(AuthorView::from),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentView>>,
    #[serde(rename = "_count", skip_serializing_if = "Option::is_none")]
    pub count: Option<CommentCount>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl PostView {
    pub fn new(post: posts::Model, author: Option<&users::Model>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            published: post.published,
            author_id: post.author_id,
            author: author.map(AuthorView::from),
            comments: None,
            count: None,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }

    pub fn with_comments(mut self, comments: Vec<CommentView>) -> Self {
        self.comments = Some(comments);
        self
    }

    pub fn with_count(mut self, comments: u64) -> Self {
        self.count = Some(CommentCount { comments });
        self
    }
}
