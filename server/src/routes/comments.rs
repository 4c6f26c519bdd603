use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use platform_api::ApiResult;
use products_blog::{
    CommentInput,
    views::{CommentView, MessagePayload},
};

use crate::{
    caller::{MaybeCaller, RequireCaller, parse_id},
    http::{ApiJson, AppState},
};

pub async fn list(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Path(post_id): Path<String>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let post_id = parse_id(&post_id, "post")?;
    state
        .blog
        .list_comments(post_id, caller.as_ref())
        .await
        .map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(post_id): Path<String>,
    ApiJson(input): ApiJson<CommentInput>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let post_id = parse_id(&post_id, "post")?;
    let comment = state
        .blog
        .create_comment(post_id, &caller, input.content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CommentInput>,
) -> ApiResult<Json<CommentView>> {
    let id = parse_id(&id, "comment")?;
    state
        .blog
        .update_comment(id, &caller, input.content)
        .await
        .map(Json)
}

pub async fn remove(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<MessagePayload>> {
    let id = parse_id(&id, "comment")?;
    state.blog.delete_comment(id, &caller).await.map(Json)
}
