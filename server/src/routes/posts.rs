use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use platform_api::ApiResult;
use products_blog::{
    PostInput,
    views::{MessagePayload, PostView},
};

use crate::{
    caller::{MaybeCaller, RequireCaller, parse_id},
    http::{ApiJson, AppState},
};

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<PostView>>> {
    state.blog.list_published().await.map(Json)
}

pub async fn dashboard(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
) -> ApiResult<Json<Vec<PostView>>> {
    state.blog.author_dashboard(&caller).await.map(Json)
}

pub async fn detail(
    State(state): State<AppState>,
    MaybeCaller(caller): MaybeCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<PostView>> {
    let id = parse_id(&id, "post")?;
    state.blog.get_post(id, caller.as_ref()).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ApiJson(input): ApiJson<PostInput>,
) -> ApiResult<(StatusCode, Json<PostView>)> {
    let post = state.blog.create_post(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<PostInput>,
) -> ApiResult<Json<PostView>> {
    let id = parse_id(&id, "post")?;
    state.blog.update_post(id, &caller, input).await.map(Json)
}

pub async fn toggle_publish(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<PostView>> {
    let id = parse_id(&id, "post")?;
    state.blog.toggle_publish(id, &caller).await.map(Json)
}

pub async fn remove(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    Path(id): Path<String>,
) -> ApiResult<Json<MessagePayload>> {
    let id = parse_id(&id, "post")?;
    state.blog.delete_post(id, &caller).await.map(Json)
}
