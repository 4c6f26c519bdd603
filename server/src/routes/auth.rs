use axum::{Json, extract::State, http::StatusCode};
use platform_api::ApiResult;
use products_blog::{LoginInput, RegisterInput, views::AuthPayload};

use crate::http::{ApiJson, AppState};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> ApiResult<(StatusCode, Json<AuthPayload>)> {
    let payload = state.blog.register(input).await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> ApiResult<Json<AuthPayload>> {
    state.blog.login(input).await.map(Json)
}
