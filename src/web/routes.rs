use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use super::AppState;
use crate::constants::{
    CONTENT_TYPE_APPLICATION_JSON, CONTENT_TYPE_IMAGE_PNG, CONTENT_TYPE_VIDEO_MP4,
    MAX_VIDEO_HEIGHT, MAX_VIDEO_WIDTH,
};
use crate::error::{ApiError, ApiResult};
use crate::frames::{expect_file_header, parse_frames, IMAGE_PNG_HEADER, VIDEO_MP4_HEADER};
use crate::models::{PostData, StoredUser};
use crate::params::{integer_param, uuid_param};

type Params = HashMap<String, String>;

/// Create the router with all API routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/post/create", post(post_create))
        .route("/api/animation/create", post(animation_create))
        .route("/api/thread/list", get(thread_list))
        .route("/api/post/list", get(post_list))
        .route("/api/animation/json", get(animation_json))
        .route("/api/animation/video", get(animation_video))
        .route("/api/animation/thumbnail", get(animation_thumbnail))
        .route("/api/profile", get(profile))
        .route("/api/authtest", get(auth_test))
}

/// The raw `Authorization` header value is the bearer credential; there is
/// no scheme prefix on this wire format.
async fn verify_bearer(state: &AppState, headers: &HeaderMap) -> ApiResult<StoredUser> {
    let credential = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    state.verifier.verify(credential).await
}

async fn post_create(
    State(state): State<AppState>,
    Query(params): Query<Params>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let user = verify_bearer(&state, &headers).await?;
    let created = state
        .posts
        .create_post(
            &user,
            false,
            false,
            PostData::Comment,
            None,
            params.get("message").map(String::as_str),
            params.get("replyId").map(String::as_str),
        )
        .await?;
    Ok(Json(created).into_response())
}

async fn animation_create(
    State(state): State<AppState>,
    Query(params): Query<Params>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    // Everything about the payload is validated before the first store
    // write, including the user record refresh.
    let frames = parse_frames(&body)?;
    if frames.len() < 3 {
        return Err(ApiError::Protocol(format!(
            "expected 3 frames (scene, video, thumbnail), got {}",
            frames.len()
        )));
    }
    let scene_json = std::str::from_utf8(&frames[0])
        .map_err(|_| ApiError::Validation("scene json was not UTF-8".to_string()))?;
    serde_json::from_str::<serde_json::Value>(scene_json)
        .map_err(|e| ApiError::Validation(format!("scene json was invalid: {e}")))?;
    expect_file_header("video:video/mp4", &frames[1], &VIDEO_MP4_HEADER)?;
    expect_file_header("thumbnail:image/png", &frames[2], &IMAGE_PNG_HEADER)?;

    let width = integer_param(&params, "width", 1, MAX_VIDEO_WIDTH)?;
    let height = integer_param(&params, "height", 1, MAX_VIDEO_HEIGHT)?;

    let user = verify_bearer(&state, &headers).await?;
    let created = state
        .posts
        .create_post(
            &user,
            true,
            true,
            PostData::Animation { width, height },
            params.get("title").map(String::as_str),
            params.get("message").map(String::as_str),
            params.get("replyId").map(String::as_str),
        )
        .await?;

    state
        .posts
        .put_animation(&created.id, scene_json, &frames[1], &frames[2])
        .await?;

    Ok(Json(created).into_response())
}

async fn thread_list(State(state): State<AppState>) -> ApiResult<Response> {
    let threads = state.posts.list_threads().await?;
    Ok(Json(threads).into_response())
}

async fn post_list(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<Response> {
    let thread_id = uuid_param(&params, "threadId")?;
    let posts = state.posts.list_posts(&thread_id).await?;
    Ok(Json(posts).into_response())
}

async fn animation_json(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<Response> {
    let id = uuid_param(&params, "id")?;
    let scene = state.posts.animation_json(&id).await?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE_APPLICATION_JSON)], scene).into_response())
}

async fn animation_video(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<Response> {
    let id = uuid_param(&params, "id")?;
    let video = state.posts.animation_video(&id).await?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE_VIDEO_MP4)], video).into_response())
}

async fn animation_thumbnail(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> ApiResult<Response> {
    let id = uuid_param(&params, "id")?;
    let thumbnail = state.posts.animation_thumbnail(&id).await?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE_IMAGE_PNG)], thumbnail).into_response())
}

async fn profile(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let user = verify_bearer(&state, &headers).await?;
    Ok(Json(user).into_response())
}

async fn auth_test(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let user = verify_bearer(&state, &headers).await?;
    Ok(Json(json!({ "authorized": true, "content": user })).into_response())
}
