use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;

use movies_api_core::models::{CreateMovie, UpdateMovie};

use crate::{ApiError, AppState, error::ApiResult};

pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let movies = state.movie_service.list().await?;
    Ok((StatusCode::OK, Json(movies)))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let movie = state.movie_service.get_by_id(&id).await?;
    Ok((StatusCode::OK, Json(movie)))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let input = CreateMovie::from_json(&body)?;
    let movie = state.movie_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let input = UpdateMovie::from_json(&body)?;
    let movie = state.movie_service.update(&id, input).await?;
    Ok((StatusCode::OK, Json(movie)))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.movie_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
