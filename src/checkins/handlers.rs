use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::{ClientIp, CurrentUser};
use crate::checkins::dto::{
    CanCheckinData, CheckinData, CheckinHistoryItem, CheckinRequest, EmotionTypeResponse,
    Pagination,
};
use crate::checkins::services;
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkin", post(create))
        .route("/checkin/today", get(today))
        .route("/checkin/can-checkin", get(can_checkin))
        .route("/checkin/history", get(history))
        .route("/checkin/emotions", get(emotions))
}

#[instrument(skip(state, actor, payload))]
async fn create(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Json(payload): Json<CheckinRequest>,
) -> ApiResult<Json<ApiResponse<CheckinData>>> {
    let data = services::create(&state, &actor, payload, &ip).await?;
    Ok(Json(ApiResponse::success(
        "Check-in completed successfully",
        data,
    )))
}

#[instrument(skip(state, actor))]
async fn today(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<CheckinData>>> {
    let data = services::today(&state, &actor).await?;
    Ok(Json(ApiResponse::success("Check-in found", data)))
}

#[instrument(skip(state, actor))]
async fn can_checkin(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<CanCheckinData>>> {
    let data = services::can_checkin(&state, &actor).await?;
    let message = if data.can_checkin {
        "Can check-in"
    } else {
        "Already checked-in today"
    };
    Ok(Json(ApiResponse::success(message, data)))
}

#[instrument(skip(state, actor))]
async fn history(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<ApiResponse<Vec<CheckinHistoryItem>>>> {
    let data = services::history(&state, &actor, page).await?;
    Ok(Json(ApiResponse::success("Check-in history retrieved", data)))
}

#[instrument(skip(state, _actor))]
async fn emotions(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<EmotionTypeResponse>>>> {
    let data = services::emotions(&state).await?;
    Ok(Json(ApiResponse::success("Emotions retrieved", data)))
}
