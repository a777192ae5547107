use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::{ClientIp, CurrentUser};
use crate::error::ApiResult;
use crate::notifications::dto::{
    NotificationResponse, SendNotificationRequest, UnreadCountData,
};
use crate::notifications::services;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list).post(send))
        .route("/notifications/unread", get(unread))
        .route("/notifications/count-unread", get(count_unread))
        .route("/notifications/:id/read", put(mark_read))
        .route("/notifications/read-all", put(mark_all_read))
}

#[instrument(skip(state, actor))]
async fn list(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<NotificationResponse>>>> {
    let data = services::list(&state, &actor).await?;
    Ok(Json(ApiResponse::success("Notifications retrieved", data)))
}

#[instrument(skip(state, actor))]
async fn unread(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<NotificationResponse>>>> {
    let data = services::unread(&state, &actor).await?;
    Ok(Json(ApiResponse::success("Notifications retrieved", data)))
}

#[instrument(skip(state, actor))]
async fn count_unread(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<UnreadCountData>>> {
    let data = services::count_unread(&state, &actor).await?;
    Ok(Json(ApiResponse::success("Unread count retrieved", data)))
}

#[instrument(skip(state, actor, payload))]
async fn send(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Json(payload): Json<SendNotificationRequest>,
) -> ApiResult<Json<ApiResponse<NotificationResponse>>> {
    let data = services::send(&state, &actor, payload, &ip).await?;
    Ok(Json(ApiResponse::success("Notification sent", data)))
}

#[instrument(skip(state, actor))]
async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    services::mark_read(&state, &actor, id).await?;
    Ok(Json(ApiResponse::message("Notification marked as read")))
}

#[instrument(skip(state, actor))]
async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<()>>> {
    services::mark_all_read(&state, &actor).await?;
    Ok(Json(ApiResponse::message("All notifications marked as read")))
}
