use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::audit::dto::{AuditLogResponse, AuditPageQuery, AuditPageResponse, AuditSearchQuery};
use crate::audit::services;
use crate::auth::extractors::{ClientIp, CurrentUser};
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(list_logs))
        .route("/audit-logs/search", get(search_logs))
        .route("/audit-logs/critical", get(critical_logs))
}

#[instrument(skip(state, actor))]
async fn list_logs(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Query(query): Query<AuditPageQuery>,
) -> ApiResult<Json<ApiResponse<AuditPageResponse>>> {
    let data = services::list(&state, &actor, query, &ip).await?;
    Ok(Json(ApiResponse::success("Audit logs retrieved", data)))
}

#[instrument(skip(state, actor))]
async fn search_logs(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<AuditSearchQuery>,
) -> ApiResult<Json<ApiResponse<AuditPageResponse>>> {
    let data = services::search(&state, &actor, query).await?;
    Ok(Json(ApiResponse::success("Audit logs retrieved", data)))
}

#[instrument(skip(state, actor))]
async fn critical_logs(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<AuditLogResponse>>>> {
    let data = services::critical(&state, &actor).await?;
    Ok(Json(ApiResponse::success(
        "Critical actions retrieved",
        data,
    )))
}
