use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::{ClientIp, CurrentUser};
use crate::dashboard::dto::{AdminDashboard, EmployeeDashboard, EmployeeInsight, TeamDashboard};
use crate::dashboard::services;
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/employee", get(employee))
        .route("/dashboard/hr", get(hr))
        .route("/dashboard/admin", get(admin))
        .route("/dashboard/employee/:id", get(insight))
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub department: Option<String>,
}

#[instrument(skip(state, actor))]
async fn employee(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
) -> ApiResult<Json<ApiResponse<EmployeeDashboard>>> {
    let data = services::employee_dashboard(&state, &actor, &ip).await?;
    Ok(Json(ApiResponse::success("Dashboard data retrieved", data)))
}

#[instrument(skip(state, actor))]
async fn hr(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<ApiResponse<TeamDashboard>>> {
    let data = services::hr_dashboard(&state, &actor, query.department, &ip).await?;
    Ok(Json(ApiResponse::success("Dashboard data retrieved", data)))
}

#[instrument(skip(state, actor))]
async fn admin(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
) -> ApiResult<Json<ApiResponse<AdminDashboard>>> {
    let data = services::admin_dashboard(&state, &actor, &ip).await?;
    Ok(Json(ApiResponse::success("Dashboard data retrieved", data)))
}

#[instrument(skip(state, actor))]
async fn insight(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<EmployeeInsight>>> {
    let data = services::employee_insight(&state, &actor, id, &ip).await?;
    Ok(Json(ApiResponse::success("Employee insight retrieved", data)))
}
