use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::extractors::{ClientIp, CurrentUser};
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::users::dto::{
    AssignDepartmentRequest, CreateUserRequest, SearchQuery, UpdateUserRequest, UserResponse,
};
use crate::users::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/search", get(search_users))
        .route("/users/without-department", get(without_department))
        .route("/users/assign-department", put(assign_department))
        .route("/users/department/:department", get(by_department))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(deactivate_user),
        )
        .route("/users/:id/activate", put(activate_user))
}

#[instrument(skip(state, actor))]
async fn list_users(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let data = services::list_all(&state, &actor).await?;
    Ok(Json(ApiResponse::success("Users retrieved", data)))
}

#[instrument(skip(state, actor))]
async fn search_users(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let data = services::search(&state, &actor, &query.keyword).await?;
    Ok(Json(ApiResponse::success("Search results", data)))
}

#[instrument(skip(state, _actor))]
async fn get_user(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let data = services::get(&state, id).await?;
    Ok(Json(ApiResponse::success("User found", data)))
}

#[instrument(skip(state, actor, payload))]
async fn create_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let data = services::create(&state, &actor, payload, &ip).await?;
    Ok(Json(ApiResponse::success("User created", data)))
}

#[instrument(skip(state, actor, payload))]
async fn update_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let data = services::update(&state, &actor, id, payload, &ip).await?;
    Ok(Json(ApiResponse::success("User updated", data)))
}

#[instrument(skip(state, actor))]
async fn deactivate_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let data = services::deactivate(&state, &actor, id, &ip).await?;
    Ok(Json(ApiResponse::success("User deactivated", data)))
}

#[instrument(skip(state, actor))]
async fn activate_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let data = services::activate(&state, &actor, id, &ip).await?;
    Ok(Json(ApiResponse::success("User activated", data)))
}

#[instrument(skip(state, actor))]
async fn by_department(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(department): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let data = services::by_department(&state, &actor, &department).await?;
    Ok(Json(ApiResponse::success("Employees retrieved", data)))
}

#[instrument(skip(state, actor))]
async fn without_department(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let data = services::without_department(&state, &actor).await?;
    Ok(Json(ApiResponse::success("Employees retrieved", data)))
}

#[instrument(skip(state, actor, payload))]
async fn assign_department(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
    Json(payload): Json<AssignDepartmentRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let data = services::assign_department(&state, &actor, payload, &ip).await?;
    Ok(Json(ApiResponse::success("Department assigned", data)))
}
