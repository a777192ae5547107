use uuid::Uuid;

use crate::audit::repo::AuditAction;
use crate::audit::services::record;
use crate::auth::handlers::is_valid_email;
use crate::auth::password::hash_password;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::users::dto::{AssignDepartmentRequest, CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::users::repo::{self, NewUser, Role, User};

pub(crate) fn require_admin(actor: &User) -> ApiResult<()> {
    if !actor.role.is_admin() {
        return Err(ApiError::forbidden(
            "Access denied: SuperAdmin role required",
        ));
    }
    Ok(())
}

pub(crate) fn require_hr(actor: &User) -> ApiResult<()> {
    if !actor.role.is_hr_or_admin() {
        return Err(ApiError::forbidden("Access denied: HR role required"));
    }
    Ok(())
}

pub async fn list_all(state: &AppState, actor: &User) -> ApiResult<Vec<UserResponse>> {
    require_admin(actor)?;
    let users = repo::list_all(&state.db).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn search(state: &AppState, actor: &User, keyword: &str) -> ApiResult<Vec<UserResponse>> {
    require_admin(actor)?;
    let users = repo::search_by_name(&state.db, keyword.trim()).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn get(state: &AppState, id: Uuid) -> ApiResult<UserResponse> {
    let user = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(UserResponse::from(user))
}

pub async fn create(
    state: &AppState,
    actor: &User,
    payload: CreateUserRequest,
    ip: &str,
) -> ApiResult<UserResponse> {
    require_admin(actor)?;

    let email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::bad_request("Password too short"));
    }
    if payload.department.is_some() && payload.role != Role::Employee {
        return Err(ApiError::bad_request(
            "Can only assign department to employees",
        ));
    }
    if repo::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::insert(
        &state.db,
        NewUser {
            name: &name,
            email: &email,
            password_hash: &hash,
            role: payload.role,
            department: payload.department.as_deref(),
            position: payload.position.as_deref(),
        },
    )
    .await?;

    record(
        &state.db,
        actor.id,
        AuditAction::AddUser,
        Some(user.id),
        Some(serde_json::json!({ "role": user.role }).to_string()),
        ip,
    )
    .await?;
    Ok(UserResponse::from(user))
}

pub async fn update(
    state: &AppState,
    actor: &User,
    id: Uuid,
    payload: UpdateUserRequest,
    ip: &str,
) -> ApiResult<UserResponse> {
    if actor.id != id {
        require_admin(actor)?;
    }

    let target = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let name = match payload.name.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::bad_request("Name is required")),
        Some(name) => name.to_string(),
        None => target.name.clone(),
    };
    let email = match payload.email.as_deref() {
        Some(raw) => {
            let email = raw.trim().to_lowercase();
            if !is_valid_email(&email) {
                return Err(ApiError::bad_request("Invalid email"));
            }
            if email != target.email
                && repo::find_by_email(&state.db, &email).await?.is_some()
            {
                return Err(ApiError::conflict("Email already registered"));
            }
            email
        }
        None => target.email.clone(),
    };
    let position = payload.position.or_else(|| target.position.clone());

    let updated = repo::update_profile(&state.db, id, &name, &email, position.as_deref()).await?;

    let action = if actor.id == id {
        AuditAction::ProfileUpdate
    } else {
        AuditAction::EditUser
    };
    record(&state.db, actor.id, action, Some(id), None, ip).await?;
    Ok(UserResponse::from(updated))
}

pub async fn deactivate(state: &AppState, actor: &User, id: Uuid, ip: &str) -> ApiResult<UserResponse> {
    require_admin(actor)?;
    if actor.id == id {
        return Err(ApiError::bad_request("Cannot deactivate yourself"));
    }
    let user = repo::set_active(&state.db, id, false)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    record(
        &state.db,
        actor.id,
        AuditAction::DeactivateUser,
        Some(id),
        None,
        ip,
    )
    .await?;
    Ok(UserResponse::from(user))
}

pub async fn activate(state: &AppState, actor: &User, id: Uuid, ip: &str) -> ApiResult<UserResponse> {
    require_admin(actor)?;
    let user = repo::set_active(&state.db, id, true)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    record(
        &state.db,
        actor.id,
        AuditAction::ActivateUser,
        Some(id),
        None,
        ip,
    )
    .await?;
    Ok(UserResponse::from(user))
}

pub async fn by_department(
    state: &AppState,
    actor: &User,
    department: &str,
) -> ApiResult<Vec<UserResponse>> {
    require_hr(actor)?;
    let users = repo::list_employees_by_department(&state.db, department).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn without_department(state: &AppState, actor: &User) -> ApiResult<Vec<UserResponse>> {
    require_hr(actor)?;
    let users = repo::list_employees_without_department(&state.db).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn assign_department(
    state: &AppState,
    actor: &User,
    payload: AssignDepartmentRequest,
    ip: &str,
) -> ApiResult<UserResponse> {
    require_hr(actor)?;
    let target = repo::find_by_id(&state.db, payload.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if target.role != Role::Employee {
        return Err(ApiError::bad_request(
            "Can only assign department to employees",
        ));
    }
    let department = payload.department.trim();
    if department.is_empty() {
        return Err(ApiError::bad_request("Department is required"));
    }

    let updated = repo::assign_department(&state.db, target.id, department)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    record(
        &state.db,
        actor.id,
        AuditAction::AssignDepartment,
        Some(target.id),
        Some(serde_json::json!({ "department": department }).to_string()),
        ip,
    )
    .await?;
    Ok(UserResponse::from(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use time::OffsetDateTime;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            password_hash: String::new(),
            role,
            department: None,
            position: None,
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn admin_gate() {
        assert!(require_admin(&user(Role::Superadmin)).is_ok());
        assert!(require_admin(&user(Role::Hr)).is_err());
        assert!(require_admin(&user(Role::Employee)).is_err());
    }

    #[test]
    fn hr_gate_admits_admin_too() {
        assert!(require_hr(&user(Role::Hr)).is_ok());
        assert!(require_hr(&user(Role::Superadmin)).is_ok());
        assert!(require_hr(&user(Role::Employee)).is_err());
    }

    #[tokio::test]
    async fn create_requires_admin() {
        let state = AppState::fake();
        let payload = CreateUserRequest {
            name: "New Hire".into(),
            email: "new@example.com".into(),
            password: "longenough".into(),
            role: Role::Employee,
            department: None,
            position: None,
        };
        let err = create(&state, &user(Role::Hr), payload, "unknown")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Access denied: SuperAdmin role required");
    }
}
